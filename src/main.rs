use std::net::SocketAddr;
use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpListener;

use weather_archive_gateway::{
    router, AppState, BlobStore, Config, GatewayError, MemoryBlobStore, OpenMeteoClient,
    S3BlobStore, StorageBackend, SERVICE_NAME,
};

#[tokio::main]
async fn main() -> Result<(), GatewayError> {
    env_logger::init();

    let config = Config::from_env()?;

    let store: Arc<dyn BlobStore> = match config.storage_backend {
        StorageBackend::S3 => Arc::new(
            S3BlobStore::from_env(config.bucket.clone(), config.s3_force_path_style).await,
        ),
        StorageBackend::Memory => {
            warn!("Using the in-memory storage backend; artifacts will not survive a restart");
            Arc::new(MemoryBlobStore::new())
        }
    };
    store.ensure_bucket().await?;

    let weather = OpenMeteoClient::builder().build()?;
    let app = router(AppState { weather, store });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| GatewayError::Bind(addr, err))?;
    info!("{SERVICE_NAME} listening on {addr} (bucket '{}')", config.bucket);
    axum::serve(listener, app).await.map_err(GatewayError::Serve)
}
