//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use rateio::config::{AppState, Config};
use rateio::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // RUST_LOG manda; sem ele, "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new(&config).await.map_err(|e| {
        tracing::error!("🔥 Falha ao inicializar o estado da aplicação: {:?}", e);
        e
    })?;

    let app = routes::app(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Swagger UI em http://{}/api/docs", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
