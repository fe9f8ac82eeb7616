use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use todo_server::{config::Config, store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,todo_server=debug,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let store = store::from_config(&config.storage);

    let addr = config.server.address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, backend = ?config.storage.backend, "listening");

    todo_server::run(listener, store).await?;
    Ok(())
}
