use puzzle_worker::stockfish::EnginePool;
use server::clients::chess_com::ChessComClient;
use server::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    tracing::info!(
        stockfish_path = %config.worker.stockfish_path,
        depth = config.worker.depth,
        max_engines = config.worker.max_engines,
        "Config loaded"
    );

    let engines = EnginePool::new(config.worker.engine_config());
    let chess_com = ChessComClient::new(&config.chess_com_base_url)?;

    let addr = format!("{}:{}", config.host, config.port);
    let app = server::app(config, engines, chess_com);

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
