use hearth::config::{Config, HandlerKind};
use hearth::handlers::{DefaultHandler, ProxyHandler, StaticFileHandler};
use hearth::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();

    let srv = match cfg.handler {
        HandlerKind::Default => server::serve(DefaultHandler, cfg.port).await?,
        HandlerKind::Proxy => server::serve(ProxyHandler::new(&cfg.proxy_base)?, cfg.port).await?,
        HandlerKind::Video => {
            server::serve(StaticFileHandler::new(&cfg.video_path), cfg.port).await?
        }
    };
    tracing::info!(addr = %srv.addr(), handler = ?cfg.handler, "server started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    srv.close()?;

    Ok(())
}
