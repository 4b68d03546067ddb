//! kubetop_agent: polls `kubectl top` and republishes each row on a websocket topic.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kubetop_agent::bus::Bus;
use kubetop_agent::collector::Collector;
use kubetop_agent::config::{parse_args, Invocation};
use kubetop_agent::source::KubectlSource;
use kubetop_agent::state::AppState;
use kubetop_agent::ws::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = match parse_args(std::env::args(), |k| std::env::var(k).ok())? {
        Invocation::Run(cfg) => cfg,
        Invocation::Help(usage) => {
            println!("{usage}");
            return Ok(());
        }
    };

    let bus = Arc::new(Bus::new(cfg.queue_size));
    let pods = bus.topic(&cfg.pod_topic);
    let nodes = bus.topic(&cfg.node_topic);

    let source = Arc::new(KubectlSource::new(cfg.tool.clone()));
    let collector = Collector::new(source, cfg.interval, pods, nodes).start();

    let app = router(AppState::new(bus, cfg.auth_token.clone()));
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        "kubetop_agent listening on ws://{}/ws/<topic>",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await
        .context("serving topics")?;

    collector.stop().await;
    Ok(())
}
