//! Entry point for kubetop. Subscribes to agent topics and prints (and optionally records) every message.

use std::env;

use anyhow::Context;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kubetop::args::{parse_args, Invocation};
use kubetop::record::Recorder;
use kubetop::ws::{connect, normalize_topic, spawn_forwarder, topic_url, TopicMessage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let parsed = match parse_args(env::args()) {
        Ok(Invocation::Run(v)) => v,
        Ok(Invocation::Help(usage)) => {
            eprintln!("{usage}");
            return Ok(());
        }
        Err(msg) => anyhow::bail!(msg),
    };

    let mut recorder = match parsed.record.as_deref() {
        Some(path) => Some(
            Recorder::open(path).with_context(|| format!("opening {}", path.display()))?,
        ),
        None => None,
    };

    let (tx, mut rx) = mpsc::channel::<TopicMessage>(256);
    let mut forwarders = Vec::new();
    for topic in &parsed.topics {
        let topic = normalize_topic(topic);
        let url = topic_url(&parsed.url, &topic, parsed.token.as_deref())
            .with_context(|| format!("bad agent url {:?}", parsed.url))?;
        let ws = connect(&url)
            .await
            .with_context(|| format!("subscribing to {topic} at {url}"))?;
        info!("subscribed to {topic}");
        forwarders.push(spawn_forwarder(topic, ws, tx.clone()));
    }
    // rx ends once every forwarder is gone
    drop(tx);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut received = 0usize;
    loop {
        let msg = tokio::select! {
            msg = rx.recv() => match msg {
                Some(m) => m,
                None => break,
            },
            _ = &mut ctrl_c => break,
        };
        println!("[{}] {}", msg.topic, msg.data);
        if let Some(rec) = recorder.as_mut() {
            rec.write(Utc::now(), &msg.topic, &msg.data)
                .context("writing recording")?;
        }
        received += 1;
        if parsed.count.is_some_and(|n| received >= n) {
            break;
        }
    }

    if let Some(rec) = recorder.as_mut() {
        rec.flush().context("flushing recording")?;
    }
    for f in forwarders {
        f.abort();
    }
    Ok(())
}
