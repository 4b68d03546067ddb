//! Named fan-out topics.
//!
//! Each topic is a bounded `broadcast` channel: every subscriber sees every
//! message in publish order, and a subscriber that falls more than
//! `queue_size` messages behind loses the oldest ones.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// `k8s_pod_metrics`, `/k8s_pod_metrics` and `//k8s_pod_metrics` all name the same topic.
/// The `kubetop` client carries a copy of this rule for building URLs; keep them in sync.
pub fn normalize_topic(name: &str) -> String {
    format!("/{}", name.trim().trim_start_matches('/'))
}

#[derive(Clone)]
struct Topic {
    tx: broadcast::Sender<String>,
    published: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TopicInfo {
    pub name: String,
    pub subscribers: usize,
    pub published: u64,
}

pub struct Bus {
    queue_size: usize,
    topics: RwLock<BTreeMap<String, Topic>>,
}

impl Bus {
    pub fn new(queue_size: usize) -> Self {
        Self {
            queue_size: queue_size.max(1),
            topics: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size
    }

    /// Create the topic if needed and hand back a publisher for it.
    pub fn topic(&self, name: &str) -> Publisher {
        let name = normalize_topic(name);
        let mut topics = self.topics.write().unwrap_or_else(|e| e.into_inner());
        let topic = topics.entry(name.clone()).or_insert_with(|| {
            debug!("creating topic {name} (queue_size={})", self.queue_size);
            let (tx, _) = broadcast::channel(self.queue_size);
            Topic {
                tx,
                published: Arc::new(AtomicU64::new(0)),
            }
        });
        Publisher {
            name: name.into(),
            tx: topic.tx.clone(),
            published: topic.published.clone(),
        }
    }

    /// `None` if nothing ever created the topic.
    pub fn subscribe(&self, name: &str) -> Option<Subscription> {
        let name = normalize_topic(name);
        let topics = self.topics.read().unwrap_or_else(|e| e.into_inner());
        topics.get(&name).map(|t| Subscription {
            name: name.into(),
            rx: t.tx.subscribe(),
        })
    }

    pub fn topics(&self) -> Vec<TopicInfo> {
        let topics = self.topics.read().unwrap_or_else(|e| e.into_inner());
        topics
            .iter()
            .map(|(name, t)| TopicInfo {
                name: name.clone(),
                subscribers: t.tx.receiver_count(),
                published: t.published.load(Ordering::Relaxed),
            })
            .collect()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(10)
    }
}

#[derive(Clone)]
pub struct Publisher {
    name: Arc<str>,
    tx: broadcast::Sender<String>,
    published: Arc<AtomicU64>,
}

impl Publisher {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns how many subscribers received the message; 0 (dropped) when nobody listens.
    pub fn publish(&self, msg: impl Into<String>) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.tx.send(msg.into()).unwrap_or(0)
    }
}

pub struct Subscription {
    name: Arc<str>,
    rx: broadcast::Receiver<String>,
}

impl Subscription {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next message in publish order; `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            match self.rx.recv().await {
                Ok(msg) => return Some(msg),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("subscriber on {} lagged, dropped {n} messages", self.name);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
