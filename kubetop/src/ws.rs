//! WebSocket client side: one connection per topic, merged into a single channel.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A message as received, tagged with the topic it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessage {
    pub topic: String,
    pub data: String,
}

/// Same rule as `kubetop_agent::bus::normalize_topic`; the two must stay in sync
/// (checked by `tests/subscribe_record.rs`).
pub fn normalize_topic(name: &str) -> String {
    format!("/{}", name.trim().trim_start_matches('/'))
}

/// `ws://host:port` + `/k8s_pod_metrics` -> `ws://host:port/ws/k8s_pod_metrics[?token=..]`
pub fn topic_url(base: &str, topic: &str, token: Option<&str>) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{prefix}/ws{}", normalize_topic(topic)));
    if let Some(t) = token {
        url.query_pairs_mut().append_pair("token", t);
    }
    Ok(url)
}

pub async fn connect(url: &Url) -> Result<WsStream, tokio_tungstenite::tungstenite::Error> {
    let (ws, _) = connect_async(url.as_str()).await?;
    Ok(ws)
}

/// Forward every text frame of `ws` into `tx` until either side goes away.
pub fn spawn_forwarder(
    topic: String,
    mut ws: WsStream,
    tx: mpsc::Sender<TopicMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Text(data)) => {
                    let msg = TopicMessage {
                        topic: topic.clone(),
                        data: data.to_string(),
                    };
                    if tx.send(msg).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("{topic}: connection error: {e}");
                    break;
                }
            }
        }
        debug!("{topic}: stream closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_topic_urls() {
        let u = topic_url("ws://127.0.0.1:3000", "/k8s_pod_metrics", None).unwrap();
        assert_eq!(u.as_str(), "ws://127.0.0.1:3000/ws/k8s_pod_metrics");

        let u = topic_url("ws://h:1/", "k8s_node_metrics", Some("a b")).unwrap();
        assert_eq!(u.as_str(), "ws://h:1/ws/k8s_node_metrics?token=a+b");

        assert!(topic_url("not a url", "t", None).is_err());
    }
}
