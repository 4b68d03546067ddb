//! Agent configuration: command-line flags first, then `KUBETOP_AGENT_*` environment, then defaults.

use std::time::Duration;

use crate::error::{AgentError, Result};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POD_TOPIC: &str = "/k8s_pod_metrics";
pub const DEFAULT_NODE_TOPIC: &str = "/k8s_node_metrics";
pub const DEFAULT_QUEUE_SIZE: usize = 10;
pub const DEFAULT_TOOL: &str = "kubectl";

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub port: u16,
    pub interval: Duration,
    pub tool: String,
    pub pod_topic: String,
    pub node_topic: String,
    pub queue_size: usize,
    pub auth_token: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            interval: Duration::from_secs(1),
            tool: DEFAULT_TOOL.into(),
            pod_topic: DEFAULT_POD_TOPIC.into(),
            node_topic: DEFAULT_NODE_TOPIC.into(),
            queue_size: DEFAULT_QUEUE_SIZE,
            auth_token: None,
        }
    }
}

pub enum Invocation {
    Run(AgentConfig),
    Help(String),
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--port PORT|-p PORT] [--interval SECS|-i SECS] [--kubectl PATH|-k PATH] \
         [--pod-topic NAME] [--node-topic NAME] [--queue-size N] [--token TOKEN]"
    )
}

fn parse_port(v: &str) -> Result<u16> {
    v.trim()
        .parse::<u16>()
        .map_err(|e| AgentError::config("port", format!("{v:?}: {e}")))
}

fn parse_interval_secs(v: &str) -> Result<Duration> {
    let secs: f64 = v
        .trim()
        .parse()
        .map_err(|e| AgentError::config("interval", format!("{v:?}: {e}")))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(AgentError::config("interval", "must be > 0"));
    }
    let interval = Duration::try_from_secs_f64(secs)
        .map_err(|e| AgentError::config("interval", format!("{v:?}: {e}")))?;
    // sub-nanosecond values round down to zero, which would spin the loop
    if interval.is_zero() {
        return Err(AgentError::config("interval", "must be at least 1ns"));
    }
    Ok(interval)
}

fn parse_interval_ms(v: &str) -> Result<Duration> {
    let ms: u64 = v
        .trim()
        .parse()
        .map_err(|e| AgentError::config("interval", format!("{v:?}: {e}")))?;
    if ms == 0 {
        return Err(AgentError::config("interval", "must be > 0"));
    }
    Ok(Duration::from_millis(ms))
}

fn parse_queue_size(v: &str) -> Result<usize> {
    match v.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        Ok(_) => Err(AgentError::config("queue-size", "must be >= 1")),
        Err(e) => Err(AgentError::config("queue-size", format!("{v:?}: {e}"))),
    }
}

fn non_empty(parameter: &str, v: String) -> Result<String> {
    if v.trim().is_empty() {
        return Err(AgentError::config(parameter, "must not be empty"));
    }
    Ok(v)
}

/// An empty token (flag or env) means no auth.
fn token(v: String) -> Option<String> {
    Some(v).filter(|t| !t.is_empty())
}

fn require(flag: &str, v: Option<String>) -> Result<String> {
    v.ok_or_else(|| AgentError::config(flag.trim_start_matches('-'), "missing value"))
}

/// Parse argv (program name first). `env` looks up a variable; pass `|k| std::env::var(k).ok()` in production.
pub fn parse_args<I, F>(args: I, env: F) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = AgentConfig::default();

    // Environment overrides first; flags below win over them.
    if let Some(v) = env("KUBETOP_AGENT_PORT") {
        cfg.port = parse_port(&v)?;
    }
    if let Some(v) = env("KUBETOP_AGENT_INTERVAL_MS") {
        cfg.interval = parse_interval_ms(&v)?;
    }
    if let Some(v) = env("KUBETOP_AGENT_KUBECTL") {
        cfg.tool = non_empty("kubectl", v)?;
    }
    if let Some(v) = env("KUBETOP_AGENT_POD_TOPIC") {
        cfg.pod_topic = non_empty("pod-topic", v)?;
    }
    if let Some(v) = env("KUBETOP_AGENT_NODE_TOPIC") {
        cfg.node_topic = non_empty("node-topic", v)?;
    }
    if let Some(v) = env("KUBETOP_AGENT_QUEUE_SIZE") {
        cfg.queue_size = parse_queue_size(&v)?;
    }
    if let Some(v) = env("KUBETOP_AGENT_TOKEN") {
        cfg.auth_token = token(v);
    }

    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "kubetop_agent".into());
    while let Some(arg) = it.next() {
        // Accept both `--flag value` and `--flag=value`.
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = || inline.clone().or_else(|| it.next());
        match flag.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help(usage(&prog))),
            "--port" | "-p" => cfg.port = parse_port(&require(&flag, value())?)?,
            "--interval" | "-i" => cfg.interval = parse_interval_secs(&require(&flag, value())?)?,
            "--kubectl" | "-k" => cfg.tool = non_empty("kubectl", require(&flag, value())?)?,
            "--pod-topic" => cfg.pod_topic = non_empty("pod-topic", require(&flag, value())?)?,
            "--node-topic" => cfg.node_topic = non_empty("node-topic", require(&flag, value())?)?,
            "--queue-size" => cfg.queue_size = parse_queue_size(&require(&flag, value())?)?,
            "--token" => cfg.auth_token = token(value().unwrap_or_default()),
            _ => {
                return Err(AgentError::config(
                    "arguments",
                    format!("unexpected argument {arg:?}. {}", usage(&prog)),
                ))
            }
        }
    }

    if crate::bus::normalize_topic(&cfg.pod_topic) == crate::bus::normalize_topic(&cfg.node_topic)
    {
        return Err(AgentError::config(
            "topics",
            "pod and node topics must differ",
        ));
    }
    Ok(Invocation::Run(cfg))
}
