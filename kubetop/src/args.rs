//! Command-line parsing for the subscriber.

use std::path::PathBuf;

pub const DEFAULT_URL: &str = "ws://127.0.0.1:3000";
pub const DEFAULT_TOPICS: [&str; 2] = ["/k8s_pod_metrics", "/k8s_node_metrics"];

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgs {
    pub url: String,
    pub topics: Vec<String>,
    pub record: Option<PathBuf>,
    pub count: Option<usize>,
    pub token: Option<String>,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Run(ParsedArgs),
    /// `-h`/`--help`: print this usage text and exit successfully.
    Help(String),
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--topic NAME|-T NAME]... [--record FILE|-r FILE] [--count N|-n N] [--token TOKEN] [ws://HOST:PORT]"
    )
}

/// `Err` carries what was wrong, followed by usage.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Invocation, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "kubetop".into());
    let mut url: Option<String> = None;
    let mut topics: Vec<String> = Vec::new();
    let mut record: Option<PathBuf> = None;
    let mut count: Option<usize> = None;
    let mut token: Option<String> = None;

    while let Some(arg) = it.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = || {
            inline
                .clone()
                .or_else(|| it.next())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("{flag} needs a value. {}", usage(&prog)))
        };
        match flag.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help(usage(&prog))),
            "--topic" | "-T" => topics.push(value()?),
            "--record" | "-r" => record = Some(PathBuf::from(value()?)),
            "--token" => token = Some(value()?),
            "--count" | "-n" => {
                let v = value()?;
                match v.parse::<usize>() {
                    Ok(n) if n > 0 => count = Some(n),
                    _ => return Err(format!("invalid --count {v:?}. {}", usage(&prog))),
                }
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown flag {arg}. {}", usage(&prog)));
            }
            _ => {
                if url.is_none() {
                    url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. {}", usage(&prog)));
                }
            }
        }
    }

    if topics.is_empty() {
        topics = DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect();
    }
    Ok(Invocation::Run(ParsedArgs {
        url: url.unwrap_or_else(|| DEFAULT_URL.into()),
        topics,
        record,
        count,
        token,
    }))
}
