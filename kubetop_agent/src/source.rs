//! Where reports come from: the external metrics tool.

use std::process::{Command, Stdio};

use crate::error::{AgentError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Pods,
    Nodes,
}

impl ReportKind {
    pub fn args(self) -> [&'static str; 2] {
        match self {
            ReportKind::Pods => ["top", "pods"],
            ReportKind::Nodes => ["top", "nodes"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Pods => "pod",
            ReportKind::Nodes => "node",
        }
    }
}

/// Produces raw report text. Implementations block; the collector runs them off the async runtime.
pub trait ReportSource: Send + Sync + 'static {
    fn fetch(&self, kind: ReportKind) -> Result<String>;
}

/// Shells out to `kubectl top ...` (or a configured replacement binary).
#[derive(Debug, Clone)]
pub struct KubectlSource {
    tool: String,
}

impl KubectlSource {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

impl ReportSource for KubectlSource {
    fn fetch(&self, kind: ReportKind) -> Result<String> {
        let args = kind.args();
        // No timeout: a hung tool stalls the loop until it returns.
        let output = Command::new(&self.tool)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| AgentError::ToolSpawn {
                tool: self.tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AgentError::ToolExit {
                tool: self.tool.clone(),
                args: args.join(" "),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_spawn_error() {
        let src = KubectlSource::new("/nonexistent/kubetop-test-kubectl");
        let err = src.fetch(ReportKind::Pods).unwrap_err();
        assert!(matches!(err, AgentError::ToolSpawn { .. }), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_exit_error() {
        // `false` ignores its arguments and exits 1
        let src = KubectlSource::new("false");
        let err = src.fetch(ReportKind::Nodes).unwrap_err();
        match err {
            AgentError::ToolExit { args, status, .. } => {
                assert_eq!(args, "top nodes");
                assert!(!status.success());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_returned_verbatim() {
        // `echo top pods` -> "top pods\n"
        let src = KubectlSource::new("echo");
        assert_eq!(src.fetch(ReportKind::Pods).unwrap(), "top pods\n");
    }
}
