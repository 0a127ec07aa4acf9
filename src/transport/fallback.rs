//! Remote script execution on a proxy node.
//!
//! Used when a node rejects direct HTTP access: the proxy node fetches the
//! same URL locally and the script's standard output becomes the payload.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::IndexServerResult;
use crate::topology::NodeOsType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptType {
    PowerShell,
    UnixShell,
}

/// A single-line script to run on a proxy node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteScript {
    pub script_type: ScriptType,
    pub body: String,
}

impl RemoteScript {
    /// Script performing a plain HTTP GET of `url` and printing the body.
    ///
    /// PowerShell unless the proxy node is known to run Unix.
    pub fn http_get(url: &str, proxy_os: Option<NodeOsType>) -> Self {
        match proxy_os {
            Some(NodeOsType::Unix) => Self {
                script_type: ScriptType::UnixShell,
                body: format!("curl -s \"{}\"", url),
            },
            _ => Self {
                script_type: ScriptType::PowerShell,
                body: format!("(Invoke-WebRequest -UseBasicParsing -uri \"{}\").content", url),
            },
        }
    }
}

/// Captured result of a remote script
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    pub fn success(stdout: &str) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }
}

/// Runs scripts on a named client machine and blocks until they finish
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run_script(
        &self,
        client_name: &str,
        script: &RemoteScript,
    ) -> IndexServerResult<ScriptOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_powershell_is_default() {
        let script = RemoteScript::http_get("http://n1:20000/solr/c/select?q=*:*&wt=json", None);
        assert_eq!(script.script_type, ScriptType::PowerShell);
        assert_eq!(
            script.body,
            "(Invoke-WebRequest -UseBasicParsing -uri \"http://n1:20000/solr/c/select?q=*:*&wt=json\").content"
        );
    }

    #[test]
    fn test_unix_proxy_uses_curl() {
        let script = RemoteScript::http_get("http://n1/x", Some(NodeOsType::Unix));
        assert_eq!(script.script_type, ScriptType::UnixShell);
        assert_eq!(script.body, "curl -s \"http://n1/x\"");
    }
}
