//! Command-line and environment construction for the two children.
//!
//! # Responsibilities
//! - Translate resolved configuration into inference server flags
//! - Derive the adapter's upstream URLs and feature toggles
//! - Render commands for logs and `--dry-run`
//!
//! Everything here is pure: no process is touched.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::config::LauncherConfig;

pub const OPENAI_BASE_URL_INTERNAL: &str = "OPENAI_BASE_URL_INTERNAL";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const API_ADAPTER_HOST: &str = "API_ADAPTER_HOST";
pub const API_ADAPTER_PORT: &str = "API_ADAPTER_PORT";
pub const ENABLE_MCP_TOOLS: &str = "ENABLE_MCP_TOOLS";

/// Where a child's standard input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StdinMode {
    /// `/dev/null`, as for a shell background job.
    Null,
    /// The launcher's own stdin, as for a foreground command.
    Inherit,
}

/// A fully resolved child process invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// Short label used in logs (`inference`, `adapter`).
    pub name: &'static str,
    pub program: String,
    pub args: Vec<String>,
    /// Entries added on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    pub stdin: StdinMode,
}

impl CommandSpec {
    /// Value following `flag` in the argument list, if present.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|idx| self.args.get(idx + 1))
            .map(String::as_str)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|arg| arg == flag)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, quote(value))?;
        }
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,@%+".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// `http://localhost:<port>`, the base URL under which a local child is reached.
pub fn local_base_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}

/// The inference server invocation.
pub fn inference_command(config: &LauncherConfig) -> CommandSpec {
    let model = &config.model;
    let mut args = config.inference.args.clone();

    args.extend([
        "--model".to_string(),
        model.path.clone(),
        "--tokenizer".to_string(),
        config.tokenizer_path().to_string(),
        "--host".to_string(),
        config.inference.host.clone(),
        "--port".to_string(),
        config.inference.port.to_string(),
        "--served-model-name".to_string(),
        model.served_name.clone(),
        "--tensor-parallel-size".to_string(),
        model.tensor_parallel_size.clone(),
        "--max-model-len".to_string(),
        model.max_model_len.clone(),
        "--max-num-batched-tokens".to_string(),
        model.max_num_batched_tokens.to_string(),
        "--max-num-seqs".to_string(),
        model.max_num_seqs.to_string(),
    ]);
    if model.trust_remote_code {
        args.push("--trust-remote-code".to_string());
    }

    CommandSpec {
        name: "inference",
        program: config.inference.program.clone(),
        args,
        env: BTreeMap::new(),
        stdin: StdinMode::Null,
    }
}

/// Environment entries handed to the adapter.
///
/// Pass-through entries from `adapter.env` come first; the derived upstream
/// URLs, bind address and the disabled tool flag always override them.
pub fn adapter_env(config: &LauncherConfig) -> BTreeMap<String, String> {
    let mut env = config.adapter.env.clone();

    env.insert(
        OPENAI_BASE_URL_INTERNAL.to_string(),
        local_base_url(config.inference.port),
    );
    env.insert(OPENAI_BASE_URL.to_string(), local_base_url(config.adapter.port));
    env.insert(API_ADAPTER_HOST.to_string(), config.adapter.host.clone());
    env.insert(API_ADAPTER_PORT.to_string(), config.adapter.port.to_string());
    env.insert(ENABLE_MCP_TOOLS.to_string(), "false".to_string());

    env
}

/// The adapter invocation.
pub fn adapter_command(config: &LauncherConfig) -> CommandSpec {
    let mut args = config.adapter.args.clone();
    args.extend([
        "--host".to_string(),
        config.adapter.host.clone(),
        "--port".to_string(),
        config.adapter.port.to_string(),
    ]);

    CommandSpec {
        name: "adapter",
        program: config.adapter.program.clone(),
        args,
        env: adapter_env(config),
        stdin: StdinMode::Inherit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFERENCE_FLAGS: [&str; 10] = [
        "--model",
        "--tokenizer",
        "--host",
        "--port",
        "--served-model-name",
        "--tensor-parallel-size",
        "--max-model-len",
        "--max-num-batched-tokens",
        "--max-num-seqs",
        "--trust-remote-code",
    ];

    #[test]
    fn inference_command_with_defaults() {
        let cmd = inference_command(&LauncherConfig::default());

        assert_eq!(cmd.program, "python3");
        assert_eq!(
            cmd.args,
            [
                "-m",
                "vllm.entrypoints.openai.api_server",
                "--model",
                "/model",
                "--tokenizer",
                "/model",
                "--host",
                "0.0.0.0",
                "--port",
                "11434",
                "--served-model-name",
                "llama4",
                "--tensor-parallel-size",
                "1",
                "--max-model-len",
                "32768",
                "--max-num-batched-tokens",
                "1024",
                "--max-num-seqs",
                "128",
                "--trust-remote-code",
            ]
        );
        assert!(cmd.env.is_empty());
    }

    #[test]
    fn inference_command_has_exact_flag_set() {
        let mut config = LauncherConfig::default();
        config.model.path = "/weights".into();
        config.model.served_name = "scout".into();
        config.model.tensor_parallel_size = "8".into();
        config.inference.port = 9000;
        config.inference.args.clear();

        let cmd = inference_command(&config);
        let flags: Vec<&str> = cmd
            .args
            .iter()
            .filter(|a| a.starts_with("--"))
            .map(String::as_str)
            .collect();
        assert_eq!(flags, INFERENCE_FLAGS);
        assert_eq!(cmd.flag_value("--tokenizer"), Some("/weights"));
        assert_eq!(cmd.flag_value("--port"), Some("9000"));
        assert_eq!(cmd.flag_value("--tensor-parallel-size"), Some("8"));
        assert_eq!(cmd.flag_value("--served-model-name"), Some("scout"));
    }

    #[test]
    fn remote_code_flag_follows_config() {
        let mut config = LauncherConfig::default();
        assert!(inference_command(&config).has_flag("--trust-remote-code"));

        config.model.trust_remote_code = false;
        assert!(!inference_command(&config).has_flag("--trust-remote-code"));
    }

    #[test]
    fn adapter_env_derives_upstream_urls() {
        let env = adapter_env(&LauncherConfig::default());

        assert_eq!(env[OPENAI_BASE_URL_INTERNAL], "http://localhost:11434");
        assert_eq!(env[OPENAI_BASE_URL], "http://localhost:8003");
        assert_eq!(env[API_ADAPTER_HOST], "0.0.0.0");
        assert_eq!(env[API_ADAPTER_PORT], "8003");
        assert_eq!(env[ENABLE_MCP_TOOLS], "false");
        assert_eq!(env.len(), 5);
    }

    #[test]
    fn tool_flag_cannot_be_overridden() {
        let mut config = LauncherConfig::default();
        config.adapter.env.insert(ENABLE_MCP_TOOLS.into(), "true".into());
        config
            .adapter
            .env
            .insert("MCP_SERVERS_CONFIG_PATH".into(), "/etc/mcp.json".into());

        let env = adapter_env(&config);
        assert_eq!(env[ENABLE_MCP_TOOLS], "false");
        assert_eq!(env["MCP_SERVERS_CONFIG_PATH"], "/etc/mcp.json");
    }

    #[test]
    fn adapter_command_binds_host_and_port() {
        let mut config = LauncherConfig::default();
        config.adapter.port = 18003;

        let cmd = adapter_command(&config);
        assert_eq!(cmd.program, "uvicorn");
        assert_eq!(cmd.flag_value("--host"), Some("0.0.0.0"));
        assert_eq!(cmd.flag_value("--port"), Some("18003"));
        assert_eq!(cmd.env[OPENAI_BASE_URL], "http://localhost:18003");
    }

    #[test]
    fn only_the_adapter_reads_launcher_stdin() {
        let config = LauncherConfig::default();
        assert_eq!(inference_command(&config).stdin, StdinMode::Null);
        assert_eq!(adapter_command(&config).stdin, StdinMode::Inherit);
    }

    #[test]
    fn display_quotes_unsafe_arguments() {
        let cmd = CommandSpec {
            name: "adapter",
            program: "sh".into(),
            args: vec!["-c".into(), "exit 3".into()],
            env: BTreeMap::from([("A".to_string(), "x y".to_string())]),
            stdin: StdinMode::Null,
        };
        assert_eq!(cmd.to_string(), "A='x y' sh -c 'exit 3'");
    }
}
