use anyhow::Context as _;
use serde_json::{Value, json};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Minimal MCP client speaking line-delimited JSON-RPC to a child process over stdio.
///
/// Exists only for integration tests; it does not go through rmcp so the tests observe the
/// exact wire messages. The child is killed if the session is dropped without [`Self::close`].
pub struct StdioMcpSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    timeout: Duration,
}

impl StdioMcpSession {
    /// Spawn `bin` with `args`, then run the `initialize` handshake.
    ///
    /// Returns the session and the `initialize` result.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or the handshake fails.
    pub async fn connect(bin: &Path, args: &[&str]) -> anyhow::Result<(Self, Value)> {
        let mut child = Command::new(bin)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawn {}", bin.display()))?;

        let stdin = child.stdin.take().context("child stdin")?;
        let stdout = child.stdout.take().context("child stdout")?;

        let mut session = Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
            timeout: Duration::from_secs(10),
        };

        let init = session
            .request(
                0,
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "knox-mcp-client-integration-tests", "version": "0" }
                }),
            )
            .await?;
        anyhow::ensure!(init.get("result").is_some(), "initialize failed: {init}");

        session
            .notify("notifications/initialized", Value::Null)
            .await?;

        Ok((session, init))
    }

    /// Send a request and wait for the response carrying the same `id`.
    ///
    /// Server notifications received in between are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, timeout, or if the child closes stdout first.
    pub async fn request(&mut self, id: u64, method: &str, params: Value) -> anyhow::Result<Value> {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))
        .await?;

        let timeout = self.timeout;
        tokio::time::timeout(timeout, self.read_response(id))
            .await
            .with_context(|| format!("timeout waiting for response to {method}"))?
    }

    /// Send a notification (no `id`, no response). `Value::Null` params are omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the child's stdin fails.
    pub async fn notify(&mut self, method: &str, params: Value) -> anyhow::Result<()> {
        let mut msg = json!({ "jsonrpc": "2.0", "method": method });
        if !params.is_null() {
            msg["params"] = params;
        }
        self.send(&msg).await
    }

    /// Close the child's stdin and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the child does not exit before the session timeout.
    pub async fn close(mut self) -> anyhow::Result<ExitStatus> {
        drop(self.stdin.take());
        tokio::time::timeout(self.timeout, self.child.wait())
            .await
            .context("timeout waiting for child exit")?
            .context("wait for child")
    }

    async fn send(&mut self, msg: &Value) -> anyhow::Result<()> {
        let stdin = self.stdin.as_mut().context("stdin already closed")?;
        let mut line = serde_json::to_vec(msg)?;
        line.push(b'\n');
        stdin.write_all(&line).await.context("write to child stdin")?;
        stdin.flush().await.context("flush child stdin")?;
        Ok(())
    }

    async fn read_response(&mut self, id: u64) -> anyhow::Result<Value> {
        while let Some(line) = self.stdout.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let msg: Value = serde_json::from_str(line)
                .with_context(|| format!("child wrote non-JSON line: {line}"))?;
            if msg.get("id") == Some(&json!(id)) {
                return Ok(msg);
            }
        }
        anyhow::bail!("child closed stdout before answering request {id}")
    }
}
