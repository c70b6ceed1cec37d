use knox_test_support::StdioMcpSession;
use serde_json::{Value, json};
use std::path::Path;

pub use knox_test_support::StubUpstream;

pub async fn spawn_server() -> anyhow::Result<StdioMcpSession> {
    let bin = Path::new(env!("CARGO_BIN_EXE_knox-mcp-client"));
    let (session, _init) =
        StdioMcpSession::connect(bin, &["--log-level", "warn", "--request-timeout-secs", "10"])
            .await?;
    Ok(session)
}

pub async fn call_knox(
    session: &mut StdioMcpSession,
    id: u64,
    arguments: Value,
) -> anyhow::Result<Value> {
    session
        .request(
            id,
            "tools/call",
            json!({ "name": "knox_client", "arguments": arguments }),
        )
        .await
}

/// `result.content[0].text` of a `tools/call` response.
#[allow(dead_code)]
pub fn result_text(msg: &Value) -> Option<&str> {
    msg.get("result")?
        .get("content")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
}

#[allow(dead_code)]
pub fn is_error_result(msg: &Value) -> bool {
    msg.get("result")
        .and_then(|r| r.get("isError"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
