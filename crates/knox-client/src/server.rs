//! MCP server surface: `tools/list` and `tools/call` over rmcp.

use crate::error::{KnoxError, Surfaced};
use crate::http::HttpCaller;
use crate::tool::{KnoxClientArgs, KnoxTool};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use tracing::{debug, warn};

pub const SERVER_NAME: &str = "knox-client";

const INSTRUCTIONS: &str = "Exposes one tool, `knox_client`, which performs a single HTTP \
GET/POST/PUT/DELETE against a Knox REST endpoint (optionally with a bearer token) and returns \
the response body as text.";

/// Stateless tool adapter. Each call is independent of every other call.
#[derive(Clone)]
pub struct KnoxServer {
    http: HttpCaller,
}

impl KnoxServer {
    #[must_use]
    pub fn new(http: HttpCaller) -> Self {
        Self { http }
    }

    /// The `tools/list` payload.
    #[must_use]
    pub fn tools() -> ListToolsResult {
        ListToolsResult {
            tools: KnoxTool::ALL.iter().map(|t| t.descriptor()).collect(),
            ..Default::default()
        }
    }

    /// Run one `tools/call`.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_params` error for unknown tools and malformed arguments. Upstream
    /// failures are not errors here: they come back as a result with `isError: true`.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.dispatch(name, arguments).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(tool = %name, error = %e, "tool call failed");
                match e.surface() {
                    Surfaced::Protocol(err) => Err(err),
                    Surfaced::ToolResult(result) => Ok(result),
                }
            }
        }
    }

    async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, KnoxError> {
        match KnoxTool::resolve(name)? {
            KnoxTool::KnoxClient => {
                let args = KnoxClientArgs::from_arguments(arguments)?;
                debug!(tool = %KnoxTool::KnoxClient, method = args.method().as_str(), "dispatching");
                let body = self.http.execute(&args).await?;
                Ok(CallToolResult::success(vec![Content::text(body)]))
            }
        }
    }
}

impl ServerHandler for KnoxServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info.name = SERVER_NAME.to_string();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(Self::tools())
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.invoke(&request.name, request.arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::KnoxServer;
    use crate::http::HttpCaller;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::routing::any;
    use rmcp::ServerHandler as _;
    use rmcp::model::{CallToolResult, ErrorCode, JsonObject};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::net::TcpListener;

    struct Upstream {
        base_url: String,
        hits: Arc<AtomicUsize>,
        _shutdown: tokio::sync::oneshot::Sender<()>,
    }

    async fn spawn_upstream() -> Upstream {
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let app = Router::new()
            .route("/ok", any(|| async { "pong" }))
            .route(
                "/secure",
                any(|headers: HeaderMap| async move {
                    headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("<none>")
                        .to_string()
                }),
            )
            .route("/missing", any(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/redir",
                any(|| async { (StatusCode::FOUND, [(header::LOCATION, "/ok")]) }),
            )
            .route(
                "/slow",
                any(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    "late"
                }),
            )
            .layer(axum::middleware::from_fn(
                move |req: axum::extract::Request, next: axum::middleware::Next| {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        next.run(req).await
                    }
                },
            ));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move { server.await });

        Upstream {
            base_url: format!("http://{addr}"),
            hits,
            _shutdown: shutdown_tx,
        }
    }

    fn server() -> KnoxServer {
        KnoxServer::new(HttpCaller::new(None).expect("client"))
    }

    fn args(v: Value) -> Option<JsonObject> {
        v.as_object().cloned()
    }

    fn first_text(result: &CallToolResult) -> String {
        let v = serde_json::to_value(result).expect("CallToolResult serializes");
        v.get("content")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str)
            .expect("content[0].text")
            .to_string()
    }

    #[test]
    fn lists_exactly_one_tool() {
        let listed = KnoxServer::tools();
        assert_eq!(listed.tools.len(), 1);
        assert_eq!(listed.tools[0].name, "knox_client");
        assert!(listed.next_cursor.is_none());
    }

    #[test]
    fn server_info_advertises_tools_only() {
        let info = server().get_info();
        assert_eq!(info.server_info.name, "knox-client");
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
    }

    #[tokio::test]
    async fn get_returns_body_text() {
        let up = spawn_upstream().await;
        let result = server()
            .invoke(
                "knox_client",
                args(json!({"url": format!("{}/ok", up.base_url), "method": "GET"})),
            )
            .await
            .expect("call succeeds");

        assert_eq!(result.is_error, Some(false));
        assert_eq!(first_text(&result), "pong");
        assert_eq!(result.content.len(), 1);
    }

    #[tokio::test]
    async fn bearer_token_reaches_upstream() {
        let up = spawn_upstream().await;
        let result = server()
            .invoke(
                "knox_client",
                args(json!({
                    "url": format!("{}/secure", up.base_url),
                    "bearer_token": "abc123"
                })),
            )
            .await
            .expect("call succeeds");

        assert_eq!(first_text(&result), "Bearer abc123");
    }

    #[tokio::test]
    async fn not_found_is_an_error_result() {
        let up = spawn_upstream().await;
        let result = server()
            .invoke(
                "knox_client",
                args(json!({"url": format!("{}/missing", up.base_url)})),
            )
            .await
            .expect("upstream failures are tool results");

        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("404"));
    }

    #[tokio::test]
    async fn unknown_tool_issues_no_request() {
        let up = spawn_upstream().await;
        let err = server()
            .invoke(
                "other_tool",
                args(json!({"url": format!("{}/ok", up.base_url)})),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("other_tool"));
        assert_eq!(up.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bad_method_issues_no_request() {
        let up = spawn_upstream().await;
        let err = server()
            .invoke(
                "knox_client",
                args(json!({"url": format!("{}/ok", up.base_url), "method": "PATCH"})),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(up.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_url_is_invalid_params() {
        let err = server().invoke("knox_client", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn redirect_is_an_error_result() {
        let up = spawn_upstream().await;
        let result = server()
            .invoke(
                "knox_client",
                args(json!({"url": format!("{}/redir", up.base_url)})),
            )
            .await
            .expect("upstream failures are tool results");

        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("302"));
        assert_eq!(up.hits.load(Ordering::SeqCst), 1, "redirect target not requested");
    }

    #[tokio::test]
    async fn timed_out_request_is_an_error_result() {
        let up = spawn_upstream().await;
        let server = KnoxServer::new(
            HttpCaller::new(Some(Duration::from_millis(200))).expect("client"),
        );
        let result = server
            .invoke(
                "knox_client",
                args(json!({"url": format!("{}/slow", up.base_url)})),
            )
            .await
            .expect("upstream failures are tool results");

        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("transport"));
    }
}
