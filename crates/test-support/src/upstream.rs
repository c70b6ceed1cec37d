use anyhow::Context as _;
use axum::Router;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::IntoResponse as _;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// One request as seen by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body_len: usize,
}

#[derive(Default)]
struct StubState {
    routes: HashMap<String, (StatusCode, Vec<u8>)>,
    observed: Mutex<Vec<ObservedRequest>>,
}

/// Local HTTP server answering fixed `(status, body)` pairs per path and recording every request.
///
/// Unconfigured paths answer `404`. The server shuts down when this value is dropped.
pub struct StubUpstream {
    base_url: String,
    state: Arc<StubState>,
    _shutdown: oneshot::Sender<()>,
}

impl StubUpstream {
    /// Start a stub with the given `(path, status, body)` routes on an ephemeral localhost port.
    ///
    /// # Errors
    ///
    /// Returns an error if a status code is invalid or the listener cannot be bound.
    pub async fn start<'a>(
        routes: impl IntoIterator<Item = (&'a str, u16, &'a [u8])>,
    ) -> anyhow::Result<Self> {
        let mut table = HashMap::new();
        for (path, status, body) in routes {
            let status = StatusCode::from_u16(status)
                .with_context(|| format!("invalid status {status} for {path}"))?;
            table.insert(path.to_string(), (status, body.to_vec()));
        }
        let state = Arc::new(StubState {
            routes: table,
            observed: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(respond).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind stub upstream")?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move { server.await });

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            _shutdown: shutdown_tx,
        })
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Snapshot of every request received so far, in arrival order.
    #[must_use]
    pub fn observed(&self) -> Vec<ObservedRequest> {
        self.state.observed.lock().clone()
    }
}

async fn respond(State(state): State<Arc<StubState>>, req: Request) -> axum::response::Response {
    let (parts, body) = req.into_parts();
    let body_len = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_or(0, |b| b.len());

    state.observed.lock().push(ObservedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body_len,
    });

    match state.routes.get(parts.uri.path()) {
        Some((status, body)) => (*status, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
