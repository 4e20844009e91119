//! Wire transports for tool-server communication.
//!
//! Two transports sit behind one handle: a stdio transport that spawns the
//! server as a child process and speaks newline-delimited JSON-RPC, and a
//! streamable-HTTP transport that POSTs each message to a network endpoint.

use crate::error::McpError;
use crate::jsonrpc::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use crate::locator::ServerLocator;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

/// The connection to a tool server, owned exclusively by the session.
///
/// A closed variant set: subprocess pipe or network stream. Which one is
/// built follows from the parsed [`ServerLocator`].
pub enum Transport {
    Stdio(StdioTransport),
    Http(HttpTransport),
}

impl Transport {
    /// Open the transport named by the locator.
    ///
    /// For a stdio locator this spawns the child process; for a URL it builds
    /// the HTTP session (the socket itself opens on the first request).
    pub fn connect(locator: &ServerLocator, timeout_ms: u64) -> Result<Self, McpError> {
        match locator {
            ServerLocator::Stdio { command, args } => Ok(Self::Stdio(StdioTransport::spawn(
                command, args, timeout_ms,
            )?)),
            ServerLocator::Url(url) => Ok(Self::Http(HttpTransport::new(url, timeout_ms)?)),
        }
    }

    /// Send a request and wait for the matching response.
    pub async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<JsonRpcResponse, McpError> {
        match self {
            Self::Stdio(t) => t.request(method, params).await,
            Self::Http(t) => t.request(method, params).await,
        }
    }

    /// Send a notification (fire-and-forget).
    pub async fn notify(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), McpError> {
        match self {
            Self::Stdio(t) => t.notify(method, params).await,
            Self::Http(t) => t.notify(method, params).await,
        }
    }

    /// Close the transport. Consumes the handle, so this runs exactly once.
    pub async fn shutdown(self) {
        match self {
            Self::Stdio(t) => t.shutdown().await,
            Self::Http(_) => {}
        }
    }
}

/// Stdio transport: the tool server runs as a child process and exchanges
/// newline-delimited JSON-RPC messages over its stdin/stdout.
pub struct StdioTransport {
    next_id: AtomicU64,
    writer: Mutex<Option<ChildStdin>>,
    pending: Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>,
    reader_task: JoinHandle<()>,
    child: Mutex<Child>,
    timeout_ms: u64,
}

impl StdioTransport {
    /// Spawn the server process and start the response-reader task.
    pub fn spawn(command: &str, args: &[String], timeout_ms: u64) -> Result<Self, McpError> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            // Server stderr passes through so startup diagnostics stay visible.
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| McpError::SpawnFailed {
                command: command.to_string(),
                source: e,
            })?;

        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = child.stdout.take().expect("stdout was piped");

        let pending: Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        let pending_in_reader = Arc::clone(&pending);
        let reader_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }
                let resp: JsonRpcResponse = match serde_json::from_str(&line) {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Discarding unparseable server message: {e}: {line}");
                        continue;
                    }
                };
                match resp.id {
                    Some(id) => {
                        if let Some(tx) = pending_in_reader.lock().await.remove(&id) {
                            let _ = tx.send(resp);
                        }
                    }
                    // Server-initiated notifications are not consumed here.
                    None => tracing::debug!("Ignoring server notification"),
                }
            }
        });

        Ok(Self {
            next_id: AtomicU64::new(1),
            writer: Mutex::new(Some(stdin)),
            pending,
            reader_task,
            child: Mutex::new(child),
            timeout_ms,
        })
    }

    async fn write_line(&self, line: String) -> Result<(), McpError> {
        let mut guard = self.writer.lock().await;
        let stdin = guard
            .as_mut()
            .ok_or_else(|| McpError::Protocol("transport already closed".to_string()))?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<JsonRpcResponse, McpError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let line = serde_json::to_string(&JsonRpcRequest::new(id, method, params))?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        if let Err(e) = self.write_line(line).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(Duration::from_millis(self.timeout_ms), rx).await {
            Ok(Ok(resp)) => Ok(resp),
            Ok(Err(_)) => Err(McpError::Protocol(
                "server closed the connection mid-request".to_string(),
            )),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(McpError::Timeout {
                    method: method.to_string(),
                    timeout_ms: self.timeout_ms,
                })
            }
        }
    }

    async fn notify(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), McpError> {
        let line = serde_json::to_string(&JsonRpcNotification::new(method, params))?;
        self.write_line(line).await
    }

    /// Close stdin to signal EOF, give the child a grace period to exit,
    /// then kill it.
    async fn shutdown(self) {
        drop(self.writer.lock().await.take());

        let exited = tokio::time::timeout(Duration::from_secs(5), async {
            let _ = self.child.lock().await.wait().await;
        })
        .await;

        if exited.is_err() {
            let _ = self.child.lock().await.kill().await;
        }

        self.reader_task.abort();
    }
}

/// Streamable-HTTP transport: every message is POSTed to the endpoint, and
/// the response arrives either as a plain JSON body or as a short SSE stream
/// carrying the JSON-RPC response in a `data:` event.
pub struct HttpTransport {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    session_id: Mutex<Option<String>>,
    timeout_ms: u64,
}

impl HttpTransport {
    pub fn new(url: &str, timeout_ms: u64) -> Result<Self, McpError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| McpError::ConnectFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
            session_id: Mutex::new(None),
            timeout_ms,
        })
    }

    async fn post(&self, body: &impl serde::Serialize) -> Result<reqwest::Response, McpError> {
        let mut builder = self
            .http
            .post(&self.url)
            .timeout(Duration::from_millis(self.timeout_ms))
            .header("accept", "application/json, text/event-stream")
            .json(body);

        if let Some(sid) = self.session_id.lock().await.clone() {
            builder = builder.header("mcp-session-id", sid);
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                McpError::Timeout {
                    method: "POST".to_string(),
                    timeout_ms: self.timeout_ms,
                }
            } else {
                McpError::ConnectFailed {
                    url: self.url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        // The server may assign a session id on initialize; echo it back on
        // every later message.
        if let Some(sid) = resp
            .headers()
            .get("mcp-session-id")
            .and_then(|v| v.to_str().ok())
        {
            *self.session_id.lock().await = Some(sid.to_string());
        }

        Ok(resp)
    }

    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<JsonRpcResponse, McpError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let resp = self.post(&JsonRpcRequest::new(id, method, params)).await?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = resp.text().await.map_err(|e| McpError::ConnectFailed {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(McpError::ConnectFailed {
                url: self.url.clone(),
                message: format!("HTTP {status}: {body}"),
            });
        }

        if content_type.starts_with("text/event-stream") {
            parse_sse_response(&body, id)
        } else {
            Ok(serde_json::from_str(&body)?)
        }
    }

    async fn notify(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), McpError> {
        let resp = self.post(&JsonRpcNotification::new(method, params)).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(McpError::ConnectFailed {
                url: self.url.clone(),
                message: format!("HTTP {status}"),
            });
        }
        Ok(())
    }
}

/// Scan an SSE body for the `data:` event holding the response to `id`.
fn parse_sse_response(body: &str, id: u64) -> Result<JsonRpcResponse, McpError> {
    for line in body.lines() {
        let Some(payload) = line.strip_prefix("data:") else {
            continue;
        };
        let Ok(resp) = serde_json::from_str::<JsonRpcResponse>(payload.trim_start()) else {
            continue;
        };
        if resp.id == Some(id) {
            return Ok(resp);
        }
    }
    Err(McpError::Protocol(format!(
        "event stream carried no response for request {id}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal stdio server: acknowledges every request with `{"ok": true}`.
    const ACK_SERVER: &str = "import json, sys\n\
         for line in sys.stdin:\n\
         \x20   msg = json.loads(line)\n\
         \x20   if 'id' in msg:\n\
         \x20       print(json.dumps({'jsonrpc': '2.0', 'id': msg['id'], 'result': {'ok': True}}), flush=True)\n";

    fn python_args(program: &str) -> Vec<String> {
        vec!["-u".to_string(), "-c".to_string(), program.to_string()]
    }

    #[tokio::test]
    async fn spawn_failure_names_the_command() {
        let result = StdioTransport::spawn("no_such_tool_server_binary", &[], 1000);
        match result {
            Err(McpError::SpawnFailed { command, .. }) => {
                assert_eq!(command, "no_such_tool_server_binary");
            }
            other => panic!("expected SpawnFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn stdio_request_roundtrip() {
        let transport = match StdioTransport::spawn("python3", &python_args(ACK_SERVER), 5000) {
            Ok(t) => t,
            // python3 unavailable on this machine; nothing to exercise.
            Err(_) => return,
        };

        let resp = transport
            .request("tools/list", Some(serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(resp.result.unwrap()["ok"], true);

        transport.shutdown().await;
    }

    #[tokio::test]
    async fn stdio_notification_is_fire_and_forget() {
        let transport = StdioTransport::spawn("cat", &[], 5000).unwrap();
        transport
            .notify("notifications/initialized", None)
            .await
            .unwrap();
        transport.shutdown().await;
    }

    #[tokio::test]
    async fn stdio_request_times_out_on_silent_server() {
        let transport = StdioTransport::spawn("sleep", &["10".to_string()], 100).unwrap();
        match transport.request("tools/list", None).await {
            Err(McpError::Timeout { method, timeout_ms }) => {
                assert_eq!(method, "tools/list");
                assert_eq!(timeout_ms, 100);
            }
            other => panic!("expected Timeout, got {:?}", other.map(|_| ())),
        }
        transport.shutdown().await;
    }

    #[test]
    fn transport_selection_follows_locator() {
        let stdio = ServerLocator::Stdio {
            command: "cat".to_string(),
            args: vec![],
        };
        let rt = tokio::runtime::Runtime::new().unwrap();
        let _guard = rt.enter();
        assert!(matches!(
            Transport::connect(&stdio, 1000),
            Ok(Transport::Stdio(_))
        ));
        let url = ServerLocator::Url("http://localhost:8000/mcp".to_string());
        assert!(matches!(
            Transport::connect(&url, 1000),
            Ok(Transport::Http(_))
        ));
    }

    #[test]
    fn sse_body_yields_matching_response() {
        let body = "event: message\n\
                    data: {\"jsonrpc\":\"2.0\",\"id\":3,\"result\":{\"tools\":[]}}\n\n";
        let resp = parse_sse_response(body, 3).unwrap();
        assert!(resp.result.unwrap()["tools"].as_array().unwrap().is_empty());
    }

    #[test]
    fn sse_body_skips_unrelated_events() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\"}\n\n\
                    data: {\"jsonrpc\":\"2.0\",\"id\":9,\"result\":{}}\n\n";
        let resp = parse_sse_response(body, 9).unwrap();
        assert_eq!(resp.id, Some(9));
    }

    #[test]
    fn sse_body_without_match_is_protocol_error() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n\n";
        assert!(matches!(
            parse_sse_response(body, 2),
            Err(McpError::Protocol(_))
        ));
    }
}
