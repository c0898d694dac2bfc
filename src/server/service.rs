//! Newline-delimited JSON service over TCP.
//!
//! Each request is one JSON object on its own line; each response is one
//! JSON object on its own line, in request order.
//!
//! ```text
//! → {"op":"predict","text":"I have a bad headache and fever"}
//! ← {"status":200,"result":{"disease":"Migraine","severity":"Moderate","medications":[..]}}
//! → {"op":"triage","text":"my chest hurts"}
//! ← {"status":200,"result":{"category":"cardiovascular","reply":"..","helpline":".."}}
//! → {"op":"predict","text":"  "}
//! ← {"status":400,"error":{"kind":"client","message":"invalid input: .."}}
//! ```
//!
//! Requests run on the blocking pool under a concurrency cap and a timeout.
//! The diagnoser and triage table are shared read-only by every connection.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::config::{Config, LimitsConfig};
use crate::diagnosis::Diagnoser;
use crate::triage::{EmergencyCategory, TriageMatcher};
use crate::types::PredictionResult;
use crate::{MedAssistError, Result};

/// A single request line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Predict { text: String },
    Triage { text: String },
    Health,
}

/// Emergency triage payload.
#[derive(Debug, Clone, Serialize)]
pub struct TriageResponse {
    pub category: EmergencyCategory,
    pub reply: &'static str,
    pub helpline: String,
}

/// Liveness payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub classes: usize,
}

/// Successful response payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Prediction(PredictionResult),
    Triage(TriageResponse),
    Health(HealthResponse),
}

/// Error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

/// One response line.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResponseBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn ok(body: ResponseBody) -> Self {
        Self {
            status: 200,
            result: Some(body),
            error: None,
        }
    }

    pub fn error(err: &MedAssistError) -> Self {
        Self {
            status: err.status_code(),
            result: None,
            error: Some(ErrorBody {
                kind: err.kind().as_str(),
                message: err.to_string(),
            }),
        }
    }
}

/// Diagnosis and triage behind the wire protocol.
pub struct MedAssistService {
    diagnoser: Diagnoser,
    triage: TriageMatcher,
    helpline: String,
    limits: LimitsConfig,
    permits: Arc<Semaphore>,
}

impl MedAssistService {
    pub fn new(diagnoser: Diagnoser, triage: TriageMatcher, config: &Config) -> Self {
        Self {
            diagnoser,
            triage,
            helpline: config.triage.helpline.clone(),
            limits: config.server.limits.clone(),
            permits: Arc::new(Semaphore::new(config.server.limits.max_concurrent_requests)),
        }
    }

    /// Dispatch a parsed request synchronously.
    pub fn handle(&self, request: Request) -> Result<ResponseBody> {
        match request {
            Request::Predict { text } => self.diagnoser.predict(&text).map(ResponseBody::Prediction),
            Request::Triage { text } => {
                let reply = self.triage.triage(&text);
                Ok(ResponseBody::Triage(TriageResponse {
                    category: reply.category,
                    reply: reply.reply,
                    helpline: self.helpline.clone(),
                }))
            }
            Request::Health => Ok(ResponseBody::Health(HealthResponse {
                status: "ok",
                version: crate::version_string(),
                classes: self.diagnoser.artifacts().classifier().classes().len(),
            })),
        }
    }

    /// Parse, limit, and run one request line.
    pub async fn handle_line(self: &Arc<Self>, line: &str) -> Response {
        match self.dispatch(line).await {
            Ok(body) => Response::ok(body),
            Err(err) => {
                if err.status_code() >= 500 {
                    warn!(error = %err, "request failed");
                } else {
                    debug!(error = %err, "request rejected");
                }
                Response::error(&err)
            }
        }
    }

    async fn dispatch(self: &Arc<Self>, line: &str) -> Result<ResponseBody> {
        if line.len() > self.limits.max_request_bytes {
            return Err(MedAssistError::InvalidInput(format!(
                "request exceeds {} bytes",
                self.limits.max_request_bytes
            )));
        }
        let request: Request = serde_json::from_str(line)?;

        let permit = Arc::clone(&self.permits)
            .try_acquire_owned()
            .map_err(|_| MedAssistError::Overloaded)?;

        let timeout = Duration::from_secs(self.limits.request_timeout_secs);
        let service = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            service.handle(request)
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(MedAssistError::Inference(format!(
                "request task failed: {join_err}"
            ))),
            Err(_) => Err(MedAssistError::Timeout(timeout)),
        }
    }

    /// Accept connections until the listener fails.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        self.serve_with_shutdown(listener, std::future::pending())
            .await
    }

    /// Accept connections until `shutdown` resolves.
    pub async fn serve_with_shutdown(
        self: Arc<Self>,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (stream, peer) = accepted?;
                    debug!(%peer, "connection accepted");
                    let service = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = service.serve_connection(stream).await {
                            warn!(%peer, error = %e, "connection closed with error");
                        }
                    });
                }
            }
        }
    }

    async fn serve_connection(self: Arc<Self>, stream: TcpStream) -> Result<()> {
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let limit = self.limits.max_request_bytes as u64 + 1;

        loop {
            let mut raw = Vec::new();
            let n = (&mut reader).take(limit).read_until(b'\n', &mut raw).await?;
            if n == 0 {
                return Ok(());
            }

            let oversized = raw.last() != Some(&b'\n') && raw.len() > self.limits.max_request_bytes;
            let response = if oversized {
                Response::error(&MedAssistError::InvalidInput(format!(
                    "request exceeds {} bytes",
                    self.limits.max_request_bytes
                )))
            } else {
                match std::str::from_utf8(&raw) {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => self.handle_line(line.trim()).await,
                    Err(e) => Response::error(&MedAssistError::InvalidInput(format!(
                        "request is not valid UTF-8: {e}"
                    ))),
                }
            };

            let mut payload = serde_json::to_string(&response)?;
            payload.push('\n');
            write_half.write_all(payload.as_bytes()).await?;

            // The rest of an oversized line cannot be framed; drop the connection.
            if oversized {
                write_half.shutdown().await?;
                return Ok(());
            }
        }
    }
}
