//! Async client for communicating with the worker process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};

use super::error::{WorkerError, WorkerResult};
use super::protocol::{self, methods, ConnectionParams, ErrorInfo, RequestEnvelope, ResponseEnvelope};
use crate::config::WorkerSettings;

/// Default timeout for requests (30 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Binary name searched for when no path is configured.
const WORKER_BINARY: &str = "catalogql-worker";

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Async client for the engine worker.
///
/// The client spawns the worker as a child process and communicates via
/// NDJSON (newline-delimited JSON) over stdin/stdout. Each request has a
/// unique ID for correlation with responses, enabling concurrent requests.
///
/// The worker owns the engine connection pool. Dropping the client kills the
/// process, and a request future that is dropped before its response arrives
/// only leaves a stale entry in the pending map, which the reader task
/// discards when the response shows up.
///
/// # Example
///
/// ```ignore
/// use catalogql::worker::{WorkerClient, protocol::*};
///
/// let client = WorkerClient::spawn("./catalogql-worker", &[], Duration::from_secs(30)).await?;
/// let catalogs = client.list_catalogs(&connection).await?;
/// ```
pub struct WorkerClient {
    /// Writer for sending requests to worker stdin.
    stdin: Arc<Mutex<BufWriter<ChildStdin>>>,

    /// Map of pending request IDs to response channels.
    pending: PendingMap,

    /// Handle to the worker child process.
    _child: Child,

    /// Handle to the background reader task.
    reader_task: tokio::task::JoinHandle<()>,

    /// Request timeout duration.
    timeout: Duration,
}

impl WorkerClient {
    /// Spawn a worker from the `[worker]` settings section.
    ///
    /// Pool settings are passed to the worker as command-line flags.
    pub async fn spawn_with_settings(settings: &WorkerSettings) -> WorkerResult<Self> {
        let worker_path = Self::resolve_worker_path(settings)?;
        let args = settings.pool.to_worker_args();
        let timeout = Duration::from_secs(settings.timeout_seconds);

        Self::spawn(&worker_path, &args, timeout).await
    }

    /// Resolve the worker binary path from settings.
    fn resolve_worker_path(settings: &WorkerSettings) -> WorkerResult<PathBuf> {
        if let Some(path) = settings.path.as_deref() {
            let expanded = crate::config::expand_env_vars(path)
                .map_err(|e| WorkerError::SpawnFailed(std::io::Error::other(e.to_string())))?;
            return Ok(PathBuf::from(expanded));
        }

        let candidates = [
            format!("./{}", WORKER_BINARY),
            format!("./worker/{}", WORKER_BINARY),
        ];
        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Ok(path);
            }
        }

        // Fall back to PATH lookup at spawn time.
        Ok(PathBuf::from(WORKER_BINARY))
    }

    /// Spawn a worker process with arguments and a request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker process cannot be spawned.
    pub async fn spawn<P: AsRef<Path>>(
        worker_path: P,
        args: &[String],
        timeout: Duration,
    ) -> WorkerResult<Self> {
        let worker_path = worker_path.as_ref();
        let mut child = Command::new(worker_path)
            .args(args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let stdin = child.stdin.take().ok_or_else(|| pipe_missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| pipe_missing("stdout"))?;

        tracing::debug!(path = %worker_path.display(), "spawned worker");

        let stdin = Arc::new(Mutex::new(BufWriter::new(stdin)));
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let reader_task = Self::spawn_reader_task(stdout, pending.clone());

        Ok(Self {
            stdin,
            pending,
            _child: child,
            reader_task,
            timeout,
        })
    }

    /// Spawn the background task that reads responses from the worker.
    fn spawn_reader_task(stdout: ChildStdout, pending: PendingMap) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                        Ok(resp) => {
                            let mut pending = pending.lock().await;
                            if let Some(tx) = pending.remove(&resp.id) {
                                let _ = tx.send(resp);
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to parse worker response");
                        }
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "worker read error");
                        break;
                    }
                }
            }

            // Worker exited - fail every request still waiting.
            let mut pending = pending.lock().await;
            for (id, tx) in pending.drain() {
                let error_response = ResponseEnvelope {
                    id,
                    success: false,
                    result: None,
                    error: Some(ErrorInfo {
                        code: "WORKER_EXITED".to_string(),
                        message: "Worker process exited unexpectedly".to_string(),
                    }),
                };
                let _ = tx.send(error_response);
            }
        })
    }

    /// Send a request to the worker and wait for a response.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The worker has already exited
    /// - Serialization fails
    /// - Writing to the worker fails
    /// - The request times out
    /// - The worker returns an error response
    /// - Deserialization of the response fails
    pub async fn request<P, R>(&self, method: &str, params: P) -> WorkerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        if !self.is_alive() {
            return Err(WorkerError::WorkerExited);
        }

        let id = uuid::Uuid::new_v4().to_string();

        let request = RequestEnvelope {
            id: id.clone(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(WorkerError::SerializeFailed)?,
        };
        let line = serde_json::to_string(&request).map_err(WorkerError::SerializeFailed)? + "\n";

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            pending.insert(id.clone(), tx);
        }

        let written = {
            let mut stdin = self.stdin.lock().await;
            match stdin.write_all(line.as_bytes()).await {
                Ok(()) => stdin.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = written {
            self.pending.lock().await.remove(&id);
            return Err(WorkerError::WriteFailed(e));
        }

        tracing::trace!(%id, method, "sent worker request");

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(_)) => return Err(WorkerError::ChannelClosed),
            Err(_) => {
                // Clean up the pending entry so the map does not grow.
                let mut pending = self.pending.lock().await;
                pending.remove(&id);
                return Err(WorkerError::Timeout(self.timeout.as_secs()));
            }
        };

        if response.success {
            let result = response.result.unwrap_or(serde_json::Value::Null);
            serde_json::from_value(result).map_err(WorkerError::DeserializeFailed)
        } else {
            let error = response.error.unwrap_or_else(|| ErrorInfo {
                code: "UNKNOWN".to_string(),
                message: "Unknown error".to_string(),
            });
            Err(Self::classify_error(&error.code, &error.message))
        }
    }

    /// Classify a worker error into a more specific error type.
    fn classify_error(code: &str, message: &str) -> WorkerError {
        match code {
            "DRIVER_NOT_FOUND" => WorkerError::DriverNotFound(message.to_string()),
            "CONNECTION_FAILED" => WorkerError::ConnectionFailed(message.to_string()),
            "INVALID_REQUEST" => WorkerError::InvalidRequest(message.to_string()),
            "METHOD_NOT_FOUND" => WorkerError::MethodNotFound(message.to_string()),
            "WORKER_EXITED" => WorkerError::WorkerExited,
            _ => WorkerError::remote(code, message),
        }
    }

    /// Check if the worker is still running.
    pub fn is_alive(&self) -> bool {
        !self.reader_task.is_finished()
    }
}

// Convenience methods for the catalog discovery protocol
impl WorkerClient {
    pub async fn list_catalogs(&self, connection: &ConnectionParams) -> WorkerResult<Vec<String>> {
        let response: protocol::ListCatalogsResponse = self
            .request(
                methods::LIST_CATALOGS,
                protocol::ListCatalogsParams {
                    connection: connection.clone(),
                },
            )
            .await?;
        Ok(response.catalogs)
    }

    pub async fn list_schemas(
        &self,
        connection: &ConnectionParams,
        catalog: &str,
    ) -> WorkerResult<Vec<String>> {
        let response: protocol::ListSchemasResponse = self
            .request(
                methods::LIST_SCHEMAS,
                protocol::ListSchemasParams {
                    connection: connection.clone(),
                    catalog: catalog.to_string(),
                },
            )
            .await?;
        Ok(response.schemas)
    }

    pub async fn list_tables(
        &self,
        connection: &ConnectionParams,
        catalog: &str,
        schema: &str,
    ) -> WorkerResult<Vec<String>> {
        let response: protocol::ListTablesResponse = self
            .request(
                methods::LIST_TABLES,
                protocol::ListTablesParams {
                    connection: connection.clone(),
                    catalog: catalog.to_string(),
                    schema: schema.to_string(),
                },
            )
            .await?;
        Ok(response.tables)
    }

    pub async fn describe_columns(
        &self,
        connection: &ConnectionParams,
        catalog: &str,
        schema: &str,
        table: &str,
    ) -> WorkerResult<Vec<protocol::ColumnInfo>> {
        let response: protocol::DescribeColumnsResponse = self
            .request(
                methods::DESCRIBE_COLUMNS,
                protocol::DescribeColumnsParams {
                    connection: connection.clone(),
                    catalog: catalog.to_string(),
                    schema: schema.to_string(),
                    table: table.to_string(),
                },
            )
            .await?;
        Ok(response.columns)
    }

    /// Execute SQL with positional `?` arguments.
    pub async fn execute_query(
        &self,
        connection: &ConnectionParams,
        sql: &str,
        args: Vec<serde_json::Value>,
    ) -> WorkerResult<protocol::ExecuteQueryResponse> {
        self.request(
            methods::EXECUTE_QUERY,
            protocol::ExecuteQueryParams {
                connection: connection.clone(),
                sql: sql.to_string(),
                args: if args.is_empty() { None } else { Some(args) },
            },
        )
        .await
    }
}

fn pipe_missing(name: &str) -> WorkerError {
    WorkerError::SpawnFailed(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        format!("worker {} not captured", name),
    ))
}
