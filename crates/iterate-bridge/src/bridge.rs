//! Process bridge to the native journal backend.
//!
//! The backend runs as a child process and speaks newline-delimited JSON on
//! its stdio. Every request carries an id; the backend answers each id once,
//! in any order:
//!
//! ```text
//! -> {"id":1,"cmd":"unlock_journal","args":{"password":[104,105]}}
//! <- {"id":1,"err":{"type":"InvalidPassword"}}
//! -> {"id":2,"cmd":"open_journal_file","args":{}}
//! <- {"id":2,"ok":"/home/me/journal.db"}
//! ```
//!
//! Transport failures never reach the screens as anything but
//! [`JournalError::InternalError`].

use crate::backend::JournalBackend;
use crate::error::{BridgeError, JournalError};
use crate::password::Password;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

type Reply = Result<Value, JournalError>;
type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Outgoing request line.
#[derive(Serialize)]
struct Request<'a> {
    id: u64,
    cmd: &'a str,
    args: Args<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Args<'a> {
    Password { password: &'a Password },
    Empty {},
}

/// Incoming response line.
#[derive(Debug, Deserialize)]
struct Response {
    id: u64,
    #[serde(default)]
    ok: Option<Value>,
    #[serde(default)]
    err: Option<JournalError>,
}

/// State shared between callers and the response reader task.
struct Shared {
    writer: tokio::sync::Mutex<Writer>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Reply>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl Shared {
    fn pending(&self) -> std::sync::MutexGuard<'_, HashMap<u64, oneshot::Sender<Reply>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the connection dead and fail every waiting caller.
    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let drained: Vec<_> = self.pending().drain().collect();
        for (id, tx) in drained {
            debug!(id, "failing request on closed bridge");
            let _ = tx.send(Err(BridgeError::Closed.into()));
        }
    }

    fn deliver(&self, response: Response) {
        let Some(tx) = self.pending().remove(&response.id) else {
            warn!(id = response.id, "response for unknown request id");
            return;
        };
        let reply = match response.err {
            Some(err) => Err(err),
            None => Ok(response.ok.unwrap_or(Value::Null)),
        };
        let _ = tx.send(reply);
    }
}

/// Backend reached through a child process (or any duplex byte stream).
pub struct ProcessBridge {
    shared: Arc<Shared>,
    request_timeout: Duration,
    child: Option<Mutex<Child>>,
}

impl ProcessBridge {
    /// Spawn the backend described by `argv` and connect to its stdio.
    pub fn spawn(argv: &[String], request_timeout: Duration) -> Result<Self, BridgeError> {
        let (program, args) = argv.split_first().ok_or(BridgeError::NoCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| BridgeError::Spawn {
            command: program.clone(),
            source,
        })?;
        info!(command = %program, pid = child.id(), "backend started");

        let stdin = child.stdin.take().ok_or(BridgeError::Closed)?;
        let stdout = child.stdout.take().ok_or(BridgeError::Closed)?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }

        let mut bridge = Self::from_io(stdin, stdout, request_timeout);
        bridge.child = Some(Mutex::new(child));
        Ok(bridge)
    }

    /// Connect over an arbitrary reader/writer pair.
    pub fn from_io<W, R>(writer: W, reader: R, request_timeout: Duration) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let shared = Arc::new(Shared {
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        });
        tokio::spawn(read_responses(Arc::clone(&shared), reader));

        Self {
            shared,
            request_timeout,
            child: None,
        }
    }

    /// Whether the backend connection has gone away.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Number of requests still waiting for an answer.
    pub fn in_flight(&self) -> usize {
        self.shared.pending().len()
    }

    async fn call(&self, cmd: &str, args: Args<'_>) -> Reply {
        if self.is_closed() {
            return Err(BridgeError::Closed.into());
        }

        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.shared.pending().insert(id, tx);

        // The reader may have closed between the check above and the insert.
        if self.is_closed() {
            self.shared.pending().remove(&id);
            return Err(BridgeError::Closed.into());
        }

        if let Err(err) = self.send(&Request { id, cmd, args }).await {
            self.shared.pending().remove(&id);
            warn!(id, cmd, error = %err, "failed to send request");
            return Err(err.into());
        }
        debug!(id, cmd, "request sent");

        match timeout(self.request_timeout, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => Err(BridgeError::Closed.into()),
            Err(_) => {
                self.shared.pending().remove(&id);
                warn!(id, cmd, "request timed out");
                Err(BridgeError::Timeout(self.request_timeout).into())
            }
        }
    }

    async fn send(&self, request: &Request<'_>) -> Result<(), BridgeError> {
        // The encoded line may hold password bytes.
        let mut line = Zeroizing::new(serde_json::to_vec(request).map_err(BridgeError::Encode)?);
        line.push(b'\n');

        let mut writer = self.shared.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

impl Drop for ProcessBridge {
    fn drop(&mut self) {
        if let Some(child) = &self.child {
            let mut child = child.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = child.start_kill();
        }
    }
}

#[async_trait]
impl JournalBackend for ProcessBridge {
    async fn create_journal(&self, password: Password) -> Result<(), JournalError> {
        self.call("create_journal", Args::Password { password: &password })
            .await
            .map(|_| ())
    }

    async fn unlock_journal(&self, password: Password) -> Result<(), JournalError> {
        self.call("unlock_journal", Args::Password { password: &password })
            .await
            .map(|_| ())
    }

    async fn open_journal_file(&self) -> Result<String, JournalError> {
        match self.call("open_journal_file", Args::Empty {}).await? {
            Value::String(path) => Ok(path),
            other => Err(BridgeError::UnexpectedResponse(other.to_string()).into()),
        }
    }
}

async fn read_responses<R>(shared: Arc<Shared>, reader: R)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Response>(&line) {
                    Ok(response) => shared.deliver(response),
                    Err(e) => warn!(error = %e, "malformed response line from backend"),
                }
            }
            Ok(None) => {
                info!("backend closed its output");
                break;
            }
            Err(e) => {
                warn!(error = %e, "error reading from backend");
                break;
            }
        }
    }
    shared.close();
}

async fn forward_stderr<R>(stderr: R)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "iterate_bridge::backend", "{line}");
    }
}
