//! JSON-lines RPC server.
//!
//! One request per input line, one response per output line. `configure`
//! is applied in the read loop so later requests observe it; `detect` and
//! `execute` run on their own tasks and can be cancelled by id.

use std::collections::HashMap;
use std::future::{self, Future};
use std::sync::{Arc, Mutex, MutexGuard};

use glide_go_engine::CancelToken;
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{PluginError, Result};
use crate::metadata::Capability;
use crate::plugin::GoPlugin;
use crate::protocol::{CancelParams, ContextRequest, ExecuteRequest, Request, Response};

type Inflight = Arc<Mutex<HashMap<u64, CancelToken>>>;

/// Serves requests until the input reaches EOF.
pub async fn serve<R, W>(plugin: Arc<GoPlugin>, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    serve_until(plugin, reader, writer, future::pending()).await
}

/// Serves requests until the input reaches EOF or `shutdown` resolves.
///
/// On either, every in-flight request is cancelled and awaited, and the
/// plugin is marked as no longer serving before this returns.
pub async fn serve_until<R, W, F>(
    plugin: Arc<GoPlugin>,
    reader: R,
    mut writer: W,
    shutdown: F,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    F: Future<Output = ()>,
{
    write_line(&mut writer, &plugin.registration()).await?;
    info!(capabilities = ?plugin.capabilities(), "Registered Go plugin");

    let (tx, rx) = mpsc::unbounded_channel();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut session = Session {
        plugin: Arc::clone(&plugin),
        responses: tx,
        inflight: Arc::default(),
        tasks: JoinSet::new(),
    };

    let mut lines = BufReader::new(reader).lines();
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => session.handle_line(&line),
                Ok(None) => {
                    debug!("Input closed");
                    break Ok(());
                }
                Err(e) => break Err(PluginError::Io(e)),
            },
            () = &mut shutdown => {
                info!("Shutdown requested");
                break Ok(());
            }
            Some(joined) = session.tasks.join_next(), if !session.tasks.is_empty() => {
                if let Err(e) = joined {
                    warn!(error = %e, "Request task failed");
                }
            }
        }
    };

    session.close().await;
    plugin.shutdown();

    match writer_task.await {
        Ok(written) => written?,
        Err(e) => warn!(error = %e, "Response writer failed"),
    }

    outcome
}

struct Session {
    plugin: Arc<GoPlugin>,
    responses: mpsc::UnboundedSender<Response>,
    inflight: Inflight,
    tasks: JoinSet<()>,
}

impl Session {
    fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let req: Request = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                debug!("Rejected request line: {}", e);
                self.respond(Response::error(None, &PluginError::Protocol(e.to_string())));
                return;
            }
        };

        debug!(id = req.id, method = %req.method, "Request");

        match req.method.as_str() {
            "metadata" => self.respond(Response::from_result(req.id, Ok(self.plugin.metadata()))),
            "configure" => {
                let result = self.plugin.configure(req.params);
                self.respond(Response::from_result(req.id, result));
            }
            "health_check" => {
                let result = self.plugin.health_check().map(|()| json!({"healthy": true}));
                self.respond(Response::from_result(req.id, result));
            }
            "cancel" => {
                let result = req.params::<CancelParams>().map(|params| {
                    let found = self.cancel(params.id);
                    json!({"cancelled": found})
                });
                self.respond(Response::from_result(req.id, result));
            }
            "detect" => match req.params::<ContextRequest>() {
                Ok(params) => self.spawn_detect(req.id, params),
                Err(e) => self.respond(Response::error(Some(req.id), &e)),
            },
            "execute" => {
                if !self.plugin.supports(Capability::Execute) {
                    let err = PluginError::Unsupported("execute".to_string());
                    self.respond(Response::error(Some(req.id), &err));
                    return;
                }
                match req.params::<ExecuteRequest>() {
                    Ok(params) => self.spawn_execute(req.id, params),
                    Err(e) => self.respond(Response::error(Some(req.id), &e)),
                }
            }
            other => {
                let err = PluginError::UnknownMethod(other.to_string());
                self.respond(Response::error(Some(req.id), &err));
            }
        }
    }

    fn spawn_detect(&mut self, id: u64, params: ContextRequest) {
        let token = self.register(id);
        let plugin = Arc::clone(&self.plugin);
        let responses = self.responses.clone();
        let inflight = Arc::clone(&self.inflight);

        self.tasks.spawn(async move {
            let resp = plugin.detect_context(&params, &token).await;
            lock(&inflight).remove(&id);
            let _ = responses.send(Response::from_result(id, Ok(resp)));
        });
    }

    fn spawn_execute(&mut self, id: u64, params: ExecuteRequest) {
        let token = self.register(id);
        let plugin = Arc::clone(&self.plugin);
        let responses = self.responses.clone();
        let inflight = Arc::clone(&self.inflight);

        self.tasks.spawn(async move {
            let resp = plugin.execute(params, &token).await;
            lock(&inflight).remove(&id);
            let _ = responses.send(Response::from_result(id, Ok(resp)));
        });
    }

    fn register(&self, id: u64) -> CancelToken {
        let token = CancelToken::new();
        if lock(&self.inflight).insert(id, token.clone()).is_some() {
            warn!(id, "Request id reused while still in flight");
        }
        token
    }

    /// Fires the token of an in-flight request. Returns whether one existed.
    fn cancel(&self, id: u64) -> bool {
        match lock(&self.inflight).get(&id) {
            Some(token) => {
                token.cancel();
                debug!(id, "Cancelled request");
                true
            }
            None => false,
        }
    }

    fn respond(&self, resp: Response) {
        if self.responses.send(resp).is_err() {
            warn!("Response dropped: writer has stopped");
        }
    }

    async fn close(mut self) {
        let pending: Vec<CancelToken> = lock(&self.inflight).values().cloned().collect();
        if !pending.is_empty() {
            info!("Cancelling {} in-flight request(s)", pending.len());
        }
        for token in pending {
            token.cancel();
        }

        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Request task failed");
            }
        }
    }
}

fn lock(inflight: &Inflight) -> MutexGuard<'_, HashMap<u64, CancelToken>> {
    inflight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Response>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(resp) = rx.recv().await {
        write_line(&mut writer, &resp).await?;
    }
    writer.shutdown().await?;
    Ok(())
}

async fn write_line<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
