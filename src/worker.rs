//! Background compute unit for packing requests.
//!
//! The worker announces itself once with `ready`, then answers every `pack` request with
//! a `timing` message followed by a `pack_result` (or a single `error`). Messages carry no
//! request id, so one exchange owns the channels from send until its result arrives.
//! [`Worker::pack`] runs that exchange in its own task: a caller that goes away does not
//! leave replies behind for the next one.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize, Serializer};
use tokio::sync::{Mutex, mpsc};

use crate::engine::PackingConfig;
use crate::error::{Error, Result};
use crate::request::{PackOutput, PackRequest};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerRequest {
    Pack { input: PackRequest },
}

/// Serialized as the bare string `"ready"`, or `{"type": ..., "data": ...}` for replies.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Ready,
    /// Milliseconds spent packing.
    Timing(f64),
    PackResult(PackOutput),
    Error(String),
}

#[derive(Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
enum Reply<'a> {
    Timing(f64),
    PackResult(&'a PackOutput),
    Error(&'a str),
}

impl Serialize for WorkerMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            WorkerMessage::Ready => serializer.serialize_str("ready"),
            WorkerMessage::Timing(ms) => Reply::Timing(*ms).serialize(serializer),
            WorkerMessage::PackResult(output) => Reply::PackResult(output).serialize(serializer),
            WorkerMessage::Error(msg) => Reply::Error(msg).serialize(serializer),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub elapsed_ms: f64,
    pub output: PackOutput,
}

struct Channels {
    requests: mpsc::Sender<WorkerRequest>,
    messages: mpsc::Receiver<WorkerMessage>,
    ready: bool,
}

impl Channels {
    async fn wait_ready(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }
        match self.messages.recv().await {
            Some(WorkerMessage::Ready) => {
                self.ready = true;
                Ok(())
            }
            Some(other) => Err(Error::Worker(format!(
                "expected ready signal, got {:?}",
                other
            ))),
            None => Err(Error::WorkerUnavailable),
        }
    }

    async fn exchange(&mut self, input: PackRequest) -> Result<PackOutcome> {
        self.wait_ready().await?;
        self.requests
            .send(WorkerRequest::Pack { input })
            .await
            .map_err(|_| Error::WorkerUnavailable)?;

        let mut elapsed_ms = None;
        loop {
            match self.messages.recv().await {
                Some(WorkerMessage::Timing(ms)) => elapsed_ms = Some(ms),
                Some(WorkerMessage::PackResult(output)) => {
                    return Ok(PackOutcome {
                        elapsed_ms: elapsed_ms.unwrap_or_default(),
                        output,
                    });
                }
                Some(WorkerMessage::Error(msg)) => return Err(Error::Worker(msg)),
                Some(WorkerMessage::Ready) => self.ready = true,
                None => return Err(Error::WorkerUnavailable),
            }
        }
    }
}

/// Handle to the worker task. Cheap to share behind an `Arc`; requests are serialized.
pub struct Worker {
    channels: Arc<Mutex<Channels>>,
}

impl Worker {
    /// Starts the worker task. Must be called inside a tokio runtime.
    pub fn spawn(config: PackingConfig) -> Self {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (msg_tx, msg_rx) = mpsc::channel(8);
        tokio::spawn(run(config, req_rx, msg_tx));
        Self {
            channels: Arc::new(Mutex::new(Channels {
                requests: req_tx,
                messages: msg_rx,
                ready: false,
            })),
        }
    }

    /// Waits for the startup signal. Later calls return immediately.
    pub async fn wait_ready(&self) -> Result<()> {
        self.channels.lock().await.wait_ready().await
    }

    pub async fn send(&self, request: WorkerRequest) -> Result<()> {
        let requests = self.channels.lock().await.requests.clone();
        requests.send(request).await.map_err(|_| Error::WorkerUnavailable)
    }

    pub async fn recv(&self) -> Option<WorkerMessage> {
        let mut channels = self.channels.lock().await;
        let message = channels.messages.recv().await;
        if matches!(message, Some(WorkerMessage::Ready)) {
            channels.ready = true;
        }
        message
    }

    /// Sends one request and collects its timing and result.
    ///
    /// The exchange runs to completion even if the returned future is dropped.
    pub async fn pack(&self, input: PackRequest) -> Result<PackOutcome> {
        let channels = Arc::clone(&self.channels);
        tokio::spawn(async move {
            let mut channels = channels.lock().await;
            channels.exchange(input).await
        })
        .await
        .map_err(|e| Error::Worker(format!("packing exchange failed: {}", e)))?
    }
}

async fn run(
    config: PackingConfig,
    mut requests: mpsc::Receiver<WorkerRequest>,
    messages: mpsc::Sender<WorkerMessage>,
) {
    if messages.send(WorkerMessage::Ready).await.is_err() {
        return;
    }

    while let Some(request) = requests.recv().await {
        let WorkerRequest::Pack { input } = request;
        tracing::debug!(
            items = input.items.len(),
            containers = input.containers.len(),
            "pack request"
        );

        let computed = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let output = input.pack(config);
            (start.elapsed().as_secs_f64() * 1000.0, output)
        })
        .await;

        let replies = match computed {
            Ok((ms, Ok(output))) => {
                vec![WorkerMessage::Timing(ms), WorkerMessage::PackResult(output)]
            }
            Ok((_, Err(e))) => vec![WorkerMessage::Error(e.to_string())],
            Err(e) => {
                tracing::error!(error = %e, "packing task failed");
                vec![WorkerMessage::Error(format!("packing task failed: {}", e))]
            }
        };

        for reply in replies {
            if messages.send(reply).await.is_err() {
                return;
            }
        }
    }
}
