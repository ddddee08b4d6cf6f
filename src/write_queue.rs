//! Write queue for single-writer mutation of the registry.
//!
//! For hosts that embed the registry in a tokio runtime; the CLI runs one
//! command per process and calls `StallRegistry` directly.
//!
//! Async hosts send mutations through a tokio mpsc channel to one worker
//! task. The worker applies them in arrival order on a blocking thread, so
//! read-modify-write cycles never interleave and never stall the runtime.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Result, StallError};
use crate::model::{NewReview, NewStall, Review, Stall};
use crate::registry::StallRegistry;

/// Commands that can be sent to the write queue worker.
#[derive(Debug)]
pub enum WriteCommand {
    AddStall {
        stall: NewStall,
        respond: oneshot::Sender<Result<Stall>>,
    },
    AddReview {
        review: NewReview,
        respond: oneshot::Sender<Result<Review>>,
    },
    Clear {
        respond: oneshot::Sender<Result<()>>,
    },
    /// Stop the worker. Later sends fail.
    Shutdown,
}

/// Cheaply cloneable handle for sending write commands.
#[derive(Clone)]
pub struct WriteQueueHandle {
    sender: mpsc::Sender<WriteCommand>,
}

impl WriteQueueHandle {
    const DEFAULT_BUFFER_SIZE: usize = 64;

    /// Creates a handle and spawns the worker. Must be called inside a
    /// tokio runtime.
    pub fn new(registry: Arc<StallRegistry>) -> Self {
        Self::with_buffer_size(registry, Self::DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(registry: Arc<StallRegistry>, buffer_size: usize) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let worker = WriteQueueWorker::new(receiver, registry);

        tokio::spawn(async move {
            worker.run().await;
        });

        Self { sender }
    }

    pub async fn add_stall(&self, stall: NewStall) -> Result<Stall> {
        let (respond, rx) = oneshot::channel();
        self.send(WriteCommand::AddStall { stall, respond }).await?;
        rx.await
            .map_err(|_| StallError::Queue("Write response channel closed".into()))?
    }

    pub async fn add_review(&self, review: NewReview) -> Result<Review> {
        let (respond, rx) = oneshot::channel();
        self.send(WriteCommand::AddReview { review, respond }).await?;
        rx.await
            .map_err(|_| StallError::Queue("Write response channel closed".into()))?
    }

    pub async fn clear(&self) -> Result<()> {
        let (respond, rx) = oneshot::channel();
        self.send(WriteCommand::Clear { respond }).await?;
        rx.await
            .map_err(|_| StallError::Queue("Write response channel closed".into()))?
    }

    /// Shuts down the worker. After shutdown all writes fail.
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(WriteCommand::Shutdown)
            .await
            .map_err(|_| StallError::Queue("Write queue already closed".into()))
    }

    pub fn is_active(&self) -> bool {
        !self.sender.is_closed()
    }

    async fn send(&self, command: WriteCommand) -> Result<()> {
        self.sender
            .send(command)
            .await
            .map_err(|_| StallError::Queue("Write queue closed".into()))
    }
}

/// Worker that processes write commands sequentially.
struct WriteQueueWorker {
    receiver: mpsc::Receiver<WriteCommand>,
    registry: Arc<StallRegistry>,
}

impl WriteQueueWorker {
    fn new(receiver: mpsc::Receiver<WriteCommand>, registry: Arc<StallRegistry>) -> Self {
        Self { receiver, registry }
    }

    async fn run(mut self) {
        tracing::debug!("WriteQueue worker started");

        while let Some(command) = self.receiver.recv().await {
            match command {
                WriteCommand::AddStall { stall, respond } => {
                    let result = self.blocking(move |r| r.add_stall(stall)).await;
                    let _ = respond.send(result);
                }
                WriteCommand::AddReview { review, respond } => {
                    let result = self.blocking(move |r| r.add_review(review)).await;
                    let _ = respond.send(result);
                }
                WriteCommand::Clear { respond } => {
                    let result = self.blocking(|r| r.clear()).await;
                    let _ = respond.send(result);
                }
                WriteCommand::Shutdown => {
                    tracing::debug!("WriteQueue worker shutting down");
                    break;
                }
            }
        }

        tracing::debug!("WriteQueue worker stopped");
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&StallRegistry) -> Result<T> + Send + 'static,
    {
        let registry = self.registry.clone();
        tokio::task::spawn_blocking(move || op(&*registry))
            .await
            .map_err(|e| StallError::Queue(format!("write task failed: {}", e)))?
    }
}
