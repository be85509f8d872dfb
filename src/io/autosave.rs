//! Debounced persistence: bursts of snapshots collapse into one write of the
//! most recent one once the table has been quiet for the debounce period.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::FileError;
use crate::io::table_file::serialize_table_state;
use crate::state::data_model::TableDocument;

pub struct AutosaveHandle {
    sender: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

/// Starts the writer task on the current tokio runtime.
pub fn spawn_autosave<W>(debounce: Duration, mut write: W) -> AutosaveHandle
where
    W: FnMut(&str) -> Result<(), FileError> + Send + 'static,
{
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    let task = tokio::spawn(async move {
        while let Some(mut latest) = receiver.recv().await {
            let mut closed = false;
            loop {
                match tokio::time::timeout(debounce, receiver.recv()).await {
                    Ok(Some(next)) => latest = next,
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }

            match write(&latest) {
                Ok(()) => tracing::info!(bytes = latest.len(), "autosaved table"),
                Err(err) => tracing::warn!(error = %err, "autosave failed"),
            }
            if closed {
                break;
            }
        }
    });

    AutosaveHandle { sender, task }
}

impl AutosaveHandle {
    /// Queues serialized content; only the last content in a burst is written.
    pub fn schedule(&self, content: String) {
        send_snapshot(&self.sender, content);
    }

    /// Observer suitable for [`crate::state::table_state::TableState::subscribe`].
    pub fn observer(&self) -> impl FnMut(&TableDocument) + 'static {
        let sender = self.sender.clone();
        move |document: &TableDocument| match serialize_table_state(document) {
            Ok(text) => send_snapshot(&sender, text),
            Err(err) => tracing::warn!(error = %err, "could not serialize table for autosave"),
        }
    }

    /// Writes any pending snapshot and stops the task. Observers created by
    /// [`Self::observer`] must be dropped first or this waits for them.
    pub async fn finish(self) {
        drop(self.sender);
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "autosave task ended abnormally");
        }
    }
}

fn send_snapshot(sender: &mpsc::UnboundedSender<String>, content: String) {
    if sender.send(content).is_err() {
        tracing::warn!("autosave task is gone; dropping snapshot");
    }
}
