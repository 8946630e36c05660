//! Completion channel between racing provider tasks and their coordinator.
//!
//! The channel is sized to the number of tasks, and each task reports at
//! most once, so a report never waits for space. A task that finishes after
//! the coordinator has stopped listening drops its report and exits.

use std::pin::Pin;

use futures_core::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::envelope::ResultEnvelope;

/// One provider's finished resolution.
#[derive(Debug, Clone)]
pub(crate) struct ProviderOutcome<T> {
    pub provider_name: String,
    pub envelope: ResultEnvelope<T>,
}

/// Boxed stream of outcomes, in completion order.
pub(crate) type OutcomeStream<T> = Pin<Box<dyn Stream<Item = ProviderOutcome<T>> + Send>>;

/// Sending half handed to each task.
#[derive(Debug)]
pub(crate) struct OutcomeSender<T> {
    tx: mpsc::Sender<ProviderOutcome<T>>,
}

impl<T> OutcomeSender<T> {
    /// Report an outcome without waiting.
    ///
    /// Returns `false` if the coordinator is gone.
    pub fn report(&self, outcome: ProviderOutcome<T>) -> bool {
        self.tx.try_send(outcome).is_ok()
    }
}

impl<T> Clone for OutcomeSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Create a channel able to hold one report from each of `tasks` tasks.
pub(crate) fn outcome_channel<T: Send + 'static>(
    tasks: usize,
) -> (OutcomeSender<T>, OutcomeStream<T>) {
    let (tx, rx) = mpsc::channel(tasks.max(1));
    let stream: OutcomeStream<T> = Box::pin(ReceiverStream::new(rx));
    (OutcomeSender { tx }, stream)
}
