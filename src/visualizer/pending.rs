//! Handle to a background `get_or_build` request.

use std::any::Any;
use std::sync::Arc;
use std::thread::JoinHandle;

use super::orchestrator::{CacheOrchestrator, CacheOutcome};
use super::VisualizerError;
use crate::signal::ShutdownHandler;

/// What happened to a finished result when it was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The result was handed to the consumer.
    Applied,
    /// The consumer was gone; the result was dropped.
    ConsumerGone,
    /// A newer forced request owns the display; the result was dropped.
    Superseded,
}

/// A request running on a background thread.
///
/// The owning thread polls [`PendingBuild::try_take`] (or blocks in
/// [`PendingBuild::wait`]) and applies the outcome itself, so bound data is
/// only ever touched from the thread that asked.
#[derive(Debug)]
pub struct PendingBuild {
    orchestrator: Arc<CacheOrchestrator>,
    ticket: u64,
    handle: Option<JoinHandle<CacheOutcome>>,
}

impl PendingBuild {
    pub(crate) fn new(
        orchestrator: Arc<CacheOrchestrator>,
        ticket: u64,
        handle: JoinHandle<CacheOutcome>,
    ) -> Self {
        Self {
            orchestrator,
            ticket,
            handle: Some(handle),
        }
    }

    /// Ticket of this request.
    #[must_use]
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Whether the background work has finished (or was already taken).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Whether a forced request was issued after this one.
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        self.orchestrator.is_superseded(self.ticket)
    }

    /// Take the outcome if it is ready, without blocking.
    ///
    /// Returns `None` while the work is running and after the outcome has
    /// been taken.
    pub fn try_take(&mut self) -> Option<Result<CacheOutcome, VisualizerError>> {
        if !self.handle.as_ref()?.is_finished() {
            return None;
        }
        self.handle.take().map(join)
    }

    /// Block until the outcome is ready.
    pub fn wait(mut self) -> Result<CacheOutcome, VisualizerError> {
        match self.handle.take() {
            Some(handle) => join(handle),
            None => Err(VisualizerError::AlreadyTaken),
        }
    }

    /// Block until the outcome is ready, then hand it to `apply` unless the
    /// consumer is gone or a newer forced request superseded it.
    pub fn deliver<F>(self, liveness: &ShutdownHandler, apply: F) -> Result<Delivery, VisualizerError>
    where
        F: FnOnce(CacheOutcome),
    {
        let orchestrator = Arc::clone(&self.orchestrator);
        let outcome = self.wait()?;
        Ok(hand_over(&orchestrator, outcome, liveness, apply))
    }

    /// Non-blocking [`Self::deliver`]. Returns `None` while the work runs.
    pub fn try_deliver<F>(
        &mut self,
        liveness: &ShutdownHandler,
        apply: F,
    ) -> Option<Result<Delivery, VisualizerError>>
    where
        F: FnOnce(CacheOutcome),
    {
        let outcome = self.try_take()?;
        Some(outcome.map(|outcome| hand_over(&self.orchestrator, outcome, liveness, apply)))
    }
}

fn hand_over<F>(
    orchestrator: &CacheOrchestrator,
    outcome: CacheOutcome,
    liveness: &ShutdownHandler,
    apply: F,
) -> Delivery
where
    F: FnOnce(CacheOutcome),
{
    if !liveness.is_alive() {
        log::debug!("Consumer gone, dropping result of request {}", outcome.ticket);
        return Delivery::ConsumerGone;
    }
    if orchestrator.is_superseded(outcome.ticket) {
        log::debug!("Request {} superseded by a forced rebuild", outcome.ticket);
        return Delivery::Superseded;
    }
    apply(outcome);
    Delivery::Applied
}

fn join(handle: JoinHandle<CacheOutcome>) -> Result<CacheOutcome, VisualizerError> {
    handle
        .join()
        .map_err(|payload| VisualizerError::BuildPanicked(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
