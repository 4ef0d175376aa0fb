//! Per-run context shared by every stage: event recording, progress and
//! cancellation.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use std::sync::{Arc, Mutex, PoisonError};
use think_tank_domain::RunEvent;
use tokio_util::sync::CancellationToken;

/// Handle threaded through one run.
///
/// Cloning is cheap; clones share the same event buffer and token, so
/// parallel members record into the run they belong to.
#[derive(Clone)]
pub struct RunContext {
    events: Arc<Mutex<Vec<RunEvent>>>,
    progress: Arc<dyn ProgressNotifier>,
    logger: Arc<dyn ConversationLogger>,
    cancel: CancellationToken,
}

impl RunContext {
    pub fn new(
        progress: Arc<dyn ProgressNotifier>,
        logger: Arc<dyn ConversationLogger>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            progress,
            logger,
            cancel,
        }
    }

    /// Context with no progress output, no transcript and a fresh token
    pub fn detached() -> Self {
        Self::new(
            Arc::new(NoProgress),
            Arc::new(NoConversationLogger),
            CancellationToken::new(),
        )
    }

    /// Record an event, forward it to the transcript and progress observers.
    pub fn emit(&self, event: RunEvent) {
        self.logger.log(ConversationEvent::from(&event));
        self.progress.on_event(&event);
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Take the events recorded so far
    pub fn drain_events(&self) -> Vec<RunEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn progress(&self) -> &dyn ProgressNotifier {
        self.progress.as_ref()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_events() {
        let ctx = RunContext::detached();
        let clone = ctx.clone();
        clone.emit(RunEvent::user_message("hi"));
        assert_eq!(ctx.drain_events().len(), 1);
        assert!(ctx.drain_events().is_empty());
    }

    #[test]
    fn test_cancel_is_shared() {
        let ctx = RunContext::detached();
        let clone = ctx.clone();
        ctx.cancel_token().cancel();
        assert!(clone.is_cancelled());
    }
}
