use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn, Span};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Waiting for the user to start a recording.
    #[default]
    Idle,
    /// Voice recording in progress.
    Recording,
    /// Recording finished, audio is being processed.
    Processing,
}

impl State {
    pub const ALL: [State; 3] = [State::Idle, State::Recording, State::Processing];

    /// Lowercase slug used in asset names and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::Recording => "recording",
            State::Processing => "processing",
        }
    }

    /// Whether `self → target` is an edge of the transition graph.
    pub fn can_transition_to(self, target: State) -> bool {
        matches!(
            (self, target),
            (State::Idle, State::Recording)
                | (State::Recording, State::Processing)
                | (State::Processing, State::Idle)
        )
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Idle => write!(f, "Idle"),
            State::Recording => write!(f, "Recording"),
            State::Processing => write!(f, "Processing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: State, to: State },
}

/// Receives `(old, new)` after every committed transition.
///
/// Plain closures taking `(State, State)` are subscribers too.
#[async_trait]
pub trait StateSubscriber: Send + Sync {
    async fn on_transition(&self, old: State, new: State);
}

#[async_trait]
impl<F> StateSubscriber for F
where
    F: Fn(State, State) + Send + Sync,
{
    async fn on_transition(&self, old: State, new: State) {
        self(old, new)
    }
}

struct Inner {
    current: State,
    subscribers: Vec<Arc<dyn StateSubscriber>>,
}

/// Owns the current [`State`] and the subscriber list.
///
/// Every `transition` runs its check-and-swap inside one exclusive section,
/// so commits are totally ordered. The lock is released before subscribers
/// run: a subscriber may call [`StateMachine::state`] or even
/// [`StateMachine::transition`] without deadlocking, and a later transition
/// may commit while an earlier notification is still in flight.
pub struct StateMachine {
    inner: RwLock<Inner>,
    span: Span,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                current: State::Idle,
                subscribers: Vec::new(),
            }),
            span: tracing::info_span!("state_machine"),
        }
    }

    /// Route this machine's log events through `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> State {
        self.read().current
    }

    /// Register a subscriber. Past transitions are not replayed.
    pub fn subscribe(&self, subscriber: Arc<dyn StateSubscriber>) {
        let mut inner = self.write();
        inner.subscribers.push(subscriber);
        debug!(parent: &self.span, count = inner.subscribers.len(), "subscriber registered");
    }

    /// Move to `target` if `(current, target)` is a legal edge, then notify
    /// every subscriber with the committed pair.
    ///
    /// A rejected transition leaves the state untouched and notifies nobody.
    /// Subscribers run on their own task; the caller waits for them, but
    /// dropping the caller's future does not cut the notification short.
    pub async fn transition(&self, target: State) -> Result<(), StateError> {
        let (old, subscribers) = {
            let mut inner = self.write();
            let from = inner.current;
            if !from.can_transition_to(target) {
                warn!(parent: &self.span, from = %from, to = %target, "invalid state transition rejected");
                return Err(StateError::InvalidTransition { from, to: target });
            }
            inner.current = target;
            (from, inner.subscribers.clone())
        };

        info!(parent: &self.span, from = %old, to = %target, "state transition");

        // Notification outlives a dropped caller: once committed, every
        // subscriber hears about the transition.
        let notify = tokio::spawn(async move {
            for subscriber in subscribers {
                subscriber.on_transition(old, target).await;
            }
        });
        if let Err(e) = notify.await {
            error!(parent: &self.span, from = %old, to = %target, "Subscriber notification failed: {}", e);
        }

        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
