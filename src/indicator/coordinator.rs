//! Fans state changes out to the visual and audio indicators.

use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, warn, Span};

use super::audio::AudioIndicator;
use super::visual::VisualIndicator;
use crate::state::{State, StateSubscriber};

#[derive(Clone, Default)]
struct IndicatorBinding {
    visual: Option<Arc<dyn VisualIndicator>>,
    audio: Option<Arc<dyn AudioIndicator>>,
}

/// Subscribes to the state machine and drives both indicators in parallel.
///
/// Handlers can be swapped at any time. Each notification works on a
/// snapshot of the binding taken when it starts, so it sees a handler either
/// entirely before or entirely after a swap. A failing or panicking handler
/// is logged and never affects the other handler or the caller.
pub struct IndicatorCoordinator {
    binding: RwLock<IndicatorBinding>,
    span: Span,
}

impl Default for IndicatorCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorCoordinator {
    pub fn new() -> Self {
        Self {
            binding: RwLock::new(IndicatorBinding::default()),
            span: tracing::info_span!("indicator_coordinator"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn set_visual(&self, visual: Option<Arc<dyn VisualIndicator>>) {
        let mut binding = self.binding.write().unwrap_or_else(PoisonError::into_inner);
        binding.visual = visual;
    }

    pub fn set_audio(&self, audio: Option<Arc<dyn AudioIndicator>>) {
        let mut binding = self.binding.write().unwrap_or_else(PoisonError::into_inner);
        binding.audio = audio;
    }

    fn snapshot(&self) -> IndicatorBinding {
        self.binding
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run both indicators for `old → new` and wait for both to finish.
    pub async fn on_state_change(&self, old: State, new: State) {
        let IndicatorBinding { visual, audio } = self.snapshot();
        if visual.is_none() && audio.is_none() {
            debug!(parent: &self.span, "No indicators bound, skipping");
            return;
        }

        let visual_task = visual.map(|visual| {
            let span = self.span.clone();
            tokio::spawn(async move {
                if let Err(e) = visual.update_icon(new).await {
                    warn!(parent: &span, state = %new, "Failed to update visual indicator: {:#}", anyhow::Error::from(e));
                }
            })
        });

        let audio_task = audio.map(|audio| {
            let span = self.span.clone();
            tokio::spawn(async move {
                if let Err(e) = audio.play_sound(old, new).await {
                    warn!(parent: &span, from = %old, to = %new, "Failed to play audio indicator: {:#}", anyhow::Error::from(e));
                }
            })
        });

        let (visual_result, audio_result) = tokio::join!(join(visual_task), join(audio_task));

        if let Err(e) = visual_result {
            error!(parent: &self.span, "Visual indicator task failed: {}", e);
        }
        if let Err(e) = audio_result {
            error!(parent: &self.span, "Audio indicator task failed: {}", e);
        }
    }
}

async fn join(task: Option<JoinHandle<()>>) -> Result<(), JoinError> {
    match task {
        Some(handle) => handle.await,
        None => Ok(()),
    }
}

#[async_trait]
impl StateSubscriber for IndicatorCoordinator {
    async fn on_transition(&self, old: State, new: State) {
        self.on_state_change(old, new).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::error::IndicatorError;
    use crate::state::StateMachine;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct FakeVisual {
        delay: Duration,
        fail: bool,
        panic: bool,
        calls: Mutex<Vec<State>>,
    }

    #[async_trait]
    impl VisualIndicator for FakeVisual {
        async fn update_icon(&self, state: State) -> Result<(), IndicatorError> {
            tokio::time::sleep(self.delay).await;
            if self.panic {
                panic!("icon backend crashed");
            }
            self.calls.lock().unwrap().push(state);
            if self.fail {
                return Err(IndicatorError::NotFound(state));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeAudio {
        delay: Duration,
        panic: bool,
        calls: Mutex<Vec<(State, State)>>,
    }

    #[async_trait]
    impl AudioIndicator for FakeAudio {
        async fn play_sound(&self, from: State, to: State) -> Result<(), IndicatorError> {
            tokio::time::sleep(self.delay).await;
            if self.panic {
                panic!("audio backend crashed");
            }
            self.calls.lock().unwrap().push((from, to));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_no_handlers_is_noop() {
        let coordinator = IndicatorCoordinator::new();
        let started = Instant::now();
        coordinator
            .on_state_change(State::Idle, State::Recording)
            .await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_both_handlers_receive_transition() {
        let coordinator = IndicatorCoordinator::new();
        let visual = Arc::new(FakeVisual::default());
        let audio = Arc::new(FakeAudio::default());
        coordinator.set_visual(Some(visual.clone()));
        coordinator.set_audio(Some(audio.clone()));

        coordinator
            .on_state_change(State::Recording, State::Processing)
            .await;

        assert_eq!(*visual.calls.lock().unwrap(), vec![State::Processing]);
        assert_eq!(
            *audio.calls.lock().unwrap(),
            vec![(State::Recording, State::Processing)]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fan_out_runs_in_parallel() {
        let d1 = Duration::from_millis(200);
        let d2 = Duration::from_millis(300);

        let coordinator = IndicatorCoordinator::new();
        let visual = Arc::new(FakeVisual {
            delay: d1,
            ..Default::default()
        });
        let audio = Arc::new(FakeAudio {
            delay: d2,
            ..Default::default()
        });
        coordinator.set_visual(Some(visual.clone()));
        coordinator.set_audio(Some(audio.clone()));

        let started = Instant::now();
        coordinator.on_state_change(State::Idle, State::Recording).await;
        let elapsed = started.elapsed();

        assert!(elapsed >= d2, "returned before both handlers finished");
        assert!(elapsed < d1 + d2, "fan-out was sequential: {elapsed:?}");
        assert_eq!(visual.calls.lock().unwrap().len(), 1);
        assert_eq!(audio.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_visual_failure_does_not_affect_audio() {
        let coordinator = IndicatorCoordinator::new();
        let audio = Arc::new(FakeAudio::default());
        coordinator.set_visual(Some(Arc::new(FakeVisual {
            fail: true,
            ..Default::default()
        })));
        coordinator.set_audio(Some(audio.clone()));

        coordinator.on_state_change(State::Idle, State::Recording).await;
        assert_eq!(audio.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_isolated() {
        let coordinator = IndicatorCoordinator::new();
        let visual = Arc::new(FakeVisual::default());
        coordinator.set_visual(Some(visual.clone()));
        coordinator.set_audio(Some(Arc::new(FakeAudio {
            panic: true,
            ..Default::default()
        })));

        coordinator.on_state_change(State::Idle, State::Recording).await;
        assert_eq!(*visual.calls.lock().unwrap(), vec![State::Recording]);
    }

    #[tokio::test]
    async fn test_unset_handler_is_skipped() {
        let coordinator = IndicatorCoordinator::new();
        let visual = Arc::new(FakeVisual::default());
        let audio = Arc::new(FakeAudio::default());
        coordinator.set_visual(Some(visual.clone()));
        coordinator.set_audio(Some(audio.clone()));
        coordinator.set_audio(None);

        coordinator.on_state_change(State::Idle, State::Recording).await;
        assert_eq!(visual.calls.lock().unwrap().len(), 1);
        assert!(audio.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_swap_during_fan_out_uses_snapshot() {
        let coordinator = Arc::new(IndicatorCoordinator::new());
        let first = Arc::new(FakeVisual {
            delay: Duration::from_millis(100),
            ..Default::default()
        });
        let second = Arc::new(FakeVisual::default());
        coordinator.set_visual(Some(first.clone()));

        let in_flight = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .on_state_change(State::Idle, State::Recording)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        coordinator.set_visual(Some(second.clone()));
        in_flight.await.unwrap();

        assert_eq!(first.calls.lock().unwrap().len(), 1);
        assert!(second.calls.lock().unwrap().is_empty());

        coordinator
            .on_state_change(State::Recording, State::Processing)
            .await;
        assert_eq!(*second.calls.lock().unwrap(), vec![State::Processing]);
    }

    #[tokio::test]
    async fn test_subscribed_to_state_machine() {
        let machine = StateMachine::new();
        let coordinator = Arc::new(IndicatorCoordinator::new());
        let visual = Arc::new(FakeVisual::default());
        let audio = Arc::new(FakeAudio::default());
        coordinator.set_visual(Some(visual.clone()));
        coordinator.set_audio(Some(audio.clone()));
        machine.subscribe(coordinator.clone());

        machine.transition(State::Recording).await.unwrap();
        let _ = machine.transition(State::Idle).await;
        machine.transition(State::Processing).await.unwrap();
        machine.transition(State::Idle).await.unwrap();

        assert_eq!(
            *visual.calls.lock().unwrap(),
            vec![State::Recording, State::Processing, State::Idle]
        );
        assert_eq!(
            *audio.calls.lock().unwrap(),
            vec![
                (State::Idle, State::Recording),
                (State::Recording, State::Processing),
                (State::Processing, State::Idle),
            ]
        );
    }
}
