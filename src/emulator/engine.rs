use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::io::InputRequest;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
    Sleeping,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("no input was requested")]
    NotAwaiting,
    #[error("input request belongs to an earlier run")]
    Stale,
    #[error("'{0}' is not a hexadecimal byte")]
    InvalidHex(String),
}

/// Run state and the suspension bookkeeping around it.
///
/// Time is logical: it only moves when the driver calls [`Engine::advance`],
/// which is also where timed sleeps expire.
#[derive(Debug, Clone)]
pub struct Engine {
    state: EngineState,
    clock: Duration,
    wake_at: Option<Duration>,
    /// Bumped on every run so requests from earlier runs can be told apart
    generation: u64,
    /// Numbers the requests within a run
    next_sequence: u64,
    /// The one request an answer is accepted for
    pending: Option<InputRequest>,
    sleep_unit: Duration,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Engine {
    pub fn new(sleep_unit: Duration) -> Self {
        Self {
            state: EngineState::Stopped,
            clock: Duration::ZERO,
            wake_at: None,
            generation: 0,
            next_sequence: 0,
            pending: None,
            sleep_unit,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Length of one `SLEEP` unit.
    pub fn sleep_unit(&self) -> Duration {
        self.sleep_unit
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.pending.is_some()
    }

    /// Remaining time before a timed sleep ends, if one is pending.
    pub fn time_to_wake(&self) -> Option<Duration> {
        self.wake_at.map(|at| at.saturating_sub(self.clock))
    }

    /// Begins a fresh run, dropping any timer or input request from the last one.
    pub(crate) fn start(&mut self) {
        self.generation += 1;
        self.next_sequence = 0;
        self.wake_at = None;
        self.pending = None;
        self.state = EngineState::Running;
        tracing::debug!(generation = self.generation, "engine running");
    }

    pub fn stop(&mut self) {
        self.wake_at = None;
        self.pending = None;
        self.state = EngineState::Stopped;
        tracing::debug!("engine stopped");
    }

    /// Suspends stepping. With a timeout the engine wakes by itself once the
    /// clock passes it, otherwise only [`Engine::wake_up`] resumes it.
    pub fn sleep(&mut self, timeout: Option<Duration>) {
        if self.state == EngineState::Stopped {
            tracing::warn!("sleep requested while stopped, ignoring");
            return;
        }
        self.state = EngineState::Sleeping;
        self.wake_at = timeout.map(|t| self.clock + t);
        tracing::debug!(?timeout, "engine sleeping");
    }

    pub fn wake_up(&mut self) {
        if self.state != EngineState::Sleeping {
            return;
        }
        self.state = EngineState::Running;
        self.wake_at = None;
        if let Some(request) = self.pending.take() {
            tracing::debug!(?request, "input request dropped by wake-up");
        }
        tracing::debug!("engine woke up");
    }

    /// Moves the logical clock forward and fires a due wake-up.
    pub fn advance(&mut self, elapsed: Duration) {
        self.clock += elapsed;
        if let Some(at) = self.wake_at {
            if self.state == EngineState::Sleeping && self.clock >= at {
                tracing::trace!("sleep timer expired");
                self.wake_up();
            }
        }
    }

    /// Marks the engine as blocked on input and hands out a fresh request
    /// token. Any earlier token stops being accepted.
    pub(crate) fn await_input(&mut self) -> InputRequest {
        let request = InputRequest {
            generation: self.generation,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.pending = Some(request);
        request
    }

    /// Whether `request` is the one currently outstanding. Leaves it pending.
    pub(crate) fn check_input(&self, request: InputRequest) -> Result<(), InputError> {
        if request.generation != self.generation {
            return Err(InputError::Stale);
        }
        match self.pending {
            None => Err(InputError::NotAwaiting),
            Some(pending) if pending != request => Err(InputError::Stale),
            Some(_) => Ok(()),
        }
    }

    /// Like [`Engine::check_input`], but retires the request on success.
    pub(crate) fn accept_input(&mut self, request: InputRequest) -> Result<(), InputError> {
        self.check_input(request)?;
        self.pending = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_state_transitions() {
        let mut engine = Engine::default();
        assert_eq!(engine.state(), EngineState::Stopped);

        engine.start();
        assert_eq!(engine.state(), EngineState::Running);

        engine.sleep(None);
        assert_eq!(engine.state(), EngineState::Sleeping);

        engine.wake_up();
        assert_eq!(engine.state(), EngineState::Running);

        // waking a running engine changes nothing
        engine.wake_up();
        assert_eq!(engine.state(), EngineState::Running);

        engine.sleep(Some(Duration::from_secs(5)));
        engine.stop();
        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(engine.time_to_wake(), None);

        engine.wake_up();
        assert_eq!(engine.state(), EngineState::Stopped);
    }

    #[traced_test]
    #[test]
    fn test_sleep_while_stopped_is_ignored() {
        let mut engine = Engine::default();
        engine.sleep(None);
        assert_eq!(engine.state(), EngineState::Stopped);
        assert!(logs_contain("sleep requested while stopped"));
    }

    #[traced_test]
    #[test]
    fn test_timed_sleep_uses_logical_clock() {
        let mut engine = Engine::default();
        engine.start();
        engine.advance(Duration::from_millis(500));

        engine.sleep(Some(Duration::from_millis(100)));
        assert_eq!(engine.time_to_wake(), Some(Duration::from_millis(100)));

        engine.advance(Duration::from_millis(60));
        assert_eq!(engine.state(), EngineState::Sleeping);
        assert_eq!(engine.time_to_wake(), Some(Duration::from_millis(40)));

        engine.advance(Duration::from_millis(40));
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.time_to_wake(), None);
    }

    #[traced_test]
    #[test]
    fn test_restart_cancels_pending_timer() {
        let mut engine = Engine::default();
        engine.start();
        engine.sleep(Some(Duration::from_millis(10)));
        engine.start();
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.time_to_wake(), None);
    }

    #[traced_test]
    #[test]
    fn test_input_requests_expire_with_their_run() {
        let mut engine = Engine::default();
        engine.start();
        let old = engine.await_input();

        engine.start();
        assert_eq!(engine.accept_input(old), Err(InputError::Stale));

        let current = engine.await_input();
        assert_eq!(engine.accept_input(current), Ok(()));
        assert_eq!(engine.accept_input(current), Err(InputError::NotAwaiting));
    }

    #[traced_test]
    #[test]
    fn test_each_request_gets_its_own_token() {
        let mut engine = Engine::default();
        engine.start();
        let first = engine.await_input();
        let second = engine.await_input();
        assert_ne!(first, second);

        assert_eq!(engine.check_input(first), Err(InputError::Stale));
        assert_eq!(engine.accept_input(first), Err(InputError::Stale));
        // a rejected token does not retire the live one
        assert!(engine.is_awaiting_input());
        assert_eq!(engine.check_input(second), Ok(()));
        assert!(engine.is_awaiting_input());
        assert_eq!(engine.accept_input(second), Ok(()));
        assert!(!engine.is_awaiting_input());
    }

    #[traced_test]
    #[test]
    fn test_wake_up_retires_pending_request() {
        let mut engine = Engine::default();
        engine.start();
        engine.sleep(None);
        let request = engine.await_input();

        engine.wake_up();
        assert!(!engine.is_awaiting_input());
        assert_eq!(engine.accept_input(request), Err(InputError::NotAwaiting));

        // a later timed sleep does not revive it
        engine.sleep(Some(Duration::from_secs(5)));
        assert_eq!(engine.accept_input(request), Err(InputError::NotAwaiting));
        assert_eq!(engine.state(), EngineState::Sleeping);
    }
}
