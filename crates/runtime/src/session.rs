use crate::errors::SessionError;
use crate::events::EventBuffer;
use crate::types::{EventCursor, SequencedEvent, SessionConfig, SessionStatus};
use sim_core::{Game, InputId, Tick};
use sim_host::RunHost;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Internal state of a live session.
pub struct SessionInner<G: Game> {
    pub host: RunHost<G>,
    pub events: EventBuffer<G::Event>,
    pub status: SessionStatus,
}

/// Thread-safe handle to a game run advanced by a real-time tick loop.
pub struct SessionHandle<G: Game> {
    inner: Arc<Mutex<SessionInner<G>>>,
    shutdown: Arc<AtomicBool>,
    tick_hz: u32,
}

impl<G: Game> Clone for SessionHandle<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            shutdown: Arc::clone(&self.shutdown),
            tick_hz: self.tick_hz,
        }
    }
}

impl<G: Game> SessionHandle<G> {
    pub fn new(game_config: G::Config, seed: u64, config: &SessionConfig) -> Self {
        let host = RunHost::new(game_config, seed, config.tick_hz);
        Self::from_host(host, config.event_buffer_capacity)
    }

    pub fn from_host(host: RunHost<G>, event_buffer_capacity: usize) -> Self {
        let tick_hz = host.tick_hz();
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                host,
                events: EventBuffer::new(event_buffer_capacity),
                status: SessionStatus::Running,
            })),
            shutdown: Arc::new(AtomicBool::new(false)),
            tick_hz,
        }
    }

    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    pub fn should_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Schedule an input. Returns the input id and the tick it will run on.
    pub async fn submit_input(
        &self,
        input: G::Input,
        intended_tick: Tick,
    ) -> Result<(InputId, Tick), SessionError> {
        let mut inner = self.inner.lock().await;
        match inner.status {
            SessionStatus::Terminated => Err(SessionError::Terminated),
            SessionStatus::Finished(outcome) => Err(SessionError::Finished(outcome)),
            SessionStatus::Running | SessionStatus::Paused => {
                Ok(inner.host.submit(input, intended_tick))
            }
        }
    }

    pub async fn observe(&self) -> G::Observation {
        let inner = self.inner.lock().await;
        inner.host.observe()
    }

    pub async fn poll_events(
        &self,
        cursor: EventCursor,
    ) -> (Vec<SequencedEvent<G::Event>>, EventCursor) {
        let inner = self.inner.lock().await;
        inner.events.get_from_cursor(cursor)
    }

    pub async fn current_tick(&self) -> Tick {
        let inner = self.inner.lock().await;
        inner.host.current_tick()
    }

    pub async fn status(&self) -> SessionStatus {
        let inner = self.inner.lock().await;
        inner.status
    }

    /// Stop advancing ticks. Inputs may still be queued.
    pub async fn pause(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        match inner.status {
            SessionStatus::Running | SessionStatus::Paused => {
                inner.status = SessionStatus::Paused;
                tracing::debug!(tick = inner.host.current_tick(), "session paused");
                Ok(())
            }
            SessionStatus::Terminated => Err(SessionError::Terminated),
            SessionStatus::Finished(outcome) => Err(SessionError::Finished(outcome)),
        }
    }

    pub async fn resume(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        match inner.status {
            SessionStatus::Running | SessionStatus::Paused => {
                inner.status = SessionStatus::Running;
                tracing::debug!(tick = inner.host.current_tick(), "session resumed");
                Ok(())
            }
            SessionStatus::Terminated => Err(SessionError::Terminated),
            SessionStatus::Finished(outcome) => Err(SessionError::Finished(outcome)),
        }
    }

    /// Step one tick and update status.
    /// Returns true once the session is over (finished or terminated).
    pub async fn step_one_tick(&self) -> bool {
        let mut inner = self.inner.lock().await;

        match inner.status {
            SessionStatus::Running => {}
            SessionStatus::Paused => return false,
            SessionStatus::Finished(_) | SessionStatus::Terminated => return true,
        }

        if let Some(events) = inner.host.step_one_tick() {
            let tick = inner.host.current_tick();
            for event in events {
                inner.events.push(tick, event);
            }
        }

        if let Some(outcome) = inner.host.is_terminal() {
            inner.status = SessionStatus::Finished(outcome);
            tracing::info!(tick = inner.host.current_tick(), ?outcome, "session finished");
            return true;
        }

        false
    }

    /// Mark the session terminated and stop its tick loop.
    pub async fn terminate(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.status.is_over() {
            inner.status = SessionStatus::Terminated;
        }
        drop(inner);
        self.request_shutdown();
    }

    /// Run a closure against the host, e.g. to read game state for rendering.
    pub async fn with_host<R>(&self, f: impl FnOnce(&RunHost<G>) -> R) -> R {
        let inner = self.inner.lock().await;
        f(&inner.host)
    }
}
