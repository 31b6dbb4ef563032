use crate::session::SessionHandle;
use sim_core::Game;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Run the tick loop for a session.
/// This function runs until the session is over or shutdown is requested.
pub async fn run_tick_loop<G: Game + Send + 'static>(handle: SessionHandle<G>)
where
    G::Input: Send,
    G::Observation: Send,
    G::Event: Send,
    G::Config: Send,
{
    let tick_hz = handle.tick_hz().max(1);
    let tick_duration = Duration::from_secs_f64(1.0 / tick_hz as f64);

    let mut interval = interval(tick_duration);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        if handle.should_shutdown() {
            break;
        }

        if handle.step_one_tick().await {
            break;
        }
    }
}

/// Spawn a tick loop as a tokio task.
pub fn spawn_tick_loop<G: Game + Send + 'static>(
    handle: SessionHandle<G>,
) -> tokio::task::JoinHandle<()>
where
    G::Input: Send,
    G::Observation: Send,
    G::Event: Send,
    G::Config: Send,
{
    tokio::spawn(run_tick_loop(handle))
}
