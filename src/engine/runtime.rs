//! Background polling loops.
//!
//! Three timers keep an active team view current: the overdue sweep, the
//! inbound-reply poll, and the cache refresh. Each runs as a tokio task
//! against the shared engine; [`Runtime::shutdown`] tears all of them
//! down when the view goes inactive, so no timer outlives its view.

use super::Engine;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle over the spawned polling loops.
pub struct Runtime {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Spawn the sweep, reply-poll and refresh loops for the engine.
    ///
    /// Intervals come from the engine's [`crate::config::EngineConfig`].
    /// Each loop fires once immediately (tokio interval semantics), which
    /// gives the sweeper its catch-up pass for tasks that went overdue
    /// while no view was active.
    pub async fn start(engine: Arc<Mutex<Engine>>) -> Self {
        let config = engine.lock().await.config().clone();
        let (shutdown, _) = watch::channel(false);

        let sweep = spawn_loop(
            engine.clone(),
            Duration::from_secs(config.sweep_interval_secs),
            shutdown.subscribe(),
            |engine| async move {
                engine.lock().await.sweep_overdue(Utc::now()).await;
            },
        );
        let replies = spawn_loop(
            engine.clone(),
            Duration::from_secs(config.reply_poll_interval_secs),
            shutdown.subscribe(),
            |engine| async move {
                engine.lock().await.process_replies().await;
            },
        );
        let refresh = spawn_loop(
            engine,
            Duration::from_secs(config.refresh_interval_secs),
            shutdown.subscribe(),
            |engine| async move {
                engine.lock().await.refresh().await;
            },
        );

        Self {
            shutdown,
            handles: vec![sweep, replies, refresh],
        }
    }

    /// Stop every loop and wait for the tasks to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
        debug!("engine runtime stopped");
    }
}

fn spawn_loop<F, Fut>(
    engine: Arc<Mutex<Engine>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    tick: F,
) -> JoinHandle<()>
where
    F: Fn(Arc<Mutex<Engine>>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => tick(engine.clone()).await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
