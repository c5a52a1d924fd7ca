/// Cancellable repeating task: the scheduler behind the poll cadence.
///
/// Each cycle runs to completion before the next tick is considered, so
/// cycles never overlap; missed ticks are skipped, not queued. The first
/// cycle runs one period after spawn.
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn<F, Fut>(period: Duration, mut cycle: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                timer.tick().await;
                cycle().await;
            }
        });
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
