/// Trailing-debounce primitive shared by the typing, search, and
/// scroll-idle paths. Each call resets the deadline; only the action from
/// the last call within the window runs.
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

pub struct Debouncer {
    delay: Duration,
    scheduled: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            scheduled: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `action` to run after the delay, dropping any action
    /// scheduled earlier.
    pub fn call<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            action.await;
        });
        if let Ok(mut scheduled) = self.scheduled.lock() {
            if let Some(previous) = scheduled.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Drop the scheduled action without running it.
    pub fn cancel(&self) {
        if let Ok(mut scheduled) = self.scheduled.lock() {
            if let Some(previous) = scheduled.take() {
                previous.abort();
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
