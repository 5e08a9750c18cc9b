use std::future::Future;
use tokio::time::{sleep_until, Duration, Instant};

/// Enforces a minimum gap between the end of one upstream call and the start
/// of the next. The gap applies whether the previous call succeeded or not.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_done: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_done: None,
        }
    }

    /// Suspend until the next call is allowed to start.
    pub async fn wait(&self) {
        if let Some(last) = self.last_done {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                tracing::trace!(
                    "rate limiter: waiting {:?}",
                    ready_at.saturating_duration_since(Instant::now())
                );
                sleep_until(ready_at).await;
            }
        }
    }

    /// Run `call` once its turn comes and record when it finished.
    pub async fn run<F, T>(&mut self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        self.wait().await;
        let out = call.await;
        self.last_done = Some(Instant::now());
        out
    }
}
