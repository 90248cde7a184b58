use std::time::Duration;

use tokio::time::sleep;

/// Fixed pause paid before every upstream call. Nothing is amortized: each
/// `wait` sleeps the full interval.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn wait(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}
