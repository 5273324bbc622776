use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};

/// Represents an entity responsible for providing dates across application. Derivations never
/// read the wall clock themselves, so tests can pin "now" through this.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    /// Current time in the zone calendar windows are evaluated in.
    fn local_time(&self) -> DateTime<Local> {
        self.time().with_timezone(&Local)
    }

    async fn sleep(&self, duration: Duration);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Always reports the same instant. Used for `--at` and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

#[async_trait]
impl Clock for FixedClock {
    fn time(&self) -> DateTime<Utc> {
        self.0
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[async_trait]
impl Clock for Box<dyn Clock> {
    fn time(&self) -> DateTime<Utc> {
        (**self).time()
    }

    fn local_time(&self) -> DateTime<Local> {
        (**self).local_time()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }
}
