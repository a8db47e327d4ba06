use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

use super::catalog::{ActivityFeed, ActivityRecord};

/// Shortest rotation period; a zero period would stall the interval.
pub(crate) const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Rotates an index through the activity feed on a fixed period.
///
/// The rotation task is owned by the ticker: it is aborted by `stop` and
/// again on drop, so no tick can outlive the session that started it.
#[derive(Debug)]
pub struct ActivityTicker {
    index: Arc<AtomicUsize>,
    len: usize,
    task: Option<JoinHandle<()>>,
}

impl ActivityTicker {
    /// Must be called from within a Tokio runtime.
    pub fn start(feed: &ActivityFeed, period: Duration) -> Self {
        let index = Arc::new(AtomicUsize::new(0));
        let len = feed.len().max(1);
        let task = tokio::spawn(rotate(index.clone(), len, period.max(MIN_PERIOD)));

        Self {
            index,
            len,
            task: Some(task),
        }
    }

    pub fn index(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    pub fn current<'a>(&self, feed: &'a ActivityFeed) -> Option<&'a ActivityRecord> {
        feed.get(self.index() % self.len)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ActivityTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn rotate(index: Arc<AtomicUsize>, len: usize, period: Duration) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        // Only this task writes the index.
        let next = (index.load(Ordering::Relaxed) + 1) % len;
        index.store(next, Ordering::Relaxed);
        trace!(index = next, "activity feed rotated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(4_000);

    #[tokio::test(start_paused = true)]
    async fn cycles_through_feed_and_wraps() {
        let feed = ActivityFeed::standard();
        let ticker = ActivityTicker::start(&feed, PERIOD);

        time::sleep(PERIOD / 2).await;
        let mut samples = vec![ticker.index()];
        for _ in 0..6 {
            time::sleep(PERIOD).await;
            samples.push(ticker.index());
        }

        assert_eq!(samples, vec![0, 1, 2, 0, 1, 2, 0]);
        assert!(samples.iter().all(|index| *index < feed.len()));
    }

    #[tokio::test(start_paused = true)]
    async fn current_record_follows_index() {
        let feed = ActivityFeed::standard();
        let ticker = ActivityTicker::start(&feed, PERIOD);
        assert_eq!(ticker.current(&feed).map(|r| r.user.as_str()), Some("Jonas"));

        time::sleep(PERIOD + PERIOD / 2).await;
        assert_eq!(ticker.current(&feed).map(|r| r.user.as_str()), Some("Rūta"));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_rotation() {
        let feed = ActivityFeed::standard();
        let mut ticker = ActivityTicker::start(&feed, PERIOD);
        assert!(ticker.is_running());

        time::sleep(PERIOD + PERIOD / 2).await;
        ticker.stop();
        assert!(!ticker.is_running());

        time::sleep(PERIOD * 5).await;
        assert_eq!(ticker.index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_clamped() {
        let feed = ActivityFeed::standard();
        let ticker = ActivityTicker::start(&feed, Duration::ZERO);

        let mut seen = Vec::new();
        for _ in 0..10 {
            time::sleep(MIN_PERIOD * 2).await;
            seen.push(ticker.index());
        }

        assert!(ticker.is_running());
        assert!(seen.iter().any(|index| *index != seen[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_releases_the_task() {
        let feed = ActivityFeed::standard();
        let ticker = ActivityTicker::start(&feed, PERIOD);
        let index = ticker.index.clone();

        drop(ticker);
        time::sleep(PERIOD * 3).await;

        assert_eq!(index.load(Ordering::Relaxed), 0);
        assert_eq!(Arc::strong_count(&index), 1);
    }
}
