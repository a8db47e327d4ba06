use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::info;

use super::catalog::{ActivityFeed, CategoryCatalog, PriceOffer};
use super::gateway::{ErrorSink, LeadGateway};
use super::session::{IntakeSession, SessionContext, SessionId};
use super::ticker::MIN_PERIOD;
use crate::config::IntakeTiming;

/// Registry of live intake sessions plus the collaborators they share.
#[derive(Debug)]
pub struct IntakeService {
    context: SessionContext,
    offers: Vec<PriceOffer>,
    sessions: Mutex<HashMap<SessionId, Arc<IntakeSession>>>,
    sequence: AtomicU64,
}

impl IntakeService {
    pub fn new(
        catalog: CategoryCatalog,
        feed: ActivityFeed,
        gateway: Arc<dyn LeadGateway>,
        sink: Arc<dyn ErrorSink>,
        timing: IntakeTiming,
    ) -> Self {
        Self {
            context: SessionContext {
                catalog: Arc::new(catalog),
                feed: Arc::new(feed),
                gateway,
                sink,
                timing,
            },
            offers: PriceOffer::mock_offers(),
            sessions: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(1),
        }
    }

    /// Standard catalog and feed wired to the given gateway and sink.
    pub fn standard(
        gateway: Arc<dyn LeadGateway>,
        sink: Arc<dyn ErrorSink>,
        timing: IntakeTiming,
    ) -> Self {
        Self::new(
            CategoryCatalog::standard(),
            ActivityFeed::standard(),
            gateway,
            sink,
            timing,
        )
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.context.catalog
    }

    pub fn feed(&self) -> &ActivityFeed {
        &self.context.feed
    }

    pub fn offers(&self) -> &[PriceOffer] {
        &self.offers
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<IntakeSession>>> {
        // A panic while holding the guard leaves the map itself consistent.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn open_session(&self) -> Arc<IntakeSession> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = SessionId(format!("lead-session-{sequence:06}"));
        let session = IntakeSession::open(id.clone(), self.context.clone());
        self.sessions().insert(id, session.clone());
        session
    }

    pub fn session(&self, id: &SessionId) -> Option<Arc<IntakeSession>> {
        self.sessions().get(id).cloned()
    }

    /// Removes the session and stops its timers. Returns `false` if unknown.
    pub async fn close_session(&self, id: &SessionId) -> bool {
        let removed = self.sessions().remove(id);
        match removed {
            Some(session) => {
                session.close().await;
                true
            }
            None => false,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }

    /// Closes and forgets every session idle for at least
    /// `timing.session_idle`. Returns how many were expired.
    pub async fn sweep_idle(&self) -> usize {
        let ttl = self.context.timing.session_idle;
        let live: Vec<Arc<IntakeSession>> = self.sessions().values().cloned().collect();

        let mut expired = 0;
        for session in live {
            if session.idle_for().await < ttl {
                continue;
            }
            // An explicit close may have won the race.
            if self.sessions().remove(session.id()).is_some() {
                session.close().await;
                expired += 1;
            }
        }

        if expired > 0 {
            info!(expired, live = self.session_count(), "idle intake sessions expired");
        }
        expired
    }

    /// Sweeps idle sessions every half idle period until the service is dropped.
    pub fn start_reaper(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::downgrade(self);
        let period = (self.context.timing.session_idle / 2).max(MIN_PERIOD);

        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(service) = service.upgrade() else {
                    return;
                };
                service.sweep_idle().await;
            }
        })
    }
}
