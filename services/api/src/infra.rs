use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use servisai::config::IntakeConfig;
use servisai::error::AppError;
use servisai::intake::{GatewayError, LeadGateway, LeadPayload, SupabaseGateway};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredLead {
    pub(crate) lead: LeadPayload,
    pub(crate) received_at: DateTime<Utc>,
}

/// Process-local lead store used when no hosted table is configured.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryLeadGateway {
    leads: Arc<Mutex<Vec<StoredLead>>>,
    offline: bool,
}

impl InMemoryLeadGateway {
    /// A store that rejects every insert, for exercising the failure path.
    pub(crate) fn offline() -> Self {
        Self {
            leads: Arc::default(),
            offline: true,
        }
    }

    pub(crate) fn leads(&self) -> Vec<StoredLead> {
        self.leads.lock().expect("lead store mutex poisoned").clone()
    }
}

#[async_trait]
impl LeadGateway for InMemoryLeadGateway {
    async fn insert_lead(&self, lead: &LeadPayload) -> Result<(), GatewayError> {
        if self.offline {
            return Err(GatewayError::Unavailable(
                "in-memory lead store is offline".to_string(),
            ));
        }
        let mut guard = self.leads.lock().expect("lead store mutex poisoned");
        guard.push(StoredLead {
            lead: lead.clone(),
            received_at: Utc::now(),
        });
        Ok(())
    }
}

pub(crate) fn lead_gateway(config: &IntakeConfig) -> Result<Arc<dyn LeadGateway>, AppError> {
    match &config.lead_store {
        Some(store) => {
            let gateway = SupabaseGateway::new(store)?;
            info!(endpoint = gateway.endpoint(), "persisting leads to hosted table");
            Ok(Arc::new(gateway))
        }
        None => {
            info!("no lead store configured; keeping leads in memory");
            Ok(Arc::new(InMemoryLeadGateway::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servisai::config::LeadStoreConfig;
    use servisai::intake::CategoryId;

    fn lead() -> LeadPayload {
        LeadPayload {
            category: CategoryId::new("clothing"),
            description: "torn zipper".to_string(),
            zip_code: "03003".to_string(),
        }
    }

    #[tokio::test]
    async fn in_memory_gateway_keeps_rows_in_order() {
        let gateway = InMemoryLeadGateway::default();
        gateway.insert_lead(&lead()).await.expect("insert succeeds");

        let stored = gateway.leads();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].lead, lead());
    }

    #[tokio::test]
    async fn offline_gateway_rejects_without_storing() {
        let gateway = InMemoryLeadGateway::offline();
        assert!(matches!(
            gateway.insert_lead(&lead()).await,
            Err(GatewayError::Unavailable(_))
        ));
        assert!(gateway.leads().is_empty());
    }

    #[test]
    fn picks_hosted_gateway_when_configured() {
        let config = IntakeConfig {
            lead_store: Some(LeadStoreConfig {
                url: "https://demo.supabase.co".to_string(),
                anon_key: "anon".to_string(),
                request_timeout: std::time::Duration::from_secs(10),
            }),
            ..IntakeConfig::default()
        };
        let gateway = lead_gateway(&config).expect("gateway builds");
        assert!(format!("{gateway:?}").contains("SupabaseGateway"));

        let gateway = lead_gateway(&IntakeConfig::default()).expect("gateway builds");
        assert!(format!("{gateway:?}").contains("InMemoryLeadGateway"));
    }
}
