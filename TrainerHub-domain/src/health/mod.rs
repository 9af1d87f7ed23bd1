//! Domain layer health check functionality
//! Probes the key-value store the services depend on

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;
use trainer_hub_data::database;
use trainer_hub_data::repository::SharedKvStore;

/// A probe slower than this marks the store as degraded
const SLOW_STORE_THRESHOLD: Duration = Duration::from_millis(500);
const PROBE_KEY: &str = "health:probe";

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone, Serialize)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub status: SystemStatus,
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the store
    ///
    /// `Ok(true)` when fully operational, `Ok(false)` when slow, `Err` when unreachable.
    async fn check_store_status(&self) -> Result<bool, String>;
}

/// Health checks against the shared key-value store
pub struct HealthService {
    store: SharedKvStore,
}

impl HealthService {
    pub fn new(store: SharedKvStore) -> Self {
        Self { store }
    }
}

fn overall_status(components: &HashMap<String, HealthComponent>) -> SystemStatus {
    if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
        SystemStatus::Unhealthy
    } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
        SystemStatus::Degraded
    } else {
        SystemStatus::Healthy
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let store_component = match self.check_store_status().await {
            Ok(true) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: database::get_connection_info(),
            },
            Ok(false) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("Store is available but responding slowly".to_string()),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let components: HashMap<String, HealthComponent> =
            vec![("store".to_string(), store_component)].into_iter().collect();

        SystemHealth {
            status: overall_status(&components),
            components,
        }
    }

    async fn check_store_status(&self) -> Result<bool, String> {
        let started = Instant::now();
        match self.store.get(PROBE_KEY).await {
            Ok(_) => {
                let elapsed = started.elapsed();
                if elapsed > SLOW_STORE_THRESHOLD {
                    warn!("Store probe took {:?}", elapsed);
                    Ok(false)
                } else {
                    Ok(true)
                }
            }
            Err(e) => Err(format!("Store unavailable: {}", e)),
        }
    }
}

pub fn create_health_service(store: SharedKvStore) -> impl HealthServiceTrait {
    HealthService::new(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trainer_hub_data::repository::tests::FailingKvStore;
    use trainer_hub_data::repository::InMemoryKvStore;

    #[tokio::test]
    async fn test_healthy_store() {
        let service = HealthService::new(Arc::new(InMemoryKvStore::new()));
        let health = service.get_system_health().await;
        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.components.contains_key("store"));
    }

    #[tokio::test]
    async fn test_failing_store_is_unhealthy() {
        let service = HealthService::new(Arc::new(FailingKvStore));
        let health = service.get_system_health().await;
        assert_eq!(health.status, SystemStatus::Unhealthy);
        assert!(health.components["store"].details.is_some());
    }
}
