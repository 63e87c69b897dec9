//! First-time setup of the policy engine: the system record, both resource
//! type catalogues, and the existing businesses.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalogue;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::lifecycle::ResourceLifecycleManager;
use crate::transport::{PolicyTransport, RequestContext};
use crate::types::{Action, ResourceAttribute, ResourceType, ScopeKind};

/// Business names reserved for the host resource pool, which is never
/// registered.
pub const RESOURCE_POOL_NAMES: &[&str] = &["资源池", "resource pool"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub business_id: i64,
    pub name: String,
}

/// A legacy real-business record owned by a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RBizRecord {
    pub rbiz_id: i64,
    pub name: String,
    pub business_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitConfig {
    #[serde(default)]
    pub businesses: Vec<BusinessRecord>,
    #[serde(default)]
    pub rbizs: Vec<RBizRecord>,
}

impl InitConfig {
    fn resources(&self) -> Vec<ResourceAttribute> {
        let businesses = self
            .businesses
            .iter()
            .filter(|b| !RESOURCE_POOL_NAMES.contains(&b.name.as_str()))
            .map(|b| {
                ResourceAttribute::new(ResourceType::Business, Action::Create)
                    .with_instance(b.business_id)
                    .with_name(b.name.as_str())
            });
        let rbizs = self.rbizs.iter().map(|r| {
            ResourceAttribute::new(ResourceType::RBusiness, Action::Create)
                .with_business(r.business_id)
                .with_instance(r.rbiz_id)
                .with_name(r.name.as_str())
        });
        businesses.chain(rbizs).collect()
    }
}

pub struct Bootstrap<T: PolicyTransport> {
    transport: Arc<T>,
    lifecycle: ResourceLifecycleManager<T>,
    enabled: bool,
    system_id: String,
}

impl<T: PolicyTransport> Bootstrap<T> {
    pub fn new(config: &AuthConfig, transport: Arc<T>) -> Self {
        Bootstrap {
            lifecycle: ResourceLifecycleManager::new(config, Arc::clone(&transport)),
            transport,
            enabled: config.enabled,
            system_id: config.system_id.clone(),
        }
    }

    /// Register the system, declare the catalogues, then register every
    /// business and rbiz in `init`. Stops at the first failure that is not
    /// a duplicate.
    pub async fn init(&self, ctx: &RequestContext, init: &InitConfig) -> Result<(), AuthError> {
        if !self.enabled {
            return Err(AuthError::Configuration(
                "authorization is disabled, nothing to initialize".to_string(),
            ));
        }

        let system = catalogue::system_info(&self.system_id);
        match self.transport.register_system(ctx, &system).await {
            Ok(()) => info!(event = "Init", phase = "SystemRegistered", system = self.system_id.as_str()),
            Err(AuthError::Duplicated) => {
                warn!(event = "Init", phase = "SystemExists", system = self.system_id.as_str())
            }
            Err(err) => return Err(err),
        }

        for kind in [ScopeKind::Global, ScopeKind::Business] {
            let types = catalogue::resource_types_for(kind);
            self.transport
                .upsert_resource_types(ctx, kind, types)
                .await?;
            info!(
                event = "Init",
                phase = "CatalogueUpserted",
                scope = %kind,
                resource_types = types.len()
            );
        }

        let resources = init.resources();
        self.lifecycle.register(ctx, &resources).await?;
        info!(
            event = "Init",
            phase = "Done",
            businesses = init.businesses.len(),
            rbizs = init.rbizs.len(),
            registered = resources.len()
        );
        Ok(())
    }
}
