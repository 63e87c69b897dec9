//! Registration of CMDB resources as policy engine resource instances.
//!
//! Only resources the policy engine can address by id are registered; a type
//! that is authorized purely at the type level has nothing to register.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::adaptor::convert_resource_type;
use crate::catalogue;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::resource_id::generate_resource_id;
use crate::transport::{PolicyTransport, RequestContext};
use crate::types::{
    DeregisterInfo, PRINCIPAL_TYPE_USER, RegisterInfo, ResourceAttribute, ResourceEntity,
    ResourceType, SYSTEM_CREATOR, ScopeInfo,
};

/// Entities sent per register call.
pub const REGISTER_PAGE_SIZE: usize = 500;

/// Whether instances of `resource_type` are registered with the policy engine.
pub fn needs_registration(resource_type: ResourceType) -> bool {
    matches!(
        resource_type,
        ResourceType::Business
            | ResourceType::RBusiness
            | ResourceType::Model
            | ResourceType::ModelClassification
            | ResourceType::AssociationType
            | ResourceType::ModelInstance
            | ResourceType::HostInstance
            | ResourceType::ModelModule
            | ResourceType::ModelSet
            | ResourceType::Plat
            | ResourceType::EventPushing
            | ResourceType::DynamicGrouping
            | ResourceType::ProcessServiceTemplate
            | ResourceType::ProcessServiceCategory
            | ResourceType::ProcessTemplate
            | ResourceType::SetTemplate
    )
}

pub struct ResourceLifecycleManager<T: PolicyTransport> {
    transport: Arc<T>,
    enabled: bool,
    system_id: String,
}

impl<T: PolicyTransport> ResourceLifecycleManager<T> {
    pub fn new(config: &AuthConfig, transport: Arc<T>) -> Self {
        ResourceLifecycleManager {
            transport,
            enabled: config.enabled,
            system_id: config.system_id.clone(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Register `resources` in pages of [`REGISTER_PAGE_SIZE`].
    ///
    /// Pages are sent one after another. A duplicate page is fine. Other
    /// failures do not stop later pages; the first one is returned once all
    /// pages have been attempted.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        resources: &[ResourceAttribute],
    ) -> Result<(), AuthError> {
        if !self.enabled {
            return Ok(());
        }

        let info = self.register_info(ctx, resources)?;
        if info.resources.is_empty() {
            debug!(
                event = "RegisterResources",
                phase = "Empty",
                requested = resources.len()
            );
            return Ok(());
        }

        let pages = info.resources.len().div_ceil(REGISTER_PAGE_SIZE);
        let mut first_error = None;
        for (page, chunk) in info.resources.chunks(REGISTER_PAGE_SIZE).enumerate() {
            let page_info = RegisterInfo {
                creator_type: info.creator_type.clone(),
                creator_id: info.creator_id.clone(),
                resources: chunk.to_vec(),
            };
            match self.transport.register_resources(ctx, &page_info).await {
                Ok(()) => info!(
                    event = "RegisterResources",
                    phase = "Page",
                    page = page + 1,
                    pages,
                    entities = chunk.len()
                ),
                Err(AuthError::Duplicated) => warn!(
                    event = "RegisterResources",
                    phase = "Duplicated",
                    page = page + 1,
                    pages,
                    entities = chunk.len()
                ),
                Err(err) => {
                    error!(
                        event = "RegisterResources",
                        phase = "PageFailed",
                        page = page + 1,
                        pages,
                        error = %err
                    );
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The payload `register` would send, before paging. Makes no call.
    pub fn dry_run_register(
        &self,
        ctx: &RequestContext,
        resources: &[ResourceAttribute],
    ) -> Result<RegisterInfo, AuthError> {
        if !self.enabled {
            return Ok(RegisterInfo {
                creator_type: PRINCIPAL_TYPE_USER.to_string(),
                creator_id: creator_id(ctx),
                resources: Vec::new(),
            });
        }
        self.register_info(ctx, resources)
    }

    /// Deregister `resources` in a single call. Resources the engine does
    /// not know are not an error.
    pub async fn deregister(
        &self,
        ctx: &RequestContext,
        resources: &[ResourceAttribute],
    ) -> Result<(), AuthError> {
        if !self.enabled {
            return Ok(());
        }
        let entities = self.entities(resources)?;
        self.send_deregister(ctx, entities).await
    }

    /// Deregister entities that already carry policy engine ids.
    pub async fn raw_deregister(
        &self,
        ctx: &RequestContext,
        entities: Vec<ResourceEntity>,
    ) -> Result<(), AuthError> {
        if !self.enabled {
            return Ok(());
        }
        self.send_deregister(ctx, entities).await
    }

    async fn send_deregister(
        &self,
        ctx: &RequestContext,
        entities: Vec<ResourceEntity>,
    ) -> Result<(), AuthError> {
        if entities.is_empty() {
            return Ok(());
        }

        let count = entities.len();
        let info = DeregisterInfo {
            resources: entities,
        };
        match self.transport.deregister_resources(ctx, &info).await {
            Ok(()) => {
                info!(event = "DeregisterResources", phase = "Done", entities = count);
                Ok(())
            }
            Err(AuthError::NotFound) => {
                warn!(event = "DeregisterResources", phase = "NotFound", entities = count);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn register_info(
        &self,
        ctx: &RequestContext,
        resources: &[ResourceAttribute],
    ) -> Result<RegisterInfo, AuthError> {
        Ok(RegisterInfo {
            creator_type: PRINCIPAL_TYPE_USER.to_string(),
            creator_id: creator_id(ctx),
            resources: self.entities(resources)?,
        })
    }

    // Map every registrable resource, then keep the id-addressable ones.
    fn entities(&self, resources: &[ResourceAttribute]) -> Result<Vec<ResourceEntity>, AuthError> {
        let mut entities = Vec::with_capacity(resources.len());
        for resource in resources
            .iter()
            .filter(|r| needs_registration(r.resource_type()))
        {
            let policy_type = convert_resource_type(resource.resource_type(), resource.business_id)?;
            entities.push(ResourceEntity {
                resource_type: policy_type,
                scope: ScopeInfo::resolve(resource, policy_type, &self.system_id)?,
                resource_name: resource.basic.name.clone(),
                resource_id: generate_resource_id(policy_type, resource)?,
            });
        }

        let mut kept = Vec::with_capacity(entities.len());
        for entity in entities {
            if catalogue::is_related_to_resource_id(entity.resource_type)? {
                kept.push(entity);
            }
        }
        Ok(kept)
    }
}

fn creator_id(ctx: &RequestContext) -> String {
    if ctx.user.is_empty() {
        SYSTEM_CREATOR.to_string()
    } else {
        ctx.user.clone()
    }
}
