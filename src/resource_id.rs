//! Hierarchical resource id derivation.
//!
//! Every domain resource maps to an ordered root-to-leaf chain of
//! [`RscTypeAndId`] segments. An empty chain means "authorize at the type
//! level", which is what create requests and type-only resources use.

use crate::adaptor::convert_resource_type;
use crate::error::AuthError;
use crate::types::{PolicyResourceType, ResourceAttribute, ResourceType, RscTypeAndId};

/// Derive the id chain of `attribute`, whose policy type is `policy_type`.
pub fn generate_resource_id(
    policy_type: PolicyResourceType,
    attribute: &ResourceAttribute,
) -> Result<Vec<RscTypeAndId>, AuthError> {
    let instance_id = attribute.basic.instance_id;

    match attribute.resource_type() {
        ResourceType::Business
        | ResourceType::RBusiness
        | ResourceType::Model
        | ResourceType::AssociationType
        | ResourceType::ModelClassification
        | ResourceType::EventPushing
        | ResourceType::ProcessTemplate
        | ResourceType::ProcessServiceCategory
        | ResourceType::ProcessServiceTemplate
        | ResourceType::SetTemplate
        | ResourceType::OperationStatistic => Ok(flat_id(policy_type, instance_id)),

        ResourceType::ModelModule => Ok(composite_id(policy_type, "module", instance_id)),
        ResourceType::ModelSet => Ok(composite_id(policy_type, "set", instance_id)),

        ResourceType::Plat => {
            if instance_id == 0 {
                return Ok(Vec::new());
            }
            let owner = attribute.layers.first().ok_or(AuthError::NotEnoughLayer)?;
            Ok(vec![
                RscTypeAndId::new(model_type(attribute), owner.instance_id.to_string()),
                RscTypeAndId::new(policy_type, format!("plat:{instance_id}")),
            ])
        }

        ResourceType::ModelAttribute
        | ResourceType::ModelAttributeGroup
        | ResourceType::ModelUnique => {
            let owner = attribute.layers.last().ok_or(AuthError::NotEnoughLayer)?;
            Ok(vec![RscTypeAndId::new(
                model_type(attribute),
                owner.instance_id.to_string(),
            )])
        }

        ResourceType::ModelInstance | ResourceType::MainlineInstance => {
            if instance_id <= 0 {
                return Ok(Vec::new());
            }
            let model = attribute.layers.first().ok_or(AuthError::NotEnoughLayer)?;
            Ok(vec![
                RscTypeAndId::new(model_type(attribute), model.instance_id.to_string()),
                RscTypeAndId::new(policy_type, instance_id.to_string()),
            ])
        }

        ResourceType::HostInstance => host_id(policy_type, attribute),

        ResourceType::DynamicGrouping | ResourceType::AuditLog => {
            let ex = &attribute.basic.instance_id_ex;
            if !ex.is_empty() {
                return Ok(vec![RscTypeAndId::new(policy_type, ex.clone())]);
            }
            Ok(flat_id(policy_type, instance_id))
        }

        ResourceType::MainlineModel
        | ResourceType::MainlineModelTopology
        | ResourceType::MainlineInstanceTopology
        | ResourceType::ModelTopology
        | ResourceType::ModelAssociation
        | ResourceType::ModelInstanceAssociation
        | ResourceType::ModelInstanceTopology
        | ResourceType::SystemBase
        | ResourceType::UserCustom
        | ResourceType::HostFavorite
        | ResourceType::NetDataCollector => Ok(Vec::new()),

        // Process types only carry functional actions, so they are verified
        // at the type level within their business.
        ResourceType::Process | ResourceType::ProcessServiceInstance => Ok(Vec::new()),

        ResourceType::ResourceSync | ResourceType::InstallBk => Err(
            AuthError::UnsupportedResourceType(attribute.resource_type().to_string()),
        ),
    }
}

fn flat_id(policy_type: PolicyResourceType, instance_id: i64) -> Vec<RscTypeAndId> {
    if instance_id <= 0 {
        return Vec::new();
    }
    vec![RscTypeAndId::new(policy_type, instance_id.to_string())]
}

fn composite_id(policy_type: PolicyResourceType, prefix: &str, instance_id: i64) -> Vec<RscTypeAndId> {
    if instance_id == 0 {
        return Vec::new();
    }
    vec![RscTypeAndId::new(
        policy_type,
        format!("{prefix}:{instance_id}"),
    )]
}

/// The model type owning model-scoped fields and instances.
fn model_type(attribute: &ResourceAttribute) -> PolicyResourceType {
    if attribute.business_id > 0 {
        PolicyResourceType::BizModel
    } else {
        PolicyResourceType::SysModel
    }
}

// One segment per ancestor layer, then the host itself.
fn host_id(
    policy_type: PolicyResourceType,
    attribute: &ResourceAttribute,
) -> Result<Vec<RscTypeAndId>, AuthError> {
    let instance_id = attribute.basic.instance_id;
    if instance_id == 0 {
        return Ok(Vec::new());
    }

    let mut chain = Vec::with_capacity(attribute.layers.len() + 1);
    for layer in &attribute.layers {
        let layer_type = convert_resource_type(layer.resource_type, attribute.business_id)
            .map_err(|e| AuthError::LayerConversion {
                layer: format!("{}:{}", layer.resource_type, layer.instance_id),
                reason: e.to_string(),
            })?;
        chain.push(RscTypeAndId::new(layer_type, layer.instance_id.to_string()));
    }
    chain.push(RscTypeAndId::new(policy_type, instance_id.to_string()));
    Ok(chain)
}
