//! Translation from domain resource types and actions to the policy engine's
//! vocabulary.

use crate::error::AuthError;
use crate::types::{Action, PolicyActionId, PolicyResourceType, ResourceAttribute, ResourceType};

/// Map a domain resource type to its policy engine resource type.
///
/// Types that exist in both catalogues resolve to the business variant when
/// `business_id > 0` and to the system variant otherwise.
pub fn convert_resource_type(
    resource_type: ResourceType,
    business_id: i64,
) -> Result<PolicyResourceType, AuthError> {
    let scoped = business_id > 0;
    let dual = |biz: PolicyResourceType, sys: PolicyResourceType| if scoped { biz } else { sys };

    let policy_type = match resource_type {
        ResourceType::Business => PolicyResourceType::SysBusinessInstance,
        ResourceType::RBusiness => PolicyResourceType::BizRBizInstance,
        ResourceType::Model
        | ResourceType::ModelAttribute
        | ResourceType::ModelAttributeGroup
        | ResourceType::ModelUnique
        | ResourceType::ModelAssociation => {
            dual(PolicyResourceType::BizModel, PolicyResourceType::SysModel)
        }
        ResourceType::ModelClassification => {
            dual(PolicyResourceType::BizModelGroup, PolicyResourceType::SysModelGroup)
        }
        ResourceType::ModelInstance | ResourceType::ModelInstanceAssociation => {
            dual(PolicyResourceType::BizInstance, PolicyResourceType::SysInstance)
        }
        ResourceType::ModelModule
        | ResourceType::ModelSet
        | ResourceType::MainlineInstance
        | ResourceType::MainlineInstanceTopology
        | ResourceType::ModelInstanceTopology => PolicyResourceType::BizTopology,
        ResourceType::MainlineModel
        | ResourceType::ModelTopology
        | ResourceType::MainlineModelTopology
        | ResourceType::SystemBase => PolicyResourceType::SysSystemBase,
        ResourceType::AssociationType => PolicyResourceType::SysAssociationType,
        ResourceType::Plat => PolicyResourceType::SysInstance,
        ResourceType::HostInstance => dual(
            PolicyResourceType::BizHostInstance,
            PolicyResourceType::SysHostInstance,
        ),
        ResourceType::AuditLog => {
            dual(PolicyResourceType::BizAuditLog, PolicyResourceType::SysAuditLog)
        }
        ResourceType::Process => PolicyResourceType::BizProcessInstance,
        ResourceType::EventPushing => PolicyResourceType::SysEventPushing,
        ResourceType::DynamicGrouping => PolicyResourceType::BizCustomQuery,
        ResourceType::ProcessServiceTemplate | ResourceType::ProcessTemplate => {
            PolicyResourceType::BizProcessServiceTemplate
        }
        ResourceType::ProcessServiceCategory => PolicyResourceType::BizProcessServiceCategory,
        ResourceType::ProcessServiceInstance => PolicyResourceType::BizProcessServiceInstance,
        ResourceType::SetTemplate => PolicyResourceType::BizSetTemplate,
        ResourceType::OperationStatistic => PolicyResourceType::SysOperationStatistic,
        ResourceType::HostFavorite
        | ResourceType::UserCustom
        | ResourceType::NetDataCollector
        | ResourceType::ResourceSync
        | ResourceType::InstallBk => {
            return Err(AuthError::UnsupportedResourceType(
                resource_type.to_string(),
            ));
        }
    };
    Ok(policy_type)
}

/// Map a resource attribute's action to a policy engine action id.
///
/// Special cases are tried before the generic create/find/update/delete
/// mapping; anything left over is an error.
pub fn adapt_action(attribute: &ResourceAttribute) -> Result<PolicyActionId, AuthError> {
    let resource_type = attribute.resource_type();
    let action = attribute.action();

    match resource_type {
        ResourceType::ModelAttribute
        | ResourceType::ModelAttributeGroup
        | ResourceType::ModelUnique
            if action.is_create() || action.is_update() || action.is_delete() =>
        {
            return Ok(PolicyActionId::Edit);
        }
        ResourceType::Business if action == Action::Archive => {
            return Ok(PolicyActionId::Archive);
        }
        ResourceType::DynamicGrouping if action == Action::Execute => {
            return Ok(PolicyActionId::Get);
        }
        ResourceType::MainlineModel if action.is_create() || action.is_delete() => {
            return Ok(PolicyActionId::ModelTopologyOperation);
        }
        _ => {}
    }

    let action_id = match action {
        Action::ModelTopologyOperation => PolicyActionId::ModelTopologyOperation,
        Action::Create | Action::CreateMany => PolicyActionId::Create,
        Action::Find | Action::FindMany => PolicyActionId::Get,
        Action::Update | Action::UpdateMany => PolicyActionId::Edit,
        Action::Delete | Action::DeleteMany => PolicyActionId::Delete,
        Action::MoveResPoolHostToBizIdleModule
        | Action::MoveHostToBizFaultModule
        | Action::MoveHostToBizIdleModule
        | Action::MoveHostToAnotherBizModule
        | Action::CleanHostInSetOrModule
        | Action::TransferHost
        | Action::MoveBizHostToModule
        | Action::MoveHostsToBusinessOrModule => PolicyActionId::Edit,
        Action::MoveHostFromModuleToResPool => PolicyActionId::Delete,
        Action::AddHostToResourcePool => PolicyActionId::Create,
        Action::Archive | Action::Execute | Action::SkipAction => {
            return Err(AuthError::UnsupportedAction(action.to_string()));
        }
    };
    Ok(action_id)
}
