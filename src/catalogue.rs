//! The resource-type catalogue declared to the policy engine, and the
//! capability lookups derived from it.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::AuthError;
use crate::types::{
    ActionSpec, PolicyActionId, PolicyResourceType, ResourceTypeSpec, SCOPE_TYPE_BUSINESS,
    SCOPE_TYPE_SYSTEM, ScopeKind, System,
};

pub const SYSTEM_NAME: &str = "Configuration Platform";
const SYSTEM_DESC: &str = "configuration management database";
const SYSTEM_MANAGER: &str = "admin";

const fn functional(action_id: PolicyActionId, action_name: &'static str) -> ActionSpec {
    ActionSpec {
        action_id,
        action_name,
        is_functional: true,
        is_related_resource: false,
    }
}

const fn related(action_id: PolicyActionId, action_name: &'static str) -> ActionSpec {
    ActionSpec {
        action_id,
        action_name,
        is_functional: false,
        is_related_resource: true,
    }
}

const fn spec(
    resource_type: PolicyResourceType,
    resource_type_name: &'static str,
    actions: &'static [ActionSpec],
) -> ResourceTypeSpec {
    ResourceTypeSpec {
        resource_type,
        resource_type_name,
        parent_resource_type: None,
        share: true,
        actions,
    }
}

// Create is functional, everything else addresses an instance.
const INSTANCE_ACTIONS: &[ActionSpec] = &[
    functional(PolicyActionId::Create, "Create"),
    related(PolicyActionId::Edit, "Edit"),
    related(PolicyActionId::Delete, "Delete"),
    related(PolicyActionId::Get, "Query"),
];

const BUSINESS_ACTIONS: &[ActionSpec] = &[
    functional(PolicyActionId::Create, "Create"),
    related(PolicyActionId::Edit, "Edit"),
    related(PolicyActionId::Archive, "Archive"),
    related(PolicyActionId::Get, "Query"),
];

const FUNCTIONAL_ACTIONS: &[ActionSpec] = &[
    functional(PolicyActionId::Create, "Create"),
    functional(PolicyActionId::Edit, "Edit"),
    functional(PolicyActionId::Delete, "Delete"),
    functional(PolicyActionId::Get, "Query"),
];

const QUERY_ONLY: &[ActionSpec] = &[functional(PolicyActionId::Get, "Query")];

const SYSTEM_BASE_ACTIONS: &[ActionSpec] = &[
    functional(PolicyActionId::Get, "Query"),
    functional(
        PolicyActionId::ModelTopologyOperation,
        "Edit Business Hierarchy",
    ),
];

const STATISTIC_ACTIONS: &[ActionSpec] = &[
    functional(PolicyActionId::Get, "Query"),
    functional(PolicyActionId::Edit, "Edit"),
];

/// Resource types declared in the global scope.
pub static GLOBAL_RESOURCE_TYPES: &[ResourceTypeSpec] = &[
    spec(PolicyResourceType::SysSystemBase, "System Base", SYSTEM_BASE_ACTIONS),
    spec(PolicyResourceType::SysBusinessInstance, "Business", BUSINESS_ACTIONS),
    spec(PolicyResourceType::SysHostInstance, "Host", INSTANCE_ACTIONS),
    spec(PolicyResourceType::SysEventPushing, "Event Pushing", INSTANCE_ACTIONS),
    spec(PolicyResourceType::SysModelGroup, "Model Group", INSTANCE_ACTIONS),
    spec(PolicyResourceType::SysModel, "Model", INSTANCE_ACTIONS),
    spec(PolicyResourceType::SysInstance, "Instance", INSTANCE_ACTIONS),
    spec(PolicyResourceType::SysAssociationType, "Association Type", INSTANCE_ACTIONS),
    spec(PolicyResourceType::SysAuditLog, "Audit Log", QUERY_ONLY),
    spec(PolicyResourceType::SysOperationStatistic, "Operation Statistic", STATISTIC_ACTIONS),
];

/// Resource types declared in every business scope.
pub static BUSINESS_RESOURCE_TYPES: &[ResourceTypeSpec] = &[
    spec(PolicyResourceType::BizRBizInstance, "Real Business", INSTANCE_ACTIONS),
    spec(PolicyResourceType::BizHostInstance, "Business Host", INSTANCE_ACTIONS),
    spec(PolicyResourceType::BizCustomQuery, "Dynamic Grouping", INSTANCE_ACTIONS),
    spec(PolicyResourceType::BizProcessInstance, "Process", FUNCTIONAL_ACTIONS),
    spec(PolicyResourceType::BizTopology, "Business Topology", INSTANCE_ACTIONS),
    spec(PolicyResourceType::BizModelGroup, "Model Group", INSTANCE_ACTIONS),
    spec(PolicyResourceType::BizModel, "Model", INSTANCE_ACTIONS),
    spec(PolicyResourceType::BizInstance, "Instance", INSTANCE_ACTIONS),
    spec(PolicyResourceType::BizAuditLog, "Audit Log", QUERY_ONLY),
    spec(PolicyResourceType::BizProcessServiceTemplate, "Service Template", INSTANCE_ACTIONS),
    spec(PolicyResourceType::BizProcessServiceCategory, "Service Category", INSTANCE_ACTIONS),
    spec(PolicyResourceType::BizProcessServiceInstance, "Service Instance", FUNCTIONAL_ACTIONS),
    spec(PolicyResourceType::BizSetTemplate, "Set Template", INSTANCE_ACTIONS),
];

static INDEX: Lazy<HashMap<PolicyResourceType, &'static ResourceTypeSpec>> = Lazy::new(|| {
    GLOBAL_RESOURCE_TYPES
        .iter()
        .chain(BUSINESS_RESOURCE_TYPES.iter())
        .map(|spec| (spec.resource_type, spec))
        .collect()
});

pub fn lookup(resource_type: PolicyResourceType) -> Option<&'static ResourceTypeSpec> {
    INDEX.get(&resource_type).copied()
}

/// Whether verifying any action on `resource_type` takes an instance id.
pub fn is_related_to_resource_id(resource_type: PolicyResourceType) -> Result<bool, AuthError> {
    let spec = lookup(resource_type)
        .ok_or_else(|| AuthError::MissingCapability(resource_type.to_string()))?;
    Ok(spec.actions.iter().any(|a| a.is_related_resource))
}

/// The catalogue declared for one scope kind.
pub fn resource_types_for(kind: ScopeKind) -> &'static [ResourceTypeSpec] {
    match kind {
        ScopeKind::Global => GLOBAL_RESOURCE_TYPES,
        ScopeKind::Business => BUSINESS_RESOURCE_TYPES,
    }
}

/// The system record registered at init.
pub fn system_info(system_id: &str) -> System {
    System {
        system_id: system_id.to_string(),
        system_name: SYSTEM_NAME.to_string(),
        desc: SYSTEM_DESC.to_string(),
        query_interface: String::new(),
        related_scope_types: [SCOPE_TYPE_BUSINESS, SCOPE_TYPE_SYSTEM].join(";"),
        managers: SYSTEM_MANAGER.to_string(),
        updater: SYSTEM_MANAGER.to_string(),
        creator: SYSTEM_MANAGER.to_string(),
    }
}
