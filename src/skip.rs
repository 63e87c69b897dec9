//! Resources granted implicitly, without asking the policy engine.

use crate::types::{ResourceAttribute, ResourceType};

/// When a listed resource type is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipWhen {
    Always,
    /// Only for find / findMany.
    ReadOnly,
}

static SKIP_TABLE: &[(ResourceType, SkipWhen)] = &[
    (ResourceType::ResourceSync, SkipWhen::Always),
    (ResourceType::UserCustom, SkipWhen::Always),
    (ResourceType::NetDataCollector, SkipWhen::Always),
    (ResourceType::HostFavorite, SkipWhen::Always),
    (ResourceType::InstallBk, SkipWhen::Always),
    (ResourceType::ModelInstanceTopology, SkipWhen::Always),
    (ResourceType::MainlineInstanceTopology, SkipWhen::Always),
    (ResourceType::ModelClassification, SkipWhen::ReadOnly),
    (ResourceType::AssociationType, SkipWhen::ReadOnly),
    (ResourceType::Model, SkipWhen::ReadOnly),
    (ResourceType::ModelAttribute, SkipWhen::ReadOnly),
    (ResourceType::ModelUnique, SkipWhen::ReadOnly),
    (ResourceType::ModelAttributeGroup, SkipWhen::ReadOnly),
    (ResourceType::ModelAssociation, SkipWhen::ReadOnly),
    (ResourceType::ModelInstanceAssociation, SkipWhen::ReadOnly),
    (ResourceType::HostInstance, SkipWhen::ReadOnly),
    (ResourceType::ProcessServiceInstance, SkipWhen::ReadOnly),
    (ResourceType::ProcessServiceTemplate, SkipWhen::ReadOnly),
    (ResourceType::SetTemplate, SkipWhen::ReadOnly),
    (ResourceType::ProcessServiceCategory, SkipWhen::ReadOnly),
    (ResourceType::ProcessTemplate, SkipWhen::ReadOnly),
    (ResourceType::MainlineInstance, SkipWhen::ReadOnly),
    (ResourceType::Process, SkipWhen::ReadOnly),
    (ResourceType::ModelSet, SkipWhen::ReadOnly),
    (ResourceType::ModelModule, SkipWhen::ReadOnly),
    (ResourceType::MainlineModelTopology, SkipWhen::ReadOnly),
    (ResourceType::OperationStatistic, SkipWhen::ReadOnly),
];

/// The skip rule for `resource_type`, if any.
pub fn skip_rule(resource_type: ResourceType) -> Option<SkipWhen> {
    SKIP_TABLE
        .iter()
        .find(|(ty, _)| *ty == resource_type)
        .map(|(_, when)| *when)
}

/// Whether `attribute` is allowed without a policy engine call.
pub fn should_skip(attribute: &ResourceAttribute) -> bool {
    match skip_rule(attribute.resource_type()) {
        Some(SkipWhen::Always) => true,
        Some(SkipWhen::ReadOnly) => attribute.action().is_read(),
        None => false,
    }
}
