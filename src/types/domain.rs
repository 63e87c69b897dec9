//! Resource types and actions as the configuration-management domain names them.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr, VariantArray};
use utoipa::ToSchema;

/// A kind of resource in the configuration-management model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    IntoStaticStr,
    VariantArray,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ResourceType {
    Business,
    /// Legacy "real business" records, owned by a business.
    #[serde(rename = "rbusiness")]
    #[strum(serialize = "rbusiness")]
    RBusiness,
    Model,
    ModelModule,
    ModelSet,
    MainlineModel,
    MainlineModelTopology,
    MainlineInstanceTopology,
    MainlineInstance,
    AssociationType,
    ModelAssociation,
    ModelInstanceAssociation,
    ModelInstance,
    ModelInstanceTopology,
    ModelTopology,
    ModelClassification,
    ModelAttributeGroup,
    ModelAttribute,
    ModelUnique,
    UserCustom,
    HostFavorite,
    NetDataCollector,
    EventPushing,
    HostInstance,
    DynamicGrouping,
    AuditLog,
    SystemBase,
    Plat,
    Process,
    ProcessServiceInstance,
    ProcessTemplate,
    ProcessServiceCategory,
    ProcessServiceTemplate,
    SetTemplate,
    OperationStatistic,
    ResourceSync,
    #[serde(rename = "installBK")]
    #[strum(serialize = "installBK")]
    InstallBk,
}

impl ResourceType {
    /// Types whose authorization scope is always global, whatever business
    /// id the caller attached.
    pub fn forces_global_scope(self) -> bool {
        matches!(
            self,
            ResourceType::MainlineModel
                | ResourceType::MainlineModelTopology
                | ResourceType::ModelTopology
        )
    }
}

/// An operation on a domain resource.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    IntoStaticStr,
    VariantArray,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Action {
    Create,
    CreateMany,
    Find,
    FindMany,
    Update,
    UpdateMany,
    Delete,
    DeleteMany,
    Archive,
    Execute,
    /// Set upstream to mean "do not check this resource".
    SkipAction,
    MoveResPoolHostToBizIdleModule,
    MoveHostToBizFaultModule,
    MoveHostToBizIdleModule,
    MoveHostFromModuleToResPool,
    MoveHostToAnotherBizModule,
    CleanHostInSetOrModule,
    TransferHost,
    MoveBizHostToModule,
    AddHostToResourcePool,
    MoveHostsToBusinessOrModule,
    ModelTopologyOperation,
}

impl Action {
    pub fn is_read(self) -> bool {
        matches!(self, Action::Find | Action::FindMany)
    }

    pub fn is_create(self) -> bool {
        matches!(self, Action::Create | Action::CreateMany)
    }

    pub fn is_update(self) -> bool {
        matches!(self, Action::Update | Action::UpdateMany)
    }

    pub fn is_delete(self) -> bool {
        matches!(self, Action::Delete | Action::DeleteMany)
    }
}
