//! Data model types for the domain side, the policy engine side, and the
//! wire payloads between them.
//!
//! Canonical string forms:
//! - Domain resource types and actions: camelCase, e.g. `hostInstance`, `findMany`
//! - Policy resource types: `sys_*` for the global catalogue, `proj_*` for businesses
//! - Scopes: `system/<system id>` or `proj/<business id>`

mod attribute;
mod decision;
mod domain;
mod policy;
mod scope;
mod wire;

pub use attribute::{AuthAttribute, Basic, Layer, ResourceAttribute, UserInfo};
pub use decision::{Decision, REASON_AUTH_DISABLED, REASON_IMPLICIT_ALLOW};
pub use domain::{Action, ResourceType};
pub use policy::{PolicyActionId, PolicyResourceType};
pub use scope::{SCOPE_TYPE_BUSINESS, SCOPE_TYPE_SYSTEM, ScopeInfo, ScopeKind};
pub use wire::{
    ActionSpec, AuthBatch, AuthorizedResource, BatchStatus, DeregisterInfo, IamResource,
    ListAuthorizedResources, PRINCIPAL_TYPE_USER, Principal, RegisterInfo, ResourceAction,
    ResourceEntity, ResourceTypeSpec, ResponseEnvelope, RscTypeAndId, SYSTEM_CREATOR, System,
    TypeAction,
};
