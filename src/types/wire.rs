//! JSON payloads exchanged with the policy engine.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Deserializer, Serialize};

use super::policy::{PolicyActionId, PolicyResourceType};
use super::scope::ScopeInfo;

/// Principal type for human and system users alike.
pub const PRINCIPAL_TYPE_USER: &str = "user";
/// Creator id used when no user is attached to the request.
pub const SYSTEM_CREATOR: &str = "system";

/// One segment of a hierarchical resource path, e.g. `sys_model/7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RscTypeAndId {
    pub resource_type: PolicyResourceType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
}

impl RscTypeAndId {
    pub fn new(resource_type: PolicyResourceType, resource_id: impl Into<String>) -> Self {
        RscTypeAndId {
            resource_type,
            resource_id: resource_id.into(),
        }
    }
}

impl Display for RscTypeAndId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.resource_type, self.resource_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    #[serde(rename = "principal_type")]
    pub kind: String,
    #[serde(rename = "principal_id")]
    pub id: String,
}

impl Principal {
    pub fn user(name: impl Into<String>) -> Self {
        Principal {
            kind: PRINCIPAL_TYPE_USER.to_string(),
            id: name.into(),
        }
    }
}

/// One entry of a verify batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceAction {
    pub resource_type: PolicyResourceType,
    pub action_id: PolicyActionId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_id: Vec<RscTypeAndId>,
}

impl Display for ResourceAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.resource_type, self.action_id)
    }
}

/// The unit of dispatch for verification: one principal, one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthBatch {
    #[serde(flatten)]
    pub principal: Principal,
    #[serde(flatten)]
    pub scope: ScopeInfo,
    #[serde(rename = "resources_actions")]
    pub resource_actions: Vec<ResourceAction>,
}

impl AuthBatch {
    pub fn new(principal: Principal, scope: ScopeInfo) -> Self {
        AuthBatch {
            principal,
            scope,
            resource_actions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.resource_actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_actions.is_empty()
    }
}

/// Verification outcome for one `AuthBatch` entry, echoing its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatus {
    pub action_id: PolicyActionId,
    pub resource_type: PolicyResourceType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_id: Vec<RscTypeAndId>,
    pub is_pass: bool,
}

impl BatchStatus {
    /// A status echoing `entry`.
    pub fn for_entry(entry: &ResourceAction, is_pass: bool) -> Self {
        BatchStatus {
            action_id: entry.action_id,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id.clone(),
            is_pass,
        }
    }

    pub fn matches(&self, entry: &ResourceAction) -> bool {
        self.resource_type == entry.resource_type && self.action_id == entry.action_id
    }
}

/// A resource instance as registered with the policy engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntity {
    pub resource_type: PolicyResourceType,
    #[serde(flatten)]
    pub scope: ScopeInfo,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_id: Vec<RscTypeAndId>,
}

impl Display for ResourceEntity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let path: Vec<String> = self.resource_id.iter().map(ToString::to_string).collect();
        write!(
            f,
            "{}[{}] in {} ({})",
            self.resource_type,
            path.join(","),
            self.scope,
            self.resource_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInfo {
    pub creator_type: String,
    pub creator_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeregisterInfo {
    pub resources: Vec<ResourceEntity>,
}

/// The system record registered once with the policy engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system_id: String,
    pub system_name: String,
    pub desc: String,
    pub query_interface: String,
    pub related_scope_types: String,
    pub managers: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub updater: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub creator: String,
}

/// An action declared for a resource type in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionSpec {
    pub action_id: PolicyActionId,
    pub action_name: &'static str,
    /// Functional actions guard a capability, not an instance.
    pub is_functional: bool,
    /// Whether verifying this action needs a resource instance id.
    pub is_related_resource: bool,
}

/// A resource type as declared to the policy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceTypeSpec {
    pub resource_type: PolicyResourceType,
    pub resource_type_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_resource_type: Option<PolicyResourceType>,
    #[serde(rename = "is_share")]
    pub share: bool,
    pub actions: &'static [ActionSpec],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAction {
    pub action_id: PolicyActionId,
    pub resource_type: PolicyResourceType,
}

/// Query body for the authorized-resource search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAuthorizedResources {
    #[serde(flatten)]
    pub principal: Principal,
    #[serde(flatten)]
    pub scope: ScopeInfo,
    #[serde(rename = "resource_types_actions")]
    pub type_actions: Vec<TypeAction>,
    #[serde(rename = "resource_data_type")]
    pub data_type: String,
    #[serde(rename = "is_exact_resource")]
    pub exact: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedResource {
    pub action_id: PolicyActionId,
    pub resource_type: PolicyResourceType,
    #[serde(default)]
    pub resource_ids: Vec<Vec<RscTypeAndId>>,
}

/// A leaf resource a user is authorized for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IamResource {
    pub resource_type: PolicyResourceType,
    pub resource_id: String,
}

/// The envelope wrapping every policy engine response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub status: i64,
    #[serde(default, deserialize_with = "code_as_string")]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub request_id: String,
    pub data: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub const STATUS_SUCCESS: i64 = 0;

    pub fn is_success(&self) -> bool {
        self.status == Self::STATUS_SUCCESS
    }
}

/// Some policy engine releases send `code` as a number.
fn code_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
