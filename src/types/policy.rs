//! The policy engine's own vocabulary: resource type codes and action ids.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, IntoStaticStr, VariantArray};

use crate::traits::WireVocabulary;

use super::scope::ScopeKind;

/// Resource type code understood by the policy engine.
///
/// `sys_*` types live in the global catalogue, `proj_*` types in the
/// per-business catalogue.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    IntoStaticStr,
    VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PolicyResourceType {
    SysSystemBase,
    #[serde(rename = "sys_project_instance")]
    #[strum(serialize = "sys_project_instance")]
    SysBusinessInstance,
    SysHostInstance,
    SysEventPushing,
    SysModelGroup,
    SysModel,
    SysInstance,
    SysAssociationType,
    SysAuditLog,
    SysOperationStatistic,
    #[serde(rename = "proj_rbiz_instance")]
    #[strum(serialize = "proj_rbiz_instance")]
    BizRBizInstance,
    #[serde(rename = "proj_host_instance")]
    #[strum(serialize = "proj_host_instance")]
    BizHostInstance,
    #[serde(rename = "proj_custom_query")]
    #[strum(serialize = "proj_custom_query")]
    BizCustomQuery,
    #[serde(rename = "proj_process_instance")]
    #[strum(serialize = "proj_process_instance")]
    BizProcessInstance,
    #[serde(rename = "proj_topology")]
    #[strum(serialize = "proj_topology")]
    BizTopology,
    #[serde(rename = "proj_model_group")]
    #[strum(serialize = "proj_model_group")]
    BizModelGroup,
    #[serde(rename = "proj_model")]
    #[strum(serialize = "proj_model")]
    BizModel,
    #[serde(rename = "proj_instance")]
    #[strum(serialize = "proj_instance")]
    BizInstance,
    #[serde(rename = "proj_audit_log")]
    #[strum(serialize = "proj_audit_log")]
    BizAuditLog,
    #[serde(rename = "proj_process_service_template")]
    #[strum(serialize = "proj_process_service_template")]
    BizProcessServiceTemplate,
    #[serde(rename = "proj_process_service_category")]
    #[strum(serialize = "proj_process_service_category")]
    BizProcessServiceCategory,
    #[serde(rename = "proj_process_service_instance")]
    #[strum(serialize = "proj_process_service_instance")]
    BizProcessServiceInstance,
    #[serde(rename = "proj_set_template")]
    #[strum(serialize = "proj_set_template")]
    BizSetTemplate,
}

impl PolicyResourceType {
    /// The catalogue this type is declared in.
    pub fn home_scope(self) -> ScopeKind {
        if self.wire_code().starts_with("proj_") {
            ScopeKind::Business
        } else {
            ScopeKind::Global
        }
    }
}

impl WireVocabulary for PolicyResourceType {
    fn vocabulary() -> &'static str {
        "resource type"
    }

    fn members() -> &'static [Self] {
        <Self as strum::VariantArray>::VARIANTS
    }

    fn wire_code(&self) -> &'static str {
        self.into()
    }

    fn display_name(&self) -> &'static str {
        match self {
            PolicyResourceType::SysSystemBase => "System Base",
            PolicyResourceType::SysBusinessInstance => "Business",
            PolicyResourceType::SysHostInstance => "Host",
            PolicyResourceType::SysEventPushing => "Event Pushing",
            PolicyResourceType::SysModelGroup => "Model Group",
            PolicyResourceType::SysModel => "Model",
            PolicyResourceType::SysInstance => "Instance",
            PolicyResourceType::SysAssociationType => "Association Type",
            PolicyResourceType::SysAuditLog => "Audit Log",
            PolicyResourceType::SysOperationStatistic => "Operation Statistic",
            PolicyResourceType::BizRBizInstance => "Real Business",
            PolicyResourceType::BizHostInstance => "Business Host",
            PolicyResourceType::BizCustomQuery => "Dynamic Grouping",
            PolicyResourceType::BizProcessInstance => "Process",
            PolicyResourceType::BizTopology => "Business Topology",
            PolicyResourceType::BizModelGroup => "Model Group",
            PolicyResourceType::BizModel => "Model",
            PolicyResourceType::BizInstance => "Instance",
            PolicyResourceType::BizAuditLog => "Audit Log",
            PolicyResourceType::BizProcessServiceTemplate => "Service Template",
            PolicyResourceType::BizProcessServiceCategory => "Service Category",
            PolicyResourceType::BizProcessServiceInstance => "Service Instance",
            PolicyResourceType::BizSetTemplate => "Set Template",
        }
    }
}

/// Action id understood by the policy engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    IntoStaticStr,
    VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PolicyActionId {
    /// An action the policy engine cannot recognize.
    Unknown,
    Get,
    Create,
    Edit,
    Delete,
    Archive,
    ModelTopologyOperation,
}

impl WireVocabulary for PolicyActionId {
    fn vocabulary() -> &'static str {
        "action"
    }

    fn members() -> &'static [Self] {
        <Self as strum::VariantArray>::VARIANTS
    }

    fn wire_code(&self) -> &'static str {
        self.into()
    }

    fn display_name(&self) -> &'static str {
        match self {
            PolicyActionId::Unknown => "Unknown",
            PolicyActionId::Get => "Query",
            PolicyActionId::Create => "Create",
            PolicyActionId::Edit => "Edit",
            PolicyActionId::Delete => "Delete",
            PolicyActionId::Archive => "Archive",
            PolicyActionId::ModelTopologyOperation => "Edit Business Hierarchy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use yare::parameterized;

    #[parameterized(
        business = { "sys_project_instance", PolicyResourceType::SysBusinessInstance },
        sys_model = { "sys_model", PolicyResourceType::SysModel },
        biz_model = { "proj_model", PolicyResourceType::BizModel },
        rbiz = { "proj_rbiz_instance", PolicyResourceType::BizRBizInstance },
    )]
    fn test_resource_type_from_wire(code: &str, expected: PolicyResourceType) {
        let ty = PolicyResourceType::from_wire(code).unwrap();
        assert_eq!(ty, expected);
        assert_eq!(ty.wire_code(), code);
        assert_eq!(serde_json::to_value(ty).unwrap(), serde_json::json!(code));
    }

    #[test]
    fn test_unknown_codes_are_not_found() {
        let err = PolicyResourceType::from_wire("sys_widget").unwrap_err();
        assert_eq!(
            err,
            AuthError::UnknownCode {
                vocabulary: "resource type".into(),
                code: "sys_widget".into()
            }
        );
        assert!(PolicyActionId::from_wire("fly").is_err());
        assert_eq!(
            PolicyActionId::from_wire("model_topology_operation").unwrap(),
            PolicyActionId::ModelTopologyOperation
        );
    }

    #[test]
    fn test_home_scope_follows_prefix() {
        for ty in PolicyResourceType::members() {
            let expected = if ty.wire_code().starts_with("sys_") {
                ScopeKind::Global
            } else {
                ScopeKind::Business
            };
            assert_eq!(ty.home_scope(), expected, "{ty}");
            assert!(!ty.display_name().is_empty());
        }
    }
}
