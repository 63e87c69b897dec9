//! Authorization scopes: the global catalogue or one business.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AuthError;
use crate::traits::WireVocabulary;

use super::attribute::ResourceAttribute;
use super::policy::PolicyResourceType;

/// Wire code of the business scope. Pinned to the live policy engine, which
/// names business catalogues `proj`.
pub const SCOPE_TYPE_BUSINESS: &str = "proj";
/// Wire code of the global scope.
pub const SCOPE_TYPE_SYSTEM: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScopeKind {
    #[serde(rename = "system")]
    Global,
    #[serde(rename = "proj")]
    Business,
}

impl WireVocabulary for ScopeKind {
    fn vocabulary() -> &'static str {
        "scope type"
    }

    fn members() -> &'static [Self] {
        &[ScopeKind::Global, ScopeKind::Business]
    }

    fn wire_code(&self) -> &'static str {
        match self {
            ScopeKind::Global => SCOPE_TYPE_SYSTEM,
            ScopeKind::Business => SCOPE_TYPE_BUSINESS,
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            ScopeKind::Global => "Global",
            ScopeKind::Business => "Business",
        }
    }
}

impl Display for ScopeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.wire_code())
    }
}

/// A scope as sent to the policy engine, e.g. `system/cc` or `proj/12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct ScopeInfo {
    #[serde(rename = "scope_type")]
    #[schema(value_type = String)]
    pub kind: ScopeKind,
    #[serde(rename = "scope_id")]
    pub id: String,
}

impl ScopeInfo {
    pub fn global(system_id: impl Into<String>) -> Self {
        ScopeInfo {
            kind: ScopeKind::Global,
            id: system_id.into(),
        }
    }

    pub fn business(business_id: i64) -> Self {
        ScopeInfo {
            kind: ScopeKind::Business,
            id: business_id.to_string(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.kind == ScopeKind::Global
    }

    /// Work out the scope a resource is authorized or registered in.
    ///
    /// Mainline-model and model-topology resources are always global. Any
    /// other resource with a business id is business-scoped. A resource whose
    /// policy type only exists in business catalogues must name its business;
    /// it is never silently moved to the global scope.
    pub fn resolve(
        attribute: &ResourceAttribute,
        policy_type: PolicyResourceType,
        system_id: &str,
    ) -> Result<Self, AuthError> {
        if attribute.basic.resource_type.forces_global_scope() {
            return Ok(ScopeInfo::global(system_id));
        }
        if attribute.business_id > 0 {
            return Ok(ScopeInfo::business(attribute.business_id));
        }
        if policy_type.home_scope() == ScopeKind::Business {
            return Err(AuthError::MissingScope(policy_type.to_string()));
        }
        Ok(ScopeInfo::global(system_id))
    }
}

impl Display for ScopeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
