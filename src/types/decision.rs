//! Authorization decisions returned to callers.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reason attached to resources allowed without asking the policy engine.
pub const REASON_IMPLICIT_ALLOW: &str = "implicitly allowed";
/// Reason attached to every resource when authorization is disabled.
pub const REASON_AUTH_DISABLED: &str = "authorization disabled";

/// Allow or deny for one resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub struct Decision {
    pub authorized: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl Decision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Decision {
            authorized: true,
            reason: reason.into(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Decision {
            authorized: false,
            reason: reason.into(),
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match (self.authorized, self.reason.is_empty()) {
            (true, true) => write!(f, "Allow"),
            (true, false) => write!(f, "Allow({})", self.reason),
            (false, true) => write!(f, "Deny"),
            (false, false) => write!(f, "Deny({})", self.reason),
        }
    }
}
