//! The capability the core uses to reach the policy engine.

use async_trait::async_trait;

use crate::error::AuthError;
use crate::types::{
    AuthBatch, AuthorizedResource, BatchStatus, DeregisterInfo, ListAuthorizedResources,
    RegisterInfo, ResourceTypeSpec, ScopeKind, System,
};

/// Per-request metadata carried through to the policy engine as headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    pub token: String,
    /// The acting user, empty for background work.
    pub user: String,
    pub supplier_account: String,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        RequestContext {
            request_id: request_id.into(),
            ..RequestContext::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_supplier_account(mut self, supplier_account: impl Into<String>) -> Self {
        self.supplier_account = supplier_account.into();
        self
    }
}

/// Operations offered by the policy engine.
///
/// Implementations do not retry. Dropping a returned future abandons the
/// in-flight call. Idempotent outcomes surface as [`AuthError::Duplicated`]
/// and [`AuthError::NotFound`] so callers decide whether to swallow them.
#[async_trait]
pub trait PolicyTransport: Send + Sync {
    async fn register_system(&self, ctx: &RequestContext, system: &System) -> Result<(), AuthError>;

    async fn upsert_resource_types(
        &self,
        ctx: &RequestContext,
        scope: ScopeKind,
        resource_types: &[ResourceTypeSpec],
    ) -> Result<(), AuthError>;

    async fn register_resources(
        &self,
        ctx: &RequestContext,
        info: &RegisterInfo,
    ) -> Result<(), AuthError>;

    async fn deregister_resources(
        &self,
        ctx: &RequestContext,
        info: &DeregisterInfo,
    ) -> Result<(), AuthError>;

    /// Verify entries that carry instance ids.
    async fn verify_exact(
        &self,
        ctx: &RequestContext,
        batch: &AuthBatch,
    ) -> Result<Vec<BatchStatus>, AuthError>;

    /// Verify entries at the type level.
    async fn verify_any(
        &self,
        ctx: &RequestContext,
        batch: &AuthBatch,
    ) -> Result<Vec<BatchStatus>, AuthError>;

    async fn search_authorized(
        &self,
        ctx: &RequestContext,
        query: &ListAuthorizedResources,
    ) -> Result<Vec<AuthorizedResource>, AuthError>;
}
