//! [`PolicyTransport`] over the policy engine's JSON envelope API.
//!
//! Requests go through an [`HttpBackend`]; [`ReqwestBackend`] is the
//! production one. This module owns URL layout, headers and envelope
//! decoding, and maps response codes onto [`AuthError`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::discovery::ServerRing;
use crate::error::AuthError;
use crate::traits::WireVocabulary;
use crate::transport::{PolicyTransport, RequestContext};
use crate::types::{
    AuthBatch, AuthorizedResource, BatchStatus, DeregisterInfo, ListAuthorizedResources,
    RegisterInfo, ResourceTypeSpec, ResponseEnvelope, ScopeKind, System,
};

pub const API_PREFIX: &str = "/api/v1";

pub const HEADER_APP_CODE: &str = "x-cc-app-code";
pub const HEADER_APP_SECRET: &str = "x-cc-app-secret";
pub const HEADER_REQUEST_ID: &str = "cc_request_id";
pub const HEADER_SUPPLIER_ACCOUNT: &str = "http_bk_supplier_account";

/// Response code for "resource already exists".
pub const CODE_DUPLICATED: &str = "1901409";
/// Response code for "resource does not exist".
pub const CODE_NOT_FOUND: &str = "1901404";

const MIME_JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Sends one request and returns the decoded JSON response body.
///
/// Connection failures and non-JSON bodies map to [`AuthError::Transport`].
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<serde_json::Value, AuthError>;
}

/// [`HttpBackend`] over a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Configuration(format!("cannot build http client: {e}")))?;
        Ok(ReqwestBackend { client })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: HttpRequest) -> Result<serde_json::Value, AuthError> {
        let response = self
            .client
            .request(request.method, request.url.as_str())
            .headers(request.headers)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(value)
        .map_err(|_| AuthError::Configuration(format!("invalid value for header {name}")))
}

pub struct IamClient<B: HttpBackend> {
    backend: B,
    servers: Arc<ServerRing>,
    system_id: String,
    app_code: String,
    app_secret: String,
    supplier_account: String,
}

impl<B: HttpBackend> IamClient<B> {
    pub fn new(config: &AuthConfig, servers: Arc<ServerRing>, backend: B) -> Self {
        IamClient {
            backend,
            servers,
            system_id: config.system_id.clone(),
            app_code: config.app_code.clone(),
            app_secret: config.app_secret.clone(),
            supplier_account: config.supplier_account.clone(),
        }
    }

    pub fn system_id(&self) -> &str {
        &self.system_id
    }

    fn headers(&self, ctx: &RequestContext) -> Result<HeaderMap, AuthError> {
        let supplier_account = if ctx.supplier_account.is_empty() {
            &self.supplier_account
        } else {
            &ctx.supplier_account
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(MIME_JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(MIME_JSON));
        for (name, value) in [
            (HEADER_APP_CODE, self.app_code.as_str()),
            (HEADER_APP_SECRET, self.app_secret.as_str()),
            (HEADER_REQUEST_ID, ctx.request_id.as_str()),
            (HEADER_SUPPLIER_ACCOUNT, supplier_account.as_str()),
        ] {
            headers.insert(HeaderName::from_static(name), header_value(name, value)?);
        }
        if !ctx.token.is_empty() {
            headers.insert(AUTHORIZATION, header_value("authorization", &ctx.token)?);
        }
        Ok(headers)
    }

    async fn call<T, P>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: String,
        payload: &P,
    ) -> Result<ResponseEnvelope<T>, AuthError>
    where
        T: DeserializeOwned,
        P: Serialize + Sync + ?Sized,
    {
        let server = self.servers.pick()?;
        let request = HttpRequest {
            method,
            url: format!("{}{}{}", server.trim_end_matches('/'), API_PREFIX, path),
            headers: self.headers(ctx)?,
            body: serde_json::to_value(payload)?,
        };

        debug!(
            event = "PolicyEngine",
            phase = "Request",
            method = %request.method,
            url = request.url.as_str(),
            request_id = ctx.request_id.as_str()
        );

        let response = self.backend.send(request).await?;
        let envelope: ResponseEnvelope<T> = serde_json::from_value(response)?;

        if !envelope.is_success() {
            warn!(
                event = "PolicyEngine",
                phase = "Response",
                path = path.as_str(),
                status = envelope.status,
                code = envelope.code.as_str(),
                message = envelope.message.as_str(),
                request_id = envelope.request_id.as_str()
            );
        }
        Ok(envelope)
    }
}

fn remote_error<T>(envelope: ResponseEnvelope<T>) -> AuthError {
    AuthError::Remote {
        code: envelope.code,
        message: envelope.message,
        request_id: envelope.request_id,
    }
}

fn expect_success<T>(envelope: ResponseEnvelope<T>) -> Result<Option<T>, AuthError> {
    if envelope.is_success() {
        Ok(envelope.data)
    } else {
        Err(remote_error(envelope))
    }
}

#[async_trait]
impl<B: HttpBackend> PolicyTransport for IamClient<B> {
    async fn register_system(&self, ctx: &RequestContext, system: &System) -> Result<(), AuthError> {
        let envelope: ResponseEnvelope<serde_json::Value> = self
            .call(ctx, Method::POST, "/iam/perm-model/system".to_string(), system)
            .await?;
        if !envelope.is_success() && envelope.code == CODE_DUPLICATED {
            return Err(AuthError::Duplicated);
        }
        expect_success(envelope).map(|_| ())
    }

    async fn upsert_resource_types(
        &self,
        ctx: &RequestContext,
        scope: ScopeKind,
        resource_types: &[ResourceTypeSpec],
    ) -> Result<(), AuthError> {
        let path = format!(
            "/iam/perm-model/system/{}/scope-type/{}/resource-type/batch-upsert",
            self.system_id,
            scope.wire_code()
        );
        let body = serde_json::json!({ "resource_types": resource_types });
        let envelope: ResponseEnvelope<serde_json::Value> =
            self.call(ctx, Method::POST, path, &body).await?;
        expect_success(envelope).map(|_| ())
    }

    async fn register_resources(
        &self,
        ctx: &RequestContext,
        info: &RegisterInfo,
    ) -> Result<(), AuthError> {
        if let Some(entity) = info.resources.iter().find(|e| e.resource_id.is_empty()) {
            return Err(AuthError::EmptyResourceId(entity.to_string()));
        }

        let path = format!("/iam/perm/system/{}/resource/batch-register", self.system_id);
        let envelope: ResponseEnvelope<serde_json::Value> =
            self.call(ctx, Method::POST, path, info).await?;
        if !envelope.is_success() && envelope.code == CODE_DUPLICATED {
            return Err(AuthError::Duplicated);
        }
        expect_success(envelope).map(|_| ())
    }

    async fn deregister_resources(
        &self,
        ctx: &RequestContext,
        info: &DeregisterInfo,
    ) -> Result<(), AuthError> {
        let path = format!("/iam/perm/system/{}/resource/batch-delete", self.system_id);
        let envelope: ResponseEnvelope<serde_json::Value> =
            self.call(ctx, Method::DELETE, path, info).await?;
        if !envelope.is_success() && envelope.code == CODE_NOT_FOUND {
            return Err(AuthError::NotFound);
        }
        expect_success(envelope).map(|_| ())
    }

    async fn verify_exact(
        &self,
        ctx: &RequestContext,
        batch: &AuthBatch,
    ) -> Result<Vec<BatchStatus>, AuthError> {
        let path = format!(
            "/iam/perm/systems/{}/resource-perm/batch-verify",
            self.system_id
        );
        let envelope = self.call(ctx, Method::POST, path, batch).await?;
        Ok(expect_success(envelope)?.unwrap_or_default())
    }

    async fn verify_any(
        &self,
        ctx: &RequestContext,
        batch: &AuthBatch,
    ) -> Result<Vec<BatchStatus>, AuthError> {
        let path = format!(
            "/iam/perm/systems/{}/any-resource-perm/batch-verify",
            self.system_id
        );
        let envelope = self.call(ctx, Method::POST, path, batch).await?;
        Ok(expect_success(envelope)?.unwrap_or_default())
    }

    async fn search_authorized(
        &self,
        ctx: &RequestContext,
        query: &ListAuthorizedResources,
    ) -> Result<Vec<AuthorizedResource>, AuthError> {
        let path = format!(
            "/iam/perm/system/{}/authorized-resource/search",
            self.system_id
        );
        let envelope = self.call(ctx, Method::POST, path, query).await?;
        Ok(expect_success(envelope)?.unwrap_or_default())
    }
}
