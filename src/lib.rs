// src/lib.rs
pub use authorizer::BatchAuthorizer;
pub use bootstrap::{Bootstrap, BusinessRecord, InitConfig, RBizRecord};
pub use client::{HttpBackend, HttpRequest, IamClient, ReqwestBackend};
pub use config::AuthConfig;
pub use discovery::ServerRing;
pub use error::{AuthError, ErrorKind};
pub use lifecycle::ResourceLifecycleManager;
pub use metrics::{BatchStats, DispatchStats, MetricsSink, NoOpSink, VerifyKind};
pub use transport::{PolicyTransport, RequestContext};
pub use types::{
    Action, AuthAttribute, Decision, IamResource, ResourceAttribute, ResourceType, UserInfo,
};

pub mod adaptor;
pub mod authorizer;
pub mod bootstrap;
pub mod catalogue;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod resource_id;
pub mod skip;
pub mod timers;
pub mod traits;
pub mod transport;
pub mod types;

#[cfg(test)]
mod tests;
