use std::sync::Arc;
use std::time::Instant;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::adaptor::{adapt_action, convert_resource_type};
use crate::catalogue;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::metrics::{BatchStats, DispatchStats, MetricsSink, NoOpSink, VerifyKind};
use crate::resource_id::generate_resource_id;
use crate::skip::should_skip;
use crate::timers::{Phase, PhaseTimer};
use crate::transport::{PolicyTransport, RequestContext};
use crate::types::{
    Action, AuthAttribute, AuthBatch, BatchStatus, Decision, IamResource,
    ListAuthorizedResources, Principal, REASON_AUTH_DISABLED, REASON_IMPLICIT_ALLOW,
    ResourceAction, ResourceAttribute, ResourceType, ScopeInfo, TypeAction, UserInfo,
};

/// Data type requested from the authorized-resource search.
const RESOURCE_DATA_TYPE_ARRAY: &str = "array";

/// A dispatch unit: one scope, one verify endpoint, plus the caller index
/// each entry came from. `origins[j]` is the input index of
/// `batch.resource_actions[j]`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bucket {
    pub(crate) verify: VerifyKind,
    pub(crate) batch: AuthBatch,
    pub(crate) origins: Vec<usize>,
}

impl Bucket {
    fn push(&mut self, entry: ResourceAction, origin: usize) {
        self.batch.resource_actions.push(entry);
        self.origins.push(origin);
    }
}

/// Buckets for one `authorize_batch` call, in first-seen order.
#[derive(Debug)]
pub(crate) struct BucketArena {
    principal: Principal,
    buckets: Vec<Bucket>,
}

impl BucketArena {
    pub(crate) fn new(principal: Principal) -> Self {
        BucketArena {
            principal,
            buckets: Vec::new(),
        }
    }

    pub(crate) fn route(
        &mut self,
        scope: ScopeInfo,
        verify: VerifyKind,
        entry: ResourceAction,
        origin: usize,
    ) {
        let position = self
            .buckets
            .iter()
            .position(|b| b.verify == verify && b.batch.scope == scope);
        let bucket = match position {
            Some(i) => &mut self.buckets[i],
            None => {
                self.buckets.push(Bucket {
                    verify,
                    batch: AuthBatch::new(self.principal.clone(), scope),
                    origins: Vec::new(),
                });
                let last = self.buckets.len() - 1;
                &mut self.buckets[last]
            }
        };
        bucket.push(entry, origin);
    }

    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Business buckets as first seen, then global exact, then global any.
    pub(crate) fn into_dispatch_order(self) -> Vec<Bucket> {
        let (global, mut ordered): (Vec<Bucket>, Vec<Bucket>) = self
            .buckets
            .into_iter()
            .partition(|b| b.batch.scope.is_global());
        let (exact, any): (Vec<Bucket>, Vec<Bucket>) = global
            .into_iter()
            .partition(|b| b.verify == VerifyKind::Exact);
        ordered.extend(exact);
        ordered.extend(any);
        ordered
    }
}

/// Check a verify response against the batch it answers. Any mismatch
/// discards the whole response.
pub(crate) fn check_statuses(batch: &AuthBatch, statuses: &[BatchStatus]) -> Result<(), AuthError> {
    if statuses.len() != batch.len() {
        return Err(AuthError::ResultCountMismatch {
            expected: batch.len(),
            actual: statuses.len(),
        });
    }
    for (index, (entry, status)) in batch.resource_actions.iter().zip(statuses).enumerate() {
        if !status.matches(entry) {
            return Err(AuthError::ResultIdentityMismatch {
                index,
                requested: entry.to_string(),
                returned: format!("{}:{}", status.resource_type, status.action_id),
            });
        }
    }
    Ok(())
}

/// Maps, buckets and verifies resource requests against the policy engine.
pub struct BatchAuthorizer<T: PolicyTransport> {
    transport: Arc<T>,
    enabled: bool,
    system_id: String,
    metrics: Arc<dyn MetricsSink>,
}

impl<T: PolicyTransport> BatchAuthorizer<T> {
    pub fn new(config: &AuthConfig, transport: Arc<T>) -> Self {
        BatchAuthorizer {
            transport,
            enabled: config.enabled,
            system_id: config.system_id.clone(),
            metrics: Arc::new(NoOpSink),
        }
    }

    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = sink;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Decide every resource for `user`. `decisions[i]` answers
    /// `resources[i]`; any failure discards all decisions.
    ///
    /// The metrics sink sees one [`BatchStats`] per call, failures included.
    pub async fn authorize_batch(
        &self,
        ctx: &RequestContext,
        user: &UserInfo,
        resources: &[ResourceAttribute],
    ) -> Result<Vec<Decision>, AuthError> {
        if !self.enabled {
            debug!(
                event = "AuthorizeBatch",
                phase = "Disabled",
                resources = resources.len()
            );
            return Ok(vec![Decision::allow(REASON_AUTH_DISABLED); resources.len()]);
        }

        let started = Instant::now();
        let mut stats = BatchStats {
            total: resources.len(),
            ..BatchStats::default()
        };
        let result = self.decide(ctx, user, resources, &mut stats).await;
        stats.success = result.is_ok();
        stats.total_duration = started.elapsed();

        match &result {
            Ok(_) => debug!(
                event = "AuthorizeBatch",
                phase = "Result",
                allowed = stats.allowed,
                denied = stats.total - stats.allowed,
                dispatches = stats.dispatches
            ),
            Err(err) => warn!(
                event = "AuthorizeBatch",
                phase = "Failed",
                user = user.user_name.as_str(),
                dispatches = stats.dispatches,
                error = %err
            ),
        }
        self.metrics.on_batch(&stats);
        result
    }

    async fn decide(
        &self,
        ctx: &RequestContext,
        user: &UserInfo,
        resources: &[ResourceAttribute],
        stats: &mut BatchStats,
    ) -> Result<Vec<Decision>, AuthError> {
        let mut decisions = vec![Decision::default(); resources.len()];

        let arena = {
            let mut timer = PhaseTimer::start(Phase::Mapping, stats);
            let mut arena = BucketArena::new(Principal::user(&user.user_name));
            for (index, resource) in resources.iter().enumerate() {
                let action_id = adapt_action(resource)?;
                if should_skip(resource) {
                    decisions[index] = Decision::allow(REASON_IMPLICIT_ALLOW);
                    timer.stats().skipped += 1;
                    continue;
                }

                let policy_type =
                    convert_resource_type(resource.resource_type(), resource.business_id)?;
                let resource_id = generate_resource_id(policy_type, resource)?;
                let scope = ScopeInfo::resolve(resource, policy_type, &self.system_id)?;
                let verify = if resource_id.is_empty() {
                    VerifyKind::Any
                } else {
                    VerifyKind::Exact
                };

                arena.route(
                    scope,
                    verify,
                    ResourceAction {
                        resource_type: policy_type,
                        action_id,
                        resource_id,
                    },
                    index,
                );
            }
            arena
        };

        debug!(
            event = "AuthorizeBatch",
            phase = "Bucketed",
            user = user.user_name.as_str(),
            resources = resources.len(),
            skipped = stats.skipped,
            buckets = arena.len()
        );

        for bucket in arena.into_dispatch_order() {
            let statuses = {
                let mut timer = PhaseTimer::start(Phase::Dispatch, stats);
                timer.stats().dispatches += 1;
                self.dispatch(ctx, bucket.verify, bucket.batch).await?
            };
            for (origin, status) in bucket.origins.into_iter().zip(statuses) {
                decisions[origin] = if status.is_pass {
                    Decision::allow("")
                } else {
                    Decision::deny(format!(
                        "no permission to {} {}",
                        status.action_id, status.resource_type
                    ))
                };
            }
        }

        stats.allowed = decisions.iter().filter(|d| d.authorized).count();
        Ok(decisions)
    }

    // Sends one bucket and returns statuses already checked against it.
    async fn dispatch(
        &self,
        ctx: &RequestContext,
        verify: VerifyKind,
        mut batch: AuthBatch,
    ) -> Result<Vec<BatchStatus>, AuthError> {
        for entry in batch.resource_actions.iter_mut() {
            if !catalogue::is_related_to_resource_id(entry.resource_type)? {
                entry.resource_id.clear();
            }
        }

        debug!(
            event = "AuthorizeBatch",
            phase = "Dispatch",
            scope = %batch.scope,
            verify = %verify,
            entries = batch.len()
        );

        let started = Instant::now();
        let result = match verify {
            VerifyKind::Exact => self.transport.verify_exact(ctx, &batch).await,
            VerifyKind::Any => self.transport.verify_any(ctx, &batch).await,
        }
        .and_then(|statuses| {
            check_statuses(&batch, &statuses)?;
            Ok(statuses)
        });

        if let Err(err) = &result {
            warn!(
                event = "AuthorizeBatch",
                phase = "Dispatch",
                scope = %batch.scope,
                verify = %verify,
                error = %err
            );
        }

        self.metrics.on_dispatch(&DispatchStats {
            scope: batch.scope.kind,
            verify,
            entries: batch.len(),
            duration: started.elapsed(),
            success: result.is_ok(),
        });
        result
    }

    /// One decision for a whole attribute. Resources marked `skipAction`
    /// are dropped first; every denial is listed in the reason.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        attribute: &AuthAttribute,
    ) -> Result<Decision, AuthError> {
        let resources: Vec<ResourceAttribute> = attribute
            .resources
            .iter()
            .filter(|r| r.action() != Action::SkipAction)
            .cloned()
            .collect();
        if resources.is_empty() {
            return Ok(Decision::allow(REASON_IMPLICIT_ALLOW));
        }

        let decisions = self
            .authorize_batch(ctx, &attribute.user, &resources)
            .await?;

        let denied = resources
            .iter()
            .zip(&decisions)
            .filter(|(_, d)| !d.authorized)
            .map(|(r, d)| {
                format!(
                    "resource [{}] permission deny by reason: {}",
                    r.resource_type(),
                    d.reason
                )
            })
            .collect::<Vec<_>>();

        if denied.is_empty() {
            Ok(Decision::allow(""))
        } else {
            Ok(Decision::deny(denied.iter().join("; ")))
        }
    }

    /// Leaf resources of `resource_type` the user may perform `action` on.
    ///
    /// Listing is not tied to one resource instance, so a missing business
    /// id searches the system scope.
    pub async fn list_authorized_resources(
        &self,
        ctx: &RequestContext,
        user: &str,
        business_id: i64,
        resource_type: ResourceType,
        action: Action,
    ) -> Result<Vec<IamResource>, AuthError> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let attribute = ResourceAttribute::new(resource_type, action).with_business(business_id);
        let action_id = adapt_action(&attribute)?;
        let policy_type = convert_resource_type(resource_type, business_id)?;
        let scope = if business_id > 0 && !resource_type.forces_global_scope() {
            ScopeInfo::business(business_id)
        } else {
            ScopeInfo::global(self.system_id.as_str())
        };

        let query = ListAuthorizedResources {
            principal: Principal::user(user),
            scope,
            type_actions: vec![TypeAction {
                action_id,
                resource_type: policy_type,
            }],
            data_type: RESOURCE_DATA_TYPE_ARRAY.to_string(),
            exact: true,
        };

        let found = self.transport.search_authorized(ctx, &query).await?;
        let resources: Vec<IamResource> = found
            .into_iter()
            .flat_map(|r| r.resource_ids)
            .filter_map(|chain| {
                chain.last().map(|leaf| IamResource {
                    resource_type: leaf.resource_type,
                    resource_id: leaf.resource_id.clone(),
                })
            })
            .collect();

        debug!(
            event = "ListAuthorized",
            phase = "Result",
            user,
            resource_type = %policy_type,
            action = %action_id,
            count = resources.len()
        );
        Ok(resources)
    }

    /// Ids of the legacy rbiz records the user may see.
    pub async fn list_authorized_rbiz_ids(
        &self,
        ctx: &RequestContext,
        user: &str,
    ) -> Result<Vec<i64>, AuthError> {
        let resources = self
            .list_authorized_resources(ctx, user, 0, ResourceType::RBusiness, Action::FindMany)
            .await?;
        resources
            .iter()
            .map(|r| {
                r.resource_id.parse::<i64>().map_err(|_| {
                    AuthError::MalformedResponse(format!(
                        "rbiz id is not numeric: {}",
                        r.resource_id
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
