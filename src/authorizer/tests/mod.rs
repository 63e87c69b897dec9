use std::sync::Mutex;

use super::*;
use crate::error::ErrorKind;
use crate::metrics::{BatchStats, DispatchStats};
use crate::tests::{Call, MockTransport, capture_logs, enabled_config};
use crate::types::{PolicyActionId, PolicyResourceType, ScopeKind};
use yare::parameterized;


fn authorizer(transport: MockTransport) -> (BatchAuthorizer<MockTransport>, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    let authorizer = BatchAuthorizer::new(&enabled_config(), Arc::clone(&transport));
    (authorizer, transport)
}

fn ctx() -> RequestContext {
    RequestContext::new("rid-test").with_user("alice")
}

fn alice() -> UserInfo {
    UserInfo::new("alice")
}

fn model(action: Action, id: i64) -> ResourceAttribute {
    ResourceAttribute::new(ResourceType::Model, action).with_instance(id)
}

fn host(business_id: i64, id: i64) -> ResourceAttribute {
    ResourceAttribute::new(ResourceType::HostInstance, Action::Update)
        .with_business(business_id)
        .with_instance(id)
        .with_layer(ResourceType::Business, business_id)
        .with_layer(ResourceType::ModelModule, 1)
}

#[derive(Default)]
struct RecordingSink {
    batches: Mutex<Vec<BatchStats>>,
    dispatches: Mutex<Vec<DispatchStats>>,
}

impl MetricsSink for RecordingSink {
    fn on_batch(&self, stats: &BatchStats) {
        self.batches.lock().unwrap().push(stats.clone());
    }

    fn on_dispatch(&self, stats: &DispatchStats) {
        self.dispatches.lock().unwrap().push(stats.clone());
    }
}

#[tokio::test]
async fn test_empty_input_gives_empty_decisions() {
    let (authorizer, transport) = authorizer(MockTransport::allow_all());
    let decisions = authorizer.authorize_batch(&ctx(), &alice(), &[]).await.unwrap();
    assert!(decisions.is_empty());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_disabled_allows_everything_without_calls() {
    let transport = Arc::new(MockTransport::allow_all());
    let authorizer = BatchAuthorizer::new(&AuthConfig::default(), Arc::clone(&transport));
    assert!(!authorizer.enabled());

    let resources = vec![
        model(Action::Update, 1),
        ResourceAttribute::new(ResourceType::InstallBk, Action::Archive),
        ResourceAttribute::new(ResourceType::ModelAttribute, Action::Update),
    ];
    let decisions = authorizer
        .authorize_batch(&ctx(), &alice(), &resources)
        .await
        .unwrap();

    assert_eq!(decisions.len(), resources.len());
    assert!(decisions.iter().all(|d| *d == Decision::allow(REASON_AUTH_DISABLED)));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_create_business_and_skipped_host_lookup() {
    let (authorizer, transport) = authorizer(MockTransport::passing(|_| false));
    let resources = vec![
        ResourceAttribute::new(ResourceType::Business, Action::Create),
        ResourceAttribute::new(ResourceType::HostInstance, Action::Find).with_business(5),
    ];

    let decisions = authorizer
        .authorize_batch(&ctx(), &alice(), &resources)
        .await
        .unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    let Call::VerifyAny(batch) = &calls[0] else {
        panic!("expected an any-verify call, got {calls:?}");
    };
    assert_eq!(batch.scope, ScopeInfo::global("cc"));
    assert_eq!(
        batch.resource_actions,
        vec![ResourceAction {
            resource_type: PolicyResourceType::SysBusinessInstance,
            action_id: PolicyActionId::Create,
            resource_id: vec![],
        }]
    );

    assert_eq!(decisions.len(), 2);
    assert!(!decisions[0].authorized);
    assert_eq!(decisions[1], Decision::allow(REASON_IMPLICIT_ALLOW));
}

#[tokio::test]
async fn test_buckets_by_scope_and_specificity() {
    let (authorizer, transport) = authorizer(MockTransport::allow_all());
    let resources = vec![
        model(Action::Update, 3),
        host(5, 42),
        ResourceAttribute::new(ResourceType::Model, Action::Create).with_business(7),
        ResourceAttribute::new(ResourceType::ModelModule, Action::Delete)
            .with_business(5)
            .with_instance(9),
        ResourceAttribute::new(ResourceType::EventPushing, Action::Create),
        ResourceAttribute::new(ResourceType::HostInstance, Action::Create).with_business(7),
    ];

    let decisions = authorizer
        .authorize_batch(&ctx(), &alice(), &resources)
        .await
        .unwrap();
    assert_eq!(decisions.len(), resources.len());
    assert!(decisions.iter().all(|d| d.authorized));

    let sent: Vec<(bool, ScopeInfo, Vec<PolicyResourceType>)> = transport
        .calls()
        .iter()
        .map(|call| {
            let batch = call.verified_batch().unwrap();
            let types = batch.resource_actions.iter().map(|e| e.resource_type).collect();
            (matches!(call, Call::VerifyExact(_)), batch.scope.clone(), types)
        })
        .collect();

    assert_eq!(
        sent,
        vec![
            (
                true,
                ScopeInfo::business(5),
                vec![PolicyResourceType::BizHostInstance, PolicyResourceType::BizTopology]
            ),
            (
                false,
                ScopeInfo::business(7),
                vec![PolicyResourceType::BizModel, PolicyResourceType::BizHostInstance]
            ),
            (true, ScopeInfo::global("cc"), vec![PolicyResourceType::SysModel]),
            (false, ScopeInfo::global("cc"), vec![PolicyResourceType::SysEventPushing]),
        ]
    );
}

#[tokio::test]
async fn test_host_chain_is_sent_whole() {
    let (authorizer, transport) = authorizer(MockTransport::allow_all());
    authorizer
        .authorize_batch(&ctx(), &alice(), &[host(5, 42)])
        .await
        .unwrap();

    let batches = transport.verified_batches();
    let chain: Vec<String> = batches[0].resource_actions[0]
        .resource_id
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        chain,
        vec![
            "sys_project_instance/5",
            "proj_topology/1",
            "proj_host_instance/42"
        ]
    );
}

#[tokio::test]
async fn test_ids_are_stripped_for_type_level_resources() {
    let (authorizer, transport) = authorizer(MockTransport::allow_all());
    let audit = ResourceAttribute::new(ResourceType::AuditLog, Action::Find)
        .with_business(3)
        .with_instance_ex("op-77");

    authorizer
        .authorize_batch(&ctx(), &alice(), &[audit])
        .await
        .unwrap();

    let calls = transport.calls();
    let Call::VerifyExact(batch) = &calls[0] else {
        panic!("expected an exact-verify call, got {calls:?}");
    };
    assert_eq!(batch.resource_actions[0].resource_type, PolicyResourceType::BizAuditLog);
    assert!(batch.resource_actions[0].resource_id.is_empty());
}

#[tokio::test]
async fn test_process_resources_verify_at_type_level() {
    let (authorizer, transport) = authorizer(MockTransport::allow_all());
    let resources = vec![
        ResourceAttribute::new(ResourceType::Process, Action::Update)
            .with_business(3)
            .with_instance(9),
        ResourceAttribute::new(ResourceType::ProcessServiceInstance, Action::Delete)
            .with_business(3)
            .with_instance(10),
    ];
    authorizer
        .authorize_batch(&ctx(), &alice(), &resources)
        .await
        .unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    let Call::VerifyAny(batch) = &calls[0] else {
        panic!("expected an any-verify call, got {calls:?}");
    };
    assert_eq!(batch.scope, ScopeInfo::business(3));
    assert_eq!(
        batch.resource_actions,
        vec![
            ResourceAction {
                resource_type: PolicyResourceType::BizProcessInstance,
                action_id: PolicyActionId::Edit,
                resource_id: vec![],
            },
            ResourceAction {
                resource_type: PolicyResourceType::BizProcessServiceInstance,
                action_id: PolicyActionId::Delete,
                resource_id: vec![],
            },
        ]
    );
}

// Every checked entry carries a distinct leaf id so a misplaced decision
// shows up as a wrong position.
fn tagged_resources() -> Vec<(ResourceAttribute, bool)> {
    vec![
        (model(Action::Update, 1), false),
        (model(Action::Delete, 2), true),
        (host(4, 3), true),
        (host(4, 4), false),
        (
            ResourceAttribute::new(ResourceType::ModelSet, Action::Delete)
                .with_business(4)
                .with_instance(5),
            true,
        ),
        (
            ResourceAttribute::new(ResourceType::ModelModule, Action::Update)
                .with_business(6)
                .with_instance(6),
            false,
        ),
        (
            ResourceAttribute::new(ResourceType::EventPushing, Action::Update).with_instance(7),
            false,
        ),
        (model(Action::Update, 8), true),
        (ResourceAttribute::new(ResourceType::Model, Action::FindMany), true),
    ]
}

const PASSING_LEAVES: &[i64] = &[2, 3, 5, 8];

fn passing_leaf(entry: &ResourceAction) -> bool {
    match entry.resource_id.last() {
        None => true,
        Some(leaf) => leaf
            .resource_id
            .rsplit(':')
            .next()
            .and_then(|digits| digits.parse::<i64>().ok())
            .is_some_and(|id| PASSING_LEAVES.contains(&id)),
    }
}

#[parameterized(
    original = { &[0, 1, 2, 3, 4, 5, 6, 7, 8] },
    reversed = { &[8, 7, 6, 5, 4, 3, 2, 1, 0] },
    rotated = { &[3, 4, 5, 6, 7, 8, 0, 1, 2] },
    interleaved = { &[1, 3, 5, 7, 0, 2, 4, 6, 8] },
    skip_first = { &[8, 0, 2, 4, 6, 1, 3, 5, 7] },
)]
#[test_macro(tokio::test)]
async fn test_decisions_follow_input_order(order: &[usize]) {
    let tagged = tagged_resources();
    let (resources, expected): (Vec<ResourceAttribute>, Vec<bool>) =
        order.iter().map(|&i| tagged[i].clone()).unzip();

    let (authorizer, _transport) = authorizer(MockTransport::passing(passing_leaf));
    let decisions = authorizer
        .authorize_batch(&ctx(), &alice(), &resources)
        .await
        .unwrap();

    assert_eq!(decisions.len(), resources.len());
    for (position, decision) in decisions.iter().enumerate() {
        assert_eq!(
            decision.authorized, expected[position],
            "position {position} ({}) got {decision}",
            resources[position]
        );
    }
}

#[tokio::test]
async fn test_skipped_resources_never_dispatch() {
    let (authorizer, transport) = authorizer(MockTransport::passing(|_| false));
    let resources = vec![
        ResourceAttribute::new(ResourceType::HostInstance, Action::FindMany).with_business(2),
        ResourceAttribute::new(ResourceType::UserCustom, Action::Update),
        ResourceAttribute::new(ResourceType::NetDataCollector, Action::Delete),
        ResourceAttribute::new(ResourceType::ModelModule, Action::Find).with_business(2),
    ];
    let decisions = authorizer
        .authorize_batch(&ctx(), &alice(), &resources)
        .await
        .unwrap();
    assert!(decisions.iter().all(|d| d.authorized));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_count_mismatch_discards_everything() {
    let transport = MockTransport::with_verifier(|batch| {
        Ok(batch
            .resource_actions
            .iter()
            .skip(1)
            .map(|e| BatchStatus::for_entry(e, true))
            .collect())
    });
    let (authorizer, _transport) = authorizer(transport);

    let err = authorizer
        .authorize_batch(
            &ctx(),
            &alice(),
            &[model(Action::Update, 1), model(Action::Delete, 2)],
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::ResultCountMismatch {
            expected: 2,
            actual: 1
        }
    );
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn test_identity_mismatch_discards_everything() {
    let transport = MockTransport::with_verifier(|batch| {
        Ok(batch
            .resource_actions
            .iter()
            .map(|e| BatchStatus {
                action_id: PolicyActionId::Get,
                ..BatchStatus::for_entry(e, true)
            })
            .collect())
    });
    let (authorizer, _transport) = authorizer(transport);

    let err = authorizer
        .authorize_batch(&ctx(), &alice(), &[model(Action::Update, 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::ResultIdentityMismatch { index: 0, .. }));
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[parameterized(
    unsupported_action = { model(Action::Archive, 1), AuthError::UnsupportedAction("archive".into()) },
    missing_layer = { ResourceAttribute::new(ResourceType::ModelAttribute, Action::Update), AuthError::NotEnoughLayer },
    missing_scope = { ResourceAttribute::new(ResourceType::Process, Action::Update), AuthError::MissingScope("proj_process_instance".into()) },
    skipped_type_still_adapts = { ResourceAttribute::new(ResourceType::HostFavorite, Action::Archive), AuthError::UnsupportedAction("archive".into()) },
)]
#[test_macro(tokio::test)]
async fn test_mapping_failure_aborts_before_dispatch(bad: ResourceAttribute, expected: AuthError) {
    let (authorizer, transport) = authorizer(MockTransport::allow_all());
    let resources = vec![model(Action::Update, 1), bad];

    let err = authorizer
        .authorize_batch(&ctx(), &alice(), &resources)
        .await
        .unwrap_err();
    assert_eq!(err, expected);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let transport =
        MockTransport::with_verifier(|_| Err(AuthError::Transport("deadline exceeded".into())));
    let (authorizer, _transport) = authorizer(transport);
    let err = authorizer
        .authorize_batch(&ctx(), &alice(), &[model(Action::Update, 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
}

#[parameterized(
    transport_error = { false },
    short_response = { true },
)]
#[test_macro(tokio::test)]
async fn test_later_bucket_failure_discards_earlier_decisions(short_response: bool) {
    let transport = MockTransport::with_verifier(move |batch| {
        if !batch.scope.is_global() {
            return Ok(batch
                .resource_actions
                .iter()
                .map(|e| BatchStatus::for_entry(e, true))
                .collect());
        }
        if short_response {
            Ok(Vec::new())
        } else {
            Err(AuthError::Transport("connection reset".into()))
        }
    });
    let (authorizer, transport) = authorizer(transport);

    let err = authorizer
        .authorize_batch(&ctx(), &alice(), &[host(5, 42), model(Action::Update, 1)])
        .await
        .unwrap_err();
    if short_response {
        assert_eq!(
            err,
            AuthError::ResultCountMismatch {
                expected: 1,
                actual: 0
            }
        );
    } else {
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    let attempted: Vec<(bool, ScopeInfo)> = transport
        .calls()
        .iter()
        .map(|call| {
            let batch = call.verified_batch().unwrap();
            (matches!(call, Call::VerifyExact(_)), batch.scope.clone())
        })
        .collect();
    assert_eq!(
        attempted,
        vec![
            (true, ScopeInfo::business(5)),
            (true, ScopeInfo::global("cc")),
        ]
    );
}

#[tokio::test]
async fn test_metrics_sink_sees_batches_and_dispatches() {
    let sink = Arc::new(RecordingSink::default());
    let transport = Arc::new(MockTransport::allow_all());
    let authorizer = BatchAuthorizer::new(&enabled_config(), transport)
        .with_metrics_sink(Arc::clone(&sink) as Arc<dyn MetricsSink>);

    let resources = vec![
        model(Action::Update, 1),
        ResourceAttribute::new(ResourceType::Business, Action::Create),
        ResourceAttribute::new(ResourceType::HostInstance, Action::Find),
    ];
    authorizer
        .authorize_batch(&ctx(), &alice(), &resources)
        .await
        .unwrap();

    let batches = sink.batches.lock().unwrap().clone();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].total, 3);
    assert_eq!(batches[0].skipped, 1);
    assert_eq!(batches[0].dispatches, 2);
    assert_eq!(batches[0].allowed, 3);
    assert!(batches[0].success);
    assert!(batches[0].total_duration >= batches[0].dispatch);

    let dispatches = sink.dispatches.lock().unwrap().clone();
    let shapes: Vec<(ScopeKind, VerifyKind, usize, bool)> = dispatches
        .iter()
        .map(|d| (d.scope, d.verify, d.entries, d.success))
        .collect();
    assert_eq!(
        shapes,
        vec![
            (ScopeKind::Global, VerifyKind::Exact, 1, true),
            (ScopeKind::Global, VerifyKind::Any, 1, true),
        ]
    );
}

#[tokio::test]
async fn test_failed_dispatch_is_reported() {
    let sink = Arc::new(RecordingSink::default());
    let transport = Arc::new(MockTransport::with_verifier(|_| Ok(vec![])));
    let authorizer = BatchAuthorizer::new(&enabled_config(), transport)
        .with_metrics_sink(Arc::clone(&sink) as Arc<dyn MetricsSink>);

    assert!(
        authorizer
            .authorize_batch(&ctx(), &alice(), &[model(Action::Update, 1)])
            .await
            .is_err()
    );

    let batches = sink.batches.lock().unwrap().clone();
    assert_eq!(batches.len(), 1);
    assert!(!batches[0].success);
    assert_eq!(batches[0].total, 1);
    assert_eq!(batches[0].dispatches, 1);
    assert_eq!(batches[0].allowed, 0);

    let dispatches = sink.dispatches.lock().unwrap().clone();
    assert_eq!(dispatches.len(), 1);
    assert!(!dispatches[0].success);
}

#[tokio::test]
async fn test_mapping_failure_is_reported() {
    let sink = Arc::new(RecordingSink::default());
    let authorizer = BatchAuthorizer::new(&enabled_config(), Arc::new(MockTransport::allow_all()))
        .with_metrics_sink(Arc::clone(&sink) as Arc<dyn MetricsSink>);

    let resources = vec![
        ResourceAttribute::new(ResourceType::HostInstance, Action::Find),
        model(Action::Archive, 1),
    ];
    assert!(authorizer.authorize_batch(&ctx(), &alice(), &resources).await.is_err());

    let batches = sink.batches.lock().unwrap().clone();
    assert_eq!(batches.len(), 1);
    assert!(!batches[0].success);
    assert_eq!(batches[0].skipped, 1);
    assert_eq!(batches[0].dispatches, 0);
    assert!(sink.dispatches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_authorize_without_checkable_resources() {
    let (authorizer, transport) = authorizer(MockTransport::passing(|_| false));
    let attribute = AuthAttribute {
        user: alice(),
        resources: vec![ResourceAttribute::new(ResourceType::Business, Action::SkipAction)],
    };
    let decision = authorizer.authorize(&ctx(), &attribute).await.unwrap();
    assert!(decision.authorized);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_authorize_folds_denials() {
    let (authorizer, _transport) =
        authorizer(MockTransport::passing(|e| e.resource_type == PolicyResourceType::SysEventPushing));
    let attribute = AuthAttribute {
        user: alice(),
        resources: vec![
            model(Action::Update, 1),
            ResourceAttribute::new(ResourceType::Business, Action::SkipAction),
            ResourceAttribute::new(ResourceType::EventPushing, Action::Create),
            ResourceAttribute::new(ResourceType::Business, Action::Update).with_instance(2),
        ],
    };

    let decision = authorizer.authorize(&ctx(), &attribute).await.unwrap();
    assert!(!decision.authorized);
    assert_eq!(
        decision.reason,
        "resource [model] permission deny by reason: no permission to edit sys_model; \
         resource [business] permission deny by reason: no permission to edit sys_project_instance"
    );
}

#[tokio::test]
async fn test_authorize_all_allowed() {
    let (authorizer, _transport) = authorizer(MockTransport::allow_all());
    let attribute = AuthAttribute {
        user: alice(),
        resources: vec![model(Action::Update, 1), host(3, 8)],
    };
    let decision = authorizer.authorize(&ctx(), &attribute).await.unwrap();
    assert_eq!(decision, Decision::allow(""));
}

#[tokio::test]
async fn test_bucketing_is_logged() {
    let (logs, _guard) = capture_logs();
    let (authorizer, _transport) = authorizer(MockTransport::allow_all());
    authorizer
        .authorize_batch(
            &ctx(),
            &alice(),
            &[model(Action::Update, 1), model(Action::Update, 2)],
        )
        .await
        .unwrap();

    let logs = logs.contents();
    assert!(logs.contains("AuthorizeBatch"), "logs: {logs}");
    assert!(logs.contains("Bucketed"), "logs: {logs}");
    assert!(logs.contains("buckets=1"), "logs: {logs}");
    assert!(logs.contains("allowed=2"), "logs: {logs}");
}
