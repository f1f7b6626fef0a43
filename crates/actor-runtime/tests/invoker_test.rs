use actor_runtime::action_error::{codes, ActionError};
use actor_runtime::config::InvokerConfig;
use actor_runtime::message::{action_defs, ActionDef, ActorCall};
use actor_runtime::mock::{MockRegistry, MockTransport};
use actor_runtime::registry::{
    ActorInfo, ActorPlacement, ActorRegistryPusher, ApplicationInfo, LocalActorRegistry,
};
use actor_runtime::{
    ActionName, ActorClient, ActorContainer, ActorId, ActorType, ActorTypeRegistration,
    Dispatcher, DynamicInvoker, FixedBackOff, InstanceWrapper, InvokeRequest, LocalTransport,
    PlacementCache, Value, WrapperFactory,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

// --- Helpers ---

fn info(applications: &[&str], placement: ActorPlacement) -> ActorInfo {
    ActorInfo {
        applications: applications.iter().map(|name| ApplicationInfo::new(*name)).collect(),
        placement,
    }
}

fn invoker(transport: Arc<MockTransport>, registry: Arc<MockRegistry>) -> DynamicInvoker {
    DynamicInvoker::new(
        transport,
        registry,
        Arc::new(PlacementCache::default()),
        &InvokerConfig::default(),
    )
    .with_backoff(Arc::new(FixedBackOff::new(Duration::from_millis(1), 3, 0.0)))
}

fn redirect_to(host: &str) -> ActionError {
    ActionError::framework("MOVED", "Instance moved")
        .with_param(codes::REDIRECT_DESTINATION, vec![host.to_string()])
}

fn request() -> InvokeRequest {
    InvokeRequest::new("Counter", "7", "increment", vec![Value::from(1i64)])
}

// --- Receiver Selection ---

#[tokio::test(start_paused = true)]
async fn test_no_applications_exhausts_backoff() {
    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(MockRegistry::new());
    let invoker = invoker(transport.clone(), registry);

    let error = invoker.invoke(request()).await.unwrap_err();
    assert_eq!(error.code, codes::INVOKE_ERROR);
    assert_eq!(error.nested.len(), 3);
    assert!(error
        .nested
        .iter()
        .all(|cause| cause.code == codes::NO_RECEIVERS_AVAILABLE));
    assert_eq!(error.param("ActionName"), Some(&Value::from("increment")));
    assert!(transport.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sticky_first_attempt_is_lazy_and_redirect_is_immediate() {
    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(MockRegistry::new());
    registry.set("Counter", info(&["host-a", "host-c"], ActorPlacement::sticky()));
    transport.expect_invoke().return_err(redirect_to("host-b"));
    transport.expect_invoke().on("host-b").return_ok("done");
    let invoker = invoker(transport.clone(), registry);

    let started = Instant::now();
    let result = invoker.invoke(request()).await;
    assert_eq!(result, Ok(Value::from("done")));
    // A redirect does not consume back-off time.
    assert_eq!(started.elapsed(), Duration::ZERO);

    let requests = transport.requests();
    assert!(requests[0].lazy);
    assert!(matches!(requests[0].receiver.as_str(), "host-a" | "host-c"));
    assert_eq!(requests[1].receiver, "host-b");
    assert!(!requests[1].lazy);

    let cache = invoker.placement_cache();
    let key = cache.prepare(&ActorType::new("Counter"), &ActorId::from("7"));
    assert_eq!(cache.get(&key), Some("host-b".to_string()));
    transport.verify();
}

#[tokio::test(start_paused = true)]
async fn test_stale_cache_entry_is_dropped_on_retry() {
    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(MockRegistry::new());
    registry.set("Counter", info(&["host-a"], ActorPlacement::sticky()));
    let invoker = invoker(transport.clone(), registry);

    let counter = ActorType::new("Counter");
    let id = ActorId::from("7");
    invoker.placement_cache().update(&counter, &id, "host-z");

    transport
        .expect_invoke()
        .on("host-z")
        .return_err(ActionError::framework(codes::DEACTIVATED, "Gone"));
    transport.expect_invoke().on("host-a").return_ok(1i64);

    assert_eq!(invoker.invoke(request()).await, Ok(Value::from(1i64)));
    let lazy: Vec<bool> = transport.requests().iter().map(|r| r.lazy).collect();
    assert_eq!(lazy, vec![true, false]);

    let key = invoker.placement_cache().prepare(&counter, &id);
    assert_eq!(invoker.placement_cache().get(&key), Some("host-a".to_string()));
    transport.verify();
}

#[tokio::test]
async fn test_bind_index_routes_to_id_segment() {
    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(MockRegistry::new());
    // Registered applications are ignored when a bind index is set.
    registry.set("Shard", info(&["host-a"], ActorPlacement::bound_to(-1)));
    transport.expect_invoke().on("host-c").return_ok(());
    let invoker = invoker(transport.clone(), registry);

    let id = ActorId::new(["tenant-1", "host-c"]);
    let result = invoker
        .invoke(InvokeRequest::new("Shard", id, "flush", vec![]))
        .await;
    assert_eq!(result, Ok(Value::Null));
    assert!(!transport.requests()[0].lazy);
    transport.verify();
}

#[tokio::test(start_paused = true)]
async fn test_bind_index_out_of_range_has_no_receiver() {
    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(MockRegistry::new());
    registry.set("Shard", info(&["host-a"], ActorPlacement::bound_to(3)));
    let invoker = invoker(transport.clone(), registry);

    let error = invoker
        .invoke(InvokeRequest::new("Shard", "only-one", "flush", vec![]))
        .await
        .unwrap_err();
    assert_eq!(error.code, codes::INVOKE_ERROR);
    assert_eq!(error.nested[0].code, codes::NO_RECEIVERS_AVAILABLE);
    assert!(transport.requests().is_empty());
}

// --- Retry Policy ---

#[tokio::test]
async fn test_application_error_is_not_retried() {
    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(MockRegistry::new());
    registry.set("Counter", info(&["host-a"], ActorPlacement::default()));
    transport
        .expect_invoke()
        .return_err(ActionError::application("OVERFLOW", "Counter overflowed"));
    let invoker = invoker(transport.clone(), registry);

    let error = invoker.invoke(request()).await.unwrap_err();
    assert_eq!(error.code, "OVERFLOW");
    assert!(error.nested.is_empty());
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_max_attempts_caps_redirect_loop() {
    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(MockRegistry::new());
    registry.set("Counter", info(&["host-a"], ActorPlacement::default()));
    for _ in 0..3 {
        transport.expect_invoke().return_err(redirect_to("host-a"));
    }
    let config = InvokerConfig {
        max_attempts: 3,
        ..Default::default()
    };
    let invoker = DynamicInvoker::new(
        transport.clone(),
        registry,
        Arc::new(PlacementCache::default()),
        &config,
    );

    let error = invoker.invoke(request()).await.unwrap_err();
    assert_eq!(error.code, codes::INVOKE_ERROR);
    assert_eq!(error.nested.len(), 3);
    assert_eq!(
        error.param("FirstMessage").unwrap().as_str(),
        Ok(error.nested[0].message.as_str())
    );
    transport.verify();
}

#[tokio::test(start_paused = true)]
async fn test_framework_error_waits_before_retry() {
    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(MockRegistry::new());
    registry.set("Counter", info(&["host-a"], ActorPlacement::default()));
    transport
        .expect_invoke()
        .return_err(ActionError::framework(codes::DEACTIVATED, "Gone"));
    transport.expect_invoke().return_ok(2i64);
    let invoker = invoker(transport.clone(), registry);

    let started = Instant::now();
    assert_eq!(invoker.invoke(request()).await, Ok(Value::from(2i64)));
    assert!(started.elapsed() >= Duration::from_millis(1));
    transport.verify();
}

// --- Local Cluster ---

struct Doubler;

#[async_trait]
impl InstanceWrapper for Doubler {
    async fn perform(&self, _action: &ActionName, args: Vec<Value>) -> Result<Value, ActionError> {
        let n = args
            .first()
            .map(Value::as_i64)
            .transpose()
            .map_err(|e| ActionError::application("BAD_ARGUMENT", e.to_string()))?
            .unwrap_or_default();
        Ok(Value::from(n * 2))
    }
}

#[tokio::test]
async fn test_local_cluster_round_trip() {
    let registry = Arc::new(LocalActorRegistry::new());
    let dispatcher = Arc::new(Dispatcher::new(
        "host-a",
        Some(registry.clone() as Arc<dyn ActorRegistryPusher>),
    ));
    let factory: WrapperFactory = Arc::new(|_id: &ActorId| Arc::new(Doubler) as Arc<dyn InstanceWrapper>);
    let container = ActorContainer::builder(
        ActorType::new("Doubler"),
        action_defs([("double", ActionDef::shared())]),
        factory,
    )
    .build();
    dispatcher.register(ActorTypeRegistration::new(container, ActorPlacement::sticky()));

    let transport = Arc::new(LocalTransport::new());
    transport.attach(dispatcher.clone());
    let invoker = Arc::new(DynamicInvoker::new(
        transport.clone(),
        registry,
        Arc::new(PlacementCache::default()),
        &InvokerConfig::default(),
    ));

    let client = ActorClient::new(invoker.clone(), "Doubler");
    let doubled: i64 = client
        .call_as("x", "double", vec![Value::from(21i64)])
        .await
        .unwrap();
    assert_eq!(doubled, 42);

    // A result of the wrong shape is a conversion failure, not a retry.
    let error = client
        .call_as::<bool>("x", "double", vec![Value::from(1i64)])
        .await
        .unwrap_err();
    assert_eq!(error.code, codes::RESULT_CONVERSION_FAILED);

    // Unknown types are refused by the receiving dispatcher.
    let error = dispatcher
        .call(ActorCall::new("Ghost", "1", "boo", vec![]))
        .await
        .unwrap_err();
    assert_eq!(error.code, codes::ACTOR_TYPE_NOT_REGISTERED);
    let error = dispatcher
        .call(ActorCall::new("", "1", "boo", vec![]))
        .await
        .unwrap_err();
    assert_eq!(error.code, codes::ACTOR_TYPE_MISSING);

    dispatcher.stop().await;
}

#[tokio::test]
async fn test_detached_host_is_unreachable() {
    let transport = LocalTransport::new();
    transport.attach(Arc::new(Dispatcher::new("host-a", None)));
    assert!(transport.detach("host-a").is_some());

    let request = actor_runtime::TransportRequest {
        receiver: "host-a".to_string(),
        actor_type: ActorType::new("Doubler"),
        actor_id: ActorId::from("x"),
        action_name: ActionName::new("double"),
        arguments: vec![],
        lazy: false,
    };
    let error = actor_runtime::TransportInvoker::invoke(&transport, request)
        .await
        .unwrap_err();
    assert_eq!(error.code, codes::RECEIVER_UNREACHABLE);
}
