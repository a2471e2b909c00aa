mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{CENTER_URL, ScriptedTransport, orders_instance};
use lodestar_client::{Method, Registrar};
use lodestar_core::RegistryError;

#[tokio::test(start_paused = true)]
async fn registration_sends_required_fields_only_by_default() {
    let transport = Arc::new(ScriptedTransport::repeating("ok"));
    let registrar = Registrar::new(transport.clone(), CENTER_URL);

    let handle = registrar.register(orders_instance()).await.unwrap();
    assert!(handle.is_running());

    let requests = transport.requests();
    let req = &requests[0];
    assert_eq!(req.method, Method::Put);
    assert_eq!(req.url, CENTER_URL);
    assert_eq!(req.get_param("ip"), Some("10.0.0.5"));
    assert_eq!(req.get_param("port"), Some("8080"));
    assert_eq!(req.get_param("serviceName"), Some("orders"));
    assert_eq!(req.get_param("metadata"), Some("{}"));
    for absent in ["weight", "enable", "healthy", "clusterName", "namespaceId"] {
        assert_eq!(req.get_param(absent), None, "{absent} should not be sent");
    }

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn registration_sends_optional_fields_when_set() {
    let transport = Arc::new(ScriptedTransport::repeating("OK"));
    let registrar = Registrar::new(transport.clone(), CENTER_URL);

    let mut instance = orders_instance()
        .with_weight(2)
        .enabled(true)
        .healthy(true)
        .with_cluster("DEFAULT")
        .with_namespace("public");
    instance.add_metadata("version", "1.4.2");

    let handle = registrar.register(instance).await.unwrap();

    let req = &transport.requests()[0];
    assert_eq!(req.get_param("weight"), Some("2"));
    assert_eq!(req.get_param("enable"), Some("true"));
    assert_eq!(req.get_param("healthy"), Some("true"));
    assert_eq!(req.get_param("clusterName"), Some("DEFAULT"));
    assert_eq!(req.get_param("namespaceId"), Some("public"));

    let metadata: serde_json::Value =
        serde_json::from_str(req.get_param("metadata").unwrap()).unwrap();
    assert_eq!(metadata, serde_json::json!({ "version": "1.4.2" }));

    handle.stop().await;
}

#[tokio::test]
async fn invalid_instance_fails_before_any_request() {
    let transport = Arc::new(ScriptedTransport::repeating("ok"));
    let registrar = Registrar::new(transport.clone(), CENTER_URL);

    let mut no_ip = orders_instance();
    no_ip.ip.clear();
    let mut no_port = orders_instance();
    no_port.port = 0;
    let mut no_name = orders_instance();
    no_name.service_name.clear();

    for instance in [no_ip, no_port, no_name] {
        let err = registrar.register(instance).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidInstance(_)));
    }

    let err = Registrar::new(transport.clone(), "")
        .register(orders_instance())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidInstance(_)));

    assert_eq!(transport.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn only_exact_ok_bodies_are_accepted() {
    for body in [" ok", "ok\n", "Ok", "", "caused: service not found"] {
        let transport = Arc::new(ScriptedTransport::new().reply(body));
        let registrar = Registrar::new(transport.clone(), CENTER_URL);

        let err = registrar.register(orders_instance()).await.unwrap_err();
        match err {
            RegistryError::RegistrationRejected(returned) => assert_eq!(returned, body),
            other => panic!("unexpected error for {body:?}: {other}"),
        }

        // a rejected registration never starts beating
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(transport.request_count(), 1);
    }
}

#[tokio::test]
async fn transport_failure_is_reported_as_such() {
    let transport = Arc::new(ScriptedTransport::new().fail("connection refused"));
    let registrar = Registrar::new(transport, CENTER_URL);

    let err = registrar.register(orders_instance()).await.unwrap_err();
    assert!(matches!(err, RegistryError::Transport(_)));
    assert!(err.to_string().contains("connection refused"));
}
