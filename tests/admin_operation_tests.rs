mod common;

use index_server_sdk::query::SelectionCriteria;
use index_server_sdk::transport::MockTransport;
use index_server_sdk::{IndexServerError, IndexServerTopology, NodeRecord};
use reqwest::{Method, StatusCode};
use serde_json::json;
use std::sync::Arc;

use common::{client_with, single_node, two_nodes};

#[tokio::test]
async fn test_delete_docs_sends_bare_clause() {
    let transport = Arc::new(
        MockTransport::new().with_json(json!({"responseHeader": {"status": 0, "QTime": 3}})),
    );
    let client = client_with(single_node(), transport.clone(), None);

    let selection = SelectionCriteria::new()
        .field("owner", "alice")
        .any_of("tag", ["a", "b"]);
    client.delete_docs("c1", Some(&selection)).await.unwrap();

    let requests = transport.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(
        requests[0].url,
        "http://h1:20000/solr/c1/update?commitWithin=1000&overwrite=true&wt=json"
    );
    assert_eq!(
        requests[0].body,
        Some(json!({"delete": {"query": "owner:alice AND (tag:a OR tag:b)"}}))
    );
}

#[tokio::test]
async fn test_delete_without_selection_matches_all() {
    let transport = Arc::new(MockTransport::new().with_response(StatusCode::OK, ""));
    let client = client_with(single_node(), transport.clone(), None);

    client.delete_docs("c1", None).await.unwrap();

    let requests = transport.requests().await;
    assert_eq!(requests[0].body, Some(json!({"delete": {"query": "*:*"}})));
}

#[tokio::test]
async fn test_delete_reports_backend_error() {
    let transport = Arc::new(MockTransport::new().with_json(json!({
        "responseHeader": {"status": 400},
        "error": {"msg": "undefined field owner", "code": 400}
    })));
    let client = client_with(single_node(), transport, None);

    match client.delete_docs("c1", None).await.unwrap_err() {
        IndexServerError::BackendReportedError(msg) => {
            assert!(msg.contains("undefined field owner"))
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_reports_bad_header_status() {
    let transport = Arc::new(MockTransport::new().with_json(json!({"responseHeader": {"status": "500"}})));
    let client = client_with(single_node(), transport, None);

    let err = client.delete_docs("c1", None).await.unwrap_err();
    assert!(matches!(err, IndexServerError::BackendReportedError(_)));
}

#[tokio::test]
async fn test_delete_forbidden_has_no_fallback() {
    let transport = Arc::new(MockTransport::new().with_response(StatusCode::FORBIDDEN, ""));
    let client = client_with(single_node(), transport, None);

    let err = client.delete_docs("c1", None).await.unwrap_err();
    assert!(matches!(
        err,
        IndexServerError::TransportRejected { status: 403, .. }
    ));
}

#[tokio::test]
async fn test_cloud_mode_rejects_updates() {
    let topology = IndexServerTopology::new(
        "cloud1",
        vec![NodeRecord::new("n1", "h1", "http://h1:20000", 20000, 11)],
    )
    .unwrap()
    .with_server_type(index_server_sdk::topology::CLOUD_SERVER_TYPE);
    let transport = Arc::new(MockTransport::new());
    let client = client_with(topology, transport.clone(), None);

    assert!(matches!(
        client.delete_docs("c1", None).await,
        Err(IndexServerError::UnsupportedForCloud(_))
    ));
    assert!(matches!(
        client.hard_commit("c1").await,
        Err(IndexServerError::UnsupportedForCloud(_))
    ));
    assert!(transport.requests().await.is_empty());
}

#[tokio::test]
async fn test_hard_commit() {
    let transport = Arc::new(MockTransport::new().with_json(json!({"responseHeader": {"status": 0}})));
    let client = client_with(two_nodes(), transport.clone(), None);

    client.hard_commit("c1").await.unwrap();

    let requests = transport.requests().await;
    assert_eq!(requests[0].url, "http://h1:20000/solr/c1/update?commit=true");
}

#[tokio::test]
async fn test_hard_commit_non_integer_status_fails() {
    let transport = Arc::new(MockTransport::new().with_json(json!({"responseHeader": {"status": "ERR"}})));
    let client = client_with(single_node(), transport, None);

    let err = client.hard_commit("c1").await.unwrap_err();
    assert!(matches!(err, IndexServerError::BackendReportedError(_)));
}

#[tokio::test]
async fn test_get_all_cores_keeps_payload_order() {
    let transport = Arc::new(MockTransport::new().with_json(json!({
        "responseHeader": {"status": 0},
        "status": {
            "mailcore": {"name": "mailcore", "index": {"numDocs": 10}},
            "filecore": {"name": "filecore", "index": {"numDocs": 4}}
        }
    })));
    let client = client_with(single_node(), transport.clone(), None);

    let cores = client.get_all_cores(None).await.unwrap();
    assert_eq!(cores.names, vec!["mailcore", "filecore"]);
    assert_eq!(cores.status["filecore"]["index"]["numDocs"], json!(4));
    assert_eq!(
        transport.requests().await[0].url,
        "http://h1:20000/solr/admin/cores"
    );
}

#[tokio::test]
async fn test_get_all_cores_backend_error() {
    let transport = Arc::new(MockTransport::new().with_json(json!({"error": {"msg": "core admin disabled"}})));
    let client = client_with(single_node(), transport, None);

    match client.get_all_cores(None).await.unwrap_err() {
        IndexServerError::BackendReportedError(msg) => assert!(msg.contains("core admin disabled")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_node_scoped_operations_need_name_on_multi_node() {
    let transport = Arc::new(MockTransport::new());
    let client = client_with(two_nodes(), transport.clone(), None);

    assert!(matches!(
        client.get_all_cores(None).await,
        Err(IndexServerError::NodeNameRequired { .. })
    ));
    assert!(matches!(
        client.get_health_indicators(None).await,
        Err(IndexServerError::NodeNameRequired { .. })
    ));
    assert!(transport.requests().await.is_empty());
}

#[tokio::test]
async fn test_health_indicators_on_named_node() {
    let xml = "<response><status>OK</status></response>";
    let transport = Arc::new(MockTransport::new().with_response(StatusCode::OK, xml));
    let client = client_with(two_nodes(), transport.clone(), None);

    let body = client.get_health_indicators(Some("n2")).await.unwrap();
    assert_eq!(body, xml);

    let requests = transport.requests().await;
    assert_eq!(requests[0].url, "http://h2:20000/solr/rest/admin/healthsummary");
    assert!(requests[0]
        .headers
        .contains(&("Accept".to_string(), "application/xml".to_string())));
}

#[tokio::test]
async fn test_index_node_lookup() {
    let client = client_with(two_nodes(), Arc::new(MockTransport::new()), None);

    assert_eq!(client.index_node("n2").unwrap().host_name, "h2");
    assert!(matches!(
        client.index_node("N2"),
        Err(IndexServerError::NodeNotFound { .. })
    ));
}
