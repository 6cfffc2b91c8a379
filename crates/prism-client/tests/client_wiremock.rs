use prism_client::{ErrorKind, PrismApi, PrismClient, TaskStatus, EMPTY_FILTER, LIST_PAGE_SIZE};
use prism_common::PrismCredentials;
use serde_json::json;
use wiremock::{
    matchers::{basic_auth, body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn client_for(server: &MockServer) -> PrismClient {
    let addr = server.address();
    let creds = PrismCredentials {
        endpoint: format!("http://{}", addr.ip()),
        port: addr.port(),
        username: "admin".to_string(),
        password: "s3cret".to_string(),
        insecure: false,
    };
    PrismClient::connect(&creds).unwrap()
}

fn vm(uuid: &str, name: &str, infra_id: &str) -> serde_json::Value {
    json!({
        "metadata": {
            "kind": "vm",
            "uuid": uuid,
            "categories": { format!("kubernetes-io-cluster-{}", infra_id): "owned" }
        },
        "spec": { "name": name }
    })
}

#[tokio::test]
async fn list_vms_sends_credentials_and_converts_entities() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/nutanix/v3/vms/list"))
        .and(basic_auth("admin", "s3cret"))
        .and(body_partial_json(json!({"kind": "vm", "offset": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": [vm("vm-1", "abc123-master-0", "abc123"), vm("vm-2", "other", "xyz999")],
            "metadata": { "kind": "vm", "total_matches": 2, "length": 2, "offset": 0 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vms = client_for(&server).list_vms(EMPTY_FILTER).await.unwrap();

    assert_eq!(vms.len(), 2);
    assert_eq!(vms[0].uuid, "vm-1");
    assert_eq!(vms[0].name, "abc123-master-0");
    assert_eq!(
        vms[1].categories.get("kubernetes-io-cluster-xyz999"),
        Some(&"owned".to_string())
    );
}

#[tokio::test]
async fn list_pages_until_total_matches_reached() {
    let server = MockServer::start().await;
    let first_page: Vec<_> = (0..LIST_PAGE_SIZE)
        .map(|i| vm(&format!("vm-{}", i), "n", "abc123"))
        .collect();

    Mock::given(method("POST"))
        .and(path("/api/nutanix/v3/images/list"))
        .and(body_partial_json(json!({"offset": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": first_page,
            "metadata": { "total_matches": LIST_PAGE_SIZE + 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/nutanix/v3/images/list"))
        .and(body_partial_json(json!({"offset": LIST_PAGE_SIZE})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": [vm("last", "n", "abc123")],
            "metadata": { "total_matches": LIST_PAGE_SIZE + 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let images = client_for(&server).list_images(EMPTY_FILTER).await.unwrap();
    assert_eq!(images.len() as u32, LIST_PAGE_SIZE + 1);
    assert_eq!(images.last().unwrap().uuid, "last");
}

#[tokio::test]
async fn list_keeps_paging_full_pages_without_total_matches() {
    let server = MockServer::start().await;
    let first_page: Vec<_> = (0..LIST_PAGE_SIZE)
        .map(|i| vm(&format!("vm-{}", i), "n", "abc123"))
        .collect();

    Mock::given(method("POST"))
        .and(path("/api/nutanix/v3/vms/list"))
        .and(body_partial_json(json!({"offset": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": first_page,
            "metadata": { "kind": "vm" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/nutanix/v3/vms/list"))
        .and(body_partial_json(json!({"offset": LIST_PAGE_SIZE})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": [vm("tail-1", "n", "abc123"), vm("tail-2", "n", "abc123")],
            "metadata": { "kind": "vm" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vms = client_for(&server).list_vms(EMPTY_FILTER).await.unwrap();
    assert_eq!(vms.len() as u32, LIST_PAGE_SIZE + 2);
    assert_eq!(vms.last().unwrap().uuid, "tail-2");
}

#[tokio::test]
async fn delete_vm_returns_task_uuid() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/nutanix/v3/vms/vm-1"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "status": {
                "state": "DELETE_PENDING",
                "execution_context": { "task_uuid": "task-1" }
            },
            "spec": "",
            "api_version": "3.1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let task = client_for(&server).delete_vm("vm-1").await.unwrap();
    assert_eq!(task, "task-1");
}

#[tokio::test]
async fn missing_category_key_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/nutanix/v3/categories/kubernetes-io-cluster-abc123"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "state": "ERROR",
            "code": 404,
            "message_list": [{
                "reason": "ENTITY_NOT_FOUND",
                "message": "category kubernetes-io-cluster-abc123 does not exist"
            }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_category_key("kubernetes-io-cluster-abc123")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn category_values_listed_and_deleted() {
    let server = MockServer::start().await;
    let key = "kubernetes-io-cluster-abc123";

    Mock::given(method("POST"))
        .and(path(format!("/api/nutanix/v3/categories/{}/list", key)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": [
                { "name": key, "value": "owned", "system_defined": false },
                { "name": key, "value": "shared", "system_defined": false }
            ],
            "metadata": { "kind": "category", "total_matches": 2 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/nutanix/v3/categories/{}/owned", key)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let values = client.list_category_values(key).await.unwrap();
    assert_eq!(values, vec!["owned".to_string(), "shared".to_string()]);

    client.delete_category_value(key, "owned").await.unwrap();
}

#[tokio::test]
async fn task_status_and_messages_parsed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/nutanix/v3/tasks/task-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uuid": "task-9",
            "status": "FAILED",
            "error_detail": "Image is in use",
            "progress_message": "Delete image",
            "percentage_complete": 100
        })))
        .mount(&server)
        .await;

    let task = client_for(&server).get_task("task-9").await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error_detail.as_deref(), Some("Image is in use"));
    assert_eq!(task.progress_message.as_deref(), Some("Delete image"));
}

#[tokio::test]
async fn server_errors_are_transient_auth_errors_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/nutanix/v3/vms/list"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/nutanix/v3/volume_groups/list"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "state": "ERROR",
            "message_list": [{ "message": "Authentication required." }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.list_vms(EMPTY_FILTER).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transient);
    assert_eq!(err.status(), Some(503));

    let err = client.list_volume_groups(EMPTY_FILTER).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fatal);
    assert!(err.to_string().contains("Authentication required."));
}

#[tokio::test]
async fn undecodable_body_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/nutanix/v3/images/img-1"))
        .respond_with(ResponseTemplate::new(202).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).delete_image("img-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fatal);
}

#[tokio::test]
async fn unreachable_endpoint_is_transient() {
    // Free an ephemeral port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let creds = PrismCredentials {
        endpoint: "http://127.0.0.1".to_string(),
        port,
        username: "admin".to_string(),
        password: "s3cret".to_string(),
        insecure: false,
    };
    let client = PrismClient::connect(&creds).unwrap();

    let err = client.get_task("task-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transient);
}
