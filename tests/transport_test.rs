//! Client behavior on failure modes the real server never produces:
//! 5xx answers, bodies with neither `task` nor `errors`, unparseable JSON,
//! and a server that is not there at all.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskpad::client::{ClientError, TaskClient};
use taskpad::model::TaskRecord;

fn draft() -> TaskRecord {
    let mut d = TaskRecord::new();
    d.set("title", "anything");
    d.set("description", "long enough");
    d
}

#[tokio::test]
async fn server_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = TaskClient::new(server.uri());
    let err = client.list().await.unwrap_err();
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn mutation_body_with_neither_task_nor_errors_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = TaskClient::new(server.uri());
    let err = client.create(&draft()).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn unparseable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = TaskClient::new(server.uri());
    let err = client.list().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_server_is_an_http_error() {
    // Bind and immediately drop a listener so the port is free but closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = TaskClient::new(format!("http://127.0.0.1:{port}"));
    let err = client.list().await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn delete_ignores_the_ack_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/task/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("whatever"))
        .mount(&server)
        .await;

    let client = TaskClient::new(server.uri());
    client.delete(7).await.unwrap();
}
