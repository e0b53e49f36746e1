use super::models::TargetChangeType;
use super::{FirestoreClient, FirestoreError};
use crate::core::SessionToken;
use futures::StreamExt;
use httpmock::Method::POST;
use httpmock::MockServer;

fn client_for(server: &MockServer) -> FirestoreClient {
    FirestoreClient::new_with_url(
        SessionToken::new(),
        server.url("/v1/projects/p/databases/(default)/documents"),
    )
}

#[tokio::test]
async fn listen_collection_yields_framed_events() {
    let server = MockServer::start();
    let db = client_for(&server);

    let listen_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/p/databases/(default)/documents:listen")
            .body_contains("traducciones");
        then.status(200).body(
            r#"[{"targetChange":{"targetChangeType":"ADD"}},
{"documentChange":{"document":{"name":"projects/p/databases/(default)/documents/traducciones/logout","fields":{"es":{"stringValue":"Salir"},"en":{"stringValue":"Logout"}}}}},
{"targetChange":{"targetChangeType":"CURRENT"}},
{"targetChange":{"targetChangeType":"NO_CHANGE","readTime":"2024-01-01T00:00:00Z"}}]"#,
        );
    });

    let mut stream = db
        .listen_collection("traducciones", None)
        .await
        .expect("listen should open");

    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event.expect("well-formed event"));
    }

    assert_eq!(events.len(), 4);
    let doc = events[1]
        .document_change
        .as_ref()
        .expect("second event is a document change");
    assert_eq!(doc.document.id(), "logout");
    assert_eq!(doc.document.string_field("es"), Some("Salir"));
    assert_eq!(
        events[3]
            .target_change
            .as_ref()
            .expect("consistency marker")
            .target_change_type,
        TargetChangeType::NoChange
    );
    listen_mock.assert();
}

#[tokio::test]
async fn listen_collection_sends_ascending_order() {
    let server = MockServer::start();
    let db = client_for(&server);

    let listen_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/p/databases/(default)/documents:listen")
            .body_contains(r#""fieldPath":"order""#)
            .body_contains("ASCENDING");
        then.status(200).body("[]");
    });

    let mut stream = db
        .listen_collection("tutoriales_login", Some("order"))
        .await
        .expect("listen should open");
    assert!(stream.next().await.is_none());
    listen_mock.assert();
}

#[tokio::test]
async fn listen_failure_surfaces_as_api_error() {
    let server = MockServer::start();
    let db = client_for(&server);

    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/p/databases/(default)/documents:listen");
        then.status(403).body("denied");
    });

    let err = db
        .listen_collection("traducciones", None)
        .await
        .expect_err("listen should be rejected");
    assert!(matches!(err, FirestoreError::Api(_)));
}

#[tokio::test]
async fn truncated_stream_reports_an_error() {
    let server = MockServer::start();
    let db = client_for(&server);

    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/p/databases/(default)/documents:listen");
        then.status(200).body(r#"[{"targetChange":{"target"#);
    });

    let mut stream = db
        .listen_collection("traducciones", None)
        .await
        .expect("listen should open");
    let err = stream
        .next()
        .await
        .expect("one item")
        .expect_err("incomplete frame is an error");
    assert!(matches!(err, FirestoreError::Api(_)));
}
