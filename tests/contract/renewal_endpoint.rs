use bearer_session::Error;
use bearer_session::token::RenewalEndpoint;
use reqwest::{Client, Url};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoint(server: &MockServer) -> RenewalEndpoint {
    RenewalEndpoint::new(Client::new(), Url::parse(&server.uri()).unwrap())
}

#[tokio::test]
async fn renewal_sends_identity_and_renewal_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/refresh"))
        .and(query_param("id", "user 42/x"))
        .and(header("Authorization", "Bearer renew-me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessToken": "new-access",
            "refreshToken": "new-renewal",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (access, renewal) = endpoint(&server)
        .renew("user 42/x", &"renew-me".into())
        .await
        .expect("renewal succeeds");
    assert_eq!(access.as_str(), "new-access");
    assert_eq!(renewal.as_str(), "new-renewal");
}

#[tokio::test]
async fn url_encodes_identity() {
    let server = MockServer::start().await;
    let url = endpoint(&server).url_for("a&b=c");
    assert_eq!(url, format!("{}/auth/refresh?id=a%26b%3Dc", server.uri()));
}

#[tokio::test]
async fn non_success_status_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(403).set_body_string("expired renewal"))
        .mount(&server)
        .await;

    let err = endpoint(&server)
        .renew("u", &"r".into())
        .await
        .expect_err("403 is a failure");
    match err {
        Error::RenewalRejected(status, body) => {
            assert_eq!(status.as_u16(), 403);
            assert!(body.contains("expired renewal"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn body_missing_a_credential_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "accessToken": "only-access" })),
        )
        .mount(&server)
        .await;

    let err = endpoint(&server)
        .renew("u", &"r".into())
        .await
        .expect_err("missing refreshToken");
    assert!(matches!(err, Error::MalformedRenewal(ref msg) if msg.contains("refreshToken")));
    assert!(err.is_renewal_failure());
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = endpoint(&server).renew("u", &"r".into()).await.unwrap_err();
    assert!(matches!(err, Error::MalformedRenewal(_)));
}

#[tokio::test]
async fn truncated_success_body_surfaces_as_transport_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await.unwrap();
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{\"accessToken\":")
            .await
            .unwrap();
    });

    let endpoint = RenewalEndpoint::new(
        Client::new(),
        Url::parse(&format!("http://{addr}")).unwrap(),
    );
    let err = endpoint.renew("user-42", &"renew-me".into()).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "unexpected error: {err:?}");
}
