use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bearer_session::session::{JsonFileSessionPersistence, SessionPersistence};
use bearer_session::{Config, Session};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::time::ManualClock;
use crate::common::{IDENTITY, Terminations, context_with, mint};

fn session_file(name: &str) -> PathBuf {
    let mut path = PathBuf::from("target");
    path.push("session-tests");
    path.push(format!("{name}-{}.json", uuid::Uuid::new_v4()));
    path
}

fn config(server: &MockServer, file: &PathBuf) -> Config {
    Config::from_values(
        server.uri(),
        None,
        Some(5),
        None,
        Some(file.to_string_lossy().to_string()),
    )
}

#[tokio::test(flavor = "current_thread")]
async fn restore_then_renew_persists_new_pair() {
    let server = MockServer::start().await;
    let renewed = mint(IDENTITY, 9_000);
    Mock::given(method("GET"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessToken": renewed,
            "refreshToken": "renewal-2",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = session_file("restore");
    let store = JsonFileSessionPersistence::new(&file);
    store
        .save(&Session::new(IDENTITY, mint(IDENTITY, 1_000).as_str(), "renewal-1"))
        .unwrap();

    let clock = ManualClock::at(990);
    let terminations = Arc::new(Terminations::default());
    let ctx = context_with(config(&server, &file), &clock, &terminations);
    assert!(ctx.restore().unwrap());

    ctx.coordinator().ensure_valid_token().await.expect("renewed");
    let on_disk = store.load().unwrap().expect("still persisted");
    assert_eq!(on_disk.access().as_str(), renewed);
    assert_eq!(on_disk.renewal().as_str(), "renewal-2");
    assert_eq!(on_disk.identity_id(), IDENTITY);
}

#[tokio::test(flavor = "current_thread")]
async fn termination_and_logout_clear_disk_but_teardown_does_not() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let file = session_file("clear");
    let clock = ManualClock::at(990);
    let terminations = Arc::new(Terminations::default());
    let ctx = context_with(config(&server, &file), &clock, &terminations);

    ctx.login(Session::new(IDENTITY, mint(IDENTITY, 5_000).as_str(), "renewal-1"));
    assert!(file.exists());
    ctx.teardown();
    assert!(ctx.session().is_none());
    assert!(file.exists(), "teardown keeps the durable copy");

    assert!(ctx.restore().unwrap());
    ctx.logout();
    assert!(!file.exists());

    ctx.login(Session::new(IDENTITY, mint(IDENTITY, 1_000).as_str(), "renewal-1"));
    assert!(ctx.coordinator().ensure_valid_token().await.is_none());
    assert!(!file.exists(), "termination clears the durable copy");
    assert_eq!(terminations.count(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn restore_without_file_reports_nothing_found() {
    let server = MockServer::start().await;
    let file = session_file("absent");
    let clock = ManualClock::at(0);
    let terminations = Arc::new(Terminations::default());
    let ctx = context_with(config(&server, &file), &clock, &terminations);
    assert!(!ctx.restore().unwrap());
    assert!(ctx.session().is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn renewal_settling_after_relogin_leaves_the_new_file_alone() {
    for status in [200, 500] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(serde_json::json!({
                        "accessToken": mint(IDENTITY, 5_000),
                        "refreshToken": "old-user-renewal-2",
                    }))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let file = session_file("relogin");
        let clock = ManualClock::at(990);
        let terminations = Arc::new(Terminations::default());
        let ctx = context_with(config(&server, &file), &clock, &terminations);
        ctx.login(Session::new(IDENTITY, mint(IDENTITY, 1_000).as_str(), "renewal-1"));
        let replacement = Session::new("user-99", mint("user-99", 9_000).as_str(), "new-renewal");

        let coordinator = ctx.coordinator();
        let relogin = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            ctx.logout();
            ctx.login(replacement.clone());
        };
        let (token, ()) = tokio::join!(coordinator.ensure_valid_token(), relogin);

        assert!(token.is_none(), "status {status}");
        let on_disk = JsonFileSessionPersistence::new(&file).load().unwrap();
        assert_eq!(on_disk, Some(replacement), "status {status}");
        assert_eq!(terminations.count(), 0, "status {status}");
    }
}
