#![allow(clippy::unwrap_used)]
// `ControllerClient` against a wiremock controller.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unifi_exporter_api::{ControllerClient, ControllerPlatform, Error, TransportConfig};

// ── Fixtures ────────────────────────────────────────────────────────

async fn controller(platform: ControllerPlatform) -> (MockServer, ControllerClient) {
    let server = MockServer::start().await;
    let client = ControllerClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        platform,
    );
    (server, client)
}

async fn classic() -> (MockServer, ControllerClient) {
    controller(ControllerPlatform::ClassicController).await
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
}

fn rc_error(msg: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "error", "msg": msg } }))
}

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_owned())
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn login_posts_credentials_as_json() {
    let (server, client) = classic().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "username": "exporter", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.login("exporter", &password("s3cret")).await.unwrap();
}

#[tokio::test]
async fn console_login_uses_auth_path() {
    let (server, client) = controller(ControllerPlatform::UnifiOs).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.login("exporter", &password("pw")).await.unwrap();
}

#[tokio::test]
async fn rejected_login_carries_controller_reply() {
    let (server, client) = classic().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("api.err.Invalid"))
        .mount(&server)
        .await;

    match client.login("exporter", &password("wrong")).await {
        Err(Error::Authentication { message }) => {
            assert!(message.contains("400"), "{message}");
            assert!(message.contains("api.err.Invalid"), "{message}");
        }
        other => panic!("expected a refused login, got {other:?}"),
    }
}

#[tokio::test]
async fn logout_hits_platform_path() {
    let (server, client) = classic().await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();
}

#[tokio::test]
async fn configured_user_agent_is_sent() {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        user_agent: "scrape-test/0.0".into(),
        ..TransportConfig::default()
    };
    let client = ControllerClient::new(
        Url::parse(&server.uri()).unwrap(),
        ControllerPlatform::ClassicController,
        &transport,
    )
    .unwrap();
    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .and(header("user-agent", "scrape-test/0.0"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.list_sites().await.unwrap().is_empty());
}

// ── Platform detection ──────────────────────────────────────────────

#[tokio::test]
async fn auth_path_answering_means_console() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let detected = ControllerClient::detect_platform(&url, &TransportConfig::default())
        .await
        .unwrap();
    assert_eq!(detected, ControllerPlatform::UnifiOs);
}

#[tokio::test]
async fn missing_auth_path_means_classic() {
    // Unmatched requests get a 404 from wiremock.
    let server = MockServer::start().await;

    let url = Url::parse(&server.uri()).unwrap();
    let detected = ControllerClient::detect_platform(&url, &TransportConfig::default())
        .await
        .unwrap();
    assert_eq!(detected, ControllerPlatform::ClassicController);
}

// ── Stat calls ──────────────────────────────────────────────────────

#[tokio::test]
async fn sites_keep_short_name_and_description() {
    let (server, client) = classic().await;
    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(ok(json!([
            { "_id": "5a1", "name": "default", "desc": "Home", "role": "admin" },
            { "_id": "5a2", "name": "x8k2lq0a", "desc": "Office" }
        ])))
        .mount(&server)
        .await;

    let sites = client.list_sites().await.unwrap();
    let summary: Vec<(&str, Option<&str>)> = sites
        .iter()
        .map(|s| (s.name.as_str(), s.desc.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![("default", Some("Home")), ("x8k2lq0a", Some("Office"))]
    );
    assert_eq!(sites[1].id, "5a2");
}

#[tokio::test]
async fn devices_are_read_per_site() {
    let (server, client) = classic().await;
    Mock::given(method("GET"))
        .and(path("/api/s/branch/stat/device"))
        .respond_with(ok(json!([{
            "_id": "sw1",
            "mac": "aa:bb:cc:00:00:01",
            "type": "usw",
            "name": "Rack switch",
            "adopted": true,
            "state": 1,
            "uptime": 86400,
            "tx_bytes": 2048
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.list_devices("branch").await.unwrap();
    assert_eq!(devices.len(), 1);
    let switch = &devices[0];
    assert_eq!(switch.kind, "usw");
    assert_eq!(switch.name.as_deref(), Some("Rack switch"));
    assert!(switch.adopted);
    assert_eq!((switch.state, switch.uptime), (1, Some(86400)));
    assert_eq!((switch.rx_bytes, switch.tx_bytes), (None, Some(2048)));
}

#[tokio::test]
async fn console_stat_calls_go_through_proxy() {
    let (server, client) = controller(ControllerPlatform::UnifiOs).await;
    Mock::given(method("GET"))
        .and(path("/proxy/network/api/s/default/stat/sta"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.list_stations("default").await.unwrap().is_empty());
}

#[tokio::test]
async fn stations_report_radio_details() {
    let (server, client) = classic().await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sta"))
        .respond_with(ok(json!([
            {
                "_id": "sta1",
                "mac": "11:22:33:44:55:66",
                "hostname": "laptop",
                "is_wired": false,
                "signal": -61,
                "rssi": 35,
                "noise": -96,
                "essid": "home"
            },
            { "_id": "sta2", "mac": "11:22:33:44:55:77", "is_wired": true }
        ])))
        .mount(&server)
        .await;

    let stations = client.list_stations("default").await.unwrap();
    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].hostname.as_deref(), Some("laptop"));
    assert_eq!(
        (stations[0].signal, stations[0].noise),
        (Some(-61), Some(-96))
    );
    assert_eq!(stations[1].is_wired, Some(true));
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn http_401_asks_for_a_new_login() {
    let (server, client) = classic().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.list_devices("default").await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "{err:?}");
    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn login_required_code_asks_for_a_new_login() {
    let (server, client) = classic().await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sta"))
        .respond_with(rc_error("api.err.LoginRequired"))
        .mount(&server)
        .await;

    let err = client.list_stations("default").await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired), "{err:?}");
}

#[tokio::test]
async fn console_401_object_asks_for_a_new_login() {
    let (server, client) = controller(ControllerPlatform::UnifiOs).await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "error": { "code": 401, "message": "Unauthorized" } })),
        )
        .mount(&server)
        .await;

    assert!(client.list_sites().await.unwrap_err().is_auth_expired());
}

#[tokio::test]
async fn other_rc_errors_surface_their_code() {
    let (server, client) = classic().await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(rc_error("api.err.NoSiteContext"))
        .mount(&server)
        .await;

    match client.list_devices("default").await {
        Err(Error::Controller { message }) => assert_eq!(message, "api.err.NoSiteContext"),
        other => panic!("expected a controller error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_controller_errors() {
    let (server, client) = classic().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client.list_devices("default").await.unwrap_err();
    assert!(
        matches!(err, Error::Controller { ref message } if message.contains("502")),
        "{err:?}"
    );
    assert!(!err.is_auth_expired());
}

#[tokio::test]
async fn html_body_is_a_decode_error() {
    let (server, client) = classic().await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    match client.list_devices("default").await {
        Err(Error::Decode { body, .. }) => assert_eq!(body, "<html>login</html>"),
        other => panic!("expected a decode error, got {other:?}"),
    }
}
