#![allow(clippy::unwrap_used)]
// End-to-end cycles against wiremock Pi-hole instances.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use failover_core::{Action, Appliance, Controller, ControllerConfig, Priority};

// ── Helpers ─────────────────────────────────────────────────────────

async fn pihole(dhcp_active: bool) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session": { "valid": true, "sid": "sid", "csrf": "csrf", "validity": 300 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/config/dhcp"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "config": { "dhcp": { "active": dhcp_active } } })),
        )
        .mount(&server)
        .await;

    server
}

async fn expect_write(server: &MockServer, active: bool, times: u64) {
    Mock::given(method("PATCH"))
        .and(path("/api/config"))
        .and(body_json(json!({ "config": { "dhcp": { "active": active } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "took": 0.1 })))
        .expect(times)
        .mount(server)
        .await;
}

fn config(addresses: &[(Priority, String)]) -> ControllerConfig {
    let appliances = addresses
        .iter()
        .map(|(p, addr)| Appliance::new(*p, addr, SecretString::from("pw")).unwrap())
        .collect();
    let mut config = ControllerConfig::new(appliances, Duration::from_secs(60)).unwrap();
    config.request_timeout = Duration::from_secs(2);
    config
}

/// An address nothing listens on.
fn dead_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn failover_when_primary_is_down() {
    let secondary = pihole(false).await;
    let tertiary = pihole(true).await;
    expect_write(&secondary, true, 1).await;
    expect_write(&tertiary, false, 1).await;

    let cfg = config(&[
        (Priority::Primary, dead_address()),
        (Priority::Secondary, secondary.uri()),
        (Priority::Tertiary, tertiary.uri()),
    ]);
    let mut ctl = Controller::pihole(&cfg).unwrap();

    let report = ctl.run_cycle().await;

    assert_eq!(report.selected, Some(Priority::Secondary));
    assert!(!report.appliances[0].reachable);
    assert_eq!(report.appliances[0].action, Action::Skip);
    assert!(report.is_converged());
}

#[tokio::test]
async fn healthy_primary_keeps_dhcp_without_writes() {
    let primary = pihole(true).await;
    let secondary = pihole(false).await;
    expect_write(&primary, true, 0).await;
    expect_write(&secondary, false, 0).await;

    let cfg = config(&[
        (Priority::Primary, primary.uri()),
        (Priority::Secondary, secondary.uri()),
    ]);
    let mut ctl = Controller::pihole(&cfg).unwrap();

    let report = ctl.run_cycle().await;

    assert_eq!(report.selected, Some(Priority::Primary));
    assert_eq!(report.writes(), 0);
}

#[tokio::test]
async fn bad_app_password_fails_over() {
    let primary = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "session": { "valid": false, "sid": null, "message": "password incorrect" }
        })))
        .mount(&primary)
        .await;
    let secondary = pihole(false).await;
    expect_write(&secondary, true, 1).await;

    let cfg = config(&[
        (Priority::Primary, primary.uri()),
        (Priority::Secondary, secondary.uri()),
    ]);
    let mut ctl = Controller::pihole(&cfg).unwrap();

    let report = ctl.run_cycle().await;

    assert_eq!(report.selected, Some(Priority::Secondary));
}

#[tokio::test]
async fn shutdown_logs_out_of_every_session() {
    let primary = pihole(true).await;
    let secondary = pihole(false).await;
    for server in [&primary, &secondary] {
        Mock::given(method("DELETE"))
            .and(path("/api/auth"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(server)
            .await;
    }

    let cfg = config(&[
        (Priority::Primary, primary.uri()),
        (Priority::Secondary, secondary.uri()),
    ]);
    let mut ctl = Controller::pihole(&cfg).unwrap();

    let shutdown = tokio_util::sync::CancellationToken::new();
    shutdown.cancel();
    ctl.run(shutdown).await;
}
