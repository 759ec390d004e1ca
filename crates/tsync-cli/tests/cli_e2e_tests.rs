//! End-to-end tests for the tsync binary
//!
//! Each test runs the binary against a mock Graph server with its state
//! directory in a temporary folder.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Command with a clean environment, both tokens and `dir` as state directory
fn tsync(server: &MockServer, dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tsync").unwrap();
    cmd.env_clear()
        .env("HOME", dir.path())
        .env("NO_COLOR", "1")
        .env("TSYNC_CONFIG", dir.path().join("absent.toml"))
        .env("TSYNC_STATE_DIR", dir.path())
        .env("TSYNC_TIME_ZONE", "UTC")
        .env("TSYNC_MAIL_TOKEN", "mail-token")
        .env("TSYNC_SITES_TOKEN", "sites-token")
        .arg("--graph-url")
        .arg(server.uri());
    cmd
}

fn write_state(dir: &Path, state: serde_json::Value) {
    fs::write(dir.join("state.json"), state.to_string()).unwrap();
}

fn read_state(dir: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(dir.join("state.json")).unwrap()).unwrap()
}

fn selected_destination() -> serde_json::Value {
    serde_json::json!({
        "mappings": {},
        "lastSelectedSite": { "id": "s1", "name": "Helpdesk" },
        "lastSelectedList": { "id": "l1", "name": "Tickets" }
    })
}

async fn mount_columns(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sites/s1/lists/l1/columns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                { "name": "TicketNumber", "displayName": "Ticket Number" },
                { "name": "Title", "displayName": "Subject" },
                { "name": "Description", "displayName": "Description" },
                { "name": "User", "displayName": "User" },
                { "name": "ContentType", "displayName": "Content Type" }
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_messages(server: &MockServer, messages: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/me/mailFolders/inbox/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": messages })))
        .mount(server)
        .await;
}

fn message(id: &str, subject: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "subject": subject,
        "bodyPreview": "Please help. Route: R-7",
        "from": { "emailAddress": { "address": "bob@example.com" } },
        "receivedDateTime": "2024-03-01T09:30:00Z"
    })
}

#[tokio::test]
async fn test_sites_lists_sites() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{ "id": "s1", "displayName": "Helpdesk" }]
        })))
        .mount(&server)
        .await;

    tsync(&server, &dir)
        .arg("sites")
        .assert()
        .success()
        .stdout(predicate::str::contains("Helpdesk"))
        .stdout(predicate::str::contains("s1"));
}

#[tokio::test]
async fn test_select_site_then_list() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/sites/s1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": "s1", "displayName": "Helpdesk" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/s2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": "s2", "displayName": "Facilities" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/s1/lists/l1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": "l1", "displayName": "Tickets" })),
        )
        .mount(&server)
        .await;

    tsync(&server, &dir)
        .args(["select", "site", "s1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected site Helpdesk"));

    tsync(&server, &dir)
        .args(["select", "list", "l1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected list Tickets"));

    let state = read_state(dir.path());
    assert_eq!(state["lastSelectedSite"]["id"], "s1");
    assert_eq!(state["lastSelectedList"]["name"], "Tickets");

    // A different site invalidates the list
    tsync(&server, &dir)
        .args(["select", "site", "s2"])
        .assert()
        .success();

    let state = read_state(dir.path());
    assert_eq!(state["lastSelectedSite"]["id"], "s2");
    assert!(state.get("lastSelectedList").is_none());
}

#[tokio::test]
async fn test_select_list_needs_site() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    tsync(&server, &dir)
        .args(["select", "list", "l1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No site selected"));
}

#[tokio::test]
async fn test_mapping_show_auto_resolves() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_state(dir.path(), selected_destination());
    mount_columns(&server).await;

    tsync(&server, &dir)
        .args(["mapping", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Subject (Title)"))
        .stdout(predicate::str::contains("not saved yet"))
        .stdout(predicate::str::contains("Mapping is complete"));
}

#[tokio::test]
async fn test_mapping_set_saves_and_rejects_content_type() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_state(dir.path(), selected_destination());
    mount_columns(&server).await;

    tsync(&server, &dir)
        .args(["mapping", "set", "status", "Description"])
        .assert()
        .success();

    let state = read_state(dir.path());
    assert_eq!(state["mappings"]["fieldMapping_s1_l1"]["status"], "Description");
    assert_eq!(state["mappings"]["fieldMapping_s1_l1"]["subject"], "Title");

    tsync(&server, &dir)
        .args(["mapping", "set", "route", "ContentType"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a selectable column"));

    tsync(&server, &dir)
        .args(["mapping", "set", "priority", "Title"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown field 'priority'"));
}

#[tokio::test]
async fn test_sync_reports_failures_and_exits_non_zero() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_state(dir.path(), selected_destination());
    mount_columns(&server).await;
    mount_messages(
        &server,
        serde_json::json!([message("m1", "first"), message("m2", "second"), message("m3", "third")]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/sites/s1/lists/l1/items"))
        .and(body_partial_json(serde_json::json!({ "fields": { "Title": "second" } })))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": "invalidRequest", "message": "Title is too long" }
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sites/s1/lists/l1/items"))
        .and(body_partial_json(serde_json::json!({ "fields": { "TicketNumber": "202403010930" } })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": "1" })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/me/messages/m1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/me/messages/m2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/me/messages/m3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    tsync(&server, &dir)
        .args(["sync", "m1", "m2", "m3"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("m2 second: Title is too long"))
        .stdout(predicate::str::contains("Synced 2 message(s), 1 failed"))
        .stderr(predicate::str::contains("1 message(s) failed to sync"));
}

#[tokio::test]
async fn test_sync_all_with_empty_inbox() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_state(dir.path(), selected_destination());
    mount_columns(&server).await;
    mount_messages(&server, serde_json::json!([])).await;

    tsync(&server, &dir)
        .args(["sync", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No unread messages."));
}

#[tokio::test]
async fn test_sync_without_mail_token_makes_no_calls() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_state(dir.path(), selected_destination());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    tsync(&server, &dir)
        .env_remove("TSYNC_MAIL_TOKEN")
        .args(["sync", "m1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No mail session"));
}

#[tokio::test]
async fn test_sync_with_incomplete_saved_mapping_is_refused() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut state = selected_destination();
    state["mappings"]["fieldMapping_s1_l1"] = serde_json::json!({ "subject": "Title" });
    write_state(dir.path(), state);
    mount_columns(&server).await;
    mount_messages(&server, serde_json::json!([message("m1", "first")])).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    tsync(&server, &dir)
        .args(["sync", "m1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required fields not mapped: ticketnumber, description, user",
        ));
}

#[tokio::test]
async fn test_reset_clears_state() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_state(dir.path(), selected_destination());

    tsync(&server, &dir)
        .args(["reset", "--yes"])
        .assert()
        .success();

    let state = read_state(dir.path());
    assert!(state.get("lastSelectedSite").is_none());
    assert_eq!(state["mappings"], serde_json::json!({}));
}

#[tokio::test]
async fn test_config_get_uses_graph_url_flag() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    tsync(&server, &dir)
        .args(["config", "get", "graph_url"])
        .assert()
        .success()
        .stdout(predicate::str::contains(server.uri()));

    tsync(&server, &dir)
        .args(["config", "get", "mail_token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mail…"));
}
