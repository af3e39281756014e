use crate::{mock_token, nyckel_against};
use httpmock::prelude::*;
use predicates::str::contains;
use serde_json::json;

#[test]
fn create_then_ls() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    mock_token(&server);
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/functions/function_1/labels")
            .json_body(json!({"name": "Dog", "description": "good"}));
        then.status(200)
            .json_body(json!({"id": "label_1", "name": "Dog", "description": "good"}));
    });
    let list = server.mock(|when, then| {
        when.method(GET).path("/v1/functions/function_1/labels");
        then.status(200)
            .json_body(json!([{"id": "label_1", "name": "Dog", "description": "good"}]));
    });

    nyckel_against(&server, home.path())
        .args(["label", "create", "function_1", "Dog", "--description", "good"])
        .assert()
        .success()
        .stdout(contains("label_1"));

    nyckel_against(&server, home.path())
        .args(["label", "ls", "function_1"])
        .assert()
        .success()
        .stdout(contains("Dog"));

    create.assert();
    list.assert();
}

#[test]
fn rm_if_exists() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    mock_token(&server);
    server.mock(|when, then| {
        when.method(DELETE).path("/v1/functions/function_1/labels/label_gone");
        then.status(404).json_body(json!({"error": "Label not found"}));
    });

    nyckel_against(&server, home.path())
        .args(["label", "rm", "function_1", "label_gone"])
        .assert()
        .failure()
        .stderr(contains("Label not found (404 Not Found)"));

    nyckel_against(&server, home.path())
        .args(["label", "rm", "function_1", "label_gone", "--if-exists"])
        .assert()
        .success()
        .stderr(contains("does not exist"));
}
