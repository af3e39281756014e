use crate::{mock_token, nyckel_against};
use httpmock::prelude::*;
use predicates::str::{contains, starts_with};
use serde_json::json;

fn mock_functions(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/v1/functions")
            .header("authorization", "Bearer cli-token");
        then.status(200).json_body(json!([
            {"id": "function_1", "name": "pets", "input": "Image", "output": "Classification"},
            {"id": "function_2", "name": "moods", "input": "Text", "output": "Tags"}
        ]));
    })
}

#[test]
fn ls_json_output() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    mock_token(&server);
    let list = mock_functions(&server);

    nyckel_against(&server, home.path())
        .args(["-O", "json", "function", "ls"])
        .assert()
        .success()
        .stdout(starts_with("["))
        .stdout(contains("\"name\":\"moods\""));

    list.assert();
}

#[test]
fn ls() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    mock_token(&server);
    mock_functions(&server);

    nyckel_against(&server, home.path())
        .args(["function", "list"])
        .assert()
        .success()
        .stdout(contains("function_1"))
        .stdout(contains("Classification"));
}

#[test]
fn create() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    mock_token(&server);
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/functions")
            .body_includes("name=pets")
            .body_includes("input=Image")
            .body_includes("output=OCR");
        then.status(200).json_body(json!({
            "id": "function_3", "name": "pets", "input": "Image", "output": "OCR"
        }));
    });

    nyckel_against(&server, home.path())
        .args(["function", "create", "pets", "--input", "Image", "--output", "OCR"])
        .assert()
        .success()
        .stdout(contains("function_3"));

    create.assert();
}

#[test]
fn create_rejects_unknown_kind() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    let token = mock_token(&server);

    nyckel_against(&server, home.path())
        .args(["function", "create", "pets", "--input", "Video", "--output", "Tags"])
        .assert()
        .failure()
        .stderr(contains("Unknown function input kind: Video"));

    assert_eq!(token.calls(), 0);
}
