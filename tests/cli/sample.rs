use crate::{mock_token, nyckel_against};
use httpmock::prelude::*;
use predicates::str::contains;
use serde_json::json;

#[test]
fn ls_with_filters() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    mock_token(&server);
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/functions/function_1/samples")
            .query_param("count", "2");
        then.status(200).json_body(json!([
            {"id": "sample_1", "data": "https://img/1", "annotation": {"labelId": "label_1"}},
            {"id": "sample_2", "data": "https://img/2", "prediction": {"labelId": "label_2", "confidence": 0.5}}
        ]));
    });

    nyckel_against(&server, home.path())
        .args(["sample", "ls", "function_1", "--count", "2"])
        .assert()
        .success()
        .stdout(contains("sample_1"))
        .stdout(contains("label_2 (0.50)"));

    list.assert();
}

#[test]
fn create_and_annotate() {
    let home = tempfile::tempdir().unwrap();
    let image = home.path().join("rex.jpg");
    std::fs::write(&image, b"jpeg bytes").unwrap();

    let server = MockServer::start();
    mock_token(&server);
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/functions/function_1/samples")
            .body_includes("filename=\"rex.jpg\"")
            .body_includes("jpeg bytes")
            .body_includes("name=\"labelName\"");
        then.status(200).json_body(json!({"id": "sample_9", "data": "https://img/9"}));
    });
    let annotate = server.mock(|when, then| {
        when.method(PUT)
            .path("/v1/functions/function_1/samples/sample_9/annotation")
            .json_body(json!({"labelId": "label_5"}));
        then.status(200).json_body(json!({"labelId": "label_5"}));
    });

    nyckel_against(&server, home.path())
        .arg("sample")
        .arg("create")
        .arg("function_1")
        .arg(&image)
        .args(["--label-name", "Dog"])
        .assert()
        .success()
        .stdout(contains("sample_9"));

    nyckel_against(&server, home.path())
        .args(["sample", "annotate", "function_1", "sample_9", "--label-id", "label_5"])
        .assert()
        .success()
        .stdout(contains("label_5"));

    create.assert();
    annotate.assert();
}

#[test]
fn create_requires_a_label() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();

    nyckel_against(&server, home.path())
        .args(["sample", "create", "function_1", "rex.jpg"])
        .assert()
        .failure();
}

#[test]
fn create_with_missing_file() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    mock_token(&server);
    let create = server.mock(|when, then| {
        when.method(POST).path("/v1/functions/function_1/samples");
        then.status(200);
    });

    nyckel_against(&server, home.path())
        .args(["sample", "create", "function_1", "/no/such/rex.jpg", "--label-name", "Dog"])
        .assert()
        .failure()
        .stderr(contains("/no/such/rex.jpg"));

    assert_eq!(create.calls(), 0);
}
