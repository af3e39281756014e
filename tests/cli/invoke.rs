use crate::{mock_token, nyckel_against};
use httpmock::prelude::*;
use predicates::str::contains;
use serde_json::json;

#[test]
fn invoke_with_capture() {
    let home = tempfile::tempdir().unwrap();
    let image = home.path().join("rex.jpg");
    std::fs::write(&image, b"jpeg bytes").unwrap();

    let server = MockServer::start();
    mock_token(&server);
    let invoke = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/functions/function_1/invoke")
            .body_includes("name=\"capture\"\r\n\r\ntrue")
            .body_includes("name=\"externalId\"\r\n\r\nrex");
        then.status(200).json_body(json!({
            "labelName": "Dog", "labelId": "label_1", "confidence": 0.9
        }));
    });

    nyckel_against(&server, home.path())
        .args(["-O", "json", "invoke", "function_1"])
        .arg(&image)
        .args(["--capture", "--external-id", "rex"])
        .assert()
        .success()
        .stdout(contains("\"labelName\":\"Dog\""));

    invoke.assert();
}

#[test]
fn upstream_html_error() {
    let home = tempfile::tempdir().unwrap();
    let image = home.path().join("rex.jpg");
    std::fs::write(&image, b"jpeg bytes").unwrap();

    let server = MockServer::start();
    mock_token(&server);
    server.mock(|when, then| {
        when.method(POST).path("/v1/functions/function_1/invoke");
        then.status(502).body("<html><body>Bad Gateway</body></html>");
    });

    nyckel_against(&server, home.path())
        .args(["invoke", "function_1"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(contains("HTML error page (502 Bad Gateway)"));
}
