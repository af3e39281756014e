use crate::{mock_token, nyckel, nyckel_against};
use httpmock::prelude::*;
use predicates::str::contains;

#[test]
fn token_json() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    let token = mock_token(&server);

    nyckel_against(&server, home.path())
        .args(["-O", "json", "token"])
        .assert()
        .success()
        .stdout(contains("\"access_token\":\"cli-token\""))
        .stdout(contains("\"expires_in\":3600"));

    token.assert();
}

#[test]
fn rejected_credentials() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/connect/token");
        then.status(401).json_body(serde_json::json!({"error": "invalid_client"}));
    });

    nyckel_against(&server, home.path())
        .args(["token"])
        .assert()
        .failure()
        .stderr(contains("invalid_client (401 Unauthorized)"));
}

#[test]
fn missing_credentials() {
    let home = tempfile::tempdir().unwrap();

    nyckel()
        .env("HOME", home.path())
        .env_remove("NYCKEL_CLIENT_ID")
        .env_remove("NYCKEL_CLIENT_SECRET")
        .args(["token"])
        .assert()
        .failure();
}
