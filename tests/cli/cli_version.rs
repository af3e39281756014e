use crate::nyckel;
use predicates::prelude::*;

#[test]
fn cli_version() {
    nyckel()
        .args(["version"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(concat!(
            "nyckel ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn version_needs_no_credentials() {
    nyckel()
        .env("HOME", "/nonexistent")
        .env_remove("NYCKEL_CLIENT_ID")
        .env_remove("NYCKEL_CLIENT_SECRET")
        .args(["version"])
        .assert()
        .success();
}
