//! Test utilities for API integration tests.

use crate::{ApiError, ApiRequest, Client, Profile, label::*};
use std::{
    hash::{BuildHasher, Hasher},
    sync::OnceLock,
    time,
};

fn test_profile() -> &'static Profile {
    static PROFILE: OnceLock<Profile> = OnceLock::new();
    PROFILE.get_or_init(|| {
        Profile::from_default_env()
            .expect("Failed to load test profile. Did you forget to set NYCKEL_CLIENT_ID?")
    })
}

/// A client holding a fresh credential for the test profile.
pub(crate) fn client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        let client = Client::new(test_profile().clone())
            .with_timeout(Some(time::Duration::from_secs(30)));
        let credential = client
            .exchange(chrono::Utc::now())
            .expect("Failed to exchange test credentials");
        client.with_credential(credential)
    })
}

/// The function that integration tests create their resources under.
pub(crate) fn test_function_id() -> &'static str {
    static FUNCTION_ID: OnceLock<String> = OnceLock::new();
    FUNCTION_ID.get_or_init(|| {
        std::env::var("NYCKEL_TEST_FUNCTION_ID")
            .expect("Did you forget to set NYCKEL_TEST_FUNCTION_ID?")
    })
}

/// Execute an API request and parse the response.
pub(crate) fn roundtrip<T: ApiRequest>(req: T) -> Result<T::Response, ApiError> {
    client().roundtrip(req)
}

/// Generate a unique name for test resources.
pub(crate) fn test_name(prefix: &str) -> String {
    let ts = time::SystemTime::now()
        .duration_since(time::UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let rand: u32 = std::hash::RandomState::new().build_hasher().finish() as u32;

    format!("{prefix}_{ts}_{rand:08x}")
}

/// A temporary label that is deleted when dropped.
pub(crate) struct TestLabel {
    pub id: String,
    pub name: String,
}

impl TestLabel {
    /// Create a new temporary label on the test function.
    pub(crate) fn new(prefix: &str) -> Result<Self, ApiError> {
        let name = test_name(prefix);
        let label = roundtrip(CreateLabel {
            function_id: test_function_id(),
            name: &name,
            description: "",
        })?;

        Ok(Self { id: label.id, name })
    }
}

impl Drop for TestLabel {
    fn drop(&mut self) {
        let req = DeleteLabel {
            function_id: test_function_id(),
            label_id: &self.id,
        };
        if let Err(e) = roundtrip(req) {
            eprintln!("Warning: failed to delete test label {}: {e}", self.name);
        }
    }
}
