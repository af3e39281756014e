//! OAuth2 client-credentials exchange.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Profile,
    api::{ApiRequest, DataResponse, EncodeError, EncodedBody, encoding},
};

/// A bearer credential returned by the token endpoint.
///
/// Expiry is never enforced by the client; check [Credential::is_expired]
/// and exchange a new one as needed.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    /// The opaque access token.
    pub access_token: String,
    /// The token type, usually `Bearer`.
    pub token_type: String,
    /// The granted scope.
    pub scope: String,
    /// When the credential was obtained.
    pub issued_at: DateTime<Utc>,
    /// The lifetime declared by the token endpoint, in seconds.
    pub expires_in: u64,
}

impl Credential {
    /// Whether the credential's lifetime has elapsed at `now`. The boundary
    /// counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// The instant the credential stops being valid.
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| self.issued_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// The `Authorization` header value, `<token_type> <access_token>`.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"********")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("issued_at", &self.issued_at)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// The token endpoint's response.
#[derive(Debug, Default, Deserialize)]
pub struct RawToken {
    /// The opaque access token.
    pub access_token: String,
    /// The token type.
    #[serde(default)]
    pub token_type: String,
    /// The granted scope.
    #[serde(default)]
    pub scope: String,
    /// The lifetime in seconds. Sent as a JSON number, sometimes fractional.
    #[serde(default)]
    pub expires_in: f64,
}

impl DataResponse for RawToken {}

impl RawToken {
    /// Stamp the token with the time it was obtained.
    pub fn issued(self, now: DateTime<Utc>) -> Credential {
        // Saturating cast: negative or NaN lifetimes become zero.
        let expires_in = self.expires_in as u64;

        Credential {
            access_token: self.access_token,
            token_type: self.token_type,
            scope: self.scope,
            issued_at: now,
            expires_in,
        }
    }
}

/// Exchange client credentials for an access token.
#[derive(Debug, Clone)]
pub struct ExchangeToken<'a> {
    /// The OAuth2 client id.
    pub client_id: &'a str,
    /// The OAuth2 client secret.
    pub client_secret: &'a str,
}

impl<'a> ExchangeToken<'a> {
    /// Use the credentials from a profile.
    pub fn for_profile(profile: &'a Profile) -> Self {
        Self {
            client_id: &profile.client_id,
            client_secret: &profile.client_secret,
        }
    }
}

#[derive(Serialize)]
struct ExchangeTokenForm<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
}

impl ApiRequest for ExchangeToken<'_> {
    type Response = RawToken;

    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        "/connect/token".to_string()
    }

    fn body(&self) -> Result<Option<EncodedBody>, EncodeError> {
        encoding::form(&ExchangeTokenForm {
            grant_type: "client_credentials",
            client_id: self.client_id,
            client_secret: self.client_secret,
        })
        .map(Some)
    }

    fn authenticated(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone as _;

    use super::*;

    fn credential(lifetime: u64) -> Credential {
        RawToken {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            scope: "api".to_string(),
            expires_in: lifetime as f64,
        }
        .issued(Utc.timestamp_opt(0, 0).unwrap())
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let cred = credential(3600);
        let at = |secs| Utc.timestamp_opt(secs, 0).unwrap();

        assert!(!cred.is_expired(at(0)));
        assert!(!cred.is_expired(at(3599)));
        assert!(cred.is_expired(at(3600)));
        assert!(cred.is_expired(at(7200)));
    }

    #[test]
    fn fractional_lifetime_truncates() {
        let raw: RawToken = serde_json::from_str(
            r#"{"access_token": "abc", "token_type": "Bearer", "expires_in": 3599.7, "scope": "api"}"#,
        )
        .unwrap();
        let cred = raw.issued(Utc::now());
        assert_eq!(cred.expires_in, 3599);
        assert_eq!(cred.authorization_header(), "Bearer abc");
    }

    #[test]
    fn exchange_form() {
        let req = ExchangeToken {
            client_id: "my-id",
            client_secret: "my-secret",
        };
        assert!(!req.authenticated());
        assert_eq!(req.method(), http::Method::POST);

        let body = req.body().unwrap().unwrap();
        assert_eq!(body.content_type, "application/x-www-form-urlencoded");
        let form = String::from_utf8(body.bytes).unwrap();
        assert_eq!(
            form,
            "grant_type=client_credentials&client_id=my-id&client_secret=my-secret"
        );
    }

    #[test]
    fn debug_masks_token() {
        let debug = format!("{:?}", credential(60));
        assert!(!debug.contains("\"tok\""));
        assert!(debug.contains("********"));
    }
}
