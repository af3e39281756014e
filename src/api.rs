use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Serialize, de::DeserializeOwned};

use crate::Profile;

pub mod encoding;
mod error;
pub mod function;
pub mod invoke;
pub mod label;
pub mod sample;
pub mod token;

#[cfg(all(test, feature = "_integration-tests"))]
pub(crate) mod testutil;

pub use encoding::{EncodeError, EncodedBody};
pub use error::*;
pub use token::Credential;

/// Characters escaped when an id is substituted into a path template.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escape a value for use as a single path segment.
pub(crate) fn segment(s: &str) -> impl std::fmt::Display + '_ {
    utf8_percent_encode(s, PATH_SEGMENT)
}

/// Implemented by types that can be sent as requests to the Nyckel API.
pub trait ApiRequest: Sized {
    /// The corresponding response type.
    type Response: ApiResponse;

    /// The path that the request should take.
    fn path(&self) -> String;

    /// The method to use.
    fn method(&self) -> http::Method {
        http::Method::GET
    }

    /// The encoded request body, if any.
    fn body(&self) -> Result<Option<EncodedBody>, EncodeError> {
        Ok(None)
    }

    /// The serializable query string.
    fn query(&self) -> Option<impl Serialize> {
        None::<&()>
    }

    /// Whether the request must carry a credential. Only the token exchange
    /// itself goes out without one.
    fn authenticated(&self) -> bool {
        true
    }

    /// Consume the request and return an [http::Request] suitable for passing
    /// to your favorite HTTP client.
    fn into_request(
        self,
        profile: &Profile,
        credential: Option<&Credential>,
    ) -> Result<http::Request<Vec<u8>>, ApiError> {
        let method = self.method();
        let mut path = self.path();
        let mut parts = profile.api_endpoint.clone().into_parts();

        if let Some(qs) = self.query() {
            let qs = serde_qs::to_string(&qs)
                .map_err(|e| ApiError::transport(None, EncodeError::from(e)))?;
            if !qs.is_empty() {
                path.push('?');
                path.push_str(&qs);
            }
        }

        // Keep any path prefix on the configured endpoint.
        if let Some(base) = parts.path_and_query.as_ref() {
            let base = base.path().trim_end_matches('/');
            if !base.is_empty() {
                path.insert_str(0, base);
            }
        }

        parts.path_and_query = Some(
            path.parse()
                .map_err(|e| ApiError::transport(None, http::Error::from(e)))?,
        );

        let uri = http::Uri::from_parts(parts)
            .map_err(|e| ApiError::transport(None, http::Error::from(e)))?;
        let mut req = http::Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::USER_AGENT, &profile.user_agent)
            .header(http::header::ACCEPT, "application/json");

        if let Some(credential) = credential {
            req = req.header(
                http::header::AUTHORIZATION,
                credential.authorization_header(),
            );
        }

        let req = if let Some(body) = self.body()? {
            req.header(http::header::CONTENT_TYPE, body.content_type)
                .header(http::header::CONTENT_LENGTH, body.bytes.len())
                .body(body.bytes)
        } else {
            req.body(Vec::new())
        };

        req.map_err(|e| ApiError::transport(None, e))
    }
}

/// Implemented by types that can be read as responses from the Nyckel API.
pub trait ApiResponse: Sized {
    /// Decode a successful response. `body` is empty if the service sent
    /// nothing back.
    fn from_body(status: http::StatusCode, body: &[u8]) -> Result<Self, ApiError>;
}

/// A private trait for types that deserialize directly from the JSON body
/// of a response.
pub(crate) trait DataResponse: DeserializeOwned + Default {}

impl<T: DataResponse> DataResponse for Vec<T> {}

impl<T: DataResponse> ApiResponse for T {
    fn from_body(status: http::StatusCode, body: &[u8]) -> Result<Self, ApiError> {
        if body.is_empty() {
            return Ok(T::default());
        }

        serde_json::from_slice(body).map_err(|e| {
            tracing::error!("Failed to parse API response: {e:#?}");
            ApiError::transport(Some(status), e)
        })
    }
}

// For API methods that return nothing of interest.
impl ApiResponse for () {
    fn from_body(_status: http::StatusCode, _body: &[u8]) -> Result<Self, ApiError> {
        Ok(())
    }
}

/// The result of a single request.
#[derive(Debug)]
pub struct CallOutcome<T> {
    /// The HTTP status, unless the exchange failed before a response arrived.
    pub status: Option<http::StatusCode>,
    /// The decoded payload, or the classified error.
    pub result: Result<T, ApiError>,
    /// The buffered response body, whenever one was received.
    pub raw: Option<Vec<u8>>,
}

impl<T> CallOutcome<T> {
    pub(crate) fn failed(err: ApiError) -> Self {
        Self {
            status: err.status(),
            result: Err(err),
            raw: None,
        }
    }

    /// Discard the diagnostics and keep the result.
    pub fn into_result(self) -> Result<T, ApiError> {
        self.result
    }

    /// The raw response body as (lossy) text, for diagnostics.
    pub fn raw_text(&self) -> Option<std::borrow::Cow<'_, str>> {
        self.raw.as_deref().map(String::from_utf8_lossy)
    }
}

/// Classify a fully buffered response.
pub fn classify<T: ApiResponse>(status: http::StatusCode, body: Vec<u8>) -> CallOutcome<T> {
    let result = if status.is_success() {
        T::from_body(status, &body)
    } else {
        Err(classify_error(status, &body))
    };

    CallOutcome {
        status: Some(status),
        result,
        raw: Some(body),
    }
}

fn classify_error(status: http::StatusCode, body: &[u8]) -> ApiError {
    if body.is_empty() {
        return ApiError::Status(status);
    }

    // Only the exact prefix counts; anything else is expected to be JSON.
    if body.starts_with(b"<html>") {
        return ApiError::Upstream(status);
    }

    match serde_json::from_slice::<RawApiError>(body) {
        Ok(raw) => {
            tracing::warn!(%status, error = %raw.error, "service returned an error");
            ApiError::Service {
                status,
                message: raw.error,
            }
        }
        Err(e) => {
            tracing::error!("Failed to parse API error: {e:#?}");
            ApiError::transport(Some(status), e)
        }
    }
}
