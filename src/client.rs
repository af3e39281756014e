use std::{io::Read as _, path::Path, time};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    ApiError, ApiRequest, CallOutcome, Credential, OrAbort as _, Profile, api,
    function::*, invoke::*, label::*, sample::*, token::ExchangeToken,
};

/// A blocking client for the Nyckel API.
///
/// Each operation performs exactly one HTTP round trip. The client holds the
/// credential used on authenticated calls, but never refreshes it; check
/// [Credential::is_expired] and call [Client::exchange] as needed.
#[derive(Clone)]
pub struct Client {
    agent: ureq::Agent,
    profile: Profile,
    credential: Option<Credential>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("profile", &self.profile)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

fn make_agent(timeout: Option<time::Duration>) -> ureq::Agent {
    // Allows error responses to be classified.
    let cfg = ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(timeout)
        .build();
    ureq::Agent::new_with_config(cfg)
}

impl Client {
    /// Create a client without a credential.
    pub fn new(profile: Profile) -> Self {
        Self {
            agent: make_agent(None),
            profile,
            credential: None,
        }
    }

    /// Apply a global timeout to every request.
    pub fn with_timeout(self, timeout: Option<time::Duration>) -> Self {
        Self {
            agent: make_agent(timeout),
            ..self
        }
    }

    /// Use the given credential for authenticated calls.
    pub fn with_credential(self, credential: Credential) -> Self {
        Self {
            credential: Some(credential),
            ..self
        }
    }

    /// Replace the credential used for authenticated calls.
    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    /// The current credential, if any.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// The profile the client was created with.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Perform a single request, keeping the status and raw body alongside
    /// the result.
    pub fn call<T: ApiRequest>(&self, req: T) -> CallOutcome<T::Response> {
        let credential = if req.authenticated() {
            match self.credential.as_ref() {
                Some(c) => Some(c),
                None => return CallOutcome::failed(ApiError::Unauthenticated),
            }
        } else {
            None
        };

        let req = match req.into_request(&self.profile, credential) {
            Ok(req) => req,
            Err(e) => return CallOutcome::failed(e),
        };

        let method = req.method().clone();
        let uri = req.uri().clone();

        let resp = match self.agent.run(req) {
            Ok(resp) => resp,
            Err(e) => {
                debug!(%method, %uri, error = %e, "request failed");
                return CallOutcome::failed(ApiError::transport(None, e));
            }
        };

        let (parts, body) = resp.into_parts();
        let mut buf = Vec::new();
        if let Err(e) = body.into_reader().read_to_end(&mut buf) {
            debug!(%method, %uri, status = %parts.status, error = %e, "failed to read body");
            return CallOutcome {
                status: Some(parts.status),
                result: Err(ApiError::transport(Some(parts.status), e)),
                raw: (!buf.is_empty()).then_some(buf),
            };
        }

        debug!(%method, %uri, status = %parts.status, len = buf.len(), "response");
        api::classify(parts.status, buf)
    }

    /// Perform a single request and return the decoded response.
    pub fn roundtrip<T: ApiRequest>(&self, req: T) -> Result<T::Response, ApiError> {
        self.call(req).into_result()
    }

    /// Exchange the profile's client credentials for an access token, issued
    /// at `now`.
    pub fn exchange(&self, now: DateTime<Utc>) -> Result<Credential, ApiError> {
        let raw = self.roundtrip(ExchangeToken::for_profile(&self.profile))?;
        Ok(raw.issued(now))
    }

    /// Like [Client::exchange], but panics on failure.
    pub fn access_token_or_abort(&self, now: DateTime<Utc>) -> Credential {
        self.exchange(now).or_abort("AccessToken")
    }

    /// List all functions.
    pub fn list_functions(&self) -> Result<Vec<Function>, ApiError> {
        self.roundtrip(ListFunctions)
    }

    /// Find a function by id.
    pub fn find_function(&self, id: &str) -> Result<Function, ApiError> {
        self.roundtrip(GetFunction { id })
    }

    /// Create a function.
    pub fn create_function(
        &self,
        name: &str,
        input: FunctionInput,
        output: FunctionOutput,
    ) -> Result<Function, ApiError> {
        self.roundtrip(CreateFunction {
            name,
            input,
            output,
        })
    }

    /// List the labels of a function.
    pub fn list_labels(&self, function_id: &str) -> Result<Vec<Label>, ApiError> {
        self.roundtrip(ListLabels { function_id })
    }

    /// Create a label on a function.
    pub fn create_label(
        &self,
        function_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Label, ApiError> {
        self.roundtrip(CreateLabel {
            function_id,
            name,
            description,
        })
    }

    /// Delete a label.
    pub fn delete_label(&self, function_id: &str, label_id: &str) -> Result<(), ApiError> {
        self.roundtrip(DeleteLabel {
            function_id,
            label_id,
        })
    }

    /// List the samples of a function.
    pub fn list_samples(&self, req: ListSamples<'_>) -> Result<Vec<Sample>, ApiError> {
        self.roundtrip(req)
    }

    /// Delete a sample.
    pub fn delete_sample(&self, function_id: &str, sample_id: &str) -> Result<(), ApiError> {
        self.roundtrip(DeleteSample {
            function_id,
            sample_id,
        })
    }

    /// Upload an image as a sample annotated with the named label.
    pub fn create_image_sample(
        &self,
        function_id: &str,
        file: &Path,
        label_name: &str,
        external_id: Option<&str>,
    ) -> Result<ImageSample, ApiError> {
        self.roundtrip(CreateImageSample {
            function_id,
            file,
            label: LabelRef::Name(label_name),
            external_id,
        })
    }

    /// Upload an image as a sample annotated with the given label id.
    pub fn create_image_sample_by_id(
        &self,
        function_id: &str,
        file: &Path,
        label_id: &str,
        external_id: Option<&str>,
    ) -> Result<ImageSample, ApiError> {
        self.roundtrip(CreateImageSample {
            function_id,
            file,
            label: LabelRef::Id(label_id),
            external_id,
        })
    }

    /// Annotate a sample with the named label. Returns the id of the label
    /// the service resolved the name to.
    pub fn annotate_sample(
        &self,
        function_id: &str,
        sample_id: &str,
        label_name: &str,
    ) -> Result<String, ApiError> {
        self.annotate(function_id, sample_id, LabelRef::Name(label_name))
    }

    /// Annotate a sample with the given label id. Returns the label id.
    pub fn annotate_sample_by_id(
        &self,
        function_id: &str,
        sample_id: &str,
        label_id: &str,
    ) -> Result<String, ApiError> {
        self.annotate(function_id, sample_id, LabelRef::Id(label_id))
    }

    fn annotate(
        &self,
        function_id: &str,
        sample_id: &str,
        label: LabelRef<'_>,
    ) -> Result<String, ApiError> {
        let annotation = self.roundtrip(AnnotateSample {
            function_id,
            sample_id,
            label,
        })?;

        Ok(annotation.label_id)
    }

    /// Invoke a function on a local file, optionally capturing it as a new
    /// sample.
    pub fn invoke_function(
        &self,
        function_id: &str,
        file: &Path,
        capture: bool,
        external_id: Option<&str>,
    ) -> Result<Invocation, ApiError> {
        self.roundtrip(InvokeFunction {
            function_id,
            file,
            capture,
            external_id,
        })
    }
}
