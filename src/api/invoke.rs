//! Running a function against new input.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::api::{ApiRequest, DataResponse, EncodeError, EncodedBody, sample::upload, segment};

/// The result of invoking a function.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    /// The predicted label's name.
    #[serde(default)]
    pub label_name: String,
    /// The predicted label's id.
    #[serde(default)]
    pub label_id: String,
    /// The confidence, from 0 to 1.
    #[serde(default)]
    pub confidence: f64,
}

impl DataResponse for Invocation {}

/// Invoke a function on a local file.
#[derive(Debug, Clone)]
pub struct InvokeFunction<'a> {
    /// The function id.
    pub function_id: &'a str,
    /// The local file to classify.
    pub file: &'a Path,
    /// Whether the service should keep the input as a new sample.
    pub capture: bool,
    /// A caller-supplied id for the captured sample.
    pub external_id: Option<&'a str>,
}

impl ApiRequest for InvokeFunction<'_> {
    type Response = Invocation;

    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        format!("/v1/functions/{}/invoke", segment(self.function_id))
    }

    fn body(&self) -> Result<Option<EncodedBody>, EncodeError> {
        let mut fields = BTreeMap::new();
        fields.insert("capture", self.capture.to_string());
        if let Some(id) = self.external_id.filter(|id| !id.is_empty()) {
            fields.insert("externalId", id.to_string());
        }

        upload(self.file, fields).map(Some)
    }
}
