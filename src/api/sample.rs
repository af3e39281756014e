//! API operations concerning samples.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::api::{
    ApiRequest, DataResponse, EncodeError, EncodedBody, encoding, encoding::Part, segment,
};

/// A sample in a function's training set.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// The sample id.
    pub id: String,
    /// The sample data: text, or a URL for images.
    #[serde(default)]
    pub data: String,
    /// The label assigned by a person, if any.
    #[serde(default)]
    pub annotation: Option<Annotation>,
    /// The label the function currently predicts, if any.
    #[serde(default)]
    pub prediction: Option<Prediction>,
    /// The caller-supplied id, if any.
    #[serde(default)]
    pub external_id: Option<String>,
}

impl DataResponse for Sample {}

/// A sample created from an uploaded image.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSample {
    /// The sample id.
    pub id: String,
    /// A URL for the stored image.
    #[serde(default)]
    pub data: String,
    /// The caller-supplied id, if any.
    #[serde(default)]
    pub external_id: Option<String>,
    /// The label assigned at creation, if any.
    #[serde(default)]
    pub annotation: Option<Annotation>,
}

impl DataResponse for ImageSample {}

/// A label assigned to a sample.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// The label id.
    #[serde(default)]
    pub label_id: String,
}

impl DataResponse for Annotation {}

/// A label predicted for a sample.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// The label id.
    #[serde(default)]
    pub label_id: String,
    /// The confidence, from 0 to 1.
    #[serde(default)]
    pub confidence: f64,
}

/// Refers to a label either by name or by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRef<'a> {
    /// The label name. The service resolves it, creating the label if needed.
    Name(&'a str),
    /// The label id.
    Id(&'a str),
}

impl<'a> LabelRef<'a> {
    fn field(&self) -> (&'static str, &'a str) {
        match *self {
            LabelRef::Name(name) => ("labelName", name),
            LabelRef::Id(id) => ("labelId", id),
        }
    }
}

/// List the samples of a function.
#[derive(Debug, Default, Clone)]
pub struct ListSamples<'a> {
    /// The function id.
    pub function_id: &'a str,
    /// The maximum number of samples to return.
    pub count: Option<u32>,
    /// Where to start listing.
    pub start: Option<u64>,
    /// Where to stop listing.
    pub end: Option<u64>,
    /// Only return the sample with this external id.
    pub external_id: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListSamplesQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_id: Option<&'a str>,
}

impl ApiRequest for ListSamples<'_> {
    type Response = Vec<Sample>;

    fn path(&self) -> String {
        format!("/v1/functions/{}/samples", segment(self.function_id))
    }

    fn query(&self) -> Option<impl Serialize> {
        Some(ListSamplesQuery {
            count: self.count.filter(|&c| c > 0),
            start: self.start,
            end: self.end,
            external_id: self.external_id.filter(|id| !id.is_empty()),
        })
    }
}

/// Delete a sample.
#[derive(Debug, Clone)]
pub struct DeleteSample<'a> {
    /// The function id.
    pub function_id: &'a str,
    /// The sample id.
    pub sample_id: &'a str,
}

impl ApiRequest for DeleteSample<'_> {
    type Response = ();

    fn method(&self) -> http::Method {
        http::Method::DELETE
    }

    fn path(&self) -> String {
        format!(
            "/v1/functions/{}/samples/{}",
            segment(self.function_id),
            segment(self.sample_id)
        )
    }
}

/// Upload an image as a new, annotated sample.
#[derive(Debug, Clone)]
pub struct CreateImageSample<'a> {
    /// The function id.
    pub function_id: &'a str,
    /// The local image file to upload.
    pub file: &'a Path,
    /// The label to annotate the sample with.
    pub label: LabelRef<'a>,
    /// A caller-supplied id to attach to the sample.
    pub external_id: Option<&'a str>,
}

impl ApiRequest for CreateImageSample<'_> {
    type Response = ImageSample;

    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        format!("/v1/functions/{}/samples", segment(self.function_id))
    }

    fn body(&self) -> Result<Option<EncodedBody>, EncodeError> {
        let (label_field, label_value) = self.label.field();

        let mut fields = BTreeMap::new();
        fields.insert(label_field, label_value.to_string());
        if let Some(id) = self.external_id.filter(|id| !id.is_empty()) {
            fields.insert("externalId", id.to_string());
        }

        upload(self.file, fields).map(Some)
    }
}

/// Annotate an existing sample.
#[derive(Debug, Clone)]
pub struct AnnotateSample<'a> {
    /// The function id.
    pub function_id: &'a str,
    /// The sample id.
    pub sample_id: &'a str,
    /// The label to assign.
    pub label: LabelRef<'a>,
}

impl ApiRequest for AnnotateSample<'_> {
    type Response = Annotation;

    fn method(&self) -> http::Method {
        http::Method::PUT
    }

    fn path(&self) -> String {
        format!(
            "/v1/functions/{}/samples/{}/annotation",
            segment(self.function_id),
            segment(self.sample_id)
        )
    }

    fn body(&self) -> Result<Option<EncodedBody>, EncodeError> {
        let (field, value) = self.label.field();
        encoding::json(&BTreeMap::from([(field, value)])).map(Some)
    }
}

/// Build a multipart upload of `file` under the `filename` field, plus
/// `fields`. Field values are always sent as text.
pub(crate) fn upload(
    file: &Path,
    fields: BTreeMap<&str, String>,
) -> Result<EncodedBody, EncodeError> {
    let parts = std::iter::once(("filename", Part::File(file)))
        .chain(fields.iter().map(|(k, v)| (*k, Part::Text(v.as_str()))));

    encoding::multipart_parts(parts)
}
