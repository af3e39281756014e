//! API operations concerning labels.

use serde::{Deserialize, Serialize};

use crate::api::{ApiRequest, DataResponse, EncodeError, EncodedBody, encoding, segment};

/// A label a function can assign.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Label {
    /// The label id, assigned by the service.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// The label name.
    pub name: String,
    /// A free-form description.
    #[serde(default)]
    pub description: String,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metadata: String,
}

impl DataResponse for Label {}

/// List the labels of a function.
#[derive(Debug, Clone)]
pub struct ListLabels<'a> {
    /// The function id.
    pub function_id: &'a str,
}

impl ApiRequest for ListLabels<'_> {
    type Response = Vec<Label>;

    fn path(&self) -> String {
        format!("/v1/functions/{}/labels", segment(self.function_id))
    }
}

/// Create a label on a function.
#[derive(Debug, Clone)]
pub struct CreateLabel<'a> {
    /// The function id.
    pub function_id: &'a str,
    /// The label name.
    pub name: &'a str,
    /// A description, possibly empty.
    pub description: &'a str,
}

#[derive(Serialize)]
struct CreateLabelBody<'a> {
    name: &'a str,
    description: &'a str,
}

impl ApiRequest for CreateLabel<'_> {
    type Response = Label;

    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        format!("/v1/functions/{}/labels", segment(self.function_id))
    }

    fn body(&self) -> Result<Option<EncodedBody>, EncodeError> {
        encoding::json(&CreateLabelBody {
            name: self.name,
            description: self.description,
        })
        .map(Some)
    }
}

/// Delete a label.
#[derive(Debug, Clone)]
pub struct DeleteLabel<'a> {
    /// The function id.
    pub function_id: &'a str,
    /// The label id.
    pub label_id: &'a str,
}

impl ApiRequest for DeleteLabel<'_> {
    type Response = ();

    fn method(&self) -> http::Method {
        http::Method::DELETE
    }

    fn path(&self) -> String {
        format!(
            "/v1/functions/{}/labels/{}",
            segment(self.function_id),
            segment(self.label_id)
        )
    }
}


#[cfg(all(test, feature = "_integration-tests"))]
mod integration {
    use super::*;
    use crate::api::testutil::{TestLabel, roundtrip, test_function_id};

    #[test]
    fn create_and_list() -> anyhow::Result<()> {
        let label = TestLabel::new("dog")?;
        assert!(!label.id.is_empty());

        let labels = roundtrip(ListLabels {
            function_id: test_function_id(),
        })?;

        let found = labels.iter().find(|l| l.name == label.name);
        assert_eq!(found.map(|l| l.id.as_str()), Some(label.id.as_str()));

        Ok(())
    }
}
