//! API operations concerning functions.

use serde::{Deserialize, Serialize};

use crate::api::{ApiRequest, DataResponse, EncodeError, EncodedBody, encoding, segment};

/// A function: a trained (or trainable) classifier.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Function {
    /// The function id.
    pub id: String,
    /// The display name.
    pub name: String,
    /// The input kind, e.g. `Image`.
    pub input: String,
    /// The output kind, e.g. `Classification`.
    pub output: String,
}

impl DataResponse for Function {}

/// Indicates that a function kind was not recognized.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown function {which} kind: {value}")]
pub struct InvalidFunctionKind {
    which: &'static str,
    value: String,
}

macro_rules! function_kinds {
    ($name:ident, $which:literal, $($code:literal => $variant:ident = $num:literal),* $(,)?) => {
        #[doc = concat!("A function ", $which, " kind.")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = $code]
                $variant,
            )*
        }

        impl $name {
            /// The canonical name sent to the API.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidFunctionKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s {
                    $($code => $name::$variant,)*
                    _ => return Err(InvalidFunctionKind { which: $which, value: s.to_string() }),
                })
            }
        }

        impl TryFrom<u8> for $name {
            type Error = InvalidFunctionKind;

            fn try_from(n: u8) -> Result<Self, Self::Error> {
                Ok(match n {
                    $($num => $name::$variant,)*
                    _ => return Err(InvalidFunctionKind { which: $which, value: n.to_string() }),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(self.as_str())
            }
        }
    };
}

function_kinds! {
    FunctionInput, "input",
    "Text" => Text = 1,
    "Image" => Image = 2,
    "Tabular" => Tabular = 3,
}

function_kinds! {
    FunctionOutput, "output",
    "Classification" => Classification = 1,
    "Tags" => Tags = 2,
    "Search" => Search = 3,
    "Localization" => Localization = 4,
    "OCR" => Ocr = 5,
}

/// List all functions.
#[derive(Debug, Clone)]
pub struct ListFunctions;

impl ApiRequest for ListFunctions {
    type Response = Vec<Function>;

    fn path(&self) -> String {
        "/v1/functions".to_string()
    }
}

/// Get a single function by id.
#[derive(Debug, Clone)]
pub struct GetFunction<'a> {
    /// The function id.
    pub id: &'a str,
}

impl ApiRequest for GetFunction<'_> {
    type Response = Function;

    fn path(&self) -> String {
        format!("/v1/functions/{}", segment(self.id))
    }
}

/// Create a new function.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFunction<'a> {
    /// The display name.
    pub name: &'a str,
    /// What the function takes.
    pub input: FunctionInput,
    /// What the function produces.
    pub output: FunctionOutput,
}

impl ApiRequest for CreateFunction<'_> {
    type Response = Function;

    fn method(&self) -> http::Method {
        http::Method::POST
    }

    fn path(&self) -> String {
        "/v1/functions".to_string()
    }

    fn body(&self) -> Result<Option<EncodedBody>, EncodeError> {
        encoding::form(self).map(Some)
    }
}
