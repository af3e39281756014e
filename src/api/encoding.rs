//! Request body encodings: JSON, URL-encoded forms, and multipart uploads.

use std::{
    fs::File,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use serde::Serialize;

/// Prefix marking a multipart field value as a path to a local file.
pub const FILE_MARKER: char = '@';

/// A serialized request body, ready to send.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedBody {
    /// The value for the `Content-Type` header.
    pub content_type: String,
    /// The body.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for EncodedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedBody")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A request body that could not be encoded.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// JSON serialization failed.
    #[error("Failed to encode JSON body: {0}")]
    Json(#[from] serde_json::Error),
    /// Form serialization failed.
    #[error("Failed to encode form body: {0}")]
    Form(#[from] serde_qs::Error),
    /// A file referenced by a multipart field could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    File {
        /// The referenced path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

/// Encode a value as an `application/json` body.
pub fn json(value: &impl Serialize) -> Result<EncodedBody, EncodeError> {
    Ok(EncodedBody {
        content_type: "application/json".to_string(),
        bytes: serde_json::to_vec(value)?,
    })
}

/// Encode a flat struct or map as an `application/x-www-form-urlencoded`
/// body.
pub fn form(value: &impl Serialize) -> Result<EncodedBody, EncodeError> {
    Ok(EncodedBody {
        content_type: "application/x-www-form-urlencoded".to_string(),
        bytes: serde_qs::to_string(value)?.into_bytes(),
    })
}

/// One part of a multipart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part<'a> {
    /// A plain form field, sent as is.
    Text(&'a str),
    /// A local file, attached under its final path component.
    File(&'a Path),
}

/// Encode fields as a `multipart/form-data` body.
///
/// A value starting with [FILE_MARKER] is treated as a local path; the file's
/// contents are attached as a file part under the field name. All other
/// values are sent as plain fields. Use [multipart_parts] when values come
/// from elsewhere and must never be read as paths.
pub fn multipart<'a, I>(fields: I) -> Result<EncodedBody, EncodeError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    multipart_parts(fields.into_iter().map(|(name, value)| {
        match value.strip_prefix(FILE_MARKER) {
            Some(path) => (name, Part::File(Path::new(path))),
            None => (name, Part::Text(value)),
        }
    }))
}

/// Encode explicit parts as a `multipart/form-data` body.
pub fn multipart_parts<'a, I>(parts: I) -> Result<EncodedBody, EncodeError>
where
    I: IntoIterator<Item = (&'a str, Part<'a>)>,
{
    let boundary = format!("nyckel-{:032x}", rand::random::<u128>());
    let mut body = Vec::new();

    for (name, part) in parts {
        write!(body, "--{boundary}\r\n").expect("writes to a Vec are infallible");
        match part {
            Part::File(path) => write_file_part(&mut body, name, path)?,
            Part::Text(value) => write!(
                body,
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{value}\r\n",
                escape_quoted(name)
            )
            .expect("writes to a Vec are infallible"),
        }
    }

    write!(body, "--{boundary}--\r\n").expect("writes to a Vec are infallible");

    Ok(EncodedBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        bytes: body,
    })
}

fn write_file_part(body: &mut Vec<u8>, name: &str, path: &Path) -> Result<(), EncodeError> {
    let file_err = |source| EncodeError::File {
        path: path.to_owned(),
        source,
    };

    // The handle is dropped at the end of this scope, whatever happens to
    // the fields after it.
    let mut file = File::open(path).map_err(file_err)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    write!(
        body,
        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n",
        escape_quoted(name),
        escape_quoted(&file_name)
    )
    .expect("writes to a Vec are infallible");

    io::copy(&mut file, body).map_err(file_err)?;
    body.extend_from_slice(b"\r\n");
    Ok(())
}

fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use assert_matches::assert_matches;

    use super::*;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn json_body() {
        let body = json(&serde_json::json!({"name": "Dog", "description": ""})).unwrap();
        assert_eq!(body.content_type, "application/json");
        let parsed: serde_json::Value = serde_json::from_slice(&body.bytes).unwrap();
        assert_eq!(parsed["name"], "Dog");
    }

    #[test]
    fn form_body() {
        let mut fields = BTreeMap::new();
        fields.insert("grant_type", "client_credentials");
        fields.insert("client_id", "a b&c");

        let body = form(&fields).unwrap();
        assert_eq!(body.content_type, "application/x-www-form-urlencoded");

        let s = String::from_utf8(body.bytes).unwrap();
        assert!(s.contains("grant_type=client_credentials"));
        assert!(!s.contains("a b&c"));
    }

    #[test]
    fn multipart_file_and_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.png");
        std::fs::write(&path, b"\x89PNG fake image bytes").unwrap();

        let file_ref = format!("@{}", path.display());
        let body = multipart([("filename", file_ref.as_str()), ("labelName", "cat")]).unwrap();

        let boundary = body
            .content_type
            .strip_prefix("multipart/form-data; boundary=")
            .expect("multipart content type");

        let bytes = &body.bytes;
        assert!(contains(
            bytes,
            b"Content-Disposition: form-data; name=\"filename\"; filename=\"x.png\"\r\n"
        ));
        assert!(contains(bytes, b"\x89PNG fake image bytes"));
        assert!(contains(
            bytes,
            b"Content-Disposition: form-data; name=\"labelName\"\r\n\r\ncat\r\n"
        ));
        assert!(bytes.ends_with(format!("--{boundary}--\r\n").as_bytes()));

        let parts = String::from_utf8_lossy(bytes)
            .matches(&format!("--{boundary}\r\n"))
            .count();
        assert_eq!(parts, 2);
    }

    #[test]
    fn multipart_missing_file() {
        let res = multipart([
            ("labelName", "cat"),
            ("filename", "@/definitely/not/here.png"),
        ]);
        assert_matches!(res, Err(EncodeError::File { path, .. }) if path.ends_with("here.png"));
    }

    #[test]
    fn text_parts_are_never_paths() {
        let dir = tempfile::tempdir().unwrap();
        let secret = dir.path().join("secret.txt");
        std::fs::write(&secret, b"do not upload").unwrap();

        let value = format!("@{}", secret.display());
        let body = multipart_parts([("labelName", Part::Text(value.as_str()))]).unwrap();

        assert!(contains(&body.bytes, value.as_bytes()));
        assert!(!contains(&body.bytes, b"do not upload"));
    }

    #[test]
    fn multipart_boundaries_differ() {
        let a = multipart([("a", "1")]).unwrap();
        let b = multipart([("a", "1")]).unwrap();
        assert_ne!(a.content_type, b.content_type);
    }
}
