//! Hand-built `multipart/form-data` bodies for file upload endpoints.
//!
//! Bodies are plain strings with CRLF line endings and a fixed boundary, so
//! they can be built and checked without any network I/O.

use crate::error::{ClientError, ClientResult};

/// Boundary token used for every multipart body
pub const MULTIPART_BOUNDARY: &str = "----PlatformClientFormBoundary7MA4YWxkTrZu0gW";

const CRLF: &str = "\r\n";

/// Fully encoded multipart payload
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartBody {
    content: String,
}

impl MultipartBody {
    /// Accept a pre-encoded body, checking it is framed with [`MULTIPART_BOUNDARY`]
    pub fn from_encoded(content: impl Into<String>) -> ClientResult<Self> {
        let content = content.into();
        let opening = format!("--{}{}", MULTIPART_BOUNDARY, CRLF);
        let closing = format!("--{}--", MULTIPART_BOUNDARY);

        if !content.starts_with(&opening) {
            return Err(ClientError::invalid_argument(
                "multipart body must open with the fixed boundary followed by CRLF",
            ));
        }
        if !content.trim_end_matches(CRLF).ends_with(&closing) {
            return Err(ClientError::invalid_argument(
                "multipart body must end with the closing boundary",
            ));
        }
        Ok(Self { content })
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY)
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn into_string(self) -> String {
        self.content
    }
}

#[derive(Debug, Clone)]
struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    value: String,
}

/// Builder for [`MultipartBody`]
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain form field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            filename: None,
            content_type: None,
            value: value.into(),
        });
        self
    }

    /// Add a file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            value: content.into(),
        });
        self
    }

    pub fn finish(self) -> MultipartBody {
        let mut content = String::new();
        for part in &self.parts {
            content.push_str("--");
            content.push_str(MULTIPART_BOUNDARY);
            content.push_str(CRLF);

            content.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"",
                quote(&part.name)
            ));
            if let Some(filename) = &part.filename {
                content.push_str(&format!("; filename=\"{}\"", quote(filename)));
            }
            content.push_str(CRLF);

            if let Some(content_type) = &part.content_type {
                content.push_str(&format!("Content-Type: {}{}", content_type, CRLF));
            }
            content.push_str(CRLF);
            content.push_str(&part.value);
            content.push_str(CRLF);
        }
        content.push_str(&format!("--{}--{}", MULTIPART_BOUNDARY, CRLF));

        MultipartBody { content }
    }
}

/// Single-file upload body, the shape most upload endpoints expect
pub fn file_upload_body(
    field: &str,
    filename: &str,
    content_type: &str,
    content: &str,
) -> MultipartBody {
    MultipartForm::new()
        .file(field, filename, content_type, content)
        .finish()
}

// Header parameter values cannot carry raw quotes or line breaks.
fn quote(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
