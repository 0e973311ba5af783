use crate::fields::EncodedPayload;
use uuid::Uuid;

/// How the field pairs are written into the request body.
///
/// Both encodings carry the same ordered pairs, and the lead capture
/// endpoint treats them the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyEncoding {
    /// `multipart/form-data`, what a browser sends for a `FormData` body.
    #[default]
    Multipart,
    /// `application/x-www-form-urlencoded`.
    UrlEncoded,
}

/// A serialized request body and the content type describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireBody {
    pub content_type: String,
    pub content: String,
}

impl BodyEncoding {
    pub fn encode(self, payload: &EncodedPayload) -> WireBody {
        match self {
            BodyEncoding::Multipart => {
                let boundary = new_boundary();
                WireBody {
                    content_type: format!("multipart/form-data; boundary={boundary}"),
                    content: encode_multipart(payload, &boundary),
                }
            }
            BodyEncoding::UrlEncoded => WireBody {
                content_type: "application/x-www-form-urlencoded;charset=UTF-8".to_string(),
                content: encode_url_encoded(payload),
            },
        }
    }
}

/// Encode pairs as `name=value&name=value`, keeping their order and repeats.
///
/// Line breaks are normalized to CRLF first, as in multipart bodies.
pub fn encode_url_encoded(payload: &EncodedPayload) -> String {
    payload
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(&normalize_newlines(name)),
                urlencoding::encode(&normalize_newlines(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Encode pairs as `multipart/form-data` parts delimited by `boundary`.
pub fn encode_multipart(payload: &EncodedPayload, boundary: &str) -> String {
    let mut body = String::new();

    for (name, value) in payload.iter() {
        body.push_str("--");
        body.push_str(boundary);
        body.push_str("\r\n");
        body.push_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
            escape_part_name(name)
        ));
        body.push_str(&normalize_newlines(value));
        body.push_str("\r\n");
    }

    body.push_str("--");
    body.push_str(boundary);
    body.push_str("--\r\n");
    body
}

fn new_boundary() -> String {
    format!("----LeadCaptureFormBoundary{}", Uuid::new_v4().simple())
}

// Browsers percent-escape quotes and line breaks in part names.
fn escape_part_name(name: &str) -> String {
    normalize_newlines(name)
        .replace('\r', "%0D")
        .replace('\n', "%0A")
        .replace('"', "%22")
}

fn normalize_newlines(value: &str) -> String {
    value
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "\r\n")
}
