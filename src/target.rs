use crate::{LeadCaptureError, Result};
use http_types::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed server path that accepts lead capture submissions.
pub const LEAD_CAPTURE_PATH: &str = "/index.php/leadCapture/save2";

/// Identifier of a Marketo form, given either as a number or as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormId {
    Number(u64),
    Text(String),
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormId::Number(n) => write!(f, "{n}"),
            FormId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for FormId {
    fn from(n: u64) -> Self {
        FormId::Number(n)
    }
}

impl From<u32> for FormId {
    fn from(n: u32) -> Self {
        FormId::Number(n.into())
    }
}

impl From<i32> for FormId {
    fn from(n: i32) -> Self {
        match u64::try_from(n) {
            Ok(n) => FormId::Number(n),
            Err(_) => FormId::Text(n.to_string()),
        }
    }
}

impl From<&str> for FormId {
    fn from(s: &str) -> Self {
        FormId::Text(s.to_string())
    }
}

impl From<String> for FormId {
    fn from(s: String) -> Self {
        FormId::Text(s)
    }
}

/// Where a submission goes: the Marketo instance, the account (munchkin)
/// id and the form id.
///
/// ```rust
/// use lead_capture::SubmissionTarget;
///
/// let target = SubmissionTarget::new("//app-sjqe.marketo.com", "718-GIV-198", 621);
/// let page = "https://example.com/contact".parse().unwrap();
/// assert_eq!(
///     target.endpoint_url(&page).unwrap().as_str(),
///     "https://app-sjqe.marketo.com/index.php/leadCapture/save2"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionTarget {
    endpoint_base: String,
    munchkin_id: String,
    form_id: FormId,
}

impl SubmissionTarget {
    pub fn new(
        endpoint_base: impl Into<String>,
        munchkin_id: impl Into<String>,
        form_id: impl Into<FormId>,
    ) -> Self {
        Self {
            endpoint_base: endpoint_base.into(),
            munchkin_id: munchkin_id.into(),
            form_id: form_id.into(),
        }
    }

    pub fn endpoint_base(&self) -> &str {
        &self.endpoint_base
    }

    pub fn munchkin_id(&self) -> &str {
        &self.munchkin_id
    }

    pub fn form_id(&self) -> &FormId {
        &self.form_id
    }

    /// Full lead capture URL for this target.
    ///
    /// Protocol-relative bases (`//host`) take their scheme from `page_url`.
    /// Any path, query or fragment on the base is replaced.
    pub fn endpoint_url(&self, page_url: &Url) -> Result<Url> {
        let base = self.endpoint_base.trim();

        let mut url = if base.starts_with("//") {
            page_url
                .join(base)
                .map_err(|e| LeadCaptureError::InvalidUrl(format!("{base}: {e}")))?
        } else {
            Url::parse(base).map_err(|e| LeadCaptureError::InvalidUrl(format!("{base}: {e}")))?
        };

        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(LeadCaptureError::InvalidUrl(format!(
                "{base}: endpoint base must name a host"
            )));
        }

        url.set_path(LEAD_CAPTURE_PATH);
        url.set_query(None);
        url.set_fragment(None);

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://www.example.com/landing?utm_source=ad").unwrap()
    }

    #[test]
    fn test_absolute_base() {
        let target = SubmissionTarget::new("https://app-sjqe.marketo.com", "718-GIV-198", 621);
        assert_eq!(
            target.endpoint_url(&page()).unwrap().as_str(),
            "https://app-sjqe.marketo.com/index.php/leadCapture/save2"
        );
    }

    #[test]
    fn test_protocol_relative_base_uses_page_scheme() {
        let target = SubmissionTarget::new("//app-sjqe.marketo.com", "718-GIV-198", 621);
        let http_page = Url::parse("http://localhost:8080/form").unwrap();
        assert_eq!(
            target.endpoint_url(&http_page).unwrap().as_str(),
            "http://app-sjqe.marketo.com/index.php/leadCapture/save2"
        );
    }

    #[test]
    fn test_existing_path_is_replaced() {
        let target = SubmissionTarget::new(
            "https://app-sjqe.marketo.com/some/other/path?x=1#frag",
            "718-GIV-198",
            621,
        );
        assert_eq!(
            target.endpoint_url(&page()).unwrap().as_str(),
            "https://app-sjqe.marketo.com/index.php/leadCapture/save2"
        );
    }

    #[test]
    fn test_bare_host_is_rejected() {
        let target = SubmissionTarget::new("app-sjqe.marketo.com", "718-GIV-198", 621);
        assert!(matches!(
            target.endpoint_url(&page()),
            Err(LeadCaptureError::InvalidUrl(_))
        ));

        let target = SubmissionTarget::new("mailto:someone@example.com", "718-GIV-198", 621);
        assert!(matches!(
            target.endpoint_url(&page()),
            Err(LeadCaptureError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_form_id_display() {
        assert_eq!(FormId::from(621u32).to_string(), "621");
        assert_eq!(FormId::from("621").to_string(), "621");
        assert_eq!(FormId::from(-1).to_string(), "-1");
    }
}
