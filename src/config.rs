use crate::body::BodyEncoding;
use crate::environment::StaticEnvironment;
use crate::target::{FormId, SubmissionTarget};
use crate::{LeadCaptureError, Result};
use http_types::Url;

pub const ENDPOINT_VAR: &str = "LEAD_CAPTURE_ENDPOINT";
pub const MUNCHKIN_ID_VAR: &str = "LEAD_CAPTURE_MUNCHKIN_ID";
pub const FORM_ID_VAR: &str = "LEAD_CAPTURE_FORM_ID";
pub const PAGE_URL_VAR: &str = "LEAD_CAPTURE_PAGE_URL";
pub const COOKIES_VAR: &str = "LEAD_CAPTURE_COOKIES";

/// Settings for submitting outside a browser, collected from environment
/// variables and command-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitterConfig {
    pub endpoint: Option<String>,
    pub munchkin_id: Option<String>,
    pub form_id: Option<String>,
    pub page_url: Option<String>,
    pub cookies: Option<String>,
    pub url_encoded: bool,
}

impl SubmitterConfig {
    /// Read the `LEAD_CAPTURE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            endpoint: read(ENDPOINT_VAR),
            munchkin_id: read(MUNCHKIN_ID_VAR),
            form_id: read(FORM_ID_VAR),
            page_url: read(PAGE_URL_VAR),
            cookies: read(COOKIES_VAR),
            url_encoded: false,
        }
    }

    /// Layer `overrides` on top of `self`; set values in `overrides` win.
    pub fn merge(self, overrides: SubmitterConfig) -> Self {
        Self {
            endpoint: overrides.endpoint.or(self.endpoint),
            munchkin_id: overrides.munchkin_id.or(self.munchkin_id),
            form_id: overrides.form_id.or(self.form_id),
            page_url: overrides.page_url.or(self.page_url),
            cookies: overrides.cookies.or(self.cookies),
            url_encoded: overrides.url_encoded || self.url_encoded,
        }
    }

    pub fn target(&self) -> Result<SubmissionTarget> {
        let endpoint = required(&self.endpoint, "endpoint", ENDPOINT_VAR)?;
        let munchkin_id = required(&self.munchkin_id, "munchkin id", MUNCHKIN_ID_VAR)?;
        let form_id = required(&self.form_id, "form id", FORM_ID_VAR)?;

        let form_id = match form_id.trim().parse::<u64>() {
            Ok(n) => FormId::Number(n),
            Err(_) => FormId::Text(form_id.trim().to_string()),
        };

        Ok(SubmissionTarget::new(endpoint.trim(), munchkin_id.trim(), form_id))
    }

    /// Host environment for the configured page location and cookies.
    pub fn environment(&self) -> Result<StaticEnvironment> {
        let page_url = required(&self.page_url, "page URL", PAGE_URL_VAR)?;
        let page_url = Url::parse(page_url.trim())
            .map_err(|e| LeadCaptureError::InvalidUrl(format!("{page_url}: {e}")))?;

        let mut environment = StaticEnvironment::new(page_url);
        if let Some(cookies) = &self.cookies {
            environment = environment.with_cookie_header(cookies);
        }
        Ok(environment)
    }

    pub fn body_encoding(&self) -> BodyEncoding {
        if self.url_encoded {
            BodyEncoding::UrlEncoded
        } else {
            BodyEncoding::Multipart
        }
    }
}

fn required<'a>(value: &'a Option<String>, what: &str, var: &str) -> Result<&'a str> {
    value.as_deref().ok_or_else(|| {
        LeadCaptureError::Config(format!("missing {what}; set {var} or pass it explicitly"))
    })
}
