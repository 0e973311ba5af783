//! # Host Environment
//!
//! The page a submission originates from owns two pieces of state the
//! request needs: the visitor tracking cookie and the page location. This
//! module abstracts them behind [`HostEnvironment`] so they are read fresh
//! on every call and can be supplied by tests without a browser.

use http_types::Url;
use scraper::Html;
use std::error::Error;

/// Cookie in which the Munchkin tracking script stores the visitor token.
pub const TRACKING_COOKIE: &str = "_mkto_trk";

/// Error type for the optional cookie-creation pre-step.
pub type CookieCreationError = Box<dyn Error + Send + Sync>;

/// State provided by the page hosting the form.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides
/// `MockHostEnvironment` generated by `mockall`.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait HostEnvironment: Send + Sync {
    /// Current page location, sent as the referrer.
    fn page_url(&self) -> Url;

    /// Value of the named cookie, if set.
    fn cookie(&self, name: &str) -> Option<String>;

    /// `Cookie` header the host would attach to a request, if any.
    fn cookie_header(&self) -> Option<String> {
        None
    }

    /// Document that bare selector payloads are resolved against.
    fn document(&self) -> Option<Html> {
        None
    }

    /// Ask the tracking script to create its cookie before the submission.
    ///
    /// Failures are logged and otherwise ignored by callers.
    fn create_tracking_cookie(&self) -> Result<(), CookieCreationError> {
        Ok(())
    }
}

/// Tracking metadata captured once per submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingContext {
    tracking_token: Option<String>,
    page_url: Url,
}

impl TrackingContext {
    pub fn new(page_url: Url, tracking_token: Option<String>) -> Self {
        Self {
            tracking_token: tracking_token.filter(|token| !token.is_empty()),
            page_url,
        }
    }

    /// Run the cookie-creation pre-step, then read the tracking cookie and
    /// page location from `environment`.
    pub fn capture(environment: &dyn HostEnvironment) -> Self {
        if let Err(e) = environment.create_tracking_cookie() {
            log::debug!("Ignoring tracking cookie creation failure: {e}");
        }

        let tracking_token = environment.cookie(TRACKING_COOKIE);
        if tracking_token.is_none() {
            log::debug!("No {TRACKING_COOKIE} cookie set; submitting without tracking token");
        }

        Self::new(environment.page_url(), tracking_token)
    }

    pub fn tracking_token(&self) -> Option<&str> {
        self.tracking_token.as_deref()
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }
}

/// A [`HostEnvironment`] with a fixed page location, cookie jar and
/// optional page markup.
///
/// ```rust
/// use lead_capture::{HostEnvironment, StaticEnvironment};
///
/// let env = StaticEnvironment::new("https://example.com/".parse().unwrap())
///     .with_cookie_header("_mkto_trk=id%3A718-GIV-198%26token%3Aabc; theme=dark");
/// assert_eq!(env.cookie("_mkto_trk").as_deref(), Some("id:718-GIV-198&token:abc"));
/// ```
#[derive(Debug, Clone)]
pub struct StaticEnvironment {
    page_url: Url,
    cookies: Vec<(String, String)>,
    markup: Option<String>,
}

impl StaticEnvironment {
    pub fn new(page_url: Url) -> Self {
        Self {
            page_url,
            cookies: Vec::new(),
            markup: None,
        }
    }

    /// Set the page's HTML. It is parsed again on every [`HostEnvironment::document`] call.
    pub fn with_document(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    /// Add a cookie. The value is stored as it would appear in a `Cookie` header.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.cookies.retain(|(existing, _)| *existing != name);
        self.cookies.push((name, value.into()));
        self
    }

    /// Add every cookie from a `Cookie` header string (`a=1; b=2`).
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        for (name, value) in parse_cookie_header(header) {
            self = self.with_cookie(name, value);
        }
        self
    }
}

impl HostEnvironment for StaticEnvironment {
    fn page_url(&self) -> Url {
        self.page_url.clone()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies
            .iter()
            .find(|(cookie_name, _)| cookie_name == name)
            .map(|(_, value)| {
                urlencoding::decode(value)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| value.clone())
            })
    }

    fn document(&self) -> Option<Html> {
        self.markup.as_deref().map(Html::parse_document)
    }

    fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Split a `Cookie` header into `(name, raw value)` pairs.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"');
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn page() -> Url {
        Url::parse("https://www.example.com/contact").unwrap()
    }

    #[test]
    fn test_parse_cookie_header() {
        let cookies = parse_cookie_header(" a=1; b = two ;broken; =nameless; c=\"quoted\"");
        assert_eq!(
            cookies,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "two".to_string()),
                ("c".to_string(), "quoted".to_string()),
            ]
        );
    }

    #[test]
    fn test_static_environment_cookies() {
        let env = StaticEnvironment::new(page())
            .with_cookie("_mkto_trk", "id%3A1")
            .with_cookie("theme", "dark")
            .with_cookie("_mkto_trk", "id%3A2");

        assert_eq!(env.cookie(TRACKING_COOKIE).as_deref(), Some("id:2"));
        assert_eq!(env.cookie("missing"), None);
        assert_eq!(
            env.cookie_header().as_deref(),
            Some("theme=dark; _mkto_trk=id%3A2")
        );
        assert_eq!(StaticEnvironment::new(page()).cookie_header(), None);
    }

    #[test]
    fn test_empty_token_counts_as_absent() {
        let env = StaticEnvironment::new(page()).with_cookie(TRACKING_COOKIE, "");
        let context = TrackingContext::capture(&env);
        assert_eq!(context.tracking_token(), None);
    }

    #[test]
    fn test_static_environment_document() {
        assert!(StaticEnvironment::new(page()).document().is_none());

        let env = StaticEnvironment::new(page()).with_document("<form id=\"signup\"></form>");
        let document = env.document().unwrap();
        let selector = scraper::Selector::parse("form#signup").unwrap();
        assert_eq!(document.select(&selector).count(), 1);
    }

    struct FailingTracker {
        attempts: AtomicUsize,
    }

    impl HostEnvironment for FailingTracker {
        fn page_url(&self) -> Url {
            page()
        }

        fn cookie(&self, name: &str) -> Option<String> {
            (name == TRACKING_COOKIE).then(|| "token".to_string())
        }

        fn create_tracking_cookie(&self) -> Result<(), CookieCreationError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err("Munchkin not loaded".into())
        }
    }

    #[test]
    fn test_capture_swallows_cookie_creation_failure() {
        let env = FailingTracker {
            attempts: AtomicUsize::new(0),
        };

        let context = TrackingContext::capture(&env);

        assert_eq!(env.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(context.tracking_token(), Some("token"));
        assert_eq!(context.page_url(), &page());
    }
}
