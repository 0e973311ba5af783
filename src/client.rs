use crate::body::BodyEncoding;
use crate::environment::{HostEnvironment, TrackingContext};
use crate::fields::{bracketize, FieldData, FieldMapping};
use crate::form::FormSource;
use crate::headers;
use crate::metadata;
use crate::payload::{Payload, Route};
use crate::target::SubmissionTarget;
use crate::{LeadCaptureError, Result};
use futures::future::BoxFuture;
use http_client::{HttpClient, Request, Response};
use http_types::Method;
use std::sync::Arc;

/// A submission that has passed validation and is waiting on the network.
///
/// Resolves to the raw endpoint response; the body is not read or parsed.
pub type PendingSubmission = BoxFuture<'static, Result<Response>>;

/// Client that submits form data to a Marketo lead capture endpoint the
/// way the Forms 2.0 script does.
///
/// All validation happens synchronously when a submission is prepared: a
/// `submit*` call either fails immediately, without touching the network,
/// or returns a [`PendingSubmission`] for exactly one POST.
///
/// # Examples
///
/// ```rust,no_run
/// use lead_capture::{FieldRecord, LeadCaptureClient, Result, StaticEnvironment, SubmissionTarget};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let environment = StaticEnvironment::new("https://example.com/contact".parse().unwrap())
///         .with_cookie_header("_mkto_trk=id:718-GIV-198&token:_mch-example.com-1234");
///     let client = LeadCaptureClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         Arc::new(environment),
///     );
///
///     let target = SubmissionTarget::new("https://app-sjqe.marketo.com", "718-GIV-198", 621);
///     let mut record = FieldRecord::new();
///     record.insert("FirstName", "Billy").insert("LastName", "Eyelash");
///
///     let response = client.submit_fields(&target, record)?.await?;
///     println!("Marketo answered {}", response.status());
///     Ok(())
/// }
/// ```
pub struct LeadCaptureClient {
    client: Arc<dyn HttpClient>,
    environment: Arc<dyn HostEnvironment>,
    body_encoding: BodyEncoding,
}

impl LeadCaptureClient {
    /// Create a new [`LeadCaptureClient`].
    ///
    /// # Arguments
    ///
    /// * `client` - Any HTTP client implementation that implements [`HttpClient`]
    /// * `environment` - Source of the page location and tracking cookie
    pub fn new(client: Box<dyn HttpClient>, environment: Arc<dyn HostEnvironment>) -> Self {
        Self {
            client: Arc::from(client),
            environment,
            body_encoding: BodyEncoding::default(),
        }
    }

    /// Choose how request bodies are encoded. Defaults to multipart.
    pub fn with_body_encoding(mut self, body_encoding: BodyEncoding) -> Self {
        self.body_encoding = body_encoding;
        self
    }

    pub fn body_encoding(&self) -> BodyEncoding {
        self.body_encoding
    }

    /// Submit an explicit record or field mapping.
    pub fn submit_fields(
        &self,
        target: &SubmissionTarget,
        fields: impl Into<FieldData>,
    ) -> Result<PendingSubmission> {
        let request = self.prepare_fields(target, fields)?;
        Ok(self.send(request))
    }

    /// Submit the current values of a form, given directly or by selector.
    pub fn submit_form<'a>(
        &self,
        target: &SubmissionTarget,
        form: impl Into<FormSource<'a>>,
    ) -> Result<PendingSubmission> {
        let request = self.prepare_form(target, form)?;
        Ok(self.send(request))
    }

    /// Submit any supported payload, choosing the form or field path by its shape.
    pub fn submit<'a>(
        &self,
        target: &SubmissionTarget,
        payload: impl Into<Payload<'a>>,
    ) -> Result<PendingSubmission> {
        let request = self.prepare(target, payload)?;
        Ok(self.send(request))
    }

    /// Build the request [`submit_fields`](Self::submit_fields) would send.
    pub fn prepare_fields(
        &self,
        target: &SubmissionTarget,
        fields: impl Into<FieldData>,
    ) -> Result<Request> {
        let mapping = fields.into().into_mapping()?;
        self.build_request(target, mapping)
    }

    /// Build the request [`submit_form`](Self::submit_form) would send.
    pub fn prepare_form<'a>(
        &self,
        target: &SubmissionTarget,
        form: impl Into<FormSource<'a>>,
    ) -> Result<Request> {
        let mapping = form.into().fields()?;
        self.build_request(target, mapping)
    }

    /// Build the request [`submit`](Self::submit) would send.
    pub fn prepare<'a>(
        &self,
        target: &SubmissionTarget,
        payload: impl Into<Payload<'a>>,
    ) -> Result<Request> {
        match payload.into().route()? {
            Route::Form(form) => self.prepare_form(target, form),
            Route::HostForm(selector) => {
                let document = self.environment.document().ok_or_else(|| {
                    LeadCaptureError::ElementResolution(format!(
                        "no host document to resolve selector '{selector}' against"
                    ))
                })?;
                self.prepare_form(target, FormSource::selector(&document, &selector))
            }
            Route::Fields(fields) => self.prepare_fields(target, fields),
        }
    }

    /// Send a prepared request.
    ///
    /// Transport failures are returned unchanged as
    /// [`LeadCaptureError::Transport`](crate::LeadCaptureError::Transport); any
    /// HTTP status is a successful result.
    pub fn send(&self, request: Request) -> PendingSubmission {
        let client = Arc::clone(&self.client);
        Box::pin(async move {
            let response = client.send(request).await?;
            log::debug!("Lead capture response status: {}", response.status());
            Ok(response)
        })
    }

    fn build_request(&self, target: &SubmissionTarget, fields: FieldMapping) -> Result<Request> {
        let context = TrackingContext::capture(self.environment.as_ref());
        let url = target.endpoint_url(context.page_url())?;

        let payload = metadata::augment(bracketize(&fields), target, &context);
        let body = self.body_encoding.encode(&payload);

        log::debug!(
            "Submitting {} field(s) for form {} to {url}",
            payload.len(),
            target.form_id()
        );

        let mut request = Request::new(Method::Post, url.clone());
        headers::add_lead_capture_headers(&mut request, &url, context.page_url(), &body.content_type);
        headers::add_same_origin_cookies(
            &mut request,
            &url,
            context.page_url(),
            self.environment.cookie_header().as_deref(),
        );
        request.set_body(body.content);

        Ok(request)
    }
}

impl std::fmt::Debug for LeadCaptureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadCaptureClient")
            .field("client", &self.client)
            .field("body_encoding", &self.body_encoding)
            .finish_non_exhaustive()
    }
}
