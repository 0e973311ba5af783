use thiserror::Error;

/// Error types for lead capture submissions.
///
/// Every variant except [`LeadCaptureError::Transport`] is a synchronous
/// validation failure: it is returned while the request is being prepared,
/// so no partial request ever reaches the network.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use lead_capture::{FieldRecord, LeadCaptureClient, LeadCaptureError, StaticEnvironment, SubmissionTarget};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let environment = StaticEnvironment::new("https://example.com/contact".parse().unwrap());
///     let client = LeadCaptureClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         Arc::new(environment),
///     );
///     let target = SubmissionTarget::new("https://app-sjqe.marketo.com", "718-GIV-198", 621);
///
///     let mut record = FieldRecord::new();
///     record.insert("Email", "billy@example.com");
///
///     match client.submit_fields(&target, record) {
///         Ok(pending) => match pending.await {
///             Ok(response) => println!("Submitted: {}", response.status()),
///             Err(LeadCaptureError::Transport(e)) => eprintln!("Network error: {}", e),
///             Err(e) => eprintln!("Other error: {}", e),
///         },
///         Err(LeadCaptureError::InvalidFieldData(msg)) => eprintln!("Bad fields: {}", msg),
///         Err(e) => eprintln!("Could not prepare submission: {}", e),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum LeadCaptureError {
    /// A form could not be resolved.
    ///
    /// # Common Causes
    /// - The selector matched no element
    /// - The selector matched an element that is not a `<form>`
    /// - The selector itself could not be parsed
    /// - An element reference passed directly is not a `<form>`
    #[error("Could not resolve form element: {0}")]
    ElementResolution(String),

    /// The payload shape is not one the dispatcher knows how to submit.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The field data is neither a key-value record nor a field mapping,
    /// or a record contains values that cannot be flattened into form fields.
    #[error("Invalid form data: {0}")]
    InvalidFieldData(String),

    /// The endpoint base or page location is not a usable URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by the underlying HTTP transport.
    ///
    /// The transport's error is carried as-is so callers can inspect its
    /// status and cause. Non-2xx responses are not errors; they are returned
    /// as ordinary responses.
    #[error("Transport error: {0}")]
    Transport(http_types::Error),

    /// File system I/O errors.
    ///
    /// This can occur when reading HTML documents from disk.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<http_types::Error> for LeadCaptureError {
    fn from(error: http_types::Error) -> Self {
        LeadCaptureError::Transport(error)
    }
}
