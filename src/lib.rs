pub mod body;
pub mod client;
pub mod config;
pub mod environment;
pub mod error;
pub mod fields;
pub mod form;
pub mod headers;
pub mod metadata;
pub mod payload;
pub mod target;

pub use body::BodyEncoding;
pub use client::{LeadCaptureClient, PendingSubmission};
pub use config::SubmitterConfig;
pub use environment::{HostEnvironment, StaticEnvironment, TrackingContext, TRACKING_COOKIE};
pub use error::LeadCaptureError;
pub use fields::{bracketize, find_duplicates, EncodedPayload, FieldData, FieldMapping, FieldRecord};
pub use form::FormSource;
pub use payload::Payload;
pub use target::{FormId, SubmissionTarget, LEAD_CAPTURE_PATH};

#[cfg(feature = "mock")]
pub use environment::MockHostEnvironment;

// Re-export scraper types for callers building form payloads
pub use scraper::{ElementRef, Html};

pub type Result<T> = std::result::Result<T, LeadCaptureError>;
