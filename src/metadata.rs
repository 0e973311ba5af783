use crate::environment::TrackingContext;
use crate::fields::{EncodedPayload, MULTI_VALUE_SUFFIX};
use crate::target::SubmissionTarget;

/// Form id, as expected by the lead capture endpoint.
pub const FORM_ID_FIELD: &str = "formid";
/// Account (munchkin) id.
pub const MUNCHKIN_ID_FIELD: &str = "munchkinId";
/// Form id again under the form-version name; Marketo reads both.
pub const FORM_VERSION_FIELD: &str = "formVid";
/// Visitor tracking token copied from the `_mkto_trk` cookie.
pub const TRACKING_TOKEN_FIELD: &str = "_mkt_trk";
/// Page the submission was made from.
pub const REFERRER_FIELD: &str = "_mktoReferrer";

/// Field names whose values are always computed and never taken from the caller.
pub const RESERVED_FIELDS: [&str; 5] = [
    FORM_ID_FIELD,
    MUNCHKIN_ID_FIELD,
    FORM_VERSION_FIELD,
    TRACKING_TOKEN_FIELD,
    REFERRER_FIELD,
];

/// Whether `name` (with or without a `[]` suffix) is a reserved field.
pub fn is_reserved(name: &str) -> bool {
    let base = name.strip_suffix(MULTI_VALUE_SUFFIX).unwrap_or(name);
    RESERVED_FIELDS.contains(&base)
}

/// Append the tracking metadata to an encoded payload.
///
/// Caller-supplied fields with reserved names are dropped first. The
/// tracking token field is omitted entirely when the context has no token.
pub fn augment(
    mut payload: EncodedPayload,
    target: &SubmissionTarget,
    context: &TrackingContext,
) -> EncodedPayload {
    let before = payload.len();
    payload.retain(|name| !is_reserved(name));
    if payload.len() != before {
        log::debug!(
            "Dropped {} caller field(s) that collide with reserved metadata names",
            before - payload.len()
        );
    }

    let form_id = target.form_id().to_string();
    payload.push(FORM_ID_FIELD, form_id.clone());
    payload.push(MUNCHKIN_ID_FIELD, target.munchkin_id());
    payload.push(FORM_VERSION_FIELD, form_id);
    if let Some(token) = context.tracking_token() {
        payload.push(TRACKING_TOKEN_FIELD, token);
    }
    payload.push(REFERRER_FIELD, context.page_url().as_str());

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{bracketize, FieldMapping};
    use http_types::Url;

    fn target() -> SubmissionTarget {
        SubmissionTarget::new("https://app-sjqe.marketo.com", "718-GIV-198", 621)
    }

    fn context(token: Option<&str>) -> TrackingContext {
        TrackingContext::new(
            Url::parse("https://www.example.com/contact").unwrap(),
            token.map(str::to_string),
        )
    }

    fn names(payload: &EncodedPayload) -> Vec<&str> {
        payload.iter().map(|(name, _)| name).collect()
    }

    #[test]
    fn test_appends_metadata_in_order() {
        let fields: FieldMapping = [("FirstName", "Billy")].into_iter().collect();
        let payload = augment(bracketize(&fields), &target(), &context(Some("id:abc")));

        assert_eq!(
            names(&payload),
            vec![
                "FirstName",
                "formid",
                "munchkinId",
                "formVid",
                "_mkt_trk",
                "_mktoReferrer"
            ]
        );
        assert_eq!(payload.get("formid"), Some("621"));
        assert_eq!(payload.get("formVid"), Some("621"));
        assert_eq!(payload.get("munchkinId"), Some("718-GIV-198"));
        assert_eq!(payload.get("_mkt_trk"), Some("id:abc"));
        assert_eq!(
            payload.get("_mktoReferrer"),
            Some("https://www.example.com/contact")
        );
    }

    #[test]
    fn test_missing_token_is_omitted() {
        let payload = augment(bracketize(&FieldMapping::new()), &target(), &context(None));
        assert!(!payload.contains(TRACKING_TOKEN_FIELD));
        assert!(payload.iter().all(|(_, value)| !value.is_empty()));
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn test_reserved_names_take_computed_values() {
        let fields: FieldMapping = [
            ("formid", "999"),
            ("formid", "998"),
            ("_mktoReferrer", "https://spoofed.example"),
            ("munchkinIdSuffix", "kept"),
        ]
        .into_iter()
        .collect();

        let payload = augment(bracketize(&fields), &target(), &context(None));

        assert!(!payload.contains("formid[]"));
        assert_eq!(payload.get("formid"), Some("621"));
        assert_eq!(payload.get("munchkinIdSuffix"), Some("kept"));
        assert_eq!(
            payload.get("_mktoReferrer"),
            Some("https://www.example.com/contact")
        );
        assert_eq!(payload.len(), 5);
    }

    #[test]
    fn test_is_reserved() {
        assert!(is_reserved("formVid"));
        assert!(is_reserved("_mkt_trk[]"));
        assert!(!is_reserved("FormVid"));
        assert!(!is_reserved("Email"));
    }
}
