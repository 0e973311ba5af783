use crate::fields::{json_kind, FieldData, FieldMapping, FieldRecord};
use crate::form::FormSource;
use crate::{LeadCaptureError, Result};
use scraper::{ElementRef, Html};
use serde_json::Value;

/// Everything [`LeadCaptureClient::submit`](crate::LeadCaptureClient::submit) accepts.
#[derive(Debug, Clone)]
pub enum Payload<'a> {
    /// A selector resolved against `document`.
    Selector {
        document: &'a Html,
        selector: &'a str,
    },
    /// A selector resolved against the host environment's document.
    HostSelector(String),
    /// A form element already in hand.
    Element(ElementRef<'a>),
    /// A structured key-value record.
    Record(FieldRecord),
    /// Field pairs, possibly with repeated names.
    Fields(FieldMapping),
    /// Loosely-typed JSON from an untyped caller. Strings are host
    /// selectors, objects are records and arrays of `[name, value]` pairs
    /// are field mappings.
    Json(Value),
}

/// Which submission path a payload takes.
#[derive(Debug, Clone)]
pub enum Route<'a> {
    Form(FormSource<'a>),
    /// Form path, with the selector resolved against the host's document.
    HostForm(String),
    Fields(FieldData),
}

impl<'a> Payload<'a> {
    pub fn selector(document: &'a Html, selector: &'a str) -> Self {
        Payload::Selector { document, selector }
    }

    pub fn route(self) -> Result<Route<'a>> {
        match self {
            Payload::Selector { document, selector } => {
                Ok(Route::Form(FormSource::Selector { document, selector }))
            }
            Payload::HostSelector(selector) | Payload::Json(Value::String(selector)) => {
                Ok(Route::HostForm(selector))
            }
            Payload::Element(element) => Ok(Route::Form(FormSource::Element(element))),
            Payload::Record(record) => Ok(Route::Fields(FieldData::Record(record))),
            Payload::Fields(mapping) => Ok(Route::Fields(FieldData::Mapping(mapping))),
            Payload::Json(value @ (Value::Object(_) | Value::Array(_))) => {
                Ok(Route::Fields(FieldData::from_value(value)?))
            }
            Payload::Json(other) => Err(LeadCaptureError::InvalidPayload(format!(
                "cannot submit a JSON {}; expected a selector, an object or a list of pairs",
                json_kind(&other)
            ))),
        }
    }
}

impl<'a> From<ElementRef<'a>> for Payload<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        Payload::Element(element)
    }
}

impl From<&str> for Payload<'_> {
    fn from(selector: &str) -> Self {
        Payload::HostSelector(selector.to_string())
    }
}

impl From<String> for Payload<'_> {
    fn from(selector: String) -> Self {
        Payload::HostSelector(selector)
    }
}

impl From<FieldRecord> for Payload<'_> {
    fn from(record: FieldRecord) -> Self {
        Payload::Record(record)
    }
}

impl From<FieldMapping> for Payload<'_> {
    fn from(mapping: FieldMapping) -> Self {
        Payload::Fields(mapping)
    }
}

impl From<FieldData> for Payload<'_> {
    fn from(data: FieldData) -> Self {
        match data {
            FieldData::Mapping(mapping) => Payload::Fields(mapping),
            FieldData::Record(record) => Payload::Record(record),
        }
    }
}

impl From<Value> for Payload<'_> {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_shapes_take_form_path() {
        let document = Html::parse_document("<form id=\"f\"></form>");
        assert!(matches!(
            Payload::selector(&document, "#f").route(),
            Ok(Route::Form(FormSource::Selector { selector: "#f", .. }))
        ));

        let form = FormSource::selector(&document, "#f").resolve().unwrap();
        assert!(matches!(
            Payload::from(form).route(),
            Ok(Route::Form(FormSource::Element(_)))
        ));

        assert!(matches!(
            Payload::from("form#my-form").route(),
            Ok(Route::HostForm(selector)) if selector == "form#my-form"
        ));
        assert!(matches!(
            Payload::from(json!("form#my-form")).route(),
            Ok(Route::HostForm(selector)) if selector == "form#my-form"
        ));
    }

    #[test]
    fn test_field_shapes_take_mapping_path() {
        let record: FieldRecord = [("FirstName", "Billy")].into_iter().collect();
        assert!(matches!(
            Payload::from(record).route(),
            Ok(Route::Fields(FieldData::Record(_)))
        ));

        assert!(matches!(
            Payload::from(FieldMapping::new()).route(),
            Ok(Route::Fields(FieldData::Mapping(_)))
        ));

        assert!(matches!(
            Payload::from(json!({ "a": 1 })).route(),
            Ok(Route::Fields(FieldData::Record(_)))
        ));
        assert!(matches!(
            Payload::from(json!([["a", "1"]])).route(),
            Ok(Route::Fields(FieldData::Mapping(_)))
        ));
    }

    #[test]
    fn test_unknown_shapes_are_rejected() {
        for value in [json!(null), json!(42), json!(true)] {
            assert!(matches!(
                Payload::from(value).route(),
                Err(LeadCaptureError::InvalidPayload(_))
            ));
        }
    }

    #[test]
    fn test_malformed_pair_list_is_field_data_error() {
        assert!(matches!(
            Payload::from(json!([1, 2])).route(),
            Err(LeadCaptureError::InvalidFieldData(_))
        ));
    }
}
