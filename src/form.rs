use crate::fields::FieldMapping;
use crate::{LeadCaptureError, Result};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;

/// A form to submit: either an element already in hand, or a selector
/// resolved against a parsed document.
#[derive(Debug, Clone, Copy)]
pub enum FormSource<'a> {
    Element(ElementRef<'a>),
    Selector {
        document: &'a Html,
        selector: &'a str,
    },
}

impl<'a> From<ElementRef<'a>> for FormSource<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        FormSource::Element(element)
    }
}

impl<'a> FormSource<'a> {
    pub fn selector(document: &'a Html, selector: &'a str) -> Self {
        FormSource::Selector { document, selector }
    }

    /// Resolve to exactly one `<form>` element.
    ///
    /// A selector resolves to its first match, as `querySelector` does.
    pub fn resolve(self) -> Result<ElementRef<'a>> {
        let element = match self {
            FormSource::Element(element) => element,
            FormSource::Selector { document, selector } => {
                let parsed = Selector::parse(selector).map_err(|e| {
                    LeadCaptureError::ElementResolution(format!(
                        "invalid selector '{selector}': {e}"
                    ))
                })?;
                document.select(&parsed).next().ok_or_else(|| {
                    LeadCaptureError::ElementResolution(format!(
                        "selector '{selector}' matched no element"
                    ))
                })?
            }
        };

        let tag = element.value().name();
        if !tag.eq_ignore_ascii_case("form") {
            return Err(LeadCaptureError::ElementResolution(format!(
                "<{tag}> is not a form element"
            )));
        }

        Ok(element)
    }

    /// Resolve the form and extract its current field values.
    pub fn fields(self) -> Result<FieldMapping> {
        let form = self.resolve()?;
        Ok(extract_fields(form))
    }
}

/// Read and parse an HTML document from disk.
pub fn read_document(path: impl AsRef<Path>) -> Result<Html> {
    let html = std::fs::read_to_string(path)?;
    Ok(Html::parse_document(&html))
}

/// Collect the successful controls of `form` in document order, the way a
/// browser builds `FormData` from a form.
pub fn extract_fields(form: ElementRef<'_>) -> FieldMapping {
    let mut fields = FieldMapping::new();

    for control in form.descendants().filter_map(ElementRef::wrap) {
        let element = control.value();
        let tag = element.name();
        if !matches!(tag, "input" | "select" | "textarea") {
            continue;
        }

        let name = match element.attr("name") {
            Some(name) if !name.is_empty() => name,
            _ => continue,
        };

        if is_disabled(control, form) {
            continue;
        }

        match tag {
            "input" => {
                if let Some(value) = input_value(control) {
                    fields.append(name, value);
                }
            }
            "select" => {
                for value in selected_options(control) {
                    fields.append(name, value);
                }
            }
            "textarea" => fields.append(name, control.text().collect::<String>()),
            _ => {}
        }
    }

    log::debug!("Extracted {} field(s) from form", fields.len());
    fields
}

fn input_value(input: ElementRef<'_>) -> Option<String> {
    let element = input.value();
    let kind = element
        .attr("type")
        .unwrap_or("text")
        .trim()
        .to_ascii_lowercase();

    match kind.as_str() {
        // File uploads cannot be represented by a text field.
        "button" | "submit" | "reset" | "image" | "file" => None,
        "checkbox" | "radio" => element
            .attr("checked")
            .map(|_| element.attr("value").unwrap_or("on").to_string()),
        _ => Some(element.attr("value").unwrap_or_default().to_string()),
    }
}

fn selected_options(select: ElementRef<'_>) -> Vec<String> {
    let multiple = select.value().attr("multiple").is_some();
    let options: Vec<ElementRef<'_>> = select
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "option")
        .collect();

    let is_option_disabled = |option: &ElementRef<'_>| {
        option.value().attr("disabled").is_some()
            || option
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|el| *el != select)
                .any(|el| el.value().name() == "optgroup" && el.value().attr("disabled").is_some())
    };

    let mut selected: Vec<&ElementRef<'_>> = options
        .iter()
        .filter(|option| option.value().attr("selected").is_some())
        .collect();

    if !multiple {
        // A single select shows the last option marked selected, or the first
        // enabled option when none is.
        selected = match selected.last() {
            Some(last) => vec![*last],
            None => options
                .iter()
                .find(|option| !is_option_disabled(*option))
                .into_iter()
                .collect(),
        };
    }

    selected
        .into_iter()
        .filter(|option| !is_option_disabled(*option))
        .map(option_value)
        .collect()
}

fn option_value(option: &ElementRef<'_>) -> String {
    match option.value().attr("value") {
        Some(value) => value.to_string(),
        None => option
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Disabled directly, or inside a disabled `<fieldset>` (outside its first
/// `<legend>`) below `form`.
fn is_disabled(control: ElementRef<'_>, form: ElementRef<'_>) -> bool {
    if control.value().attr("disabled").is_some() {
        return true;
    }

    let mut child = control;
    for ancestor in control.ancestors().filter_map(ElementRef::wrap) {
        if ancestor == form {
            break;
        }
        if ancestor.value().name() == "fieldset" && ancestor.value().attr("disabled").is_some() {
            let first_legend = ancestor
                .children()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "legend");
            let inside_first_legend = first_legend
                .map(|legend| legend == child)
                .unwrap_or(false);
            if !inside_first_legend {
                return true;
            }
        }
        child = ancestor;
    }

    false
}
