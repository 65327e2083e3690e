use tracing::{debug, warn};

use crate::browser::{css_string, BrowserError, ElementDriver, PageDriver, Relation};

/// Every control that can carry an answer, in document order.
pub const FIELD_SELECTOR: &str = "input, textarea, select";

/// Input types that never carry candidate data.
const NON_FILLABLE_INPUT_TYPES: [&str; 5] = ["hidden", "submit", "button", "reset", "image"];

/// How a control is filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text: text-like inputs, inputs without a type, textareas.
    Text,
    File,
    Checkbox,
    Radio,
    Select,
    /// Any other input type (date, range, color, ...). Left untouched.
    Other(String),
}

impl FieldKind {
    pub fn classify(tag: &str, input_type: &str) -> Self {
        match tag {
            "textarea" => FieldKind::Text,
            "select" => FieldKind::Select,
            _ => match input_type {
                "" | "text" | "email" | "tel" | "url" | "number" => FieldKind::Text,
                "file" => FieldKind::File,
                "checkbox" => FieldKind::Checkbox,
                "radio" => FieldKind::Radio,
                other => FieldKind::Other(other.to_string()),
            },
        }
    }
}

/// One fillable control found on an application page. Only valid until the page navigates.
#[derive(Debug, Clone)]
pub struct FormField<E> {
    pub element: E,
    pub kind: FieldKind,
    pub name: String,
    pub id: String,
    pub placeholder: String,
    /// Visible label text, or empty when none could be associated.
    pub label: String,
}

impl<E> FormField<E> {
    /// Short human-readable identifier for logs.
    pub fn display_name(&self) -> &str {
        [&self.label, &self.name, &self.id, &self.placeholder]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("<unnamed>")
    }
}

/// Enumerates the fillable controls on the current page.
///
/// A control whose attributes cannot be read is skipped; only failing to query
/// the page at all is an error.
pub async fn discover_fields<P: PageDriver>(
    page: &P,
) -> Result<Vec<FormField<P::Element>>, BrowserError> {
    let elements = page.find_all(FIELD_SELECTOR).await?;
    let mut fields = Vec::with_capacity(elements.len());

    for element in elements {
        match describe(page, element).await {
            Ok(Some(field)) => fields.push(field),
            Ok(None) => {}
            Err(e) => warn!("Skipping unreadable form control: {e}"),
        }
    }

    debug!("Discovered {} fillable fields", fields.len());
    Ok(fields)
}

async fn describe<P: PageDriver>(
    page: &P,
    element: P::Element,
) -> Result<Option<FormField<P::Element>>, BrowserError> {
    let tag = element.tag_name().await?.to_lowercase();
    let input_type = attr(&element, "type").await?.to_lowercase();
    if tag == "input" && NON_FILLABLE_INPUT_TYPES.contains(&input_type.as_str()) {
        return Ok(None);
    }

    let name = attr(&element, "name").await?;
    let id = attr(&element, "id").await?;
    let placeholder = attr(&element, "placeholder").await?;
    let label = infer_label(page, &element, &id).await;

    Ok(Some(FormField {
        kind: FieldKind::classify(&tag, &input_type),
        element,
        name,
        id,
        placeholder,
        label,
    }))
}

async fn attr<E: ElementDriver>(element: &E, name: &str) -> Result<String, BrowserError> {
    Ok(element.attribute(name).await?.unwrap_or_default().trim().to_string())
}

/// Label text for a control: `label[for=id]`, then an enclosing label, then an
/// adjacent sibling label. Lookup failures fall through to the next strategy.
pub async fn infer_label<P: PageDriver>(page: &P, element: &P::Element, id: &str) -> String {
    if !id.is_empty() {
        let selector = format!("label[for={}]", css_string(id));
        if let Ok(labels) = page.find_all(&selector).await {
            if let Some(label) = labels.first() {
                if let Ok(text) = label.text().await {
                    let text = text.trim();
                    if !text.is_empty() {
                        return text.to_string();
                    }
                }
            }
        }
    }

    for relation in [Relation::Parent, Relation::PreviousSibling, Relation::NextSibling] {
        if let Ok(Some(node)) = element.related(relation).await {
            if node.is_label() && !node.text.trim().is_empty() {
                return node.text.trim().to_string();
            }
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDocument, FakeElement, FakePage};

    #[test]
    fn test_classify_control_kinds() {
        assert_eq!(FieldKind::classify("input", ""), FieldKind::Text);
        assert_eq!(FieldKind::classify("input", "email"), FieldKind::Text);
        assert_eq!(FieldKind::classify("textarea", ""), FieldKind::Text);
        assert_eq!(FieldKind::classify("select", ""), FieldKind::Select);
        assert_eq!(FieldKind::classify("input", "file"), FieldKind::File);
        assert_eq!(FieldKind::classify("input", "checkbox"), FieldKind::Checkbox);
        assert_eq!(FieldKind::classify("input", "radio"), FieldKind::Radio);
        assert_eq!(
            FieldKind::classify("input", "date"),
            FieldKind::Other("date".to_string())
        );
    }

    #[tokio::test]
    async fn test_discovery_skips_non_fillable_inputs_and_keeps_order() {
        let doc = FakeDocument::new().with(
            FIELD_SELECTOR,
            vec![
                FakeElement::input("hidden", "csrf").build(),
                FakeElement::input("text", "first_name").build(),
                FakeElement::input("submit", "go").build(),
                FakeElement::builder("textarea").attr("name", "cover").build(),
                FakeElement::builder("select").attr("name", "country").build(),
                FakeElement::input("IMAGE", "pixel").build(),
            ],
        );
        let page = FakePage::showing(doc);

        let fields = discover_fields(&page).await.unwrap();

        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first_name", "cover", "country"]);
        assert_eq!(fields[1].kind, FieldKind::Text);
        assert_eq!(fields[2].kind, FieldKind::Select);
    }

    #[tokio::test]
    async fn test_label_for_id_takes_precedence() {
        let input = FakeElement::input("text", "email")
            .attr("id", "email-1")
            .related(Relation::Parent, "label", "Parent label")
            .build();
        let doc = FakeDocument::new()
            .with(FIELD_SELECTOR, vec![input])
            .with(
                "label[for=\"email-1\"]",
                vec![FakeElement::builder("label").text(" Email address ").build()],
            );
        let page = FakePage::showing(doc);

        let fields = discover_fields(&page).await.unwrap();
        assert_eq!(fields[0].label, "Email address");
        assert_eq!(fields[0].id, "email-1");
    }

    #[tokio::test]
    async fn test_label_falls_back_to_parent_then_siblings() {
        let wrapped = FakeElement::input("text", "a")
            .related(Relation::Parent, "label", "Wrapped")
            .build();
        let after = FakeElement::input("text", "b")
            .related(Relation::Parent, "div", "not a label")
            .related(Relation::PreviousSibling, "span", "nope")
            .related(Relation::NextSibling, "label", "Trailing")
            .build();
        let bare = FakeElement::input("text", "c")
            .related(Relation::PreviousSibling, "div", "Phone")
            .build();
        let page = FakePage::showing(FakeDocument::new().with(FIELD_SELECTOR, vec![wrapped, after, bare]));

        let fields = discover_fields(&page).await.unwrap();
        let labels: Vec<_> = fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Wrapped", "Trailing", ""]);
    }

    #[tokio::test]
    async fn test_unreadable_control_is_skipped() {
        let page = FakePage::showing(FakeDocument::new().with(
            FIELD_SELECTOR,
            vec![
                FakeElement::input("text", "gone").broken().build(),
                FakeElement::input("email", "email").build(),
            ],
        ));

        let fields = discover_fields(&page).await.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "email");
    }

    #[test]
    fn test_display_name_prefers_label_then_name() {
        let mut field = FormField {
            element: (),
            kind: FieldKind::Text,
            name: "q1".to_string(),
            id: String::new(),
            placeholder: String::new(),
            label: "Years of experience".to_string(),
        };
        assert_eq!(field.display_name(), "Years of experience");

        field.label.clear();
        assert_eq!(field.display_name(), "q1");
    }
}
