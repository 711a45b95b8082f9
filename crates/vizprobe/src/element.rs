//! DOM element snapshots and typed reads over them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::result::{ProbeError, ProbeResult};

#[allow(clippy::expect_used)]
fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number pattern compiles"))
}

/// Read-only copy of one element's observable state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSnapshot {
    /// Lower-case tag name
    pub tag: String,
    /// Visible text (`innerText`, trimmed)
    pub text: String,
    /// Form control value, if the element has one
    pub value: Option<String>,
    /// Class list
    pub classes: Vec<String>,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// Inline style declarations
    pub style: BTreeMap<String, String>,
    /// Rendered with a non-empty box
    pub visible: bool,
    /// Disabled form control
    pub disabled: bool,
}

impl ElementSnapshot {
    /// Create a snapshot for `tag` with defaults
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            visible: true,
            ..Self::default()
        }
    }

    /// Set text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Add a class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add an inline style declaration
    #[must_use]
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    /// Mark disabled
    #[must_use]
    pub const fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Whether the class list contains `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Input value for form controls, text otherwise
    #[must_use]
    pub fn value_or_text(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.text)
    }

    /// Parse the whole trimmed text as `T`
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Parse`] when the text is not a `T`.
    pub fn number<T: FromStr>(&self) -> ProbeResult<T> {
        let text = self.text.trim();
        text.parse()
            .map_err(|_| ProbeError::parse(&self.tag, text, std::any::type_name::<T>()))
    }

    /// First number embedded anywhere in the text ("Comparisons: 12" → 12)
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Parse`] when the text holds no number.
    pub fn first_number<T: FromStr>(&self) -> ProbeResult<T> {
        extract_numbers(&self.text)?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::parse(&self.tag, &self.text, "a number"))
    }

    /// Inline style length in pixels (`height: 120px` → 120.0)
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Parse`] when the property is absent or not in px.
    pub fn style_px(&self, property: &str) -> ProbeResult<f64> {
        let raw = self
            .style
            .get(property)
            .ok_or_else(|| ProbeError::parse(property, "", "an inline style"))?;
        raw.trim()
            .strip_suffix("px")
            .and_then(|n| n.trim().parse().ok())
            .ok_or_else(|| ProbeError::parse(property, raw, "a pixel length"))
    }
}

/// All numbers embedded in `text`, in order.
///
/// # Errors
///
/// Returns [`ProbeError::Parse`] when a matched token does not fit `T`.
pub fn extract_numbers<T: FromStr>(text: &str) -> ProbeResult<Vec<T>> {
    number_pattern()
        .find_iter(text)
        .map(|m| {
            m.as_str()
                .parse()
                .map_err(|_| ProbeError::parse("number", m.as_str(), std::any::type_name::<T>()))
        })
        .collect()
}

/// JavaScript function body turning an element `el` into an [`ElementSnapshot`] object.
pub(crate) const SNAPSHOT_JS: &str = r"(el) => {
  const rect = el.getBoundingClientRect();
  const style = {};
  for (let i = 0; i < el.style.length; i++) {
    const p = el.style[i];
    style[p] = el.style.getPropertyValue(p);
  }
  const attributes = {};
  for (const a of Array.from(el.attributes)) { attributes[a.name] = a.value; }
  return {
    tag: el.tagName.toLowerCase(),
    text: (el.innerText ?? el.textContent ?? '').trim(),
    value: ('value' in el && typeof el.value === 'string') ? el.value : null,
    classes: Array.from(el.classList),
    attributes,
    style,
    visible: rect.width > 0 && rect.height > 0 && getComputedStyle(el).visibility !== 'hidden',
    disabled: !!el.disabled,
  };
}";

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_number_parses_trimmed_text() {
        let el = ElementSnapshot::new("span").with_text(" 28 ");
        assert_eq!(el.number::<u32>().unwrap(), 28);
    }

    #[test]
    fn test_number_rejects_words() {
        let el = ElementSnapshot::new("span").with_text("twenty");
        assert!(matches!(
            el.number::<u32>(),
            Err(ProbeError::Parse { .. })
        ));
    }

    #[test]
    fn test_first_number_and_extract() {
        let el = ElementSnapshot::new("div").with_text("Comparisons: 12, swaps: 4");
        assert_eq!(el.first_number::<u32>().unwrap(), 12);
        assert_eq!(extract_numbers::<i64>("a -3 b 7").unwrap(), vec![-3, 7]);
        assert_eq!(extract_numbers::<f64>("w=1.5").unwrap(), vec![1.5]);
        assert!(ElementSnapshot::new("p").first_number::<u32>().is_err());
    }

    #[test]
    fn test_style_px() {
        let el = ElementSnapshot::new("div")
            .with_style("height", "120px")
            .with_style("width", "auto");
        assert_eq!(el.style_px("height").unwrap(), 120.0);
        assert!(el.style_px("width").is_err());
        assert!(el.style_px("top").is_err());
    }

    #[test]
    fn test_classes_and_attributes() {
        let el = ElementSnapshot::new("div")
            .with_class("node")
            .with_class("visited")
            .with_attribute("data-id", "B");
        assert!(el.has_class("visited"));
        assert!(!el.has_class("current"));
        assert_eq!(el.attribute("data-id"), Some("B"));
        assert_eq!(el.attribute("data-x"), None);
    }

    #[test]
    fn test_deserialize_partial_object() {
        let el: ElementSnapshot =
            serde_json::from_str(r#"{"tag":"input","value":"28","visible":true}"#).unwrap();
        assert_eq!(el.value_or_text(), "28");
        assert!(el.classes.is_empty());
    }
}
