//! Textual templates and their compiled renderers.
//!
//! A rule keeps its template as structure (selector list plus an ordered
//! list of placeholders) and produces the handlebars source on demand. The
//! source is only recompiled when that structure changes; value updates just
//! re-run the compiled renderer with fresh data.

use crate::error::SwirlError;
use handlebars::Handlebars;
use std::collections::HashMap;
use std::fmt;

const TEMPLATE_NAME: &str = "swirl";

/// `{{[key]}}`: a literal-segment placeholder, so keys may contain `-`.
pub fn placeholder(key: &str) -> String {
    format!("{{{{[{}]}}}}", key)
}

/// Keeps user text such as selectors from being read as template syntax.
/// Escape the whole literal run, not its pieces: `a{` followed by `{ ` only
/// forms `{{` once joined.
pub fn escape_literal(text: &str) -> String {
    text.replace("{{", "\\{{")
}

/// A compiled template: a pure function from placeholder data to text.
/// CSS passes through unescaped.
pub struct Renderer {
    source: String,
    registry: Handlebars<'static>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("source", &self.source)
            .finish()
    }
}

impl Renderer {
    pub fn compile(source: &str) -> Result<Self, SwirlError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(TEMPLATE_NAME, source)?;
        log::debug!("compiled template `{}`", source);
        Ok(Renderer {
            source: source.to_string(),
            registry,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, data: &HashMap<String, String>) -> Result<String, SwirlError> {
        Ok(self.registry.render(TEMPLATE_NAME, data)?)
    }
}

/// Structure of one rule's template: `a,b{ {{[color]}};{{[margin]}};}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTemplate {
    selector_list: String,
    /// (property, placeholder key) in discovery order.
    entries: Vec<(String, String)>,
}

impl RuleTemplate {
    pub fn new(selectors: &[String]) -> Self {
        RuleTemplate {
            selector_list: selectors.join(","),
            entries: Vec::new(),
        }
    }

    /// Swaps the selector prefix, keeping every placeholder.
    pub fn set_selectors(&mut self, selectors: &[String]) {
        self.selector_list = selectors.join(",");
    }

    pub fn selector_list(&self) -> &str {
        &self.selector_list
    }

    pub fn contains(&self, property: &str) -> bool {
        self.entries.iter().any(|(p, _)| p == property)
    }

    /// Appends a placeholder for `property` and returns its key. Keys are
    /// unique within the template even when two names camelCase alike.
    pub fn push_property(&mut self, property: &str, key: String) -> String {
        let mut unique = key.clone();
        let mut n = 1;
        while self.entries.iter().any(|(_, k)| *k == unique) {
            n += 1;
            unique = format!("{}{}", key, n);
        }
        self.entries.push((property.to_string(), unique.clone()));
        unique
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, k)| (p.as_str(), k.as_str()))
    }

    pub fn source(&self) -> String {
        let mut source = escape_literal(&format!("{}{{ ", self.selector_list));
        for (_, key) in &self.entries {
            source.push_str(&placeholder(key));
            source.push(';');
        }
        source.push('}');
        source
    }
}

/// Source of a sheet template: the slot placeholders back to back.
pub fn concat_source<'a>(keys: impl IntoIterator<Item = &'a str>) -> String {
    keys.into_iter().map(placeholder).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_rule_template_source() {
        let mut template = RuleTemplate::new(&[".a".to_string(), ".b".to_string()]);
        assert_eq!(template.source(), ".a,.b{ }");

        template.push_property("color", "color".to_string());
        template.push_property("margin-top", "marginTop".to_string());
        assert_eq!(template.source(), ".a,.b{ {{[color]}};{{[marginTop]}};}");

        template.set_selectors(&[".c".to_string()]);
        assert_eq!(template.source(), ".c{ {{[color]}};{{[marginTop]}};}");
    }

    #[test]
    fn test_selector_ending_in_brace_still_renders() {
        let mut template = RuleTemplate::new(&["a{".to_string()]);
        template.push_property("color", "color".to_string());
        assert_eq!(template.source(), "a\\{{ {{[color]}};}");

        let renderer = Renderer::compile(&template.source()).unwrap();
        let text = renderer.render(&data(&[("color", "color:red")])).unwrap();
        assert_eq!(text, "a{{ color:red;}");
    }

    #[test]
    fn test_colliding_keys_get_suffix() {
        let mut template = RuleTemplate::new(&[".a".to_string()]);
        assert_eq!(template.push_property("my-var", "myVar".into()), "myVar");
        assert_eq!(template.push_property("--my-var", "myVar".into()), "myVar2");
    }

    #[test]
    fn test_renderer_does_not_escape_css() {
        let renderer = Renderer::compile("a{ {{[content]}};}").unwrap();
        let text = renderer
            .render(&data(&[("content", "content:\"<&>\"")]))
            .unwrap();
        assert_eq!(text, "a{ content:\"<&>\";}");
    }

    #[test]
    fn test_missing_placeholder_renders_empty() {
        let renderer = Renderer::compile(&concat_source(["rule-1", "rule-2"])).unwrap();
        let text = renderer.render(&data(&[("rule-2", "b{ }")])).unwrap();
        assert_eq!(text, "b{ }");
    }
}
