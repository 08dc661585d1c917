// An owned copy of a parsed stylesheet, detached from the parser's borrowed input.
use std::fmt;

#[derive(Debug, Default)]
pub struct OwnedStylesheet {
    pub rules: Vec<OwnedRule>,
}

#[derive(Debug, Clone)]
pub struct OwnedRule {
    /// e.g. "div", ".red", "#header"
    pub selectors: Vec<String>,
    /// Normal declarations first, then `!important` ones, each in source order.
    pub declarations: Vec<OwnedDeclaration>,
    /// Query text of the enclosing `@media` block, e.g. "(min-width: 600px)".
    pub media: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedDeclaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl OwnedDeclaration {
    /// Value as it is handed to a rule, `!important` included.
    pub fn value_text(&self) -> String {
        if self.important {
            format!("{} !important", self.value)
        } else {
            self.value.clone()
        }
    }
}

impl fmt::Display for OwnedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(media) = &self.media {
            write!(f, "@media {} ", media)?;
        }
        writeln!(f, "{} {{", self.selectors.join(", "))?;
        for decl in &self.declarations {
            writeln!(f, "  {}: {};", decl.property, decl.value_text())?;
        }
        write!(f, "}}")
    }
}
