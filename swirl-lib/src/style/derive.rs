//! Rules derived from a parent rule for a state qualifier.

use crate::context::Swirl;
use crate::style::rule::{Rule, Wrap};

pub const PSEUDO_CLASSES: &[&str] = &[
    "active",
    "checked",
    "disabled",
    "empty",
    "enabled",
    "first-child",
    "first-of-type",
    "focus",
    "hover",
    "in-range",
    "invalid",
    "last-child",
    "last-of-type",
    "link",
    "only-of-type",
    "only-child",
    "optional",
    "out-of-range",
    "read-only",
    "read-write",
    "required",
    "root",
    "target",
    "valid",
    "visited",
];

pub const PSEUDO_ELEMENTS: &[&str] = &["after", "before", "first-letter", "first-line", "selection"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    PseudoClass,
    PseudoElement,
    /// Anything outside the pseudo vocabularies: a media condition.
    Conditional,
}

pub fn classify(state: &str) -> StateKind {
    if PSEUDO_CLASSES.contains(&state) {
        StateKind::PseudoClass
    } else if PSEUDO_ELEMENTS.contains(&state) {
        StateKind::PseudoElement
    } else {
        StateKind::Conditional
    }
}

/// `selector` refined by a pseudo state; conditionals leave it untouched.
pub fn derive_selector(selector: &str, state: &str, kind: StateKind) -> String {
    match kind {
        StateKind::PseudoClass => format!("{}:{}", selector, state),
        StateKind::PseudoElement => format!("{}::{}", selector, state),
        StateKind::Conditional => selector.to_string(),
    }
}

/// Builds the derived rule from the parent's selectors captured now.
pub(crate) fn derive_for_state(swirl: &Swirl, parent_selectors: &[String], state: &str) -> Rule {
    let kind = classify(state);
    let rule = swirl.rule();
    if kind == StateKind::Conditional {
        rule.set_wrap(Wrap::Media(state.to_string()));
    }
    for selector in parent_selectors {
        rule.select(derive_selector(selector, state, kind));
    }
    log::debug!(
        "derived {} from {:?} for `{}` ({:?})",
        rule.id(),
        parent_selectors,
        state,
        kind
    );
    rule
}
