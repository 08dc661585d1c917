//! Property names and values to declaration text, and back and forth between
//! kebab-case CSS names and camelCase keys.

use crate::config::Vendor;
use heck::{ToKebabCase, ToLowerCamelCase};

const VENDORS: [Vendor; 4] = [Vendor::Webkit, Vendor::Moz, Vendor::Ms, Vendor::O];

/// Canonical CSS name for a property identifier.
///
/// Only plain ASCII camelCase identifiers are converted to kebab-case; a
/// leading vendor prefix such as `WebkitTransition` or `msTransform` keeps its
/// leading dash. Anything else (custom properties, prefixed names, hacks like
/// `*zoom`) is taken verbatim.
pub fn property_name(ident: &str) -> String {
    if ident.is_empty() || !ident.chars().all(|c| c.is_ascii_alphanumeric()) {
        return ident.to_string();
    }
    let kebab = ident.to_kebab_case();
    if vendor_camel_prefix(ident).is_some() {
        format!("-{}", kebab)
    } else {
        kebab
    }
}

/// Placeholder key for a property, e.g. `background-color` -> `backgroundColor`.
///
/// `]` would terminate a literal template segment, so it is dropped.
pub fn property_key(name: &str) -> String {
    name.to_lower_camel_case().replace(']', "")
}

/// The vendor whose camelCase prefix `ident` starts with, e.g. `WebkitBoxShadow`.
pub fn vendor_camel_prefix(ident: &str) -> Option<Vendor> {
    VENDORS.into_iter().find(|vendor| {
        ident
            .strip_prefix(vendor.camel_prefix())
            .and_then(|rest| rest.chars().next())
            .map_or(false, |c| c.is_ascii_uppercase())
    })
}

/// One declaration per value, fallbacks first: `color:red;color:rgb(1 2 3)`.
pub fn declaration<S: AsRef<str>>(property: &str, values: &[S]) -> String {
    values
        .iter()
        .map(|value| format!("{}:{}", property, value.as_ref()))
        .collect::<Vec<_>>()
        .join(";")
}
