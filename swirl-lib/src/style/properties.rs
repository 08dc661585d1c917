//! Static property binding table.
//!
//! Built once per [`crate::Swirl`] context from a capability list (the property
//! names a style object exposes) and the configured vendor. The table decides
//! which canonical names must be emitted with the vendor prefix; every other
//! name passes through unchanged.

use crate::config::Vendor;
use crate::style::codec;
use std::collections::{HashMap, HashSet};

/// Names a style object exposes that are not properties.
const SKIP: &[&str] = &["x", "y", "tag"];

/// Capability list used by [`PropertyTable::standard`].
const STANDARD_CAPABILITIES: &[&str] = &[
    "alignContent",
    "alignItems",
    "alignSelf",
    "animation",
    "animationDelay",
    "animationDuration",
    "animationName",
    "background",
    "backgroundColor",
    "backgroundImage",
    "backgroundPosition",
    "backgroundRepeat",
    "backgroundSize",
    "border",
    "borderBottom",
    "borderColor",
    "borderLeft",
    "borderRadius",
    "borderRight",
    "borderStyle",
    "borderTop",
    "borderWidth",
    "bottom",
    "boxShadow",
    "boxSizing",
    "clear",
    "color",
    "content",
    "cursor",
    "display",
    "filter",
    "flex",
    "flexBasis",
    "flexDirection",
    "flexGrow",
    "flexShrink",
    "flexWrap",
    "cssFloat",
    "font",
    "fontFamily",
    "fontSize",
    "fontStyle",
    "fontWeight",
    "gap",
    "gridTemplateColumns",
    "gridTemplateRows",
    "height",
    "justifyContent",
    "left",
    "letterSpacing",
    "lineHeight",
    "listStyle",
    "margin",
    "marginBottom",
    "marginLeft",
    "marginRight",
    "marginTop",
    "maxHeight",
    "maxWidth",
    "minHeight",
    "minWidth",
    "opacity",
    "outline",
    "overflow",
    "overflowX",
    "overflowY",
    "padding",
    "paddingBottom",
    "paddingLeft",
    "paddingRight",
    "paddingTop",
    "pointerEvents",
    "position",
    "right",
    "textAlign",
    "textDecoration",
    "textOverflow",
    "textTransform",
    "top",
    "transform",
    "transformOrigin",
    "transition",
    "verticalAlign",
    "visibility",
    "whiteSpace",
    "width",
    "wordBreak",
    "zIndex",
    "MozAppearance",
    "MozTextSizeAdjust",
    "MozUserSelect",
    "WebkitAppearance",
    "WebkitBackdropFilter",
    "WebkitLineClamp",
    "WebkitTextSizeAdjust",
    "WebkitTransition",
    "WebkitUserSelect",
    "msTextSizeAdjust",
    "msUserSelect",
];

/// How a canonical property name is written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyBinding {
    /// Canonical unprefixed name, e.g. `user-select`.
    pub name: String,
    /// Emitted name when only the prefixed form is supported, e.g. `-webkit-user-select`.
    pub prefixed: Option<String>,
}

/// Outcome of resolving a caller-supplied property identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Name to emit in declarations.
    pub name: String,
    /// Set when `name` carries the configured vendor prefix.
    pub vendor: Option<Vendor>,
}

/// Per-vendor replacement values for a single `set` call.
///
/// Only consulted when the property resolves to a vendor-prefixed binding.
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    overrides: HashMap<Vendor, Vec<String>>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vendor<I, S>(mut self, vendor: Vendor, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides
            .insert(vendor, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn get(&self, vendor: Vendor) -> Option<&[String]> {
        self.overrides.get(&vendor).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    vendor: Option<Vendor>,
    bindings: HashMap<String, PropertyBinding>,
}

impl PropertyTable {
    /// Builds the table from property names as a style object exposes them
    /// (camelCase, e.g. `WebkitUserSelect`) or in kebab-case.
    ///
    /// A prefixed capability of the configured vendor binds its canonical name
    /// to the prefixed form, unless the unprefixed name is also supported.
    pub fn from_capabilities<I, S>(capabilities: I, vendor: Option<Vendor>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bindings = HashMap::new();
        let mut prefixed_only = HashSet::new();

        for capability in capabilities {
            let capability = capability.as_ref();
            if capability.is_empty() || SKIP.contains(&capability) {
                continue;
            }
            match vendor.and_then(|v| strip_vendor(capability, v)) {
                Some(canonical) => {
                    prefixed_only.insert(canonical);
                }
                None => {
                    let name = codec::property_name(capability);
                    bindings.insert(
                        name.clone(),
                        PropertyBinding {
                            name,
                            prefixed: None,
                        },
                    );
                }
            }
        }

        if let Some(vendor) = vendor {
            for canonical in prefixed_only {
                if bindings.contains_key(&canonical) {
                    continue;
                }
                let prefixed = format!("{}{}", vendor.prefix(), canonical);
                bindings.insert(
                    canonical.clone(),
                    PropertyBinding {
                        name: canonical,
                        prefixed: Some(prefixed),
                    },
                );
            }
        }

        log::debug!(
            "bound {} properties (vendor: {:?})",
            bindings.len(),
            vendor.map(Vendor::tag)
        );
        PropertyTable { vendor, bindings }
    }

    pub fn standard(vendor: Option<Vendor>) -> Self {
        Self::from_capabilities(STANDARD_CAPABILITIES.iter().copied(), vendor)
    }

    pub fn vendor(&self) -> Option<Vendor> {
        self.vendor
    }

    pub fn binding(&self, canonical: &str) -> Option<&PropertyBinding> {
        self.bindings.get(canonical)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Canonicalizes `ident` and applies the vendor prefix when bound so.
    /// Unknown names are accepted as they are.
    pub fn resolve(&self, ident: &str) -> Resolved {
        let name = codec::property_name(ident);
        match self.bindings.get(&name).and_then(|b| b.prefixed.clone()) {
            Some(prefixed) => Resolved {
                name: prefixed,
                vendor: self.vendor,
            },
            None => Resolved { name, vendor: None },
        }
    }

    /// Resolves `ident` and orders `values` for storage.
    ///
    /// Callers list values preferred-first; storage is fallback-first so the
    /// preferred declaration comes last. Vendor-prefixed properties take the
    /// override for the configured vendor when one is given, in the order
    /// given, and never reverse.
    pub fn prepare(
        &self,
        ident: &str,
        values: Vec<String>,
        options: &SetOptions,
    ) -> (String, Vec<String>) {
        let resolved = self.resolve(ident);
        let values = match resolved.vendor {
            Some(vendor) => options
                .get(vendor)
                .map(<[String]>::to_vec)
                .unwrap_or(values),
            None => values.into_iter().rev().collect(),
        };
        (resolved.name, values)
    }
}

/// Canonical name of a capability carrying `vendor`'s prefix, in either casing.
fn strip_vendor(capability: &str, vendor: Vendor) -> Option<String> {
    if let Some(rest) = capability.strip_prefix(vendor.prefix()) {
        return Some(rest.to_string());
    }
    if codec::vendor_camel_prefix(capability) == Some(vendor) {
        let rest = &capability[vendor.camel_prefix().len()..];
        let mut chars = rest.chars();
        let first = chars.next()?;
        let camel = format!("{}{}", first.to_ascii_lowercase(), chars.as_str());
        return Some(codec::property_name(&camel));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_skips_non_properties() {
        let table = PropertyTable::from_capabilities(["x", "y", "tag", "color"], None);
        assert_eq!(table.len(), 1);
        assert!(table.binding("color").is_some());
    }

    #[test]
    fn test_prefixed_only_capability_binds_prefix() {
        let table = PropertyTable::from_capabilities(
            ["color", "WebkitUserSelect", "WebkitTransition", "transition"],
            Some(Vendor::Webkit),
        );
        assert_eq!(
            table.resolve("userSelect"),
            Resolved {
                name: "-webkit-user-select".to_string(),
                vendor: Some(Vendor::Webkit),
            }
        );
        // Unprefixed support wins over the prefixed form.
        assert_eq!(table.resolve("transition").name, "transition");
        assert_eq!(table.resolve("transition").vendor, None);
    }

    #[test]
    fn test_other_vendor_capabilities_stay_verbatim() {
        let table = PropertyTable::from_capabilities(["MozUserSelect"], Some(Vendor::Webkit));
        assert_eq!(table.resolve("userSelect").name, "user-select");
        assert!(table.binding("-moz-user-select").is_some());
    }

    #[test]
    fn test_kebab_capabilities() {
        let table =
            PropertyTable::from_capabilities(["-ms-user-select", "font-size"], Some(Vendor::Ms));
        assert_eq!(table.resolve("user-select").name, "-ms-user-select");
        assert_eq!(table.resolve("fontSize").name, "font-size");
    }

    #[test]
    fn test_prepare_reverses_plain_values() {
        let table = PropertyTable::standard(None);
        let (name, values) = table.prepare(
            "backgroundColor",
            owned(&["rgba(0, 0, 0, .5)", "black"]),
            &SetOptions::default(),
        );
        assert_eq!(name, "background-color");
        assert_eq!(values, owned(&["black", "rgba(0, 0, 0, .5)"]));
    }

    #[test]
    fn test_prepare_prefers_vendor_override() {
        let table = PropertyTable::standard(Some(Vendor::Webkit));
        let options = SetOptions::new().vendor(Vendor::Webkit, ["none"]);
        let (name, values) = table.prepare("userSelect", owned(&["text", "auto"]), &options);
        assert_eq!(name, "-webkit-user-select");
        assert_eq!(values, owned(&["none"]));

        let (_, values) = table.prepare("userSelect", owned(&["text", "auto"]), &SetOptions::new());
        assert_eq!(values, owned(&["text", "auto"]));
    }

    #[test]
    fn test_unknown_names_accepted() {
        let table = PropertyTable::standard(Some(Vendor::Moz));
        let (name, values) = table.prepare("--gutter", owned(&["8px"]), &SetOptions::new());
        assert_eq!(name, "--gutter");
        assert_eq!(values, owned(&["8px"]));
    }
}
