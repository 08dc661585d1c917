use crate::context::Swirl;
use crate::error::SwirlError;
use crate::style::owned_css::{OwnedDeclaration, OwnedRule, OwnedStylesheet};
use crate::style::rule::Rule;
use indexmap::IndexMap;
use lightningcss::declaration::DeclarationBlock;
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{style::StyleRule, CssRule};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;

/// Parse `css_text` and replay every style rule into a live [`Rule`].
///
/// Rules inside `@media (<feature>)` come back as conditional rules derived
/// for that feature. Other media queries are flattened.
pub fn import_stylesheet(swirl: &Swirl, css_text: &str) -> Result<Vec<Rule>, SwirlError> {
    let owned_sheet = parse_and_own_css(css_text)?;
    Ok(owned_sheet
        .rules
        .iter()
        .map(|owned| replay_rule(swirl, owned))
        .collect())
}

/// Parse a raw CSS string (LightningCSS) and convert it to a fully-owned stylesheet.
pub fn parse_and_own_css(css_text: &str) -> Result<OwnedStylesheet, SwirlError> {
    let parser_opts = ParserOptions::default();

    // The parser borrows `css_text`; flatten its error to text so the owned
    // stylesheet (and our error type) carry no lifetime.
    let sheet = LightningStyleSheet::parse(css_text, parser_opts)
        .map_err(|e| SwirlError::Parse(e.to_string()))?;

    let mut owned_rules = Vec::new();

    for rule in &sheet.rules.0 {
        match rule {
            CssRule::Style(style_rule) => {
                owned_rules.push(convert_style_rule(style_rule, None)?);
            }
            CssRule::Media(media_rule) => {
                let query = media_rule
                    .query
                    .to_css_string(PrinterOptions::default())
                    .map_err(|e| SwirlError::Print(e.to_string()))?;
                for inner_rule in &media_rule.rules.0 {
                    if let CssRule::Style(sr) = inner_rule {
                        owned_rules.push(convert_style_rule(sr, Some(&query))?);
                    }
                }
            }
            // @font-face, @keyframes, @import... have no rule to bind to.
            _ => log::debug!("skipping unsupported at-rule"),
        }
    }

    Ok(OwnedStylesheet { rules: owned_rules })
}

/// Helper to copy a single StyleRule's selectors + declarations into OwnedRule.
fn convert_style_rule(
    style_rule: &StyleRule<'_>,
    media: Option<&str>,
) -> Result<OwnedRule, SwirlError> {
    let mut selectors_vec = Vec::new();
    for selector in &style_rule.selectors.0 {
        match selector.to_css_string(Default::default()) {
            Ok(sel_str) => selectors_vec.push(sel_str),
            Err(e) => log::warn!("dropping selector that failed to print: {}", e),
        }
    }
    if selectors_vec.is_empty() {
        log::warn!("imported rule has no printable selectors and will not render");
    }

    Ok(OwnedRule {
        selectors: selectors_vec,
        declarations: convert_declarations(&style_rule.declarations)?,
        media: media.map(str::to_string),
    })
}

/// Normal declarations, then `!important` ones, each in source order.
///
/// Property names are printed through the property id so a vendor prefix
/// written in the source (`-webkit-user-select`) is kept.
fn convert_declarations(block: &DeclarationBlock<'_>) -> Result<Vec<OwnedDeclaration>, SwirlError> {
    let normal = block.declarations.iter().map(|p| (p, false));
    let important = block.important_declarations.iter().map(|p| (p, true));

    let mut decls_vec = Vec::new();
    for (property, important) in normal.chain(important) {
        let value = property
            .value_to_css_string(PrinterOptions::default())
            .map_err(|e| SwirlError::Print(e.to_string()))?;
        decls_vec.push(OwnedDeclaration {
            property: property
                .property_id()
                .to_css_string(PrinterOptions::default())
                .map_err(|e| SwirlError::Print(e.to_string()))?,
            value,
            important,
        });
    }
    Ok(decls_vec)
}

/// Feature text of a query made of exactly one parenthesized feature:
/// "(min-width: 600px)" -> "min-width: 600px".
pub fn media_feature(query: &str) -> Option<&str> {
    let inner = query.trim().strip_prefix('(')?.strip_suffix(')')?;
    if inner.contains('(') || inner.contains(')') {
        return None;
    }
    Some(inner.trim())
}

fn replay_rule(swirl: &Swirl, owned: &OwnedRule) -> Rule {
    let rule = match owned.media.as_deref() {
        None => plain_rule(swirl, &owned.selectors),
        Some(query) => match media_feature(query) {
            Some(feature) => {
                // The carrier only holds the selectors to derive from and is
                // dropped before it ever renders.
                let carrier = plain_rule(swirl, &owned.selectors);
                carrier.on(feature)
            }
            None => {
                log::warn!("flattening @media {}: only single-feature queries are kept", query);
                plain_rule(swirl, &owned.selectors)
            }
        },
    };
    for ((property, _), values) in group_declarations(&owned.declarations) {
        rule.set(&property, values);
    }
    rule
}

/// Collapses repeated declarations of one property into a single value list,
/// preferred (last in source) first. Normal and `!important` declarations of
/// the same property stay in separate groups, normal first.
fn group_declarations(declarations: &[OwnedDeclaration]) -> IndexMap<(String, bool), Vec<String>> {
    let mut groups: IndexMap<(String, bool), Vec<String>> = IndexMap::new();
    for decl in declarations {
        groups
            .entry((decl.property.clone(), decl.important))
            .or_default()
            .insert(0, decl.value_text());
    }
    groups
}

fn plain_rule(swirl: &Swirl, selectors: &[String]) -> Rule {
    let rule = swirl.rule();
    for selector in selectors {
        rule.select(selector.clone());
    }
    rule
}
