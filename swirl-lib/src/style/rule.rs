//! A live CSS rule: selectors plus properties, compiled incrementally.
//!
//! Writes land in a [`DeltaTracker`] and schedule a debounced flush. The flush
//! folds the delta into the known properties, recompiles the template only
//! when its structure changed (first compile, new selectors, new property),
//! renders every known property and emits the text to `rendered` listeners.

use crate::context::Swirl;
use crate::error::SwirlError;
use crate::events::{self, Emitter, ListenerId};
use crate::scheduler::Debouncer;
use crate::style::codec;
use crate::style::delta::DeltaTracker;
use crate::style::derive;
use crate::style::properties::SetOptions;
use crate::style::template::{Renderer, RuleTemplate};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RULE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique rule identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u64);

impl RuleId {
    fn next() -> Self {
        RuleId(NEXT_RULE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Placeholder key of this rule's slot in a sheet template.
    pub fn slot_key(self) -> String {
        format!("rule-{}", self.0)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule-{}", self.0)
    }
}

/// Block-level wrapping applied around a rule's rendered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wrap {
    None,
    /// `@media (<condition>) {<body>}`
    Media(String),
}

struct RuleState {
    id: RuleId,
    swirl: Swirl,
    selectors: Vec<String>,
    selectors_dirty: bool,
    /// Every property ever flushed, in discovery order.
    properties: IndexMap<String, Vec<String>>,
    delta: DeltaTracker,
    template: Option<RuleTemplate>,
    renderer: Option<Renderer>,
    needs_rebuild: bool,
    wrap: Wrap,
    last_rendered: Option<String>,
    rendered: Emitter<str>,
    debounce: Debouncer,
}

impl Drop for RuleState {
    fn drop(&mut self) {
        self.debounce.cancel();
    }
}

impl RuleState {
    /// Runs one compile pass. `Ok(None)` means nothing to emit: no
    /// selectors yet, or the text did not change.
    fn compile(&mut self) -> Result<Option<String>, SwirlError> {
        if self.selectors.is_empty() {
            return Ok(None);
        }

        let first = self.template.is_none();
        let template = self.template.get_or_insert_with(RuleTemplate::default);
        if first || self.selectors_dirty {
            template.set_selectors(&self.selectors);
            self.needs_rebuild = true;
        }
        self.selectors_dirty = false;

        for (property, values) in self.delta.drain() {
            if !self.properties.contains_key(&property) {
                let key = template.push_property(&property, codec::property_key(&property));
                log::trace!("{}: new placeholder `{}` for {}", self.id, key, property);
                self.needs_rebuild = true;
            }
            self.properties.insert(property, values);
        }

        if self.needs_rebuild || self.renderer.is_none() {
            self.renderer = Some(Renderer::compile(&template.source())?);
            self.needs_rebuild = false;
            log::debug!("{}: rebuilt template", self.id);
        }

        let data: HashMap<String, String> = template
            .entries()
            .filter_map(|(property, key)| {
                self.properties
                    .get(property)
                    .map(|values| (key.to_string(), codec::declaration(property, values)))
            })
            .collect();
        let body = match &self.renderer {
            Some(renderer) => renderer.render(&data)?,
            None => return Ok(None),
        };

        let text = match &self.wrap {
            Wrap::None => body,
            Wrap::Media(condition) => format!("@media ({}) {{{}}}", condition, body),
        };
        if self.last_rendered.as_deref() == Some(text.as_str()) {
            log::trace!("{}: output unchanged", self.id);
            return Ok(None);
        }
        self.last_rendered = Some(text.clone());
        Ok(Some(text))
    }
}

/// Cheap-clone handle to a live rule.
#[derive(Clone)]
pub struct Rule {
    state: Rc<RefCell<RuleState>>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Rule")
            .field("id", &state.id)
            .field("selectors", &state.selectors)
            .field("wrap", &state.wrap)
            .finish()
    }
}

impl Rule {
    pub(crate) fn new(swirl: &Swirl) -> Self {
        let debounce = Debouncer::new(swirl.scheduler().clone(), swirl.config().window);
        Rule {
            state: Rc::new(RefCell::new(RuleState {
                id: RuleId::next(),
                swirl: swirl.clone(),
                selectors: Vec::new(),
                selectors_dirty: false,
                properties: IndexMap::new(),
                delta: DeltaTracker::new(),
                template: None,
                renderer: None,
                needs_rebuild: false,
                wrap: Wrap::None,
                last_rendered: None,
                rendered: Emitter::default(),
                debounce,
            })),
        }
    }

    pub fn id(&self) -> RuleId {
        self.state.borrow().id
    }

    /// Sets `property` to `values`, most preferred first. Earlier values
    /// render after later ones so they win wherever they are understood:
    /// `set("display", ["flex", "-webkit-box"])` renders
    /// `display:-webkit-box;display:flex`.
    pub fn set<I, S>(&self, property: &str, values: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_with(property, values, &SetOptions::default())
    }

    /// Like [`Rule::set`], with per-vendor override values.
    pub fn set_with<I, S>(&self, property: &str, values: I, options: &SetOptions) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = self.state.borrow_mut();
            let values = values.into_iter().map(Into::into).collect();
            let (name, values) = state.swirl.properties().prepare(property, values, options);
            log::trace!("{}: {} = {:?}", state.id, name, values);
            state.delta.record(name, values);
        }
        self.schedule();
        self
    }

    /// Adds a selector this rule applies to.
    pub fn select(&self, selector: impl Into<String>) -> &Self {
        {
            let mut state = self.state.borrow_mut();
            state.selectors.push(selector.into());
            state.selectors_dirty = true;
        }
        self.schedule();
        self
    }

    /// A new rule for `state` (`hover`, `before`, `min-width: 600px`, ...)
    /// derived from this rule's selectors as they are right now. Selectors
    /// added to this rule later are not picked up by the derived rule.
    pub fn on(&self, state: &str) -> Rule {
        let (swirl, selectors) = {
            let parent = self.state.borrow();
            (parent.swirl.clone(), parent.selectors.clone())
        };
        derive::derive_for_state(&swirl, &selectors, state)
    }

    pub fn selectors(&self) -> Vec<String> {
        self.state.borrow().selectors.clone()
    }

    pub fn wrap(&self) -> Wrap {
        self.state.borrow().wrap.clone()
    }

    pub(crate) fn set_wrap(&self, wrap: Wrap) {
        self.state.borrow_mut().wrap = wrap;
    }

    /// Flushed values of `property` in stored (fallback-first) order.
    pub fn property(&self, property: &str) -> Option<Vec<String>> {
        self.state.borrow().properties.get(property).cloned()
    }

    /// Known properties in the order they were first flushed.
    pub fn property_names(&self) -> Vec<String> {
        self.state.borrow().properties.keys().cloned().collect()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.state.borrow().delta.is_empty()
    }

    pub fn is_scheduled(&self) -> bool {
        self.state.borrow().debounce.is_pending()
    }

    /// The most recently rendered text, if the rule has rendered at all.
    pub fn rendered_text(&self) -> Option<String> {
        self.state.borrow().last_rendered.clone()
    }

    pub fn template_source(&self) -> Option<String> {
        self.state
            .borrow()
            .renderer
            .as_ref()
            .map(|renderer| renderer.source().to_string())
    }

    /// Subscribes to the "rendered" notification.
    pub fn add_listener(&self, handler: impl Fn(&str) + 'static) -> ListenerId {
        self.state.borrow_mut().rendered.add_listener(handler)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.borrow_mut().rendered.remove_listener(id)
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().rendered.listener_count()
    }

    fn schedule(&self) {
        let state = self.state.borrow();
        if state.selectors.is_empty() {
            log::trace!("{}: no selectors, not scheduling", state.id);
            return;
        }
        let weak = Rc::downgrade(&self.state);
        state.debounce.trigger(move || {
            if let Some(state) = weak.upgrade() {
                Rule { state }.flush();
            }
        });
    }

    /// One compile pass; normally run by the debounced scheduler.
    pub(crate) fn flush(&self) {
        let (text, handlers) = {
            let mut state = self.state.borrow_mut();
            match state.compile() {
                Ok(Some(text)) => (text, state.rendered.snapshot()),
                Ok(None) => return,
                Err(err) => {
                    log::warn!("{}: flush abandoned: {}", state.id, err);
                    return;
                }
            }
        };
        events::dispatch(&handlers, text.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::scheduler::ManualClock;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::time::Duration;

    fn swirl() -> (Rc<ManualClock>, Swirl) {
        let clock = Rc::new(ManualClock::new());
        (clock.clone(), Swirl::with_clock(Config::default(), clock))
    }

    fn renders(rule: &Rule) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        rule.add_listener(move |text| s.borrow_mut().push(text.to_string()));
        seen
    }

    #[test]
    fn test_last_write_wins_within_window() {
        let (_clock, swirl) = swirl();
        let rule = swirl.rule();
        let seen = renders(&rule);
        rule.select(".a");
        rule.set("color", ["red"]).set("color", ["green"]).set("color", ["blue"]);
        swirl.run_until_idle();

        assert_eq!(*seen.borrow(), vec![".a{ color:blue;}".to_string()]);
    }

    #[test]
    fn test_no_selectors_no_render() {
        let (clock, swirl) = swirl();
        let rule = swirl.rule();
        let seen = renders(&rule);
        rule.set("color", ["red"]);
        assert!(!rule.is_scheduled());
        clock.advance(Duration::from_millis(100));
        swirl.run_until_idle();
        assert!(seen.borrow().is_empty());
        assert!(rule.has_pending_changes());

        rule.select("p");
        swirl.run_until_idle();
        assert_eq!(*seen.borrow(), vec!["p{ color:red;}".to_string()]);
        assert!(!rule.has_pending_changes());
    }

    #[test]
    fn test_first_seen_order_is_kept() {
        let (_clock, swirl) = swirl();
        let rule = swirl.rule();
        rule.select(".a");
        rule.set("color", ["red"]);
        swirl.run_until_idle();
        rule.set("margin", ["0"]);
        swirl.run_until_idle();
        rule.set("color", ["blue"]);
        swirl.run_until_idle();

        assert_eq!(rule.rendered_text().unwrap(), ".a{ color:blue;margin:0;}");
        assert_eq!(rule.property_names(), vec!["color", "margin"]);
    }

    #[test]
    fn test_fallbacks_render_before_preferred() {
        let (_clock, swirl) = swirl();
        let rule = swirl.rule();
        rule.select(".box").set("display", ["flex", "-webkit-box"]);
        swirl.run_until_idle();
        assert_eq!(
            rule.rendered_text().unwrap(),
            ".box{ display:-webkit-box;display:flex;}"
        );
    }

    #[test]
    fn test_value_change_reuses_renderer() {
        let (_clock, swirl) = swirl();
        let rule = swirl.rule();
        rule.select(".a").set("color", ["red"]);
        swirl.run_until_idle();
        let source = rule.template_source().unwrap();
        assert_eq!(source, ".a{ {{[color]}};}");

        rule.set("color", ["blue"]);
        swirl.run_until_idle();
        assert_eq!(rule.template_source().unwrap(), source);
        assert_eq!(rule.rendered_text().unwrap(), ".a{ color:blue;}");
    }

    #[test]
    fn test_new_selector_rebuilds_prefix_only() {
        let (_clock, swirl) = swirl();
        let rule = swirl.rule();
        rule.select(".a").set("color", ["red"]).set("margin-top", ["1px"]);
        swirl.run_until_idle();
        rule.select(".b");
        swirl.run_until_idle();

        assert_eq!(
            rule.template_source().unwrap(),
            ".a,.b{ {{[color]}};{{[marginTop]}};}"
        );
        assert_eq!(
            rule.rendered_text().unwrap(),
            ".a,.b{ color:red;margin-top:1px;}"
        );
    }

    #[test]
    fn test_flush_twice_is_identical_and_silent() {
        let (_clock, swirl) = swirl();
        let rule = swirl.rule();
        let seen = renders(&rule);
        rule.select("a").set("color", ["red"]);
        swirl.run_until_idle();
        let first = rule.rendered_text();

        rule.flush();
        rule.flush();
        assert_eq!(rule.rendered_text(), first);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_one_flush_per_window() {
        let (clock, swirl) = swirl();
        let rule = swirl.rule();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        rule.add_listener(move |_| c.set(c.get() + 1));
        rule.select("a");
        for i in 0..10 {
            rule.set("z-index", [i.to_string()]);
            clock.advance(Duration::from_millis(5));
            swirl.scheduler().run_due();
        }
        assert_eq!(count.get(), 0);
        swirl.run_until_idle();
        assert_eq!(count.get(), 1);
        assert_eq!(rule.rendered_text().unwrap(), "a{ z-index:9;}");
    }

    #[test]
    fn test_camel_case_and_unknown_names() {
        let (_clock, swirl) = swirl();
        let rule = swirl.rule();
        rule.select("a")
            .set("backgroundColor", ["red"])
            .set("no-such-thing", ["1"]);
        swirl.run_until_idle();
        assert_eq!(
            rule.rendered_text().unwrap(),
            "a{ background-color:red;no-such-thing:1;}"
        );
    }

    #[test]
    fn test_hack_property_names_render_verbatim() {
        let (_clock, swirl) = swirl();
        let rule = swirl.rule();
        rule.select(".a").set("color", ["red"]);
        swirl.run_until_idle();
        rule.set("*zoom", ["1"]).set("_height", ["1px"]);
        swirl.run_until_idle();

        assert_eq!(
            rule.rendered_text().unwrap(),
            ".a{ color:red;*zoom:1;_height:1px;}"
        );
        assert_eq!(rule.property_names(), vec!["color", "*zoom", "_height"]);
    }

    #[test]
    fn test_selector_with_trailing_brace_renders() {
        let (_clock, swirl) = swirl();
        let rule = swirl.rule();
        rule.select("a{").set("color", ["red"]);
        swirl.run_until_idle();
        assert_eq!(rule.rendered_text().unwrap(), "a{{ color:red;}");
    }

    #[test]
    fn test_dropped_rule_cancels_pending_flush() {
        let (_clock, swirl) = swirl();
        let rule = swirl.rule();
        rule.select("a");
        assert_eq!(swirl.scheduler().pending(), 1);
        drop(rule);
        assert_eq!(swirl.scheduler().pending(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let (_clock, swirl) = swirl();
        let a = swirl.rule();
        let b = swirl.rule();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id().slot_key(), a.id().to_string());
    }
}
