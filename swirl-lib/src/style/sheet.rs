//! Aggregation of many rules into one stylesheet written to a sink.
//!
//! A sheet keeps one slot per attached rule, filled from the rule's
//! "rendered" notifications. Its template is the slot placeholders in attach
//! order and is recompiled only on attach and detach. Writes to the sink are
//! debounced independently of the rules, so any number of rules re-rendering
//! in one window produce a single write.

use crate::context::Swirl;
use crate::error::SwirlError;
use crate::events::ListenerId;
use crate::scheduler::Debouncer;
use crate::sink::RenderSink;
use crate::style::rule::{Rule, RuleId};
use crate::style::template::{concat_source, Renderer};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

struct Slot {
    rule: Rule,
    listener: ListenerId,
    text: String,
}

struct SheetState {
    slots: IndexMap<RuleId, Slot>,
    renderer: Option<Renderer>,
    sink: Box<dyn RenderSink>,
    last_written: String,
    writes: usize,
    debounce: Debouncer,
}

impl Drop for SheetState {
    fn drop(&mut self) {
        self.debounce.cancel();
        for (_, slot) in self.slots.drain(..) {
            slot.rule.remove_listener(slot.listener);
        }
    }
}

impl SheetState {
    fn rebuild(&mut self) -> Result<(), SwirlError> {
        let keys: Vec<String> = self.slots.keys().map(|id| id.slot_key()).collect();
        let source = concat_source(keys.iter().map(String::as_str));
        self.renderer = Some(Renderer::compile(&source)?);
        Ok(())
    }

    fn render(&mut self) -> Result<String, SwirlError> {
        if self.renderer.is_none() {
            self.rebuild()?;
        }
        let data: HashMap<String, String> = self
            .slots
            .iter()
            .map(|(id, slot)| (id.slot_key(), slot.text.clone()))
            .collect();
        match &self.renderer {
            Some(renderer) => renderer.render(&data),
            None => Ok(String::new()),
        }
    }
}

/// Cheap-clone handle to a stylesheet. The sink and every subscription are
/// released when the last handle is dropped.
#[derive(Clone)]
pub struct Sheet {
    state: Rc<RefCell<SheetState>>,
}

impl fmt::Debug for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Sheet")
            .field("rules", &state.slots.keys().collect::<Vec<_>>())
            .field("writes", &state.writes)
            .finish()
    }
}

impl Sheet {
    pub(crate) fn new(swirl: &Swirl, sink: Box<dyn RenderSink>) -> Self {
        Sheet {
            state: Rc::new(RefCell::new(SheetState {
                slots: IndexMap::new(),
                renderer: None,
                sink,
                last_written: String::new(),
                writes: 0,
                debounce: Debouncer::new(swirl.scheduler().clone(), swirl.config().window),
            })),
        }
    }

    /// Appends `rule` to the sheet. Attaching a rule twice does nothing.
    pub fn attach(&self, rule: &Rule) -> &Self {
        let id = rule.id();
        if self.contains(id) {
            log::debug!("{} already attached", id);
            return self;
        }

        let weak = Rc::downgrade(&self.state);
        let listener = rule.add_listener(move |text: &str| {
            if let Some(state) = weak.upgrade() {
                Sheet { state }.update_slot(id, text);
            }
        });
        {
            let mut state = self.state.borrow_mut();
            state.slots.insert(
                id,
                Slot {
                    rule: rule.clone(),
                    listener,
                    text: rule.rendered_text().unwrap_or_default(),
                },
            );
            if let Err(err) = state.rebuild() {
                log::warn!("sheet template rebuild failed: {}", err);
            }
        }
        log::debug!("attached {}", id);
        self.schedule();
        self
    }

    /// Removes `rule` and its subscription. Returns false if it was not attached.
    pub fn detach(&self, rule: &Rule) -> bool {
        let slot = {
            let mut state = self.state.borrow_mut();
            let Some(slot) = state.slots.shift_remove(&rule.id()) else {
                return false;
            };
            if let Err(err) = state.rebuild() {
                log::warn!("sheet template rebuild failed: {}", err);
            }
            slot
        };
        slot.rule.remove_listener(slot.listener);
        log::debug!("detached {}", rule.id());
        self.schedule();
        true
    }

    /// Derives `parent.on(state)` and attaches the result.
    pub fn derive(&self, parent: &Rule, state: &str) -> Rule {
        let rule = parent.on(state);
        self.attach(&rule);
        rule
    }

    pub fn contains(&self, id: RuleId) -> bool {
        self.state.borrow().slots.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().slots.is_empty()
    }

    /// Attached rules in output order.
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.state.borrow().slots.keys().copied().collect()
    }

    pub fn template_source(&self) -> Option<String> {
        self.state
            .borrow()
            .renderer
            .as_ref()
            .map(|renderer| renderer.source().to_string())
    }

    /// Text of the last successful sink write.
    pub fn output(&self) -> Option<String> {
        let state = self.state.borrow();
        (state.writes > 0).then(|| state.last_written.clone())
    }

    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }

    pub fn is_scheduled(&self) -> bool {
        self.state.borrow().debounce.is_pending()
    }

    fn update_slot(&self, id: RuleId, text: &str) {
        {
            let mut state = self.state.borrow_mut();
            match state.slots.get_mut(&id) {
                Some(slot) => slot.text = text.to_string(),
                None => return,
            }
        }
        self.schedule();
    }

    fn schedule(&self) {
        let weak = Rc::downgrade(&self.state);
        self.state.borrow().debounce.trigger(move || {
            if let Some(state) = weak.upgrade() {
                Sheet { state }.flush();
            }
        });
    }

    /// Writes the aggregate to the sink unless it matches the last write.
    /// Sinks must not call back into this sheet.
    fn flush(&self) {
        let mut state = self.state.borrow_mut();
        let output = match state.render() {
            Ok(output) => output,
            Err(err) => {
                log::warn!("sheet render failed: {}", err);
                return;
            }
        };
        if output == state.last_written {
            log::trace!("sheet output unchanged, skipping write");
            return;
        }
        match state.sink.replace(&output) {
            Ok(()) => {
                log::debug!("sheet wrote {} bytes", output.len());
                state.last_written = output;
                state.writes += 1;
            }
            Err(err) => log::error!("sheet sink write failed: {}", err),
        }
    }
}
