use crate::config::Config;
use crate::scheduler::{Clock, Scheduler, SystemClock};
use crate::sink::RenderSink;
use crate::style::properties::PropertyTable;
use crate::style::rule::Rule;
use crate::style::sheet::Sheet;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

struct SwirlInner {
    config: Config,
    properties: PropertyTable,
    scheduler: Scheduler,
}

/// Shared engine context: configuration, property table and the scheduler
/// every rule and sheet created from it debounces on.
#[derive(Clone)]
pub struct Swirl {
    inner: Rc<SwirlInner>,
}

impl fmt::Debug for Swirl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Swirl")
            .field("config", &self.inner.config)
            .field("properties", &self.inner.properties.len())
            .field("scheduler", &self.inner.scheduler)
            .finish()
    }
}

impl Swirl {
    /// A context on wall-clock time with the built-in property table.
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Rc<dyn Clock>) -> Self {
        let properties = PropertyTable::standard(config.vendor);
        Self::with_properties(config, clock, properties)
    }

    /// A context with a property table built from the environment's own
    /// capability list.
    pub fn with_properties(config: Config, clock: Rc<dyn Clock>, properties: PropertyTable) -> Self {
        Swirl {
            inner: Rc::new(SwirlInner {
                config,
                properties,
                scheduler: Scheduler::new(clock),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.inner.properties
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    pub fn rule(&self) -> Rule {
        Rule::new(self)
    }

    pub fn sheet(&self, sink: impl RenderSink + 'static) -> Sheet {
        Sheet::new(self, Box::new(sink))
    }

    /// A rule that owns its own sink.
    pub fn style(&self, sink: impl RenderSink + 'static) -> Style {
        let rule = self.rule();
        let sheet = self.sheet(sink);
        sheet.attach(&rule);
        Style { rule, sheet }
    }

    /// Runs scheduled compiles and writes until nothing is pending.
    pub fn run_until_idle(&self) -> usize {
        self.inner.scheduler.run_until_idle()
    }
}

/// Standalone rule: a single-slot [`Sheet`] that writes only this rule.
#[derive(Debug, Clone)]
pub struct Style {
    rule: Rule,
    sheet: Sheet,
}

impl Style {
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }
}

impl Deref for Style {
    type Target = Rule;

    fn deref(&self) -> &Rule {
        &self.rule
    }
}
