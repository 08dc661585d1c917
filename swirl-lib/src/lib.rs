//! Live CSS rules kept in sync with a stylesheet sink.
//!
//! Rules are built imperatively, a property or selector at a time. Each rule
//! compiles its own text incrementally on a debounce, and a [`Sheet`] merges
//! any number of rules into one batched write to a [`RenderSink`].

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod sink;
pub mod style;
pub mod swirl_generate;

pub use config::{Config, Vendor};
pub use context::{Style, Swirl};
pub use error::SwirlError;
pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock};
pub use sink::{FileSink, MemorySink, RenderSink};
pub use style::properties::{PropertyTable, SetOptions};
pub use style::rule::{Rule, RuleId, Wrap};
pub use style::sheet::Sheet;
