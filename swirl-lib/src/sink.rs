//! Rendering sinks: where a sheet's final CSS text ends up.

use crate::error::SwirlError;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Receives the complete stylesheet text, replacing whatever it held before.
pub trait RenderSink {
    fn replace(&mut self, css: &str) -> Result<(), SwirlError>;
}

impl<F> RenderSink for F
where
    F: FnMut(&str),
{
    fn replace(&mut self, css: &str) -> Result<(), SwirlError> {
        self(css);
        Ok(())
    }
}

/// In-memory sink that records every write. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    writes: Rc<RefCell<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    /// Current content of the container, if anything was written.
    pub fn contents(&self) -> Option<String> {
        self.writes.borrow().last().cloned()
    }
}

impl RenderSink for MemorySink {
    fn replace(&mut self, css: &str) -> Result<(), SwirlError> {
        self.writes.borrow_mut().push(css.to_string());
        Ok(())
    }
}

/// Rewrites a file on every flush.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileSink {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenderSink for FileSink {
    fn replace(&mut self, css: &str) -> Result<(), SwirlError> {
        fs::write(&self.path, css)?;
        log::debug!("wrote {} bytes to {}", css.len(), self.path.display());
        Ok(())
    }
}
