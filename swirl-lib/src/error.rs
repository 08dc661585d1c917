use thiserror::Error;

/// Errors surfaced on the fallible edges of the engine.
///
/// Rule and sheet flushes run on the scheduler and never return these to a
/// caller; they log and keep the previous output instead.
#[derive(Debug, Error)]
pub enum SwirlError {
    #[error("template compilation failed: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("template rendering failed: {0}")]
    Render(#[from] Box<handlebars::RenderError>),

    #[error("sink i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse stylesheet: {0}")]
    Parse(String),

    #[error("failed to print stylesheet: {0}")]
    Print(String),

    #[error("unknown vendor `{0}` (expected webkit, moz, ms or o)")]
    UnknownVendor(String),
}

impl From<handlebars::TemplateError> for SwirlError {
    fn from(err: handlebars::TemplateError) -> Self {
        SwirlError::Template(Box::new(err))
    }
}

impl From<handlebars::RenderError> for SwirlError {
    fn from(err: handlebars::RenderError) -> Self {
        SwirlError::Render(Box::new(err))
    }
}
