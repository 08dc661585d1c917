use crate::context::Swirl;
use crate::error::SwirlError;
use crate::sink::RenderSink;
use crate::style::sheet::Sheet;
use crate::style::swirl_css;

pub mod swirl_sheet {
    use super::*;
    use lightningcss::printer::PrinterOptions;
    use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};

    /// Imports `css_content` into live rules, attaches them all to a new sheet
    /// writing to `sink`, and drives the scheduler until the sheet has flushed.
    pub fn generate(
        swirl: &Swirl,
        css_content: &str,
        sink: impl RenderSink + 'static,
    ) -> Result<Sheet, SwirlError> {
        let rules = swirl_css::import_stylesheet(swirl, css_content)?;
        let sheet = swirl.sheet(sink);
        for rule in &rules {
            sheet.attach(rule);
        }
        let ran = swirl.run_until_idle();
        log::debug!("{} rules settled after {} tasks", rules.len(), ran);
        Ok(sheet)
    }

    /// Re-prints compact engine output as indented CSS.
    pub fn prettify(css: &str) -> Result<String, SwirlError> {
        let sheet = LightningStyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| SwirlError::Parse(e.to_string()))?;
        let printed = sheet
            .to_css(PrinterOptions::default())
            .map_err(|e| SwirlError::Print(e.to_string()))?;
        Ok(printed.code)
    }
}
