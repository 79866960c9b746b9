//! Outline label extraction

use super::document::Div;
use super::error::{MetsError, Result};
use super::mods::ModsExtractor;
use super::navigator::StructureNavigator;

/// Produces the display text of one outline entry
pub trait LabelExtractor {
    fn label<'d>(&self, div: &Div<'d>, nav: &StructureNavigator<'d>) -> Result<String>;
}

/// Default labels: `LABEL`, then the MODS title, then `ORDERLABEL`, then `TYPE`
#[derive(Debug, Clone, Copy, Default)]
pub struct DivLabelExtractor;

impl LabelExtractor for DivLabelExtractor {
    fn label<'d>(&self, div: &Div<'d>, nav: &StructureNavigator<'d>) -> Result<String> {
        if let Some(label) = div.label() {
            return Ok(label.to_string());
        }
        if let Some(title) = ModsExtractor::mods_record(div, nav)?
            .as_ref()
            .and_then(ModsExtractor::title)
        {
            return Ok(title);
        }
        div.order_label()
            .or_else(|| div.div_type())
            .map(str::to_string)
            .ok_or_else(|| MetsError::not_found("label", div.id()))
    }
}
