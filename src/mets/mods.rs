//! MODS descriptive metadata extraction
//!
//! Reads the fields the title page and the document properties need from
//! the MODS record a div references through DMDID.

use crate::config::ResolverConfig;
use crate::xml::Element;

use super::document::Div;
use super::error::Result;
use super::navigator::StructureNavigator;

/// Descriptive fields of one div
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptiveFields {
    pub title: Option<String>,
    pub creators: Vec<String>,
    pub keywords: Vec<String>,
    pub place: Option<String>,
    pub date: Option<String>,
    pub volume_number: Option<String>,
}

impl DescriptiveFields {
    /// First creator, if any
    pub fn creator(&self) -> Option<&str> {
        self.creators.first().map(String::as_str)
    }
}

/// Source of descriptive fields for a div
pub trait MetadataExtractor {
    fn extract<'d>(
        &self,
        div: &Div<'d>,
        nav: &StructureNavigator<'d>,
    ) -> Result<DescriptiveFields>;
}

/// Extracts [`DescriptiveFields`] from MODS
#[derive(Debug, Clone)]
pub struct ModsExtractor {
    config: ResolverConfig,
}

impl Default for ModsExtractor {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl ModsExtractor {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// The `mods` element of the div's descriptive section
    pub fn mods_record<'d>(
        div: &Div<'d>,
        nav: &StructureNavigator<'d>,
    ) -> Result<Option<Element<'d>>> {
        let Some(section) = nav.dmd_section(div)? else {
            return Ok(None);
        };
        Ok(section.descendants_named("mods").next())
    }

    /// Display title: nonSort, title and subTitle of the first titleInfo
    pub fn title(mods: &Element<'_>) -> Option<String> {
        let info = mods
            .children_named("titleInfo")
            .find(|t| t.attr("type").is_none())
            .or_else(|| mods.child("titleInfo"))?;

        let title = info.select_text("title")?;
        let mut out = match info.select_text("nonSort") {
            Some(non_sort) => format!("{} {}", non_sort.trim_end(), title),
            None => title.to_string(),
        };
        if let Some(sub) = info.select_text("subTitle") {
            out.push_str(": ");
            out.push_str(sub);
        }
        Some(out)
    }

    fn creators(&self, mods: &Element<'_>) -> Vec<String> {
        mods.children_named("name")
            .filter(|name| {
                name.select("role/roleTerm")
                    .iter()
                    .any(|term| self.config.is_creator_role(term.text()))
            })
            .filter_map(|name| display_name(&name))
            .collect()
    }

    fn place(mods: &Element<'_>) -> Option<String> {
        mods.select_text("originInfo/place/placeTerm[@type='text']")
            .or_else(|| mods.select_text("originInfo/place/placeTerm"))
            .map(str::to_string)
    }

    fn date(mods: &Element<'_>) -> Option<String> {
        mods.select_text("originInfo/dateIssued")
            .or_else(|| mods.select_text("originInfo/dateCreated"))
            .map(str::to_string)
    }

    fn volume_number(mods: &Element<'_>) -> Option<String> {
        mods.select_text("part/detail[@type='volume']/number")
            .or_else(|| mods.select_text("part/detail/number"))
            .or_else(|| mods.select_text("titleInfo/partNumber"))
            .map(str::to_string)
    }
}

fn display_name(name: &Element<'_>) -> Option<String> {
    if let Some(display) = name.select_text("displayForm") {
        return Some(display.to_string());
    }

    let family = name.select_text("namePart[@type='family']");
    let given = name.select_text("namePart[@type='given']");
    match (family, given) {
        (Some(family), Some(given)) => Some(format!("{}, {}", family, given)),
        (Some(family), None) => Some(family.to_string()),
        (None, Some(given)) => Some(given.to_string()),
        (None, None) => {
            let parts: Vec<&str> = name
                .children_named("namePart")
                .map(|p| p.text())
                .filter(|t| !t.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
    }
}

impl MetadataExtractor for ModsExtractor {
    fn extract<'d>(
        &self,
        div: &Div<'d>,
        nav: &StructureNavigator<'d>,
    ) -> Result<DescriptiveFields> {
        let Some(mods) = Self::mods_record(div, nav)? else {
            tracing::debug!("div {} has no MODS record", div.id());
            return Ok(DescriptiveFields::default());
        };

        Ok(DescriptiveFields {
            title: Self::title(&mods),
            creators: self.creators(&mods),
            keywords: mods
                .select("subject/topic")
                .iter()
                .map(|t| t.text())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            place: Self::place(&mods),
            date: Self::date(&mods),
            volume_number: Self::volume_number(&mods),
        })
    }
}
