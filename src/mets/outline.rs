//! Bookmark tree
//!
//! Derives the outline handed to the PDF bookmark writer: one entry per
//! structural node, carrying the ORDER of the node's first page.

use serde::Serialize;

use super::document::Div;
use super::error::{MetsError, Result};
use super::labels::LabelExtractor;
use super::navigator::{compare_order_ascending, StructureNavigator};

/// Page number used for an unbound top-level node
const ANCHOR_PAGE: u32 = 1;

/// Resolved outline entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureOutline {
    pub page_number: u32,
    pub label: String,
    pub node_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    pub children: Vec<StructureOutline>,
}

impl StructureOutline {
    /// Number of entries in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Entries in depth-first order
    pub fn flatten(&self) -> Vec<&StructureOutline> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }
}

pub struct BookmarkTreeBuilder<'a, 'd> {
    nav: StructureNavigator<'d>,
    labels: Option<&'a dyn LabelExtractor>,
}

impl<'a, 'd> BookmarkTreeBuilder<'a, 'd> {
    pub fn new(nav: StructureNavigator<'d>, labels: Option<&'a dyn LabelExtractor>) -> Self {
        Self { nav, labels }
    }

    /// Build the outline of `div`; `depth` is 0 for the requested node
    pub fn build(&self, div: &Div<'d>, depth: usize) -> Result<StructureOutline> {
        let page_number = match self.first_page(div) {
            Some(page) => page.required_order()?,
            None if depth == 0 => ANCHOR_PAGE,
            None => {
                return Err(MetsError::malformed(format!(
                    "div {} is not linked to any page",
                    div.id()
                )));
            }
        };

        let children = div
            .children()
            .map(|child| self.build(&child, depth + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(StructureOutline {
            page_number,
            label: self.label_for(div),
            node_id: div.id().to_string(),
            node_type: div.div_type().map(str::to_string),
            children,
        })
    }

    /// Start page of `div`
    ///
    /// A physical div without cross-references stands for itself: a page is
    /// its own start, a container starts at its lowest-ordered page.
    fn first_page(&self, div: &Div<'d>) -> Option<Div<'d>> {
        if let Some(page) = self.nav.start_page(div) {
            return Some(page);
        }
        if !self.nav.is_physical(div) || !self.nav.related_nodes(div).is_empty() {
            return None;
        }
        if div.is_page() {
            return Some(*div);
        }
        div.children()
            .filter(Div::is_page)
            .min_by(|a, b| compare_order_ascending(a.sort_order(), b.sort_order()))
    }

    fn label_for(&self, div: &Div<'d>) -> String {
        let Some(labels) = self.labels else {
            tracing::warn!("No label extractor configured; using placeholder for {}", div.id());
            return placeholder_label(div);
        };
        match labels.label(div, &self.nav) {
            Ok(label) => label,
            Err(e) => {
                tracing::warn!("Label extraction failed for {}: {}", div.id(), e);
                placeholder_label(div)
            }
        }
    }
}

/// Cosmetic fallback: the div's TYPE, else its id
pub fn placeholder_label(div: &Div<'_>) -> String {
    div.div_type().unwrap_or(div.id()).to_string()
}
