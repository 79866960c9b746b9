//! Page sequence resolution
//!
//! Walks the physical nodes linked to a structural node and collects one
//! image URL per page, keyed by ORDER. Two nodes resolving to the same URL
//! contribute a single page.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::document::Div;
use super::error::{MetsError, Result};
use super::navigator::StructureNavigator;

/// One page of the output document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    pub order: u32,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Order-keyed page URLs plus order-keyed display labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSequence {
    pages: BTreeMap<u32, String>,
    labels: BTreeMap<u32, String>,
}

impl PageSequence {
    /// Pages in ascending order
    pub fn entries(&self) -> Vec<PageEntry> {
        self.pages
            .iter()
            .map(|(&order, url)| PageEntry {
                order,
                url: url.clone(),
                label: self.labels.get(&order).cloned(),
            })
            .collect()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.values().map(String::as_str)
    }

    pub fn url(&self, order: u32) -> Option<&str> {
        self.pages.get(&order).map(String::as_str)
    }

    pub fn label(&self, order: u32) -> Option<&str> {
        self.labels.get(&order).map(String::as_str)
    }

    pub fn pages(&self) -> &BTreeMap<u32, String> {
        &self.pages
    }

    pub fn labels(&self) -> &BTreeMap<u32, String> {
        &self.labels
    }

    pub fn first_order(&self) -> Option<u32> {
        self.pages.keys().next().copied()
    }

    pub fn last_order(&self) -> Option<u32> {
        self.pages.keys().next_back().copied()
    }

    /// 1-based position of `order` in the assembled document
    pub fn position_of(&self, order: u32) -> Option<usize> {
        self.pages
            .contains_key(&order)
            .then(|| self.pages.range(..order).count() + 1)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[derive(Default)]
struct Accumulator {
    sequence: PageSequence,
    seen_urls: HashSet<String>,
    /// First branch-level failure, reported only if no page resolves
    skipped: Option<MetsError>,
}

/// Builds the page sequence of a structural node for one file group
pub struct PageSequenceBuilder<'a, 'd> {
    nav: StructureNavigator<'d>,
    group: &'a str,
}

impl<'a, 'd> PageSequenceBuilder<'a, 'd> {
    /// `group` selects the rendition; empty means the first file of any group
    pub fn new(nav: StructureNavigator<'d>, group: &'a str) -> Self {
        Self { nav, group }
    }

    pub fn build(&self, div: &Div<'d>) -> Result<PageSequence> {
        let mut related = self.nav.related_nodes(div);
        if related.is_empty() && self.nav.is_physical(div) {
            related.push(*div);
        }

        let mut acc = Accumulator::default();
        for node in &related {
            if node.is_page() {
                self.collect_page(node, &mut acc)?;
            } else {
                // Link to a page container rather than to individual pages
                for child in node.children().filter(Div::is_page) {
                    self.collect_page(&child, &mut acc)?;
                }
            }
        }

        if acc.sequence.is_empty() {
            if let Some(err) = acc.skipped {
                return Err(err);
            }
        }

        tracing::debug!(
            "Resolved {} pages for div {} (group {:?})",
            acc.sequence.len(),
            div.id(),
            self.group
        );
        Ok(acc.sequence)
    }

    fn collect_page(&self, node: &Div<'d>, acc: &mut Accumulator) -> Result<()> {
        match self.nav.file_for(node, self.group) {
            Ok(file) => self.record(node, file.url.to_string(), acc),
            Err(MetsError::NotFound { .. }) => {
                if !node.has_children() {
                    tracing::debug!(
                        "div {} has no file in group {:?}; branch contributes no page",
                        node.id(),
                        self.group
                    );
                    return Ok(());
                }
                for child in node.children() {
                    self.collect_page(&child, acc)?;
                }
                Ok(())
            }
            Err(err @ MetsError::UnsupportedLocationType { .. }) => {
                tracing::warn!("Skipping page {}: {}", node.id(), err);
                acc.skipped.get_or_insert(err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn record(&self, node: &Div<'d>, url: String, acc: &mut Accumulator) -> Result<()> {
        let order = node.required_order()?;

        if acc.seen_urls.contains(&url) {
            tracing::debug!("Page {} repeats {}; skipped", node.id(), url);
            return Ok(());
        }
        if let Some(existing) = acc.sequence.pages.get(&order) {
            return Err(MetsError::malformed(format!(
                "ORDER {} is used by two different files ({} and {})",
                order, existing, url
            )));
        }

        acc.seen_urls.insert(url.clone());
        acc.sequence.pages.insert(order, url);
        if let Some(label) = node.order_label() {
            acc.sequence.labels.insert(order, label.to_string());
        }
        Ok(())
    }
}
