//! Entry point: one div of one document in, pages + outline + metadata out

use std::time::Instant;

use serde::Serialize;
use url::Url;

use crate::config::ResolverConfig;

use super::document::MetsDocument;
use super::error::Result;
use super::labels::{DivLabelExtractor, LabelExtractor};
use super::loader::DocumentLoader;
use super::metadata::{MetadataCascadeResolver, MetadataRecord};
use super::mods::{MetadataExtractor, ModsExtractor};
use super::navigator::StructureNavigator;
use super::outline::{BookmarkTreeBuilder, StructureOutline};
use super::pages::{PageEntry, PageSequenceBuilder};

/// Everything needed to assemble the output document of one div
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub document_url: String,
    pub div_id: String,
    pub pages: Vec<PageEntry>,
    pub outline: StructureOutline,
    pub metadata: MetadataRecord,
}

pub struct ContentResolver<'a> {
    config: &'a ResolverConfig,
    loader: &'a dyn DocumentLoader,
    labels: Option<&'a dyn LabelExtractor>,
    extractor: Box<dyn MetadataExtractor + 'a>,
    deadline: Option<Instant>,
}

impl<'a> ContentResolver<'a> {
    /// Resolver with the default MODS extractor and div labels
    pub fn new(config: &'a ResolverConfig, loader: &'a dyn DocumentLoader) -> Self {
        Self {
            config,
            loader,
            labels: Some(&DivLabelExtractor),
            extractor: Box::new(ModsExtractor::new(config)),
            deadline: None,
        }
    }

    /// Replace the outline label source; `None` yields placeholder labels
    pub fn with_labels(mut self, labels: Option<&'a dyn LabelExtractor>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_extractor(mut self, extractor: impl MetadataExtractor + 'a) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Stop following external pointers once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Load the document at `url` and resolve `div_id` in it
    ///
    /// `group` selects the file group; `None` or an empty label falls back to
    /// the configured default.
    pub fn resolve(&self, url: &Url, div_id: &str, group: Option<&str>) -> Result<Resolution> {
        let text = self.loader.load(url)?;
        let doc = MetsDocument::parse(url.clone(), &text, self.config.index_mode)?;
        self.resolve_in(&doc, div_id, group)
    }

    /// Resolve `div_id` in an already loaded document
    pub fn resolve_in(
        &self,
        doc: &MetsDocument<'_>,
        div_id: &str,
        group: Option<&str>,
    ) -> Result<Resolution> {
        let group = group
            .filter(|g| !g.is_empty())
            .unwrap_or(&self.config.default_file_group);

        let nav = StructureNavigator::new(doc);
        let div = nav.div(div_id)?;
        tracing::info!("Resolving {} in {} (group {:?})", div_id, doc.url(), group);

        let pages = PageSequenceBuilder::new(nav, group).build(&div)?;
        let outline = BookmarkTreeBuilder::new(nav, self.labels).build(&div, 0)?;
        let metadata = MetadataCascadeResolver::new(
            self.extractor.as_ref(),
            Some(self.loader),
            self.config.max_pointer_depth,
        )
        .with_index_mode(self.config.index_mode)
        .with_deadline(self.deadline)
        .resolve(&nav, &div)?;

        Ok(Resolution {
            document_url: doc.url().to_string(),
            div_id: div.id().to_string(),
            pages: pages.entries(),
            outline,
            metadata,
        })
    }
}
