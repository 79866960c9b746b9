//! METS structure resolution
//!
//! Given one structural node (`mets:div`) of a METS document this module
//! derives three things:
//!
//! - the ordered page images that make up the node ([`PageSequenceBuilder`])
//! - a bookmark outline of the node's subtree ([`BookmarkTreeBuilder`])
//! - title-page and document metadata, following external pointers to
//!   parent works where needed ([`MetadataCascadeResolver`])
//!
//! [`ContentResolver`] runs all three for one request.
//!
//! # Architecture
//!
//! ```text
//! DocumentLoader ──► MetsDocument (XML tree + id indexes + smLinks)
//!                         │
//!                   StructureNavigator
//!            ┌────────────┼──────────────────┐
//!   PageSequenceBuilder  BookmarkTreeBuilder  MetadataCascadeResolver
//!                         (LabelExtractor)    (MetadataExtractor, DocumentLoader)
//! ```

mod document;
mod error;
mod index;
mod labels;
mod loader;
mod metadata;
mod mods;
mod navigator;
mod outline;
mod pages;
mod resolver;

#[cfg(test)]
pub(crate) mod fixtures;

pub use document::{CrossReference, Div, MetsDocument};
pub use error::{IdSpace, MetsError, Result};
pub use index::{ElementIndex, FileGroup, FileGroupIndex, IndexMode};
pub use labels::{DivLabelExtractor, LabelExtractor};
pub use loader::{parse_document_url, time_left, DefaultLoader, DocumentLoader};
pub use metadata::{
    place_and_date, truncate_title, MetadataCascadeResolver, MetadataRecord, Strategy, TitlePage,
};
pub use mods::{DescriptiveFields, MetadataExtractor, ModsExtractor};
pub use navigator::{compare_order_ascending, compare_order_descending, LeafFile, StructureNavigator};
pub use outline::{placeholder_label, BookmarkTreeBuilder, StructureOutline};
pub use pages::{PageEntry, PageSequence, PageSequenceBuilder};
pub use resolver::{ContentResolver, Resolution};
