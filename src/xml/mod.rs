//! XML element tree
//!
//! Thin handles over a `roxmltree` document. METS and MODS are queried by
//! local name, so namespace prefixes are ignored for matching purposes.
//!
//! # Usage
//!
//! ```rust
//! use mets_resolver::xml::XmlDocument;
//!
//! let doc = XmlDocument::parse(r#"<mods:mods xmlns:mods="http://www.loc.gov/mods/v3">
//!     <mods:titleInfo><mods:title>Faust</mods:title></mods:titleInfo>
//! </mods:mods>"#).unwrap();
//!
//! let root = doc.root();
//! assert_eq!(root.select_first("titleInfo/title").map(|e| e.text()), Some("Faust"));
//! ```

mod tree;

pub use tree::{Element, ElementId, XmlDocument, XmlError};
