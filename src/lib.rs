//! METS Resolver Library
//!
//! Resolves a structural node of a METS-described digitized work into the
//! inputs of a PDF assembler: page image URLs, a bookmark outline and
//! title-page metadata. The HTTP server binary is in main.rs.
//!
//! # Modules
//!
//! - `xml`: Element handles over roxmltree
//! - `mets`: METS/MODS navigation and resolution
//! - `config`: Environment-driven configuration

pub mod config;
pub mod mets;
pub mod xml;
