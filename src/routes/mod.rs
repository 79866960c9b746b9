//! Route modules for the METS resolver server

pub mod health;
pub mod structure;
