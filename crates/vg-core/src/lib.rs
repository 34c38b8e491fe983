//! vg-core - Core library for viewgen
//!
//! This crate provides the value types shared by the CQL block IR and its
//! renderers: member paths, literals, the per-render identifier registry,
//! text helpers, and configuration parsing.

pub mod config;
pub mod error;
pub mod identifiers;
pub mod literal;
pub mod member_path;
pub mod serde_helpers;
pub mod text_utils;

pub use config::{Config, IdentifierConfig, OutputConfig, OutputFormat};
pub use error::{CoreError, CoreResult};
pub use identifiers::CqlIdentifiers;
pub use literal::Literal;
pub use member_path::MemberPath;
