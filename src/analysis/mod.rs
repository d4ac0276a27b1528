//! Document analysis for the MLDSL Language Server.
//!
//! Handles document text tracking and `module.function` reference scanning.

pub mod document;
pub mod scanner;

pub use document::{line_range, DocumentState, PositionEncoding};
pub use scanner::{find_all_references, find_module_and_prefix, find_qualified_at, QualifiedReference};
