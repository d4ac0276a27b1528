//! MLDSL Language Server library.
//!
//! Provides the symbol resolution engine behind the `mldsl-lsp` binary:
//! - Alias-aware resolution tables built from `api_aliases.json`
//! - `module.function` reference scanning at cursor positions
//! - Completion, hover, go-to-definition and diagnostics handlers
//! - Rendering of `§`-style formatting codes into styled runs

pub mod analysis;
pub mod api;
pub mod compile;
pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod server;

pub use api::{ActiveTable, FunctionSpec, ModuleTable, ResolutionTable};
pub use error::{ApiError, CompileError};
