//! LSP request handlers.

pub mod completion;
pub mod diagnostics;
pub mod goto_definition;
pub mod hover;
