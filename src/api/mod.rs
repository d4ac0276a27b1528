//! API description model, loading and resolution.
//!
//! ```text
//! api_aliases.json ──► loader ──► RawApi ──► ResolutionTable::build ──► ActiveTable
//!                                                                        │
//!                      completion / hover / definition / diagnostics ◄───┘
//! ```

mod handle;
pub mod loader;
mod table;
pub mod types;

pub use handle::ActiveTable;
pub use loader::{load_api, load_or_empty, RawApi};
pub use table::{
    AliasCollision, CompletionEntry, ModuleTable, ResolutionTable, ResolvedFunction,
    MODULE_ALIASES,
};
pub use types::{EnumValue, FunctionSpec, ParamMode, Parameter};
