//! Alias-aware resolution table.
//!
//! Every module maps each usable name (canonical name plus declared aliases)
//! to the canonical function and its spec. A small static table adds
//! alternate module names on top of the data-driven modules.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::loader::RawApi;
use super::types::FunctionSpec;

/// Secondary module names as `(canonical module, alternate name)`.
///
/// Applied after the data-driven build, only when the alternate is not
/// already a module and the canonical module exists.
pub const MODULE_ALIASES: &[(&str, &str)] = &[("player", "игрок"), ("event", "событие")];

/// A name resolved to its canonical function.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFunction {
    pub canonical_name: String,
    pub spec: Arc<FunctionSpec>,
}

/// One completion candidate from a prefix lookup.
#[derive(Debug, Clone, Copy)]
pub struct CompletionEntry<'a> {
    /// The key that matched (canonical name or alias)
    pub alias: &'a str,
    pub canonical_name: &'a str,
    pub spec: &'a Arc<FunctionSpec>,
}

impl CompletionEntry<'_> {
    pub fn is_alias(&self) -> bool {
        self.alias != self.canonical_name
    }
}

/// A key that was claimed by two different functions while building.
///
/// The later function wins; the collision is kept so it can be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasCollision {
    pub module: String,
    pub key: String,
    pub previous: String,
    pub replacement: String,
}

/// Names available in one module.
#[derive(Debug, Default)]
pub struct ModuleTable {
    /// Every accessible name, in insertion order
    by_name: IndexMap<String, ResolvedFunction>,
    /// Canonical functions, in declaration order
    canonical: IndexMap<String, Arc<FunctionSpec>>,
}

impl ModuleTable {
    fn build(
        module: &str,
        funcs: IndexMap<String, FunctionSpec>,
        collisions: &mut Vec<AliasCollision>,
    ) -> Self {
        let mut table = ModuleTable::default();

        for (func_name, spec) in funcs {
            let spec = Arc::new(spec);
            let entry = ResolvedFunction {
                canonical_name: func_name.clone(),
                spec: Arc::clone(&spec),
            };

            table.insert(module, func_name.clone(), entry.clone(), collisions);
            for alias in &spec.aliases {
                if alias.is_empty() {
                    continue;
                }
                table.insert(module, alias.clone(), entry.clone(), collisions);
            }
            table.canonical.insert(func_name, spec);
        }

        table
    }

    fn insert(
        &mut self,
        module: &str,
        key: String,
        entry: ResolvedFunction,
        collisions: &mut Vec<AliasCollision>,
    ) {
        if let Some(previous) = self.by_name.get(&key) {
            if previous.canonical_name != entry.canonical_name {
                debug!(
                    "Alias collision in '{}': '{}' moves from '{}' to '{}'",
                    module, key, previous.canonical_name, entry.canonical_name
                );
                collisions.push(AliasCollision {
                    module: module.to_string(),
                    key: key.clone(),
                    previous: previous.canonical_name.clone(),
                    replacement: entry.canonical_name.clone(),
                });
            }
        }
        // IndexMap keeps the original position of an overwritten key
        self.by_name.insert(key, entry);
    }

    /// Exact lookup by canonical name or alias.
    pub fn get(&self, name: &str) -> Option<&ResolvedFunction> {
        self.by_name.get(name)
    }

    /// Every entry whose key starts with `prefix`, in insertion order.
    pub fn complete<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = CompletionEntry<'a>> {
        self.by_name
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
            .map(|(key, entry)| CompletionEntry {
                alias: key,
                canonical_name: &entry.canonical_name,
                spec: &entry.spec,
            })
    }

    /// True when some known key extends `prefix`.
    pub fn has_key_with_prefix(&self, prefix: &str) -> bool {
        self.by_name.keys().any(|k| k.starts_with(prefix))
    }

    /// All accessible names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// First `n` accessible names, for debug logging.
    pub fn sample_keys(&self, n: usize) -> Vec<&str> {
        self.keys().take(n).collect()
    }

    /// Canonical functions in declaration order.
    pub fn canonical(&self) -> &IndexMap<String, Arc<FunctionSpec>> {
        &self.canonical
    }

    /// Number of accessible names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// The full module -> name -> spec structure.
#[derive(Debug, Default)]
pub struct ResolutionTable {
    modules: IndexMap<String, Arc<ModuleTable>>,
    collisions: Vec<AliasCollision>,
}

impl ResolutionTable {
    /// A table in which nothing resolves.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a fresh table from a decoded description.
    pub fn build(api: RawApi) -> Self {
        let mut modules = IndexMap::with_capacity(api.len() + MODULE_ALIASES.len());
        let mut collisions = Vec::new();

        for (module_name, funcs) in api {
            let table = ModuleTable::build(&module_name, funcs, &mut collisions);
            modules.insert(module_name, Arc::new(table));
        }

        for (canonical, alternate) in MODULE_ALIASES {
            if modules.contains_key(*alternate) {
                continue;
            }
            if let Some(table) = modules.get(*canonical).cloned() {
                modules.insert((*alternate).to_string(), table);
            }
        }

        if !collisions.is_empty() {
            warn!(
                "{} alias collision(s) resolved by last definition",
                collisions.len()
            );
        }

        Self {
            modules,
            collisions,
        }
    }

    /// Table for a module name (including secondary module aliases).
    pub fn module(&self, name: &str) -> Option<&Arc<ModuleTable>> {
        self.modules.get(name)
    }

    /// Exact lookup of `module.name`.
    pub fn resolve(&self, module: &str, name: &str) -> Option<&ResolvedFunction> {
        self.module(module)?.get(name)
    }

    /// Prefix lookup within a module; empty when the module is unknown.
    pub fn complete<'a>(&'a self, module: &str, prefix: &'a str) -> Vec<CompletionEntry<'a>> {
        match self.module(module) {
            Some(table) => table.complete(prefix).collect(),
            None => Vec::new(),
        }
    }

    /// Module names, data-driven first, then secondary aliases.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Keys claimed by more than one function during the build.
    pub fn collisions(&self) -> &[AliasCollision] {
        &self.collisions
    }

    /// Number of module names, secondary aliases included.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
