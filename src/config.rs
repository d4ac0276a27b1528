//! Server configuration
//!
//! Settings come from three layers, later ones overriding earlier ones:
//! 1. Environment variables (`MLDSL_*`)
//! 2. LSP `initializationOptions`
//! 3. `workspace/didChangeConfiguration` settings
//!
//! In the two client layers a missing key keeps the lower value and a blank
//! string clears it.
//!
//! The JSON shape matches the editor settings, either bare or nested under
//! an `mldsl` key:
//!
//! ```json
//! { "mldsl": { "apiAliasesPath": "out/api_aliases.json", "docsRoot": "out/docs" } }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

const ENV_API_ALIASES_PATH: &str = "MLDSL_API_ALIASES_PATH";
const ENV_DOCS_ROOT: &str = "MLDSL_DOCS_ROOT";
const ENV_PYTHON: &str = "MLDSL_PYTHON";
const ENV_COMPILER_PATH: &str = "MLDSL_COMPILER_PATH";
const ENV_PLAN_PATH: &str = "MLDSL_PLAN_PATH";

/// Settings section name used by editors.
pub const SECTION: &str = "mldsl";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// Path to `api_aliases.json`
    pub api_aliases_path: Option<PathBuf>,
    /// Root of the generated per-function Markdown docs
    pub docs_root: Option<PathBuf>,
    /// Python interpreter used to run the compiler
    pub python_path: Option<String>,
    /// Path to `mldsl_compile.py`
    pub compiler_path: Option<PathBuf>,
    /// Output path for `mldsl.compilePlan`
    pub plan_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Configuration from `MLDSL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_aliases_path: get(ENV_API_ALIASES_PATH).map(PathBuf::from),
            docs_root: get(ENV_DOCS_ROOT).map(PathBuf::from),
            python_path: get(ENV_PYTHON),
            compiler_path: get(ENV_COMPILER_PATH).map(PathBuf::from),
            plan_path: get(ENV_PLAN_PATH).map(PathBuf::from),
        }
    }

    /// Overlay a client settings layer.
    pub fn apply(&mut self, layer: SettingsLayer) {
        layer.api_aliases_path.apply_to(&mut self.api_aliases_path);
        layer.docs_root.apply_to(&mut self.docs_root);
        layer.python_path.apply_to(&mut self.python_path);
        layer.compiler_path.apply_to(&mut self.compiler_path);
        layer.plan_path.apply_to(&mut self.plan_path);
    }

    /// Python interpreter, defaulting to `python`.
    pub fn python(&self) -> &str {
        self.python_path.as_deref().unwrap_or("python")
    }

    /// Documentation file for a function: `<docsRoot>/<module>/<function>.md`.
    pub fn doc_path(&self, module: &str, function: &str) -> Option<PathBuf> {
        let root = self.docs_root.as_deref()?;
        Some(root.join(module).join(format!("{}.md", function)))
    }

    /// Resolve relative file paths against the workspace root.
    ///
    /// The interpreter is left alone; it is usually looked up on `PATH`.
    pub fn relative_to(mut self, root: Option<&Path>) -> Self {
        let Some(root) = root else {
            return self;
        };
        let absolute = |p: PathBuf| if p.is_relative() { root.join(p) } else { p };
        self.api_aliases_path = self.api_aliases_path.map(absolute);
        self.docs_root = self.docs_root.map(absolute);
        self.compiler_path = self.compiler_path.map(absolute);
        self.plan_path = self.plan_path.map(absolute);
        self
    }
}

/// One field of a client settings layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Setting<T> {
    /// Key absent or null: the lower layer's value stands
    #[default]
    Inherit,
    /// Key set to a blank string: the field is unset
    Clear,
    Set(T),
}

impl<T> Setting<T> {
    fn from_raw(raw: Option<String>, convert: impl FnOnce(String) -> T) -> Self {
        match raw {
            None => Setting::Inherit,
            Some(s) if s.trim().is_empty() => Setting::Clear,
            Some(s) => Setting::Set(convert(s)),
        }
    }

    fn apply_to(self, field: &mut Option<T>) {
        match self {
            Setting::Inherit => {}
            Setting::Clear => *field = None,
            Setting::Set(value) => *field = Some(value),
        }
    }
}

/// Settings object as the editor sends it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    api_aliases_path: Option<String>,
    docs_root: Option<String>,
    python_path: Option<String>,
    compiler_path: Option<String>,
    plan_path: Option<String>,
}

/// `initializationOptions` or `didChangeConfiguration` settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsLayer {
    pub api_aliases_path: Setting<PathBuf>,
    pub docs_root: Setting<PathBuf>,
    pub python_path: Setting<String>,
    pub compiler_path: Setting<PathBuf>,
    pub plan_path: Setting<PathBuf>,
}

impl SettingsLayer {
    /// Parse editor settings, bare or nested under `mldsl`.
    ///
    /// Returns `None` when the value is not a settings object. A blank
    /// string clears the field, so emptying a setting in the editor takes
    /// effect on the next reload.
    pub fn from_settings(settings: &Value) -> Option<Self> {
        let section = settings.get(SECTION).unwrap_or(settings);
        if !section.is_object() {
            return None;
        }
        let raw: RawSettings = serde_json::from_value(section.clone()).ok()?;
        Some(Self {
            api_aliases_path: Setting::from_raw(raw.api_aliases_path, PathBuf::from),
            docs_root: Setting::from_raw(raw.docs_root, PathBuf::from),
            python_path: Setting::from_raw(raw.python_path, |s| s),
            compiler_path: Setting::from_raw(raw.compiler_path, PathBuf::from),
            plan_path: Setting::from_raw(raw.plan_path, PathBuf::from),
        })
    }
}
