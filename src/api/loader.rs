//! API description loader
//!
//! Reads `api_aliases.json` (module -> function -> spec) into ordered maps.
//! Missing or broken files are reported as [`ApiError`]; [`load_or_empty`]
//! applies the degrade-to-empty policy used by the server.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::types::FunctionSpec;
use crate::error::ApiError;

/// Decoded description: module name -> canonical function name -> spec,
/// in file order.
pub type RawApi = IndexMap<String, IndexMap<String, FunctionSpec>>;

/// Load and decode the API description at `path`.
pub fn load_api(path: Option<&Path>) -> Result<RawApi, ApiError> {
    let path = path.ok_or(ApiError::NotConfigured)?;
    if !path.exists() {
        return Err(ApiError::NotFound {
            path: path.to_path_buf(),
        });
    }

    info!("Loading API description from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| ApiError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(content.trim_start_matches('\u{feff}')).map_err(
        |source| ApiError::Parse {
            path: path.to_path_buf(),
            source,
        },
    )?;

    let api = decode_api(value).ok_or_else(|| ApiError::NotAnObject {
        path: path.to_path_buf(),
    })?;

    info!(
        "Loaded {} modules with {} total functions",
        api.len(),
        api.values().map(|m| m.len()).sum::<usize>()
    );

    Ok(api)
}

/// Load the description, degrading to an empty one on any failure.
pub fn load_or_empty(path: Option<&Path>) -> RawApi {
    match load_api(path) {
        Ok(api) => api,
        Err(e) if e.is_missing() => {
            warn!("{}; no symbols will resolve", e);
            RawApi::new()
        }
        Err(e) => {
            warn!("{}; falling back to an empty API", e);
            RawApi::new()
        }
    }
}

/// Decode an already-parsed JSON document.
///
/// Returns `None` only when the top level is not an object. Modules that
/// are not objects are skipped; function entries that are not objects
/// become empty specs.
pub fn decode_api(value: Value) -> Option<RawApi> {
    let Value::Object(modules) = value else {
        return None;
    };

    let mut api = RawApi::with_capacity(modules.len());
    for (module_name, funcs) in modules {
        let Value::Object(funcs) = funcs else {
            debug!("Skipping module '{}': not an object", module_name);
            continue;
        };

        let mut specs = IndexMap::with_capacity(funcs.len());
        for (func_name, raw) in funcs {
            let spec = if raw.is_object() {
                serde_json::from_value(raw).unwrap_or_default()
            } else {
                FunctionSpec::default()
            };
            specs.insert(func_name, spec);
        }
        api.insert(module_name, specs);
    }

    Some(api)
}
