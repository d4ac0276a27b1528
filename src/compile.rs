//! External compiler invocation.
//!
//! Backs the `mldsl.compile` and `mldsl.compilePlan` commands. The compiler
//! is a Python script run once per request; this module only locates it,
//! runs it, and hands the output back.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::process::Command;
use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::error::CompileError;

/// Compiler location relative to the workspace root.
const DEFAULT_COMPILER: &str = "tools/mldsl_compile.py";

/// Result of `mldsl.compile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
    /// Trimmed compiler stdout
    pub text: String,
    /// Number of non-blank output lines
    pub command_count: usize,
}

/// Result of `mldsl.compilePlan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    pub plan_path: PathBuf,
    /// In-game command that runs the written plan
    pub run_command: String,
}

/// Local path of an `.mldsl` document.
pub fn source_path(uri: &Url) -> Result<PathBuf, CompileError> {
    let path = uri
        .to_file_path()
        .map_err(|_| CompileError::NotAFile(uri.to_string()))?;
    let is_mldsl = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mldsl"));
    if !is_mldsl {
        return Err(CompileError::NotMldsl(path.display().to_string()));
    }
    Ok(path)
}

/// Configured compiler if it exists, else `<root>/tools/mldsl_compile.py`.
pub fn find_compiler(config: &ServerConfig, workspace_root: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config.compiler_path.as_ref().filter(|p| p.exists()) {
        return Some(path.clone());
    }
    let auto = workspace_root?.join(DEFAULT_COMPILER);
    auto.exists().then_some(auto)
}

/// Configured plan path, else `$APPDATA/.minecraft/plan.json`, else
/// `./plan.json`.
pub fn resolve_plan_path(config: &ServerConfig) -> PathBuf {
    let appdata = std::env::var("APPDATA")
        .or_else(|_| std::env::var("appdata"))
        .ok();
    let cwd = std::env::current_dir().unwrap_or_default();
    plan_path_from(config, appdata.as_deref(), &cwd)
}

fn plan_path_from(config: &ServerConfig, appdata: Option<&str>, cwd: &Path) -> PathBuf {
    if let Some(path) = &config.plan_path {
        return path.clone();
    }
    match appdata.filter(|a| !a.is_empty()) {
        Some(appdata) => Path::new(appdata).join(".minecraft").join("plan.json"),
        None => cwd.join("plan.json"),
    }
}

/// Compile `source` and return the generated commands.
pub async fn compile(
    config: &ServerConfig,
    workspace_root: Option<&Path>,
    source: &Path,
) -> Result<CompileOutput, CompileError> {
    let compiler = find_compiler(config, workspace_root).ok_or(CompileError::CompilerNotFound)?;
    let stdout = run(
        config.python(),
        vec![compiler.into_os_string(), source.as_os_str().to_owned()],
    )
    .await?;

    let text = stdout.trim().to_string();
    if text.is_empty() {
        return Err(CompileError::EmptyOutput);
    }
    let command_count = text.lines().filter(|l| !l.trim().is_empty()).count();

    Ok(CompileOutput {
        text,
        command_count,
    })
}

/// Compile `source` into a plan file and return the command that runs it.
pub async fn compile_plan(
    config: &ServerConfig,
    workspace_root: Option<&Path>,
    source: &Path,
) -> Result<PlanOutput, CompileError> {
    let compiler = find_compiler(config, workspace_root).ok_or(CompileError::CompilerNotFound)?;
    let plan_path = resolve_plan_path(config);

    run(
        config.python(),
        vec![
            compiler.into_os_string(),
            OsString::from("--plan"),
            plan_path.as_os_str().to_owned(),
            source.as_os_str().to_owned(),
        ],
    )
    .await?;

    let run_command = format!("/mldsl run \"{}\"", plan_path.display());
    Ok(PlanOutput {
        plan_path,
        run_command,
    })
}

async fn run(program: &str, args: Vec<OsString>) -> Result<String, CompileError> {
    debug!("running {} {:?}", program, args);

    let output = Command::new(program)
        .args(&args)
        .env("PYTHONIOENCODING", "utf-8")
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| CompileError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        warn!("compiler stderr: {}", stderr);
    }

    if !output.status.success() {
        return Err(CompileError::Failed {
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
