//! LSP Server implementation for MLDSL.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error, ErrorCode, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::analysis::{DocumentState, PositionEncoding};
use crate::api::{load_or_empty, ActiveTable, ResolutionTable};
use crate::compile;
use crate::config::{ServerConfig, SettingsLayer};
use crate::error::CompileError;
use crate::handlers;

pub const CMD_RELOAD_API: &str = "mldsl.reloadApi";
pub const CMD_COMPILE: &str = "mldsl.compile";
pub const CMD_COMPILE_PLAN: &str = "mldsl.compilePlan";

/// MLDSL Language Server state.
pub struct MldslLanguageServer {
    /// LSP client for sending notifications
    client: Client,
    /// Open documents and their state
    documents: Arc<RwLock<HashMap<Url, DocumentState>>>,
    /// Resolution table, swapped on reload
    table: Arc<ActiveTable>,
    /// Layered configuration (environment, init options, settings)
    config: Arc<RwLock<ServerConfig>>,
    /// First workspace folder, if the client sent one
    workspace_root: Arc<RwLock<Option<PathBuf>>>,
    /// Column unit agreed in `initialize`
    encoding: Arc<RwLock<PositionEncoding>>,
}

impl MldslLanguageServer {
    /// Create a server configured from the environment.
    pub fn new(client: Client) -> Self {
        Self::with_config(client, ServerConfig::from_env())
    }

    pub fn with_config(client: Client, config: ServerConfig) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
            table: Arc::new(ActiveTable::default()),
            config: Arc::new(RwLock::new(config)),
            workspace_root: Arc::new(RwLock::new(None)),
            encoding: Arc::new(RwLock::new(PositionEncoding::default())),
        }
    }

    /// Get a document by URL.
    pub async fn get_document(&self, uri: &Url) -> Option<DocumentState> {
        self.documents.read().await.get(uri).cloned()
    }

    /// Configuration with relative paths resolved against the workspace.
    async fn effective_config(&self) -> ServerConfig {
        let root = self.workspace_root.read().await.clone();
        self.config.read().await.clone().relative_to(root.as_deref())
    }

    /// Analyze a document and publish diagnostics.
    async fn publish_diagnostics(&self, uri: Url, doc: &DocumentState, table: &ResolutionTable) {
        let diagnostics =
            handlers::diagnostics::analyze_document_with(&doc.text, table, doc.encoding);
        tracing::debug!("{} diagnostic(s) for {}", diagnostics.len(), uri);
        self.client
            .publish_diagnostics(uri, diagnostics, doc.version)
            .await;
    }

    /// Recompute diagnostics for every open document.
    async fn refresh_all_diagnostics(&self) {
        let table = self.table.snapshot();
        let open: Vec<_> = self
            .documents
            .read()
            .await
            .iter()
            .map(|(uri, doc)| (uri.clone(), doc.clone()))
            .collect();

        for (uri, doc) in open {
            self.publish_diagnostics(uri, &doc, &table).await;
        }
    }

    /// Rebuild the resolution table from the configured API description.
    ///
    /// Returns the number of module names in the new table.
    async fn reload_api(&self, reason: &str) -> usize {
        let config = self.effective_config().await;

        tracing::info!(
            "reloadApi ({}): apiAliasesPath={} docsRoot={}",
            reason,
            display_path(config.api_aliases_path.as_deref()),
            display_path(config.docs_root.as_deref())
        );
        for (key, path) in [
            ("apiAliasesPath", &config.api_aliases_path),
            ("docsRoot", &config.docs_root),
        ] {
            if let Some(path) = path.as_deref().filter(|p| !p.exists()) {
                tracing::warn!("{} does not exist: {}", key, path.display());
            }
        }

        let table = ResolutionTable::build(load_or_empty(config.api_aliases_path.as_deref()));
        for c in table.collisions() {
            tracing::debug!(
                "alias collision {}.{}: {} replaced by {}",
                c.module,
                c.key,
                c.previous,
                c.replacement
            );
        }
        let modules = table.len();
        self.table.replace(table);
        tracing::info!("reloadApi ({}): modules={}", reason, modules);

        self.refresh_all_diagnostics().await;
        modules
    }

    async fn run_command(&self, command: &str, arguments: &[Value]) -> Result<Option<Value>> {
        match command {
            CMD_RELOAD_API => {
                let modules = self.reload_api("command").await;
                self.client
                    .show_message(MessageType::INFO, format!("MLDSL: API reloaded ({} modules)", modules))
                    .await;
                Ok(Some(json!({ "modules": modules })))
            }
            CMD_COMPILE => {
                let source = document_argument(arguments).and_then(|uri| {
                    compile::source_path(&uri).map_err(compile_error)
                })?;
                let config = self.effective_config().await;
                let root = self.workspace_root.read().await.clone();

                let output = compile::compile(&config, root.as_deref(), &source)
                    .await
                    .map_err(compile_error)?;
                tracing::info!(
                    "compiled {}: {} command(s)",
                    source.display(),
                    output.command_count
                );
                self.client
                    .show_message(
                        MessageType::INFO,
                        format!("MLDSL: compiled {} command(s)", output.command_count),
                    )
                    .await;
                Ok(Some(json!(output)))
            }
            CMD_COMPILE_PLAN => {
                let source = document_argument(arguments).and_then(|uri| {
                    compile::source_path(&uri).map_err(compile_error)
                })?;
                let config = self.effective_config().await;
                let root = self.workspace_root.read().await.clone();

                let plan = compile::compile_plan(&config, root.as_deref(), &source)
                    .await
                    .map_err(compile_error)?;
                tracing::info!("wrote plan {}", plan.plan_path.display());
                self.client
                    .show_message(
                        MessageType::INFO,
                        format!("MLDSL: wrote {}", plan.plan_path.display()),
                    )
                    .await;
                Ok(Some(json!(plan)))
            }
            other => Err(Error::invalid_params(format!("unknown command: {}", other))),
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for MldslLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("Initializing MLDSL Language Server");

        if let Some(root) = workspace_root(&params) {
            tracing::info!("workspace root: {}", root.display());
            *self.workspace_root.write().await = Some(root);
        }

        let encoding = PositionEncoding::negotiate(&params.capabilities);
        tracing::info!("position encoding: {:?}", encoding);
        *self.encoding.write().await = encoding;

        if let Some(options) = params.initialization_options.as_ref() {
            match SettingsLayer::from_settings(options) {
                Some(layer) => self.config.write().await.apply(layer),
                None => tracing::warn!("ignoring malformed initializationOptions"),
            }
        }

        self.reload_api("initialize").await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                position_encoding: Some(encoding.kind()),

                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),

                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![".".to_string()]),
                    ..Default::default()
                }),

                hover_provider: Some(HoverProviderCapability::Simple(true)),

                definition_provider: Some(OneOf::Left(true)),

                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![
                        CMD_RELOAD_API.to_string(),
                        CMD_COMPILE.to_string(),
                        CMD_COMPILE_PLAN.to_string(),
                    ],
                    ..Default::default()
                }),

                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "mldsl-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("MLDSL Language Server initialized");

        self.client
            .log_message(MessageType::INFO, "MLDSL Language Server ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down MLDSL Language Server");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let item = params.text_document;
        tracing::debug!("Document opened: {}", item.uri);

        let encoding = *self.encoding.read().await;
        let doc = DocumentState::new(item.text)
            .with_version(item.version)
            .with_encoding(encoding);
        self.documents
            .write()
            .await
            .insert(item.uri.clone(), doc.clone());

        self.publish_diagnostics(item.uri, &doc, &self.table.snapshot())
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("Document changed: {}", uri);

        let updated = {
            let mut docs = self.documents.write().await;
            docs.get_mut(&uri).map(|doc| {
                doc.apply_changes(params.content_changes);
                doc.version = Some(params.text_document.version);
                doc.clone()
            })
        };

        match updated {
            Some(doc) => {
                self.publish_diagnostics(uri, &doc, &self.table.snapshot())
                    .await
            }
            None => tracing::warn!("change for unknown document {}", uri),
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        tracing::debug!("Document closed: {}", params.text_document.uri);

        self.documents
            .write()
            .await
            .remove(&params.text_document.uri);

        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let Some(layer) = SettingsLayer::from_settings(&params.settings) else {
            tracing::debug!("configuration change without mldsl settings");
            return;
        };
        self.config.write().await.apply(layer);
        self.reload_api("configuration").await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        tracing::debug!(
            "Completion request: uri={}, line={}, char={}",
            uri,
            position.line,
            position.character
        );

        let Some(doc) = self.get_document(uri).await else {
            tracing::warn!("No document found for completion request");
            return Ok(None);
        };

        let table = self.table.snapshot();
        Ok(handlers::completion::get_completions(&doc, position, &table)
            .map(CompletionResponse::Array))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        if let Some(doc) = self.get_document(uri).await {
            let table = self.table.snapshot();
            return Ok(handlers::hover::get_hover(&doc, position, &table));
        }

        Ok(None)
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        if let Some(doc) = self.get_document(uri).await {
            let table = self.table.snapshot();
            let config = self.effective_config().await;
            return Ok(handlers::goto_definition::get_definition(
                &doc, position, &table, &config,
            ));
        }

        Ok(None)
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        tracing::info!("executeCommand {}", params.command);

        let result = self.run_command(&params.command, &params.arguments).await;
        if let Err(e) = &result {
            tracing::error!("{} failed: {}", params.command, e.message);
            self.client
                .show_message(MessageType::ERROR, format!("MLDSL: {}", e.message))
                .await;
        }
        result
    }
}

fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    let from_folders = params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .and_then(|folder| folder.uri.to_file_path().ok());

    #[allow(deprecated)]
    let from_root_uri = || params.root_uri.as_ref()?.to_file_path().ok();

    from_folders.or_else(from_root_uri)
}

/// First command argument as a document URI: a bare string or `{ "uri": ... }`.
fn document_argument(arguments: &[Value]) -> Result<Url> {
    let raw = arguments
        .first()
        .and_then(|arg| arg.as_str().or_else(|| arg.get("uri")?.as_str()))
        .ok_or_else(|| Error::invalid_params("expected a document URI argument"))?;

    Url::parse(raw).map_err(|e| Error::invalid_params(format!("invalid URI {}: {}", raw, e)))
}

fn compile_error(e: CompileError) -> Error {
    let code = match e {
        CompileError::NotAFile(_) | CompileError::NotMldsl(_) => ErrorCode::InvalidParams,
        _ => ErrorCode::InternalError,
    };
    Error {
        code,
        message: e.to_string().into(),
        data: None,
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(|| "(not set)".to_string(), |p| p.display().to_string())
}
