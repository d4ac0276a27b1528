//! MLDSL Language Server - Main entry point
//!
//! Provides LSP support for MLDSL scripts with:
//! - Completion of `module.function` names, aliases included
//! - Hover documentation with rendered `§` colour codes
//! - Go-to-definition into the generated Markdown docs
//! - Diagnostics for unknown modules and functions
//! - Compile commands backed by the external compiler

use tower_lsp::{LspService, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mldsl_lsp::server::MldslLanguageServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging to stderr (LSP uses stdout for protocol)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mldsl_lsp=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    tracing::info!("Starting MLDSL Language Server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(MldslLanguageServer::new);

    Server::new(stdin, stdout, socket).serve(service).await;
    Ok(())
}
