//! Diagnostics handler for the MLDSL Language Server.
//!
//! Flags `module.function` references that do not resolve. A function name
//! that is a prefix of some known name in its module is left alone, since
//! the user is most likely still typing it.

use tower_lsp::lsp_types::*;

use crate::analysis::{find_all_references, PositionEncoding};
use crate::api::ResolutionTable;

/// Diagnostic source reported to the client.
pub const SOURCE: &str = "mldsl";

/// Scan every line of `text` and return the full diagnostic set, with
/// ranges in UTF-16 columns.
pub fn analyze_document(text: &str, table: &ResolutionTable) -> Vec<Diagnostic> {
    analyze_document_with(text, table, PositionEncoding::Utf16)
}

/// [`analyze_document`] with ranges in the given column encoding.
pub fn analyze_document_with(
    text: &str,
    table: &ResolutionTable,
    encoding: PositionEncoding,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        for reference in find_all_references(line) {
            let range = encoding.range(line_num as u32, line, reference.start, reference.end);

            let Some(module) = table.module(&reference.module) else {
                diagnostics.push(warning(
                    range,
                    format!("Unknown module '{}'", reference.module),
                ));
                continue;
            };

            if module.get(&reference.name).is_some() {
                continue;
            }

            // player.соо while typing player.сообщение
            if module.has_key_with_prefix(&reference.name) {
                continue;
            }

            diagnostics.push(warning(
                range,
                format!(
                    "Unknown function '{}.{}'",
                    reference.module, reference.name
                ),
            ));
        }
    }

    diagnostics
}

fn warning(range: Range, message: String) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(DiagnosticSeverity::WARNING),
        source: Some(SOURCE.to_string()),
        message,
        ..Default::default()
    }
}
