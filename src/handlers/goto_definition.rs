//! Go-to-definition handler.
//!
//! A function's "definition" is its generated documentation page at
//! `<docsRoot>/<module>/<canonical>.md`.

use tower_lsp::lsp_types::*;

use crate::analysis::{find_qualified_at, DocumentState};
use crate::api::ResolutionTable;
use crate::config::ServerConfig;

/// Get definition location for the reference at position.
pub fn get_definition(
    doc: &DocumentState,
    position: Position,
    table: &ResolutionTable,
    config: &ServerConfig,
) -> Option<GotoDefinitionResponse> {
    let (line, cursor) = doc.cursor(position)?;
    let reference = find_qualified_at(line, cursor)?;

    let Some(module) = table.module(&reference.module) else {
        tracing::debug!("definition: module not found for {}", reference.text);
        return None;
    };

    let Some(entry) = module.get(&reference.name) else {
        tracing::debug!(
            "definition: function not found for {}; known keys sample: {}",
            reference.text,
            module.sample_keys(30).join(", ")
        );
        return None;
    };

    let Some(doc_path) = config.doc_path(&reference.module, &entry.canonical_name) else {
        tracing::debug!("definition: docsRoot not set");
        return None;
    };

    if !doc_path.is_file() {
        tracing::debug!("definition: doc not found: {}", doc_path.display());
        return None;
    }

    let uri = Url::from_file_path(&doc_path).ok()?;
    tracing::debug!("definition: {} -> {}", reference.text, doc_path.display());

    Some(GotoDefinitionResponse::Scalar(Location {
        uri,
        range: Range::default(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::loader::decode_api;
    use serde_json::json;

    fn table() -> ResolutionTable {
        ResolutionTable::build(
            decode_api(json!({"player": {"message": {"aliases": ["msg"]}}})).unwrap(),
        )
    }

    #[test]
    fn test_definition_resolves_alias_to_canonical_doc() {
        let docs = tempfile::tempdir().unwrap();
        let page = docs.path().join("player").join("message.md");
        std::fs::create_dir_all(page.parent().unwrap()).unwrap();
        std::fs::write(&page, "# message").unwrap();

        let config = ServerConfig {
            docs_root: Some(docs.path().to_path_buf()),
            ..Default::default()
        };
        let doc = DocumentState::new("player.msg(\"hi\")".to_string());

        let Some(GotoDefinitionResponse::Scalar(location)) =
            get_definition(&doc, Position::new(0, 8), &table(), &config)
        else {
            panic!("expected a scalar location");
        };
        assert_eq!(location.uri, Url::from_file_path(&page).unwrap());
        assert_eq!(location.range, Range::default());
    }

    #[test]
    fn test_definition_missing_doc_file() {
        let docs = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            docs_root: Some(docs.path().to_path_buf()),
            ..Default::default()
        };
        let doc = DocumentState::new("player.message".to_string());
        assert!(get_definition(&doc, Position::new(0, 3), &table(), &config).is_none());
    }

    #[test]
    fn test_definition_without_docs_root() {
        let doc = DocumentState::new("player.message".to_string());
        let config = ServerConfig::default();
        assert!(get_definition(&doc, Position::new(0, 3), &table(), &config).is_none());
    }

    #[test]
    fn test_definition_unknown_function() {
        let doc = DocumentState::new("player.nope".to_string());
        let config = ServerConfig::default();
        assert!(get_definition(&doc, Position::new(0, 9), &table(), &config).is_none());
    }
}
