//! Completion handler for the MLDSL Language Server.

use tower_lsp::lsp_types::*;

use crate::analysis::{find_module_and_prefix, DocumentState};
use crate::api::{CompletionEntry, ResolutionTable};

use super::hover::spec_to_markdown;

/// Generate completions for the `module.prefix` ending at the cursor.
///
/// Returns `None` when the cursor is not right after a `module.` token or
/// the module is unknown.
pub fn get_completions(
    doc: &DocumentState,
    position: Position,
    table: &ResolutionTable,
) -> Option<Vec<CompletionItem>> {
    let (line, cursor) = doc.cursor(position).unwrap_or(("", 0));
    let Some(reference) = find_module_and_prefix(line, cursor) else {
        tracing::debug!("completion: no module prefix match");
        return None;
    };

    let Some(module) = table.module(&reference.module) else {
        tracing::debug!("completion: module not found: {}", reference.module);
        return None;
    };

    let items: Vec<_> = module
        .complete(&reference.name)
        .enumerate()
        .map(|(index, entry)| completion_item(&reference.module, index, entry))
        .collect();

    tracing::debug!(
        "completion: {}. prefix='{}' items={}",
        reference.module,
        reference.name,
        items.len()
    );

    Some(items)
}

fn completion_item(module: &str, index: usize, entry: CompletionEntry<'_>) -> CompletionItem {
    let mut detail = format!(
        "{}.{}({})",
        module,
        entry.canonical_name,
        entry.spec.parameter_list()
    );
    if entry.is_alias() {
        detail.push_str(&format!("  (alias of {})", entry.canonical_name));
    }

    CompletionItem {
        label: entry.alias.to_string(),
        kind: Some(CompletionItemKind::FUNCTION),
        detail: Some(detail),
        documentation: Some(Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value: spec_to_markdown(entry.spec),
        })),
        insert_text_format: Some(InsertTextFormat::PLAIN_TEXT),
        // declaration order, not alphabetical
        sort_text: Some(format!("{:05}", index)),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::loader::decode_api;
    use serde_json::json;

    fn table() -> ResolutionTable {
        ResolutionTable::build(
            decode_api(json!({
                "player": {
                    "message": {
                        "aliases": ["msg", "сообщение"],
                        "params": [{"name": "text", "mode": "TEXT", "slot": 27}, {"name": "text2", "mode": "TEXT", "slot": 28}]
                    },
                    "teleport": {"aliases": ["tp"]}
                }
            }))
            .unwrap(),
        )
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_after_dot_lists_everything() {
        let doc = DocumentState::new("player.".to_string());
        let items = get_completions(&doc, Position::new(0, 7), &table()).unwrap();
        assert_eq!(
            labels(&items),
            vec!["message", "msg", "сообщение", "teleport", "tp"]
        );
    }

    #[test]
    fn test_prefix_narrows_and_alias_detail() {
        let doc = DocumentState::new("  player.m".to_string());
        let items = get_completions(&doc, Position::new(0, 10), &table()).unwrap();
        assert_eq!(labels(&items), vec!["message", "msg"]);
        assert_eq!(
            items[0].detail.as_deref(),
            Some("player.message(text, text2)")
        );
        assert_eq!(
            items[1].detail.as_deref(),
            Some("player.message(text, text2)  (alias of message)")
        );
        assert_eq!(items[1].kind, Some(CompletionItemKind::FUNCTION));
        assert_eq!(items[1].sort_text.as_deref(), Some("00001"));
    }

    #[test]
    fn test_secondary_module_name() {
        let doc = DocumentState::new("игрок.со".to_string());
        let items = get_completions(&doc, Position::new(0, 8), &table()).unwrap();
        assert_eq!(labels(&items), vec!["сообщение"]);
        assert!(items[0].detail.as_deref().unwrap().starts_with("игрок.message("));
    }

    #[test]
    fn test_no_completion_away_from_token() {
        let doc = DocumentState::new("player.message x".to_string());
        assert!(get_completions(&doc, Position::new(0, 16), &table()).is_none());
    }

    #[test]
    fn test_unknown_module() {
        let doc = DocumentState::new("nope.".to_string());
        assert!(get_completions(&doc, Position::new(0, 5), &table()).is_none());
    }
}
