//! Hover handler for the MLDSL Language Server.

use tower_lsp::lsp_types::*;

use crate::analysis::{find_qualified_at, DocumentState};
use crate::api::{FunctionSpec, ResolutionTable};
use crate::render::{render, runs_to_html};

/// Get hover information at position.
pub fn get_hover(doc: &DocumentState, position: Position, table: &ResolutionTable) -> Option<Hover> {
    let (line, cursor) = doc.cursor(position)?;
    let reference = find_qualified_at(line, cursor)?;
    let entry = table.resolve(&reference.module, &reference.name)?;

    tracing::debug!(
        "hover {} -> {}.{}",
        reference.text,
        reference.module,
        entry.canonical_name
    );

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: spec_to_markdown(&entry.spec),
        }),
        range: Some(doc.range_on_line(position.line, reference.start, reference.end)),
    })
}

/// Markdown documentation for a function spec.
///
/// Used for hovers and completion item documentation. The rich description
/// is embedded as inline HTML, so clients must allow HTML in Markdown to
/// show the colours.
pub fn spec_to_markdown(spec: &FunctionSpec) -> String {
    let mut lines = Vec::new();

    if let Some(sign1) = non_empty(&spec.signature1) {
        lines.push(format!("**sign1:** {}", sign1));
    }
    if let Some(sign2) = non_empty(&spec.signature2) {
        lines.push(format!("**sign2:** {}", sign2));
    }
    if let Some(gui) = non_empty(&spec.gui_hint) {
        lines.push(format!("**gui:** {}", gui));
    }
    if !spec.aliases.is_empty() {
        lines.push(format!("**aliases:** {}", spec.aliases.join(", ")));
    }

    if let Some(description) = non_empty(&spec.description) {
        lines.push(String::new());
        lines.push("**description:**".to_string());
        lines.push("```".to_string());
        lines.push(description.to_string());
        lines.push("```".to_string());
    }

    if let Some(raw) = non_empty(&spec.rich_description) {
        let html = runs_to_html(&render(raw));
        if !html.is_empty() {
            lines.push(String::new());
            lines.push("**description (mc colors):**".to_string());
            lines.push(format!(
                r#"<div style="font-family: var(--vscode-editor-font-family); font-size: 12px; line-height: 1.35;">{}</div>"#,
                html
            ));
        }
    }

    if !spec.parameters.is_empty() {
        lines.push(String::new());
        lines.push("**params:**".to_string());
        for p in &spec.parameters {
            lines.push(format!(
                "- `{}` ({}) slot {}",
                p.name,
                p.mode.as_ref().map_or_else(|| "?".to_string(), |m| m.to_string()),
                slot_label(p.slot)
            ));
        }
    }

    if !spec.enum_values.is_empty() {
        lines.push(String::new());
        lines.push("**enums:**".to_string());
        for e in &spec.enum_values {
            let mut line = format!("- `{}` slot {}", e.name, slot_label(e.slot));
            if !e.options.is_empty() {
                let options: Vec<_> = e.options.keys().map(String::as_str).collect();
                line.push_str(&format!(": {}", options.join(" / ")));
            }
            lines.push(line);
        }
    }

    lines.join("\n")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn slot_label(slot: Option<u32>) -> String {
    slot.map_or_else(|| "?".to_string(), |s| s.to_string())
}
