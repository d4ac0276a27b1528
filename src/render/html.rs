//! HTML adapter for styled runs, embedded in hover Markdown.

use super::{Modifier, StyledRun};

/// Render runs as escaped inline HTML; plain runs are emitted without a span.
pub fn runs_to_html(runs: &[StyledRun]) -> String {
    let mut out = String::new();
    for run in runs {
        let content = escape_html(&run.text).replace('\n', "<br/>");
        let css = css_for(run);
        if css.is_empty() {
            out.push_str(&content);
        } else {
            out.push_str(&format!(r#"<span style="{}">{}</span>"#, css, content));
        }
    }
    out
}

fn css_for(run: &StyledRun) -> String {
    let mut parts = Vec::new();
    if let Some(color) = run.style.color {
        parts.push(format!("color:{}", color.hex()));
    }
    let modifiers = run.style.modifiers;
    if modifiers.contains(Modifier::BOLD) {
        parts.push("font-weight:700".to_string());
    }
    if modifiers.contains(Modifier::ITALIC) {
        parts.push("font-style:italic".to_string());
    }

    let mut decorations = Vec::new();
    if modifiers.contains(Modifier::UNDERLINED) {
        decorations.push("underline");
    }
    if modifiers.contains(Modifier::CROSSED_OUT) {
        decorations.push("line-through");
    }
    if !decorations.is_empty() {
        parts.push(format!("text-decoration:{}", decorations.join(" ")));
    }

    parts.join(";")
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
