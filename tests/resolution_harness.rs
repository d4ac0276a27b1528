//! Resolution harness - table-driven checks against a realistic API file
//!
//! Loads `tests/fixtures/api_aliases.json` through the real loader and runs
//! the editor-facing handlers over it:
//! - Diagnostics (unknown modules, unknown functions, prefix suppression)
//! - Hover and completion through aliases and secondary module names
//! - Rich description rendering
//!
//! Run with: cargo test --test resolution_harness

use std::path::PathBuf;
use std::sync::Arc;

use mldsl_lsp::analysis::DocumentState;
use mldsl_lsp::api::{load_api, ActiveTable, ResolutionTable};
use mldsl_lsp::handlers::completion::get_completions;
use mldsl_lsp::handlers::diagnostics::analyze_document;
use mldsl_lsp::handlers::hover::get_hover;
use mldsl_lsp::render::plain_text;
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticSeverity, HoverContents, Position, Range, TextDocumentContentChangeEvent,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/api_aliases.json")
}

fn fixture_table() -> ResolutionTable {
    let api = load_api(Some(&fixture_path())).expect("fixture loads");
    ResolutionTable::build(api)
}

// =============================================================================
// TEST CASE DEFINITIONS
// =============================================================================

/// Diagnostic test case with expected outcome
struct TestCase {
    name: &'static str,
    input: &'static str,
    expected: Expected,
}

#[derive(Debug, Clone, PartialEq)]
enum Expected {
    /// Every reference resolves (or is still being typed)
    Clean,
    /// Exactly one diagnostic with this message
    Warning(&'static str),
    /// Specific number of diagnostics
    WarningCount(usize),
}

// =============================================================================
// RESOLVING REFERENCES
// =============================================================================

const CLEAN_CASES: &[TestCase] = &[
    TestCase {
        name: "canonical_name",
        input: r#"player.message("hi")"#,
        expected: Expected::Clean,
    },
    TestCase {
        name: "latin_alias",
        input: r#"player.msg("hi")"#,
        expected: Expected::Clean,
    },
    TestCase {
        name: "cyrillic_alias",
        input: r#"player.сообщение("привет")"#,
        expected: Expected::Clean,
    },
    TestCase {
        name: "secondary_module_name",
        input: r#"игрок.tp(loc)"#,
        expected: Expected::Clean,
    },
    TestCase {
        name: "secondary_event_module",
        input: "событие.вход {",
        expected: Expected::Clean,
    },
    TestCase {
        name: "indented_block",
        input: "event.onJoin {\n    player.give(items)\n    player.teleport(spawn)\n}",
        expected: Expected::Clean,
    },
    TestCase {
        name: "prefix_still_typing",
        input: "player.tele",
        expected: Expected::Clean,
    },
    TestCase {
        name: "cyrillic_prefix_still_typing",
        input: "player.соо",
        expected: Expected::Clean,
    },
    TestCase {
        name: "no_references",
        input: "# just a comment\n\n   ",
        expected: Expected::Clean,
    },
    TestCase {
        // diagnostics only match ASCII module names
        name: "cyrillic_module_not_diagnosed",
        input: "игрок.fly()",
        expected: Expected::Clean,
    },
    TestCase {
        name: "empty_document",
        input: "",
        expected: Expected::Clean,
    },
];

// =============================================================================
// UNRESOLVED REFERENCES
// =============================================================================

const WARNING_CASES: &[TestCase] = &[
    TestCase {
        name: "unknown_function",
        input: "player.explode()",
        expected: Expected::Warning("Unknown function 'player.explode'"),
    },
    TestCase {
        name: "unknown_module",
        input: "world.spawn()",
        expected: Expected::Warning("Unknown module 'world'"),
    },
    TestCase {
        name: "non_object_module_is_skipped",
        input: "broken_module.anything",
        expected: Expected::Warning("Unknown module 'broken_module'"),
    },
    TestCase {
        name: "aliases_are_module_scoped",
        input: "event.msg",
        expected: Expected::Warning("Unknown function 'event.msg'"),
    },
    TestCase {
        name: "one_per_reference",
        input: "player.a1 player.a2\nworld.x",
        expected: Expected::WarningCount(3),
    },
    TestCase {
        name: "mixed_line",
        input: "player.msg(x) player.zzz(y) event.join",
        expected: Expected::WarningCount(1),
    },
];

// =============================================================================
// TEST RUNNER
// =============================================================================

fn run_test_case(case: &TestCase, table: &ResolutionTable) {
    let diagnostics = analyze_document(case.input, table);

    for d in &diagnostics {
        assert_eq!(
            d.severity,
            Some(DiagnosticSeverity::WARNING),
            "Test '{}' produced a non-warning diagnostic",
            case.name
        );
        assert_eq!(d.source.as_deref(), Some("mldsl"));
    }

    match &case.expected {
        Expected::Clean => {
            if !diagnostics.is_empty() {
                panic!(
                    "Test '{}' expected no diagnostics but got:\n{}\n\nInput:\n{}",
                    case.name,
                    format_diagnostics(&diagnostics),
                    case.input
                );
            }
        }
        Expected::Warning(message) => {
            if diagnostics.len() != 1 || diagnostics[0].message != *message {
                panic!(
                    "Test '{}' expected warning '{}' but got:\n{}\n\nInput:\n{}",
                    case.name,
                    message,
                    format_diagnostics(&diagnostics),
                    case.input
                );
            }
        }
        Expected::WarningCount(count) => {
            if diagnostics.len() != *count {
                panic!(
                    "Test '{}' expected {} warning(s) but got {}:\n{}\n\nInput:\n{}",
                    case.name,
                    count,
                    diagnostics.len(),
                    format_diagnostics(&diagnostics),
                    case.input
                );
            }
        }
    }

    eprintln!("✓ {}", case.name);
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("  - {:?}: {}", d.range, d.message))
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_clean_cases() {
    let table = fixture_table();
    eprintln!("\n=== CLEAN CASES ({}) ===", CLEAN_CASES.len());
    for case in CLEAN_CASES {
        run_test_case(case, &table);
    }
}

#[test]
fn test_warning_cases() {
    let table = fixture_table();
    eprintln!("\n=== WARNING CASES ({}) ===", WARNING_CASES.len());
    for case in WARNING_CASES {
        run_test_case(case, &table);
    }
}

#[test]
fn test_fixture_shape() {
    let table = fixture_table();
    let modules: Vec<_> = table.module_names().collect();
    assert_eq!(modules, vec!["player", "event", "var", "игрок", "событие"]);

    let player = table.module("player").unwrap();
    assert!(Arc::ptr_eq(player, table.module("игрок").unwrap()));
    assert_eq!(player.canonical().len(), 3);
    assert!(table.collisions().is_empty());
}

#[test]
fn test_diagnostic_range_covers_reference() {
    let table = fixture_table();
    let diagnostics = analyze_document("ok\n  player.fly()", &table);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].range.start, Position::new(1, 2));
    assert_eq!(diagnostics[0].range.end, Position::new(1, 12));
}

#[test]
fn test_edit_after_emoji_keeps_text_and_ranges_aligned() {
    let table = fixture_table();
    let mut doc = DocumentState::new("😀 player.msg(x)\n😀 ab".to_string());

    // client columns are UTF-16: "😀 " spans three units
    doc.apply_changes(vec![TextDocumentContentChangeEvent {
        range: Some(Range::new(Position::new(1, 3), Position::new(1, 3))),
        range_length: None,
        text: "world.".to_string(),
    }]);
    assert_eq!(doc.text, "😀 player.msg(x)\n😀 world.ab");

    let diagnostics = analyze_document(&doc.text, &table);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Unknown module 'world'");
    assert_eq!(diagnostics[0].range.start, Position::new(1, 3));
    assert_eq!(diagnostics[0].range.end, Position::new(1, 11));
}

#[test]
fn test_hover_through_alias() {
    let table = fixture_table();
    let doc = DocumentState::new("event.onJoin {\n  player.tp(spawn)\n}".to_string());

    let hover = get_hover(&doc, Position::new(1, 10), &table).expect("hover on alias");
    let HoverContents::Markup(content) = hover.contents else {
        panic!("expected markup hover");
    };
    assert!(content.value.contains("**sign2:** Телепорт"));
    assert!(content.value.contains("- `location` (LOCATION) slot 13"));
    assert!(content.value.contains("- `keep_rotation` slot 26: No / Yes"));
}

#[test]
fn test_completion_order_follows_file() {
    let table = fixture_table();
    let doc = DocumentState::new("игрок.".to_string());
    let items = get_completions(&doc, Position::new(0, 6), &table).expect("completions");
    let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "message",
            "msg",
            "сообщение",
            "teleport",
            "tp",
            "телепорт",
            "give_items",
            "give"
        ]
    );
}

#[test]
fn test_rich_description_plain_text() {
    let table = fixture_table();
    let join = table.resolve("event", "вход").unwrap();
    let raw = join.spec.rich_description.as_deref().unwrap();
    assert_eq!(plain_text(raw), "Join event");
}

#[test]
fn test_reload_swaps_snapshot() {
    let active = ActiveTable::default();
    let before = active.snapshot();
    assert!(before.resolve("player", "msg").is_none());

    active.replace(fixture_table());

    // old snapshot keeps answering from the table it was taken from
    assert!(before.resolve("player", "msg").is_none());
    let current = active.snapshot();
    let entry = current.resolve("player", "msg").unwrap();
    assert_eq!(entry.canonical_name, "message");
}
