//! Legacy formatting-code renderer.
//!
//! Converts text carrying `§`-prefixed style codes into [`StyledRun`]s.
//! Style state is cumulative across the whole string:
//!
//! | code        | effect                          |
//! |-------------|---------------------------------|
//! | `0`-`9` `a`-`f` | set colour, keep other flags |
//! | `l`         | bold                            |
//! | `o`         | italic                          |
//! | `n`         | underline                       |
//! | `m`         | strikethrough                   |
//! | `r`         | reset everything                |
//!
//! Any other code character is consumed and ignored. A `§` at the very end
//! of the string is kept as literal text.

pub mod html;

use bitflags::bitflags;

pub use html::runs_to_html;

/// Character introducing a style code.
pub const FORMAT_PREFIX: char = '§';

/// The 16 fixed palette entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl Color {
    const ALL: [Color; 16] = [
        Color::Black,
        Color::DarkBlue,
        Color::DarkGreen,
        Color::DarkAqua,
        Color::DarkRed,
        Color::DarkPurple,
        Color::Gold,
        Color::Gray,
        Color::DarkGray,
        Color::Blue,
        Color::Green,
        Color::Aqua,
        Color::Red,
        Color::LightPurple,
        Color::Yellow,
        Color::White,
    ];

    /// Colour for a hex-digit code, case-insensitive.
    pub fn from_code(code: char) -> Option<Self> {
        code.to_digit(16).map(|d| Self::ALL[d as usize])
    }

    /// CSS hex value.
    pub fn hex(self) -> &'static str {
        match self {
            Color::Black => "#000000",
            Color::DarkBlue => "#0000AA",
            Color::DarkGreen => "#00AA00",
            Color::DarkAqua => "#00AAAA",
            Color::DarkRed => "#AA0000",
            Color::DarkPurple => "#AA00AA",
            Color::Gold => "#FFAA00",
            Color::Gray => "#AAAAAA",
            Color::DarkGray => "#555555",
            Color::Blue => "#5555FF",
            Color::Green => "#55FF55",
            Color::Aqua => "#55FFFF",
            Color::Red => "#FF5555",
            Color::LightPurple => "#FF55FF",
            Color::Yellow => "#FFFF55",
            Color::White => "#FFFFFF",
        }
    }
}

bitflags! {
    /// Text decorations that accumulate until a reset.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifier: u8 {
        const BOLD        = 0b0001;
        const ITALIC      = 0b0010;
        const UNDERLINED  = 0b0100;
        const CROSSED_OUT = 0b1000;
    }
}

/// Cumulative style state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub color: Option<Color>,
    pub modifiers: Modifier,
}

impl Style {
    /// True when no colour or decoration is active.
    pub fn is_plain(&self) -> bool {
        self.color.is_none() && self.modifiers.is_empty()
    }

    fn apply(self, code: FormatCode) -> Self {
        match code {
            FormatCode::Color(color) => Style {
                color: Some(color),
                ..self
            },
            FormatCode::Modifier(m) => Style {
                modifiers: self.modifiers | m,
                ..self
            },
            FormatCode::Reset => Style::default(),
            FormatCode::Inert => self,
        }
    }
}

/// A decoded two-character style code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormatCode {
    Color(Color),
    Modifier(Modifier),
    Reset,
    Inert,
}

impl FormatCode {
    fn from_char(code: char) -> Self {
        if let Some(color) = Color::from_code(code) {
            return FormatCode::Color(color);
        }
        match code.to_ascii_lowercase() {
            'l' => FormatCode::Modifier(Modifier::BOLD),
            'o' => FormatCode::Modifier(Modifier::ITALIC),
            'n' => FormatCode::Modifier(Modifier::UNDERLINED),
            'm' => FormatCode::Modifier(Modifier::CROSSED_OUT),
            'r' => FormatCode::Reset,
            _ => FormatCode::Inert,
        }
    }
}

/// Contiguous text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: Style,
}

impl StyledRun {
    pub fn color(&self) -> Option<Color> {
        self.style.color
    }

    pub fn bold(&self) -> bool {
        self.style.modifiers.contains(Modifier::BOLD)
    }

    pub fn italic(&self) -> bool {
        self.style.modifiers.contains(Modifier::ITALIC)
    }

    pub fn underline(&self) -> bool {
        self.style.modifiers.contains(Modifier::UNDERLINED)
    }

    pub fn strikethrough(&self) -> bool {
        self.style.modifiers.contains(Modifier::CROSSED_OUT)
    }
}

/// Render `input` into styled runs in left-to-right order.
///
/// A run is flushed whenever a code changes the style; empty runs are
/// dropped, and codes that leave the style unchanged do not split runs.
pub fn render(input: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut style = Style::default();
    let mut buf = String::new();
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch == FORMAT_PREFIX {
            if let Some(code) = chars.next() {
                let next = style.apply(FormatCode::from_char(code));
                if next != style {
                    flush(&mut runs, &mut buf, style);
                    style = next;
                }
                continue;
            }
        }
        buf.push(ch);
    }
    flush(&mut runs, &mut buf, style);

    runs
}

/// Strip all style codes, keeping only the text.
pub fn plain_text(input: &str) -> String {
    render(input).into_iter().map(|run| run.text).collect()
}

fn flush(runs: &mut Vec<StyledRun>, buf: &mut String, style: Style) {
    if buf.is_empty() {
        return;
    }
    runs.push(StyledRun {
        text: std::mem::take(buf),
        style,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_string_is_one_run() {
        let runs = render("hello");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "hello");
        assert!(runs[0].style.is_plain());
    }

    #[test]
    fn test_empty_string_has_no_runs() {
        assert!(render("").is_empty());
        assert!(render("§c§l").is_empty());
    }

    #[test]
    fn test_reset_clears_style() {
        let runs = render("§caaa§rbbb");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "aaa");
        assert_eq!(runs[0].color(), Some(Color::Red));
        assert!(!runs[0].bold());
        assert_eq!(runs[1].text, "bbb");
        assert!(runs[1].style.is_plain());
    }

    #[test]
    fn test_trailing_prefix_is_literal() {
        let runs = render("§aok§");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "ok§");
        assert_eq!(runs[0].color(), Some(Color::Green));
    }

    #[test]
    fn test_styles_accumulate_and_color_keeps_flags() {
        let runs = render("§la§ob§9c");
        assert_eq!(runs.len(), 3);
        assert!(runs[0].bold() && !runs[0].italic());
        assert!(runs[1].bold() && runs[1].italic());
        assert!(runs[2].bold() && runs[2].italic());
        assert_eq!(runs[2].color(), Some(Color::Blue));
    }

    #[test]
    fn test_codes_are_case_insensitive() {
        let runs = render("§Lx§Ny§Mz§Fw");
        assert!(runs[0].bold());
        assert!(runs[1].underline());
        assert!(runs[2].strikethrough());
        assert_eq!(runs[3].color(), Some(Color::White));
    }

    #[test]
    fn test_unknown_code_is_consumed_without_split() {
        let runs = render("a§zb");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "ab");
    }

    #[test]
    fn test_newlines_preserved() {
        let runs = render("§7line one\nline two");
        assert_eq!(runs[0].text, "line one\nline two");
    }

    #[test]
    fn test_plain_text_strips_codes() {
        assert_eq!(plain_text("§6Gold §lbold§r done§"), "Gold bold done§");
    }

    #[test]
    fn test_palette_codes() {
        assert_eq!(Color::from_code('0').map(Color::hex), Some("#000000"));
        assert_eq!(Color::from_code('e').map(Color::hex), Some("#FFFF55"));
        assert_eq!(Color::from_code('g'), None);
    }
}
