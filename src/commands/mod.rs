pub mod assign;
pub mod detail;
pub mod init;
pub mod list;
pub mod session;
pub mod show;

use crate::board::NoticeKind;
use crate::desk::Desk;
use crate::models::Tone;

/// Wrap `text` in the ANSI color for `tone`. Plain text when `color` is off.
pub fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let code = match tone {
        Tone::Warning => "33",
        Tone::Info => "36",
        Tone::Success => "32",
        Tone::Muted => "90",
        Tone::Danger => "31",
    };
    format!("\x1b[{}m{}\x1b[0m", code, text)
}

/// Shorten `s` to at most `max_chars` characters, ending in "...".
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Print and clear the desk's pending notifications.
pub fn print_notices<A>(desk: &Desk<A>) {
    for notice in desk.board().drain_notices() {
        match notice.kind {
            NoticeKind::Success => println!("{}", notice.message),
            NoticeKind::Failure => eprintln!("{}", notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate("Pothole", 40), "Pothole");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate("Streetlight broken near market", 12), "Streetlig...");
    }

    #[test]
    fn test_truncate_multibyte() {
        let s = "\u{e9}".repeat(9);
        assert_eq!(truncate(&s, 6), format!("{}...", "\u{e9}".repeat(3)));
    }

    #[test]
    fn test_paint() {
        assert_eq!(paint("high", Tone::Danger, false), "high");
        assert_eq!(paint("high", Tone::Danger, true), "\x1b[31mhigh\x1b[0m");
    }

    proptest! {
        #[test]
        fn prop_truncate_never_exceeds(s in ".{0,80}", max in 3usize..50) {
            prop_assert!(truncate(&s, max).chars().count() <= max);
        }
    }
}
