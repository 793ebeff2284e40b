//! Text shaping shared by every component that talks or listens.
//!
//! [`clean_for_speech`] turns assistant markdown into plain text a speech
//! engine can read aloud; [`normalize_command`] reduces a transcript to the
//! canonical form the fast-path matcher compares against.

use regex::Regex;
use std::sync::LazyLock;

// =============================================================================
// Compiled patterns
// =============================================================================

struct MarkupPatterns {
    heading: Regex,
    bullet: Regex,
    link: Regex,
    bold_stars: Regex,
    bold_underscores: Regex,
    italic_star: Regex,
    italic_underscore: Regex,
    inline_code: Regex,
}

static MARKUP: LazyLock<MarkupPatterns> = LazyLock::new(|| {
    let re = |p: &str| Regex::new(p).expect("Invalid markup regex");
    MarkupPatterns {
        heading: re(r"(?m)^[ \t]*#{1,6}[ \t]*"),
        bullet: re(r"(?m)^[ \t]*[-*•][ \t]+"),
        link: re(r"\[([^\]]*)\]\([^)]*\)"),
        bold_stars: re(r"\*\*([^*]*)\*\*"),
        bold_underscores: re(r"__([^_]*)__"),
        italic_star: re(r"\*([^*\n]*)\*"),
        italic_underscore: re(r"\b_([^_\n]+)_\b"),
        inline_code: re(r"`+([^`]*)`+"),
    }
});

static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").expect("Invalid whitespace regex"));

static TRAILING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s.,;:!?…¡¿]+$").expect("Invalid punctuation regex"));

static ANY_WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

// =============================================================================
// Speech cleaning
// =============================================================================

/// Strip markdown markup and emoji so the text reads naturally when spoken.
///
/// Removes bold, italic, heading, bullet, inline-code and link markup (links
/// keep their label), drops emoji code points, collapses runs of spaces and
/// blank lines. The result is a fixpoint: cleaning it again changes nothing.
pub fn clean_for_speech(text: &str) -> String {
    let mut current = clean_once(text);
    // Every rewrite strictly shortens the text, so this terminates.
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let m = &*MARKUP;

    let s = m.heading.replace_all(text, "");
    let s = m.bullet.replace_all(&s, "");
    let s = m.link.replace_all(&s, "$1");
    let s = m.bold_stars.replace_all(&s, "$1");
    let s = m.bold_underscores.replace_all(&s, "$1");
    let s = m.italic_star.replace_all(&s, "$1");
    let s = m.italic_underscore.replace_all(&s, "$1");
    let s = m.inline_code.replace_all(&s, "$1");

    let stripped: String = s
        .chars()
        .filter(|c| *c != '*' && *c != '`' && !is_emoji(*c))
        .collect();

    stripped
        .lines()
        .map(|line| SPACE_RUN.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emoji, pictographs, dingbats and the joiners/selectors that glue them.
fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF   // pictographs, emoticons, transport, flags
            | 0x2600..=0x27BF   // misc symbols, dingbats
            | 0x2300..=0x23FF   // misc technical (watch, hourglass, alarm)
            | 0x2B00..=0x2BFF   // arrows, stars
            | 0xFE00..=0xFE0F   // variation selectors
            | 0x200D            // zero-width joiner
            | 0x20E3            // combining keycap
            | 0xE0020..=0xE007F // tag characters
    )
}

// =============================================================================
// Command normalization
// =============================================================================

/// Canonical form of a spoken command: trimmed, lower-cased, trailing
/// punctuation removed and inner whitespace collapsed to single spaces.
pub fn normalize_command(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let collapsed = ANY_WHITESPACE_RUN.replace_all(&lowered, " ");
    TRAILING_PUNCTUATION
        .replace(&collapsed, "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // clean_for_speech
    // =========================================================================

    #[test]
    fn test_removes_bold_and_italic() {
        assert_eq!(
            clean_for_speech("Você tem **3 tarefas** e *uma* reunião"),
            "Você tem 3 tarefas e uma reunião"
        );
        assert_eq!(clean_for_speech("__urgente__ e _depois_"), "urgente e depois");
    }

    #[test]
    fn test_removes_headings_and_bullets() {
        let input = "## Agenda de hoje\n- Reunião às 10h\n* Almoço\n• Dentista";
        assert_eq!(
            clean_for_speech(input),
            "Agenda de hoje\nReunião às 10h\nAlmoço\nDentista"
        );
    }

    #[test]
    fn test_links_keep_label() {
        assert_eq!(
            clean_for_speech("Veja [o relatório](https://example.com/r?id=1) agora"),
            "Veja o relatório agora"
        );
    }

    #[test]
    fn test_removes_inline_code() {
        assert_eq!(clean_for_speech("Rode `status` para ver"), "Rode status para ver");
    }

    #[test]
    fn test_removes_emoji() {
        assert_eq!(clean_for_speech("Bom dia! ☀️ Tudo certo 👍🏽"), "Bom dia! Tudo certo");
        assert_eq!(clean_for_speech("Família 👨‍👩‍👧 reunida"), "Família reunida");
        assert_eq!(clean_for_speech("🎉🎉"), "");
    }

    #[test]
    fn test_collapses_whitespace_and_blank_lines() {
        assert_eq!(
            clean_for_speech("  primeira   linha \n\n\n   segunda\t\tlinha  "),
            "primeira linha\nsegunda linha"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        let text = "Você tem duas reuniões amanhã.";
        assert_eq!(clean_for_speech(text), text);
    }

    #[test]
    fn test_snake_case_identifiers_survive() {
        assert_eq!(clean_for_speech("campo user_id vazio"), "campo user_id vazio");
    }

    #[test]
    fn test_nested_markup() {
        assert_eq!(
            clean_for_speech("- **[Pagar conta](http://x)** hoje 💸"),
            "Pagar conta hoje"
        );
    }

    #[test]
    fn test_clean_is_idempotent() {
        let inputs = [
            "**a *b* c**",
            "# *Título* com `code` e [link](u)",
            "***triplo***",
            "- * item",
            "texto _com_ __vários__ *estilos* 😀\n\n- lista",
            "*",
            "[](vazio)",
        ];
        for input in inputs {
            let once = clean_for_speech(input);
            assert_eq!(clean_for_speech(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_for_speech(""), "");
        assert_eq!(clean_for_speech("   \n  "), "");
    }

    // =========================================================================
    // normalize_command
    // =========================================================================

    #[test]
    fn test_normalize_lowercases_and_trims() {
        assert_eq!(normalize_command("  Bom Dia  "), "bom dia");
    }

    #[test]
    fn test_normalize_strips_trailing_punctuation() {
        assert_eq!(normalize_command("Parar!"), "parar");
        assert_eq!(normalize_command("obrigado..."), "obrigado");
        assert_eq!(normalize_command("tudo bem?!"), "tudo bem");
        assert_eq!(normalize_command("Olá, "), "olá");
    }

    #[test]
    fn test_normalize_collapses_inner_whitespace() {
        assert_eq!(
            normalize_command("quais   sao\tminhas \n tarefas"),
            "quais sao minhas tarefas"
        );
    }

    #[test]
    fn test_normalize_keeps_inner_punctuation() {
        assert_eq!(normalize_command("oi, tudo bem?"), "oi, tudo bem");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_command(""), "");
        assert_eq!(normalize_command(" ?! "), "");
    }
}
