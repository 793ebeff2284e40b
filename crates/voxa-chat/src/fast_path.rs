//! Local fast-path answers.
//!
//! Short conversational commands (stop, greetings, thanks, help) are
//! answered on-device without a round trip to the assistant. Patterns run
//! against the normalized command text in priority order; the first match
//! wins.

use std::sync::LazyLock;

use regex::Regex;

/// What a fast-path pattern recognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FastPathIntent {
    Stop,
    Greeting,
    Thanks,
    Help,
}

/// Result of a fast-path match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FastPathMatch {
    /// Silence output and end the turn without a reply.
    Stop,
    /// Answer locally with this text.
    Reply {
        intent: FastPathIntent,
        text: String,
    },
}

const HELP_REPLY: &str = "Posso consultar suas tarefas, sua agenda, seu resumo financeiro, \
     seus alertas e contatos. É só perguntar!";

const THANKS_REPLY: &str = "De nada! Se precisar de mais alguma coisa, é só chamar.";

struct FastPattern {
    regex: Regex,
    intent: FastPathIntent,
}

/// Patterns in priority order. Stop is first so "para, obrigado" halts.
static PATTERNS: LazyLock<Vec<FastPattern>> = LazyLock::new(|| {
    let table: Vec<(&str, FastPathIntent)> = vec![
        // =====================================================================
        // Stop / cancel
        // =====================================================================
        (
            r"^(?:voxa,? )?(?:parar|pare|para|chega|cancelar|cancela|cancele|stop|silêncio|silencio|quieto|fica quieto|cala a boca)(?:,? (?:por favor|obrigad[oa]|voxa|de falar|agora))*$",
            FastPathIntent::Stop,
        ),
        // =====================================================================
        // Greetings
        // =====================================================================
        (
            r"^(?:oi|olá|ola|oie|e aí|e ai|eai|bom dia|boa tarde|boa noite|hello|hi|hey)(?:,? voxa)?$",
            FastPathIntent::Greeting,
        ),
        // =====================================================================
        // Thanks
        // =====================================================================
        (
            r"^(?:muito )?(?:obrigad[oa]|brigad[oa]|valeu|thanks|thank you)(?:,? (?:voxa|mesmo|pela ajuda|por tudo|de novo))*$",
            FastPathIntent::Thanks,
        ),
        // =====================================================================
        // Help
        // =====================================================================
        (
            r"^(?:ajuda|me ajuda|socorro|help|o que (?:você|voce) (?:pode|sabe) fazer)$",
            FastPathIntent::Help,
        ),
    ];

    table
        .into_iter()
        .map(|(pattern, intent)| FastPattern {
            regex: Regex::new(pattern).expect("Invalid fast-path regex"),
            intent,
        })
        .collect()
});

/// Matches normalized commands against the fast-path table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastPathMatcher;

impl FastPathMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Classify a normalized command. `None` means the command needs the
    /// remote assistant.
    pub fn classify(&self, normalized: &str) -> Option<FastPathIntent> {
        if normalized.is_empty() {
            return None;
        }
        PATTERNS
            .iter()
            .find(|p| p.regex.is_match(normalized))
            .map(|p| p.intent)
    }

    /// Resolve a normalized command to a local action.
    pub fn resolve(&self, normalized: &str) -> Option<FastPathMatch> {
        let intent = self.classify(normalized)?;
        let text = match intent {
            FastPathIntent::Stop => return Some(FastPathMatch::Stop),
            FastPathIntent::Greeting => greeting_reply(normalized).to_string(),
            FastPathIntent::Thanks => THANKS_REPLY.to_string(),
            FastPathIntent::Help => HELP_REPLY.to_string(),
        };
        Some(FastPathMatch::Reply { intent, text })
    }
}

/// Answer a salutation in kind.
fn greeting_reply(normalized: &str) -> &'static str {
    if normalized.starts_with("bom dia") {
        "Bom dia! Como posso ajudar?"
    } else if normalized.starts_with("boa tarde") {
        "Boa tarde! Como posso ajudar?"
    } else if normalized.starts_with("boa noite") {
        "Boa noite! Como posso ajudar?"
    } else {
        "Olá! Como posso ajudar você hoje?"
    }
}
