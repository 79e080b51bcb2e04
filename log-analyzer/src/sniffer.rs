//! Generic user-agent sniffing used as the classifier's fallback.

use woothee::parser::Parser;

/// Verdict of a generic sniffer: whether the agent is automated and a family
/// name for it (the crawler for bots, the browser otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sniff {
    pub is_bot: bool,
    pub family: String,
}

pub trait UserAgentSniffer: Send + Sync {
    fn sniff(&self, user_agent: &str) -> Sniff;
}

const UNKNOWN_FAMILY: &str = "Other";
const WOOTHEE_UNKNOWN: &str = "UNKNOWN";

// Scripts woothee has no entry for. Prefix match, as authored.
const TOOL_PREFIXES: [&str; 8] = [
    "curl/",
    "Wget/",
    "python-requests/",
    "Go-http-client/",
    "okhttp/",
    "axios/",
    "node-fetch/",
    "Scrapy/",
];

/// Sniffs with woothee's agent dataset; `category == "crawler"` is a bot.
pub struct WootheeSniffer {
    parser: Parser,
}

impl WootheeSniffer {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    fn tool_family(user_agent: &str) -> Option<Sniff> {
        TOOL_PREFIXES
            .iter()
            .find(|prefix| user_agent.starts_with(*prefix))
            .map(|prefix| Sniff {
                is_bot: true,
                family: prefix.trim_end_matches('/').to_owned(),
            })
    }

    fn unknown() -> Sniff {
        Sniff {
            is_bot: false,
            family: UNKNOWN_FAMILY.to_owned(),
        }
    }
}

impl Default for WootheeSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl UserAgentSniffer for WootheeSniffer {
    fn sniff(&self, user_agent: &str) -> Sniff {
        let user_agent = user_agent.trim();
        if user_agent.is_empty() || user_agent == "-" {
            return Self::unknown();
        }
        let Some(result) = self.parser.parse(user_agent) else {
            return Self::tool_family(user_agent).unwrap_or_else(Self::unknown);
        };
        if result.category == WOOTHEE_UNKNOWN {
            return Self::tool_family(user_agent).unwrap_or_else(Self::unknown);
        }

        let family = match result.name.to_string() {
            name if name.is_empty() || name == WOOTHEE_UNKNOWN => UNKNOWN_FAMILY.to_owned(),
            name => name,
        };
        Sniff {
            is_bot: result.category == "crawler",
            family,
        }
    }
}
