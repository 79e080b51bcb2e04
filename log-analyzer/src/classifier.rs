use serde::Serialize;

use crate::sniffer::{UserAgentSniffer, WootheeSniffer};

pub const HUMAN: &str = "Human";

/// Known crawlers, checked top to bottom. A user agent may carry several of
/// these signatures, so the first match decides.
const SIGNATURES: [(&[&str], &str); 7] = [
    (&["Googlebot"], "Google"),
    (&["Bingbot"], "Bing"),
    (&["Applebot"], "Apple"),
    (&["YandexBot", "YandexMobileBot"], "Yandex"),
    (&["DuckDuckBot"], "DuckDuckGo"),
    (&["SEMrushBot"], "SEMRush"),
    (&["OpenLinkProfiler", "SiteExplorer"], "OpenSEO"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub is_bot: bool,
    pub bot_name: String,
}

impl Classification {
    fn bot(name: impl Into<String>) -> Self {
        Self {
            is_bot: true,
            bot_name: name.into(),
        }
    }

    fn human() -> Self {
        Self {
            is_bot: false,
            bot_name: HUMAN.to_owned(),
        }
    }
}

pub struct UserAgentClassifier<S = WootheeSniffer> {
    sniffer: S,
}

impl Default for UserAgentClassifier {
    fn default() -> Self {
        Self::new(WootheeSniffer::new())
    }
}

impl<S: UserAgentSniffer> UserAgentClassifier<S> {
    pub fn new(sniffer: S) -> Self {
        Self { sniffer }
    }

    pub fn classify(&self, user_agent: &str) -> Classification {
        if let Some(name) = known_signature(user_agent) {
            return Classification::bot(name);
        }
        let sniff = self.sniffer.sniff(user_agent);
        if sniff.is_bot {
            Classification::bot(sniff.family)
        } else {
            Classification::human()
        }
    }
}

fn known_signature(user_agent: &str) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| user_agent.contains(n)))
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniffer::Sniff;
    use asserting::prelude::*;

    struct Fixed(bool);

    impl UserAgentSniffer for Fixed {
        fn sniff(&self, _: &str) -> Sniff {
            Sniff {
                is_bot: self.0,
                family: "FixedFamily".into(),
            }
        }
    }

    #[test]
    fn signature_table_names() {
        let classifier = UserAgentClassifier::default();
        let cases = [
            ("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)", "Google"),
            ("Mozilla/5.0 (compatible; Bingbot/2.0)", "Bing"),
            ("Mozilla/5.0 (Macintosh) Applebot/0.1", "Apple"),
            ("Mozilla/5.0 (compatible; YandexBot/3.0)", "Yandex"),
            ("Mozilla/5.0 (iPhone) YandexMobileBot/3.0", "Yandex"),
            ("DuckDuckBot/1.1; (+http://duckduckgo.com/duckduckbot.html)", "DuckDuckGo"),
            ("Mozilla/5.0 (compatible; SEMrushBot/7~bl)", "SEMRush"),
            ("Mozilla/5.0 (compatible; OpenLinkProfiler.org/1.0)", "OpenSEO"),
            ("Mozilla/5.0 (compatible; SiteExplorer/1.1b)", "OpenSEO"),
        ];
        for (ua, name) in cases {
            assert_eq!(classifier.classify(ua), Classification::bot(name), "{ua}");
        }
    }

    #[test]
    fn table_order_wins_over_alphabet_and_length() {
        let classifier = UserAgentClassifier::default();
        let both = "SEMrushBot/7 Googlebot/2.1";
        assert_eq!(classifier.classify(both).bot_name, "Google");
        let reversed = "Googlebot/2.1 SEMrushBot/7";
        assert_eq!(classifier.classify(reversed).bot_name, "Google");
        assert_eq!(classifier.classify("DuckDuckBot Applebot").bot_name, "Apple");
    }

    #[test]
    fn signatures_are_case_sensitive() {
        let classifier = UserAgentClassifier::new(Fixed(false));
        assert_eq!(classifier.classify("googlebot/2.1"), Classification::human());
    }

    #[test]
    fn signature_match_is_a_bot_even_if_sniffer_disagrees() {
        let classifier = UserAgentClassifier::new(Fixed(false));
        assert_that!(classifier.classify("Googlebot").is_bot).is_true();
    }

    #[test]
    fn fallback_uses_the_sniffed_family() {
        let classifier = UserAgentClassifier::new(Fixed(true));
        assert_eq!(
            classifier.classify("anything"),
            Classification::bot("FixedFamily")
        );

        let classifier = UserAgentClassifier::default();
        let baidu = classifier
            .classify("Mozilla/5.0 (compatible; Baiduspider/2.0; +http://www.baidu.com/search/spider.html)");
        assert_that!(baidu.is_bot).is_true();
        assert_that!(baidu.bot_name.as_str()).is_not_equal_to(HUMAN);
    }

    #[test]
    fn android_phone_with_bot_in_model_name_is_human() {
        let classifier = UserAgentClassifier::default();
        let ua = "Mozilla/5.0 (Linux; Android 10; CUBOT_X30) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
        assert_eq!(classifier.classify(ua), Classification::human());
    }

    #[test]
    fn empty_agent_is_human() {
        let classifier = UserAgentClassifier::default();
        assert_eq!(classifier.classify(""), Classification::human());
        assert_eq!(classifier.classify("-"), Classification::human());
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = UserAgentClassifier::default();
        let ua = "Mozilla/5.0 (compatible; MJ12bot/v1.4.8; http://mj12bot.com/)";
        let first = classifier.classify(ua);
        assert!(!first.bot_name.is_empty());
        for _ in 0..10 {
            assert_eq!(classifier.classify(ua), first);
        }
    }
}
