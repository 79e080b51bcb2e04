use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};
use rand::{Rng, seq::IndexedRandom};

const METHODS: [(&str, u8); 5] = [
    ("GET", 80),
    ("POST", 10),
    ("HEAD", 6),
    ("PUT", 2),
    ("DELETE", 2),
];
const PATHS: [(&str, u8); 10] = [
    ("/", 30),
    ("/index.html", 20),
    ("/blog/rust-log-parsing", 10),
    ("/products?page=2", 8),
    ("/robots.txt", 6),
    ("/sitemap.xml", 6),
    ("/about", 5),
    ("/contact", 4),
    ("/search?q=access logs", 3),
    ("/wp-login.php", 2),
];
const STATUS: [(u16, u8); 7] = [
    (200, 70),
    (301, 8),
    (304, 6),
    (404, 10),
    (403, 2),
    (500, 2),
    (503, 1),
];
const REFERRERS: [(&str, u8); 4] = [
    ("-", 50),
    ("https://www.google.com/", 25),
    ("https://duckduckgo.com/", 5),
    ("https://example.com/", 20),
];
const BOT_AGENTS: [(&str, u8); 10] = [
    ("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)", 30),
    ("Mozilla/5.0 (compatible; Bingbot/2.0; +http://www.bing.com/bingbot.htm)", 10),
    ("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.1.1 Safari/605.1.15 (Applebot/0.1; +http://www.apple.com/go/applebot)", 6),
    ("Mozilla/5.0 (compatible; YandexBot/3.0; +http://yandex.com/bots)", 6),
    ("DuckDuckBot/1.1; (+http://duckduckgo.com/duckduckbot.html)", 4),
    ("Mozilla/5.0 (compatible; SEMrushBot/7~bl; +http://www.semrush.com/bot.html)", 8),
    ("Mozilla/5.0 (compatible; OpenLinkProfiler.org/1.0; +http://www.openlinkprofiler.org/bot)", 2),
    ("Mozilla/5.0 (compatible; Baiduspider/2.0; +http://www.baidu.com/search/spider.html)", 10),
    ("Mozilla/5.0 (compatible; Yahoo! Slurp; http://help.yahoo.com/help/us/ysearch/slurp)", 4),
    ("curl/8.4.0", 2),
];
const HUMAN_AGENTS: [(&str, u8); 5] = [
    ("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36", 40),
    ("Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0", 15),
    ("Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1", 25),
    ("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0", 15),
    ("-", 5),
];
const OFFSETS_SECS: [i32; 3] = [0, 2 * 3600, -5 * 3600];

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, table: &'a [(T, u8)]) -> &'a T {
    // weights are constant and non-zero
    &table
        .choose_weighted(rng, |(_, w)| *w)
        .expect("non-empty weighted table")
        .0
}

/// A moment inside `[start, start + days)` at one of a few fixed offsets.
pub fn random_timestamp<R: Rng + ?Sized>(
    rng: &mut R,
    start: NaiveDate,
    days: u32,
) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(*OFFSETS_SECS.choose(rng).unwrap_or(&0))
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset"));
    let seconds = rng.random_range(0..i64::from(days.max(1)) * 86_400);
    let local = start.and_time(chrono::NaiveTime::MIN) + TimeDelta::seconds(seconds);
    local
        .and_local_timezone(offset)
        .single()
        .expect("fixed offsets are unambiguous")
}

pub fn generate_combined_log<R: Rng + ?Sized>(
    rng: &mut R,
    timestamp: DateTime<FixedOffset>,
    bot_share: f64,
) -> String {
    let ip = format!(
        "{}.{}.{}.{}",
        rng.random_range(1..224),
        rng.random_range(0..256),
        rng.random_range(0..256),
        rng.random_range(1..255)
    );
    let timestamp = timestamp.format("%d/%b/%Y:%H:%M:%S %z");
    let method = pick(rng, &METHODS);
    let path = pick(rng, &PATHS);
    let status = pick(rng, &STATUS);
    let size = if *status == 304 {
        "-".to_owned()
    } else {
        rng.random_range(100..50_000).to_string()
    };
    let referrer = pick(rng, &REFERRERS);
    let agent = if rng.random::<f64>() < bot_share {
        pick(rng, &BOT_AGENTS)
    } else {
        pick(rng, &HUMAN_AGENTS)
    };

    format!(
        "{ip} - - [{timestamp}] \"{method} {path} HTTP/1.1\" {status} {size} \"{referrer}\" \"{agent}\""
    )
}

/// Cuts the trailing quoted user agent, the usual shape of a log line torn
/// by a crashed writer.
pub fn truncate(line: &str) -> &str {
    line.rfind(" \"").map_or(line, |cut| &line[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use seo_log_analyzer::parser::LineParser;

    #[test]
    fn generated_lines_parse() {
        let mut rng = StdRng::seed_from_u64(7);
        let parser = LineParser::default();
        let start = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        for _ in 0..500 {
            let ts = random_timestamp(&mut rng, start, 3);
            let line = generate_combined_log(&mut rng, ts, 0.5);
            let record = parser.parse(&line).unwrap_or_else(|e| panic!("{e}: {line}"));
            assert!(record.date >= start);
            assert!(record.date < start + TimeDelta::days(3));
        }
    }

    #[test]
    fn truncated_lines_do_not_parse() {
        let mut rng = StdRng::seed_from_u64(11);
        let parser = LineParser::default();
        let ts = random_timestamp(&mut rng, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(), 1);
        for _ in 0..100 {
            let line = generate_combined_log(&mut rng, ts, 0.5);
            assert!(parser.parse(truncate(&line)).is_err(), "{line}");
        }
    }

    #[test]
    fn bot_share_extremes() {
        let mut rng = StdRng::seed_from_u64(3);
        let parser = LineParser::default();
        let ts = random_timestamp(&mut rng, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(), 1);
        for _ in 0..100 {
            let line = generate_combined_log(&mut rng, ts, 1.0);
            assert!(parser.parse(&line).unwrap().is_bot, "{line}");
        }
    }
}
