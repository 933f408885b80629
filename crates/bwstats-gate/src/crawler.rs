//! Search-engine crawler detection
//!
//! Crawlers are a trusted traffic class: they never consume rate-limit
//! quota and never trip the denylist, so pages stay indexable even while
//! abusive traffic is being throttled.

/// User-agent fragments of known crawlers, matched case-insensitively
const CRAWLER_SIGNATURES: &[&str] = &[
    "googlebot",
    "bingbot",
    "slurp", // Yahoo
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "facebookexternalhit",
    "twitterbot",
    "linkedinbot",
    "whatsapp",
    "telegrambot",
];

/// Whether a user-agent string belongs to a known crawler
pub fn is_known_crawler(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    CRAWLER_SIGNATURES.iter().any(|sig| ua.contains(sig))
}
