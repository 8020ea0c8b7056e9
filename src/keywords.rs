//! App and category keyword sets
//!
//! Case-insensitive substring matching used to classify sessions and to pick out
//! development activity for insights.

const DEVELOPMENT: &[&str] = &[
    "development",
    "code",
    "cursor",
    "vim",
    "intellij",
    "pycharm",
    "xcode",
    "terminal",
    "iterm",
];

const COMMUNICATION: &[&str] = &[
    "communication",
    "slack",
    "zoom",
    "teams",
    "discord",
    "mail",
    "outlook",
];

const BROWSING: &[&str] = &["browsing", "browser", "chrome", "firefox", "safari", "brave"];

fn matches_any(label: &str, keywords: &[&str]) -> bool {
    let lowered = label.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k))
}

pub(crate) fn is_development(label: &str) -> bool {
    matches_any(label, DEVELOPMENT)
}

pub(crate) fn is_communication(label: &str) -> bool {
    matches_any(label, COMMUNICATION)
}

pub(crate) fn is_browsing(label: &str) -> bool {
    matches_any(label, BROWSING)
}
