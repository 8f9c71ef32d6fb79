//! Cache Strategy Module
//!
//! Named TTL/tag/priority presets shared by every cache call site.

use serde::{Deserialize, Serialize};

// == Priority ==
/// Relative importance of an entry. Recorded in metadata, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

// == Cache Strategy ==
/// Immutable caching preset: lifetime, tags, priority and stale grace window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStrategy {
    /// Seconds an entry is considered fresh
    pub ttl_seconds: u64,
    /// Tags attached to every entry written with this strategy
    pub tags: &'static [&'static str],
    pub priority: Priority,
    /// Seconds past expiry during which a stale value may still be served
    pub stale_grace_seconds: u64,
}

impl CacheStrategy {
    pub const fn new(
        ttl_seconds: u64,
        tags: &'static [&'static str],
        priority: Priority,
        stale_grace_seconds: u64,
    ) -> Self {
        Self {
            ttl_seconds,
            tags,
            priority,
            stale_grace_seconds,
        }
    }

    /// Returns true if any of this strategy's tags appears in `tags`.
    pub fn matches_any<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter()
            .any(|t| self.tags.iter().any(|own| *own == t.as_ref()))
    }
}

pub const MENU_STRATEGY: CacheStrategy = CacheStrategy::new(300, &["menu"], Priority::High, 60);
pub const RESTAURANT_STRATEGY: CacheStrategy =
    CacheStrategy::new(1800, &["restaurant"], Priority::Normal, 300);
pub const ANALYTICS_STRATEGY: CacheStrategy =
    CacheStrategy::new(120, &["analytics"], Priority::Low, 30);
pub const SESSION_STRATEGY: CacheStrategy =
    CacheStrategy::new(3600, &["session", "auth"], Priority::High, 0);
pub const TABLE_STRATEGY: CacheStrategy = CacheStrategy::new(600, &["table"], Priority::Normal, 120);
pub const QR_CODE_STRATEGY: CacheStrategy =
    CacheStrategy::new(86400, &["qrcode"], Priority::Low, 3600);

// == Strategy Catalog ==
/// Fixed lookup table over the named presets.
pub struct StrategyCatalog;

impl StrategyCatalog {
    /// Every preset, in lookup order.
    pub const ALL: [(&'static str, CacheStrategy); 6] = [
        ("menu", MENU_STRATEGY),
        ("restaurant", RESTAURANT_STRATEGY),
        ("analytics", ANALYTICS_STRATEGY),
        ("session", SESSION_STRATEGY),
        ("table", TABLE_STRATEGY),
        ("qr_code", QR_CODE_STRATEGY),
    ];

    /// Finds a preset by name, case-insensitively. `qrcode` is accepted for `qr_code`.
    pub fn by_name(name: &str) -> Option<CacheStrategy> {
        let name = name.trim().to_lowercase();
        let name = if name == "qrcode" { "qr_code" } else { name.as_str() };
        Self::ALL
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, strategy)| *strategy)
    }

    /// First preset whose tags intersect `tags`.
    pub fn for_tags<S: AsRef<str>>(tags: &[S]) -> Option<CacheStrategy> {
        Self::ALL
            .iter()
            .map(|(_, strategy)| *strategy)
            .find(|strategy| strategy.matches_any(tags))
    }

    /// Stale grace for an entry carrying `tags`; 0 when no preset matches.
    pub fn grace_for_tags<S: AsRef<str>>(tags: &[S]) -> u64 {
        Self::for_tags(tags).map_or(0, |s| s.stale_grace_seconds)
    }
}
