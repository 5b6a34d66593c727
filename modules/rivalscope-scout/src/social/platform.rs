use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    TikTok,
    Instagram,
    Twitter,
    Facebook,
    YouTube,
    LinkedIn,
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::YouTube => "youtube",
            Platform::LinkedIn => "linkedin",
            Platform::Generic => "web",
        }
    }

    /// Pick a platform by domain. Patterns are tried in order; anything
    /// unrecognised is `Generic`.
    pub fn from_url(url: &str) -> Platform {
        PLATFORM_PATTERNS
            .iter()
            .find(|p| p.regex.is_match(url))
            .map(|p| p.platform)
            .unwrap_or(Platform::Generic)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Host match: optional scheme, any subdomains, then the registrable domain
// followed by a path/query/port boundary or end of string.
fn host_pattern(domains: &str) -> Regex {
    Regex::new(&format!(
        r"(?i)^(?:https?://)?(?:[a-z0-9-]+\.)*(?:{domains})(?:[/:?#]|$)"
    ))
    .unwrap()
}

static RE_TIKTOK: LazyLock<Regex> = LazyLock::new(|| host_pattern(r"tiktok\.com"));
static RE_INSTAGRAM: LazyLock<Regex> = LazyLock::new(|| host_pattern(r"instagram\.com"));
static RE_TWITTER: LazyLock<Regex> = LazyLock::new(|| host_pattern(r"twitter\.com|x\.com"));
static RE_FACEBOOK: LazyLock<Regex> =
    LazyLock::new(|| host_pattern(r"facebook\.com|fb\.com|fb\.watch"));
static RE_YOUTUBE: LazyLock<Regex> = LazyLock::new(|| host_pattern(r"youtube\.com|youtu\.be"));
static RE_LINKEDIN: LazyLock<Regex> = LazyLock::new(|| host_pattern(r"linkedin\.com"));

struct PlatformPattern {
    platform: Platform,
    regex: &'static LazyLock<Regex>,
}

static PLATFORM_PATTERNS: &[PlatformPattern] = &[
    PlatformPattern {
        platform: Platform::TikTok,
        regex: &RE_TIKTOK,
    },
    PlatformPattern {
        platform: Platform::Instagram,
        regex: &RE_INSTAGRAM,
    },
    PlatformPattern {
        platform: Platform::Twitter,
        regex: &RE_TWITTER,
    },
    PlatformPattern {
        platform: Platform::Facebook,
        regex: &RE_FACEBOOK,
    },
    PlatformPattern {
        platform: Platform::YouTube,
        regex: &RE_YOUTUBE,
    },
    PlatformPattern {
        platform: Platform::LinkedIn,
        regex: &RE_LINKEDIN,
    },
];
