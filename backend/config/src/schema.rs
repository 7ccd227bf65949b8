//! Engine configuration schema.
//!
//! Every section is optional in the file; `defaults::apply_all_defaults`
//! fills in anything missing, and the accessors below fall back to the same
//! defaults so an unprepared config is still usable.

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_CONTAINER_ID, DEFAULT_FALLBACK_ALT, DEFAULT_HOME_SLUG, DEFAULT_LOG_LEVEL,
    DEFAULT_SCROLL_DELAY_MS, DEFAULT_SETTLE_MS,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Site-wide routing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteConfig>,

    /// Markdown compilation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile: Option<CompileConfig>,

    /// Pane visibility timing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    /// Slug of the page served at `/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileConfig {
    /// Alt text for file-table images that have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_alt: Option<String>,
    /// Parent id given to top-level blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Level or `EnvFilter` directive, e.g. `info` or `tractstack_markdown=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling log files; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl EngineConfig {
    pub fn home_slug(&self) -> &str {
        self.site
            .as_ref()
            .and_then(|s| s.home_slug.as_deref())
            .unwrap_or(DEFAULT_HOME_SLUG)
    }

    pub fn fallback_alt(&self) -> &str {
        self.compile
            .as_ref()
            .and_then(|c| c.fallback_alt.as_deref())
            .unwrap_or(DEFAULT_FALLBACK_ALT)
    }

    pub fn container_id(&self) -> &str {
        self.compile
            .as_ref()
            .and_then(|c| c.container_id.as_deref())
            .unwrap_or(DEFAULT_CONTAINER_ID)
    }

    pub fn settle_ms(&self) -> u64 {
        self.visibility
            .as_ref()
            .and_then(|v| v.settle_ms)
            .unwrap_or(DEFAULT_SETTLE_MS)
    }

    pub fn scroll_delay_ms(&self) -> u64 {
        self.visibility
            .as_ref()
            .and_then(|v| v.scroll_delay_ms)
            .unwrap_or(DEFAULT_SCROLL_DELAY_MS)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}
