//! Config defaults: fills every unset field of a loaded config.

use crate::schema::{CompileConfig, EngineConfig, LoggingConfig, SiteConfig, VisibilityConfig};

pub const DEFAULT_HOME_SLUG: &str = "hello";

pub use tractstack_core::DEFAULT_FALLBACK_ALT;

pub const DEFAULT_CONTAINER_ID: &str = "markdown";

/// Quiet period after page load during which revealed panes never scroll.
pub const DEFAULT_SETTLE_MS: u64 = 5000;

pub const DEFAULT_SCROLL_DELAY_MS: u64 = 50;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: EngineConfig) -> EngineConfig {
    let config = apply_site_defaults(config);
    let config = apply_compile_defaults(config);
    let config = apply_visibility_defaults(config);
    apply_logging_defaults(config)
}

fn apply_site_defaults(mut config: EngineConfig) -> EngineConfig {
    let site = config.site.get_or_insert_with(SiteConfig::default);
    site.home_slug.get_or_insert_with(|| DEFAULT_HOME_SLUG.to_string());
    config
}

fn apply_compile_defaults(mut config: EngineConfig) -> EngineConfig {
    let compile = config.compile.get_or_insert_with(CompileConfig::default);
    compile.fallback_alt.get_or_insert_with(|| DEFAULT_FALLBACK_ALT.to_string());
    compile.container_id.get_or_insert_with(|| DEFAULT_CONTAINER_ID.to_string());
    config
}

fn apply_visibility_defaults(mut config: EngineConfig) -> EngineConfig {
    let visibility = config.visibility.get_or_insert_with(VisibilityConfig::default);
    visibility.settle_ms.get_or_insert(DEFAULT_SETTLE_MS);
    visibility.scroll_delay_ms.get_or_insert(DEFAULT_SCROLL_DELAY_MS);
    config
}

fn apply_logging_defaults(mut config: EngineConfig) -> EngineConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_every_section() {
        let cfg = apply_all_defaults(EngineConfig::default());
        assert_eq!(cfg.site.unwrap().home_slug.unwrap(), DEFAULT_HOME_SLUG);
        assert_eq!(cfg.visibility.as_ref().unwrap().settle_ms, Some(DEFAULT_SETTLE_MS));
        assert_eq!(cfg.logging.as_ref().unwrap().json, Some(false));
        assert!(cfg.logging.unwrap().dir.is_none());
    }

    #[test]
    fn test_keeps_user_values() {
        let mut cfg = EngineConfig::default();
        cfg.site = Some(SiteConfig { home_slug: Some("welcome".into()) });
        cfg.visibility = Some(VisibilityConfig { settle_ms: Some(0), scroll_delay_ms: None });
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.home_slug(), "welcome");
        assert_eq!(cfg.settle_ms(), 0);
        assert_eq!(cfg.scroll_delay_ms(), DEFAULT_SCROLL_DELAY_MS);
    }
}
