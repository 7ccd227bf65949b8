//! Config validation with path-qualified messages.

use thiserror::Error;

use crate::schema::EngineConfig;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Longest settle window that still makes sense for a page visit.
const MAX_SETTLE_MS: u64 = 60_000;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

pub fn validate(config: &EngineConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_site(config, &mut report);
    validate_compile(config, &mut report);
    validate_visibility(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_site(config: &EngineConfig, report: &mut ValidationReport) {
    let slug = config.home_slug();
    if slug.trim().is_empty() {
        report.error("site.homeSlug", "homeSlug cannot be empty");
    } else if slug.contains('/') || slug.chars().any(char::is_whitespace) {
        report.error("site.homeSlug", format!("'{slug}' is not a valid slug"));
    }
}

fn validate_compile(config: &EngineConfig, report: &mut ValidationReport) {
    if config.container_id().trim().is_empty() {
        report.error("compile.containerId", "containerId cannot be empty");
    }
    if config.fallback_alt().trim().is_empty() {
        report.warn("compile.fallbackAlt", "Empty fallback alt leaves images without a description");
    }
}

fn validate_visibility(config: &EngineConfig, report: &mut ValidationReport) {
    let settle = config.settle_ms();
    if settle > MAX_SETTLE_MS {
        report.warn(
            "visibility.settleMs",
            format!("settleMs {settle} is over a minute; revealed panes will rarely scroll"),
        );
    }
    let delay = config.scroll_delay_ms();
    if delay > settle && settle > 0 {
        report.warn("visibility.scrollDelayMs", "scrollDelayMs is longer than settleMs");
    }
}

fn validate_logging(config: &EngineConfig, report: &mut ValidationReport) {
    let level = config.log_level();
    // Anything with a target or comma is an EnvFilter directive; leave it to the subscriber.
    if level.contains('=') || level.contains(',') {
        return;
    }
    if !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.error(
            "logging.level",
            format!("Unknown log level '{level}'. Use one of {}", LEVELS.join(", ")),
        );
    }
}
