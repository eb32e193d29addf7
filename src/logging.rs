use crate::error::{InsightError, Result};
use chrono::Local;
use env_logger::Builder;
use log::{Level, LevelFilter, Record};
use std::io::Write;
use yansi::Paint;

const CRATE_TARGET: &str = "repo_insight::";

/// Initializes logging for the command-line tool
///
/// `log_level` is the default filter; a `RUST_LOG` directive takes
/// precedence when set. Unknown level names are rejected.
pub fn init(log_level: &str) -> Result<()> {
    let level = parse_log_level(log_level)?;

    Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format(|buf, record| writeln!(buf, "{}", format_log(record)))
        .try_init()
        .map_err(|e| InsightError::Config(format!("Failed to initialize logging: {}", e)))
}

/// Formats a record as `HH:MM:SS LEVEL module: message`
///
/// Targets inside this crate lose their `repo_insight::` prefix, so a fetch
/// event reads `github: ...` next to the spinner output.
pub fn format_log(record: &Record) -> String {
    let level = match record.level() {
        Level::Error => Paint::red("ERROR").bold(),
        Level::Warn => Paint::yellow("WARN ").bold(),
        Level::Info => Paint::cyan("INFO ").bold(),
        Level::Debug => Paint::blue("DEBUG"),
        Level::Trace => Paint::new("TRACE").dimmed(),
    };
    let target = record.target();
    let module = target.strip_prefix(CRATE_TARGET).unwrap_or(target);

    format!(
        "{} {} {}: {}",
        Local::now().format("%H:%M:%S"),
        level,
        module,
        record.args()
    )
}

/// Parses a `--log-level` value
pub fn parse_log_level(level: &str) -> Result<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(InsightError::Config(format!(
            "Unknown log level '{}': expected off, error, warn, info, debug or trace",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("off", LevelFilter::Off)]
    #[test_case("error", LevelFilter::Error)]
    #[test_case("WARN", LevelFilter::Warn)]
    #[test_case("warning", LevelFilter::Warn)]
    #[test_case(" debug ", LevelFilter::Debug)]
    fn test_parse_log_level(input: &str, expected: LevelFilter) {
        assert_eq!(parse_log_level(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_log_level_rejects_unknown() {
        assert!(matches!(parse_log_level("verbose"), Err(InsightError::Config(_))));
    }

    #[test]
    fn test_format_log_shortens_crate_targets() {
        let line = format_log(
            &Record::builder()
                .args(format_args!("fetched 3 files"))
                .level(Level::Info)
                .target("repo_insight::github")
                .build(),
        );
        assert!(line.contains(" github: fetched 3 files"));
        assert!(!line.contains("repo_insight::"));
    }

    #[test]
    fn test_format_log_keeps_foreign_targets() {
        let line = format_log(
            &Record::builder()
                .args(format_args!("connection closed"))
                .level(Level::Debug)
                .target("hyper::proto")
                .build(),
        );
        assert!(line.ends_with("hyper::proto: connection closed"));
    }
}
