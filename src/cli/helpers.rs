//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, EntityStore, FileBackend, Project};

/// Format a record id for display, truncating if too long
///
/// Ids longer than 16 characters (ULIDs are 26) are cut to 13 with "...".
pub fn format_short_id_str(id: &str) -> String {
    if id.chars().count() > 16 {
        let head: String = id.chars().take(13).collect();
        format!("{}...", head)
    } else {
        id.to_string()
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and line breaks according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Locate the project from `--project` or the working directory
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    Project::resolve(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))
}

/// Locate the project and open its store
pub fn open_store(global: &GlobalOpts) -> Result<(Project, EntityStore<FileBackend>)> {
    let project = open_project(global)?;
    let store = EntityStore::open(&project);
    Ok((project, store))
}

/// Resolve `auto` against the configured default, then against `fallback`
pub fn effective_format(
    requested: OutputFormat,
    config: &Config,
    fallback: OutputFormat,
) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    config
        .default_format
        .as_deref()
        .and_then(|name| <OutputFormat as clap::ValueEnum>::from_str(name, true).ok())
        .filter(|f| *f != OutputFormat::Auto)
        .unwrap_or(fallback)
}

/// Print a value as pretty JSON
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

/// Print a value as YAML
pub fn print_yaml<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let yaml = serde_yml::to_string(value).into_diagnostic()?;
    print!("{}", yaml);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_short_id_str() {
        assert_eq!(format_short_id_str("7"), "7");
        assert_eq!(format_short_id_str("01J9ZQ4M8Y3N5K7P2R6T0VXW1B"), "01J9ZQ4M8Y3N5...");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("Instalación de fibra", 12), "Instalaci...");
        assert_eq!(truncate_str("ñandú", 5), "ñandú");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
        assert_eq!(escape_csv("with\rreturn"), "\"with\rreturn\"");
    }

    #[test]
    fn test_effective_format() {
        let mut config = Config::default();
        assert_eq!(
            effective_format(OutputFormat::Auto, &config, OutputFormat::Tsv),
            OutputFormat::Tsv
        );
        config.default_format = Some("json".to_string());
        assert_eq!(
            effective_format(OutputFormat::Auto, &config, OutputFormat::Tsv),
            OutputFormat::Json
        );
        assert_eq!(
            effective_format(OutputFormat::Csv, &config, OutputFormat::Tsv),
            OutputFormat::Csv
        );
        config.default_format = Some("nonsense".to_string());
        assert_eq!(
            effective_format(OutputFormat::Auto, &config, OutputFormat::Yaml),
            OutputFormat::Yaml
        );
    }
}
