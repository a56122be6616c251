use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Run-wide settings. Every field has a default so a partial document
/// deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusConfig {
    #[serde(default)]
    pub format: ReportFormat,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Treat a clean exit request from the target (`sys.exit()` / `sys.exit(0)`)
    /// as normal termination rather than a failure.
    #[serde(default = "default_clean_exit_completes")]
    pub clean_exit_completes: bool,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_clean_exit_completes() -> bool {
    true
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            log_filter: default_log_filter(),
            clean_exit_completes: default_clean_exit_completes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: CensusConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, CensusConfig::default());
        assert_eq!(config.log_filter, "warn");
        assert!(config.clean_exit_completes);
    }

    #[test]
    fn format_uses_snake_case_names() {
        let config: CensusConfig =
            serde_json::from_str(r#"{"format": "json", "clean_exit_completes": false}"#)
                .expect("parse");
        assert_eq!(config.format, ReportFormat::Json);
        assert!(!config.clean_exit_completes);
    }
}
