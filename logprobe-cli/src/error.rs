//! CLI-specific error types and exit code mapping

use logprobe_checker::CheckerError;
use logprobe_core::{ProbeError, State};

/// CLI-specific error type.
///
/// Every failure is reported to the monitoring system as an UNKNOWN
/// verdict, so all variants share the same exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Command-line usage or configuration failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A pattern file could not be read.
    #[error("cannot read pattern file {path}: {source}")]
    PatternFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Wrapped error from the check engine.
    #[error("{0}")]
    Check(#[from] CheckerError),

    /// Wrapped domain error from logprobe-core.
    #[error("{0}")]
    Core(#[from] ProbeError),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// Monitoring plugins signal their own failure with UNKNOWN (3).
    pub fn exit_code(&self) -> i32 {
        State::Unknown.exit_code()
    }

    /// Plugin line printed on stdout for this error.
    pub fn plugin_line(&self) -> String {
        format!("{}: {}", State::Unknown, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logprobe_core::ConfigError;

    #[test]
    fn test_exit_code_is_unknown() {
        let errors = [
            CliError::Config("bad".to_owned()),
            CliError::Io(std::io::Error::other("boom")),
            CliError::Check(CheckerError::Encoding("bogus".to_owned())),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), 3, "{err}");
        }
    }

    #[test]
    fn test_plugin_line_prefix() {
        let err = CliError::Config("invalid TOML syntax".to_owned());
        assert_eq!(
            err.plugin_line(),
            "UNKNOWN: configuration error: invalid TOML syntax"
        );
    }

    #[test]
    fn test_pattern_file_display() {
        let err = CliError::PatternFile {
            path: "/etc/logprobe/patterns".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/logprobe/patterns"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_from_core_error() {
        let core_err = ProbeError::Config(ConfigError::FileNotFound {
            path: "logprobe.toml".to_owned(),
        });
        let cli_err: CliError = core_err.into();
        assert!(matches!(cli_err, CliError::Core(_)));
        assert!(cli_err.to_string().contains("logprobe.toml"));
    }

    #[test]
    fn test_from_checker_error() {
        let err: CliError = CheckerError::Encoding("bogus".to_owned()).into();
        assert!(matches!(err, CliError::Check(_)));
    }
}
