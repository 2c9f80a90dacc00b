//! CLI argument parsing using clap derive API
//!
//! Every check option is optional here so that unset flags fall through to
//! the environment, the config file and finally the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use logprobe_core::{FORMAT_SYSLOG, ProbeConfig};

use crate::error::CliError;

/// Incremental log checker for monitoring systems.
///
/// Scans only the bytes appended since the previous run and reports
/// OK / WARNING / CRITICAL / UNKNOWN with the matching exit code.
#[derive(Parser, Debug)]
#[command(name = "logprobe", version, about, long_about = None)]
pub struct Cli {
    /// Log file, space-separated list of files, or glob pattern.
    #[arg(short = 'l', long = "logfile")]
    pub logfile: String,

    /// Line format template, or the preset name `syslog`.
    #[arg(short = 'F', long = "format")]
    pub format: Option<String>,

    /// Warning pattern (repeatable).
    #[arg(short = 'p', long = "pattern")]
    pub patterns: Vec<String>,

    /// File with one warning pattern per line.
    #[arg(short = 'P', long = "patternfile")]
    pub pattern_file: Option<PathBuf>,

    /// Negative pattern for the warning tier (repeatable).
    #[arg(short = 'n', long = "negpattern")]
    pub negpatterns: Vec<String>,

    /// File with one negative pattern per line.
    #[arg(short = 'N', long = "negpatternfile")]
    pub negpattern_file: Option<PathBuf>,

    /// Critical pattern (repeatable).
    #[arg(long = "critical-pattern")]
    pub critical_patterns: Vec<String>,

    /// File with one critical pattern per line.
    #[arg(long = "critical-patternfile")]
    pub critical_pattern_file: Option<PathBuf>,

    /// Negative pattern that drops a line from both tiers (repeatable).
    #[arg(long = "critical-negpattern")]
    pub critical_negpatterns: Vec<String>,

    /// File with one critical negative pattern per line.
    #[arg(long = "critical-negpatternfile")]
    pub critical_negpattern_file: Option<PathBuf>,

    /// Match patterns case-insensitively.
    #[arg(short = 'i', long = "case-insensitive")]
    pub case_insensitive: bool,

    /// Encoding of the log files (encoding_rs label).
    #[arg(long)]
    pub encoding: Option<String>,

    /// Warning threshold: fewer hits than this report OK.
    #[arg(short = 'w', long)]
    pub warning: Option<u64>,

    /// Critical threshold: this many warning hits report CRITICAL (0 disables).
    #[arg(short = 'c', long)]
    pub critical: Option<u64>,

    /// Report WARNING when nothing new was read.
    #[arg(long)]
    pub nodiff_warn: bool,

    /// Report CRITICAL when nothing new was read.
    #[arg(long)]
    pub nodiff_crit: bool,

    /// Key offset records by inode so rotated files keep their offsets.
    #[arg(long)]
    pub trace_inode: bool,

    /// Join consecutive lines sharing a header before matching.
    #[arg(short = 'M', long)]
    pub multiline: bool,

    /// Only scan files modified within this many seconds.
    #[arg(long)]
    pub scantime: Option<u64>,

    /// Offset records idle longer than this many seconds are purged.
    #[arg(long)]
    pub expiration: Option<u64>,

    /// Explicit offset record for a single log file.
    #[arg(short = 's', long)]
    pub seekfile: Option<PathBuf>,

    /// Directory holding offset records, cache and lock files.
    #[arg(short = 'S', long)]
    pub state_dir: Option<PathBuf>,

    /// Tag that namespaces offset records, cache and lock.
    #[arg(short = 'T', long)]
    pub tag: Option<String>,

    /// Purge expired offset records after the scan.
    #[arg(short = 'R', long)]
    pub remove_seekfile: bool,

    /// Reuse a recent verdict instead of rescanning.
    #[arg(long)]
    pub cache: bool,

    /// Lifetime of a cached verdict in seconds.
    #[arg(long)]
    pub cachetime: Option<u64>,

    /// Seconds to wait for another run to release the lock (0 waits forever).
    #[arg(long)]
    pub lock_timeout: Option<u64>,

    /// Delete every offset record of this pattern and tag, then exit.
    #[arg(long)]
    pub reset: bool,

    /// Path to a logprobe.toml configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plugin line: the verdict message.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl Cli {
    /// Layer the command-line flags over a loaded configuration.
    ///
    /// Boolean switches can only turn an option on. Patterns given on the
    /// command line replace the configured list for the same tier.
    pub fn apply_to(&self, config: &mut ProbeConfig) -> Result<(), CliError> {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }

        let check = &mut config.check;

        if let Some(format) = &self.format {
            check.logformat = resolve_format(format).to_owned();
        }

        replace_patterns(&mut check.patterns, &self.patterns, self.pattern_file.as_deref())?;
        replace_patterns(
            &mut check.negpatterns,
            &self.negpatterns,
            self.negpattern_file.as_deref(),
        )?;
        replace_patterns(
            &mut check.critical_patterns,
            &self.critical_patterns,
            self.critical_pattern_file.as_deref(),
        )?;
        replace_patterns(
            &mut check.critical_negpatterns,
            &self.critical_negpatterns,
            self.critical_negpattern_file.as_deref(),
        )?;

        check.case_insensitive |= self.case_insensitive;
        check.nodiff_warn |= self.nodiff_warn;
        check.nodiff_crit |= self.nodiff_crit;
        check.trace_inode |= self.trace_inode;
        check.multiline |= self.multiline;
        check.remove_seekfile |= self.remove_seekfile;
        check.cache |= self.cache;

        if let Some(encoding) = &self.encoding {
            check.encoding = encoding.clone();
        }
        if let Some(warning) = self.warning {
            check.warning = warning;
        }
        if let Some(critical) = self.critical {
            check.critical = critical;
        }
        if let Some(scantime) = self.scantime {
            check.scantime_secs = Some(scantime);
        }
        if let Some(expiration) = self.expiration {
            check.expiration_secs = expiration;
        }
        if let Some(cachetime) = self.cachetime {
            check.cachetime_secs = cachetime;
        }
        if let Some(timeout) = self.lock_timeout {
            check.lock_timeout_secs = timeout;
        }
        if let Some(dir) = &self.state_dir {
            check.state_dir = dir.display().to_string();
        }
        if let Some(tag) = &self.tag {
            check.seekfile_tag = tag.clone();
        }

        config.validate()?;
        Ok(())
    }
}

/// Map a preset name to its template; anything else is used verbatim.
pub fn resolve_format(format: &str) -> &str {
    match format {
        "syslog" => FORMAT_SYSLOG,
        other => other,
    }
}

fn replace_patterns(
    target: &mut Vec<String>,
    inline: &[String],
    file: Option<&Path>,
) -> Result<(), CliError> {
    let mut patterns = inline.to_vec();
    if let Some(path) = file {
        patterns.extend(read_pattern_file(path)?);
    }
    if !patterns.is_empty() {
        *target = patterns;
    }
    Ok(())
}

/// Read one pattern per line, skipping blank lines and `#` comments.
pub fn read_pattern_file(path: &Path) -> Result<Vec<String>, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::PatternFile {
        path: path.display().to_string(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(str::to_owned)
        .collect())
}
