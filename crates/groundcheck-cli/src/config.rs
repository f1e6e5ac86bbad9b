//! CLI configuration

use groundcheck::HarnessConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CliError, CliResult};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - reports and warnings
    #[default]
    Normal,
    /// Verbose - scenario progress
    Verbose,
    /// Debug - every lookup and step
    Debug,
}

impl Verbosity {
    /// Verbosity from the `-q` flag and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default log filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "groundcheck=info,warn",
            Self::Debug => "groundcheck=debug,groundcheck_cli=debug,info",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Harness settings from the config file, before flag overrides
    pub harness: HarnessConfig,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set harness configuration
    #[must_use]
    pub fn with_harness(mut self, harness: HarnessConfig) -> Self {
        self.harness = harness;
        self
    }

    /// Load harness settings from a YAML file
    pub fn load_harness(self, path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        let harness = HarnessConfig::load(path)?;
        Ok(self.with_harness(harness))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use groundcheck::WaitPolicy;
    use std::io::Write;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 5), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(true, 2), Verbosity::Quiet);
    }

    #[test]
    fn test_log_filter_widens_with_verbosity() {
        assert_eq!(Verbosity::Quiet.log_filter(), "error");
        assert!(Verbosity::Debug.log_filter().contains("groundcheck=debug"));
    }

    #[test]
    fn test_color_choice() {
        assert!(ColorChoice::Always.should_color());
        assert!(!ColorChoice::Never.should_color());
    }

    #[test]
    fn test_load_harness() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wait_policy: recorded\nseed: 9").unwrap();
        let config = CliConfig::new().load_harness(file.path()).unwrap();
        assert_eq!(config.harness.wait_policy, WaitPolicy::Recorded);
        assert_eq!(config.harness.seed, 9);
    }

    #[test]
    fn test_missing_config_file() {
        let err = CliConfig::new()
            .load_harness(Path::new("/nonexistent/groundcheck.yaml"))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
