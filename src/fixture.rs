//! Comparison fixtures and corpus collection for formatter regression tests.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use dprint_core::configuration::GlobalConfiguration;

use crate::configuration::Configuration;
use crate::configuration::config_key_map_from_json;
use crate::configuration::resolve_config;
use crate::format_text::format_text;
use crate::formatter::JavaFormatter;
use crate::oracle::OracleOptions;
use crate::oracle::expected_formatted_source;

/// Environment variable that turns the oracle comparison off when set to
/// `0`, `false` or `off`.
pub const COMPARE_ENV_VAR: &str = "JAVA_COMMENT_ORACLE_COMPARE";

/// Name of the per-directory options file in a corpus.
pub const CORPUS_OPTIONS_FILE: &str = "dprint-java.json";

#[derive(Debug, Clone)]
pub struct FixtureOptions {
    pub config: Configuration,
    /// Whether to compute the oracle baseline next to the production output.
    pub compare: bool,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            config: Configuration::default(),
            compare: true,
        }
    }
}

impl FixtureOptions {
    /// Default options with `compare` taken from [`COMPARE_ENV_VAR`].
    pub fn from_env() -> Self {
        let compare = match std::env::var(COMPARE_ENV_VAR) {
            Ok(value) => !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off"),
            Err(_) => true,
        };
        Self {
            compare,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: Configuration) -> Self {
        self.config = config;
        self
    }
}

/// Result of running one source through a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Output of the production formatting path.
    pub actual: String,
    /// Oracle baseline, when comparison is enabled.
    pub expected: Option<String>,
}

impl Comparison {
    /// True when there is no baseline or the baseline equals the output.
    pub fn matches(&self) -> bool {
        self.expected.as_ref().is_none_or(|expected| *expected == self.actual)
    }
}

/// Owns everything one formatter comparison needs.
#[derive(Debug, Clone)]
pub struct ComparisonFixture {
    options: FixtureOptions,
    formatter: JavaFormatter,
}

impl ComparisonFixture {
    pub fn new(options: FixtureOptions) -> Self {
        let formatter = JavaFormatter::new(options.config.clone());
        Self { options, formatter }
    }

    /// Format `source` through the production path and, when enabled, build
    /// the oracle baseline for it.
    pub fn check(&self, source: &str) -> Result<Comparison> {
        let actual = self.format(source)?;
        let expected = if self.options.compare {
            let oracle_options = OracleOptions::from_config(&self.options.config);
            Some(expected_formatted_source(&self.formatter, source, &oracle_options)?)
        } else {
            None
        };
        Ok(Comparison { actual, expected })
    }

    /// Whether formatting the production output again leaves it unchanged.
    pub fn check_idempotent(&self, source: &str) -> Result<bool> {
        let once = self.format(source)?;
        let twice = self.format(&once)?;
        Ok(once == twice)
    }

    fn format(&self, source: &str) -> Result<String> {
        let formatted = format_text(Path::new("Test.java"), source, &self.options.config)?;
        Ok(formatted.unwrap_or_else(|| source.to_string()))
    }
}

/// One `.java` file of a corpus together with the options that apply to it.
#[derive(Debug, Clone)]
pub struct CorpusCase {
    pub path: PathBuf,
    pub options: FixtureOptions,
}

impl CorpusCase {
    /// Name relative to the corpus root, for reporting.
    pub fn name(&self, root: &Path) -> String {
        self.path
            .strip_prefix(root)
            .unwrap_or(&self.path)
            .display()
            .to_string()
    }

    pub fn run(&self) -> Result<Comparison> {
        let source = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        ComparisonFixture::new(self.options.clone())
            .check(&source)
            .with_context(|| format!("Failed to check {}", self.path.display()))
    }
}

/// Collect every `.java` file under `root`, sorted by path.
///
/// Each directory may hold a [`CORPUS_OPTIONS_FILE`] with a flat JSON object
/// of formatter options; the nearest one above a file applies to it. The
/// `compare` flag comes from `base`.
pub fn collect_corpus(root: &Path, base: &FixtureOptions) -> Result<Vec<CorpusCase>> {
    let mut configs: HashMap<PathBuf, Configuration> = HashMap::new();
    let mut cases = Vec::new();

    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let path = entry.path();

        if entry.file_type().is_dir() {
            let parent_config = path
                .parent()
                .and_then(|parent| configs.get(parent))
                .cloned()
                .unwrap_or_else(|| base.config.clone());
            let config = match read_options_file(&path.join(CORPUS_OPTIONS_FILE))? {
                Some(config) => config,
                None => parent_config,
            };
            configs.insert(path.to_path_buf(), config);
            continue;
        }

        if path.extension().and_then(|ext| ext.to_str()) != Some("java") {
            continue;
        }

        let config = path
            .parent()
            .and_then(|parent| configs.get(parent))
            .cloned()
            .unwrap_or_else(|| base.config.clone());
        cases.push(CorpusCase {
            path: path.to_path_buf(),
            options: FixtureOptions {
                config,
                compare: base.compare,
            },
        });
    }

    tracing::debug!(root = %root.display(), cases = cases.len(), "collected corpus");
    Ok(cases)
}

fn read_options_file(path: &Path) -> Result<Option<Configuration>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let config_map = config_key_map_from_json(&value)
        .with_context(|| format!("Invalid options in {}", path.display()))?;

    let result = resolve_config(config_map, &GlobalConfiguration::default());
    if let Some(diagnostic) = result.diagnostics.first() {
        anyhow::bail!(
            "Invalid options in {}: {}: {}",
            path.display(),
            diagnostic.property_name,
            diagnostic.message
        );
    }
    Ok(Some(result.config))
}
