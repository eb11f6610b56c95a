use thiserror::Error;

use chatpress_config::ConfigError;

/// Failure to turn a [`GateConfig`](chatpress_config::GateConfig) into matchers.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid pattern for rule `{rule}`: {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to build banned phrase matcher: {0}")]
    Phrases(#[from] aho_corasick::BuildError),
}
