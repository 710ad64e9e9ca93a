//! Errors raised while compiling syntax rules.

use thiserror::Error;

/// A syntax rule table that cannot be compiled into matchers.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("keyword set `{0}` must not be empty")]
    EmptyKeywordSet(&'static str),

    #[error("keyword set `{0}` contains a blank keyword")]
    BlankKeyword(&'static str),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
