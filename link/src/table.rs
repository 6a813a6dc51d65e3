use std::collections::BTreeMap;
use thiserror::Error;

use crate::protocol::{CommandToken, TokenError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("expected LABEL=TOKEN, got {0:?}")]
    MissingSeparator(String),
    #[error("label is empty in {0:?}")]
    EmptyLabel(String),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Which token, if any, each known person triggers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandTable {
    labels: BTreeMap<String, CommandToken>,
    unknown: CommandToken,
}

impl Default for CommandTable {
    /// The demo's two people plus the stranger token.
    fn default() -> Self {
        Self::new(CommandToken::unknown())
            .with("zhang_san", CommandToken::face1())
            .with("li_si", CommandToken::face2())
    }
}

impl CommandTable {
    /// Empty table; strangers trigger `unknown`.
    pub fn new(unknown: CommandToken) -> Self {
        Self {
            labels: BTreeMap::new(),
            unknown,
        }
    }

    pub fn with(mut self, label: impl Into<String>, token: CommandToken) -> Self {
        self.insert(label, token);
        self
    }

    pub fn insert(&mut self, label: impl Into<String>, token: CommandToken) -> Option<CommandToken> {
        self.labels.insert(label.into(), token)
    }

    /// Token for a known person, or `None` when the label has no command.
    pub fn lookup(&self, label: &str) -> Option<&CommandToken> {
        self.labels.get(label)
    }

    /// Token sent when faces are seen but none is known.
    pub fn unknown(&self) -> &CommandToken {
        &self.unknown
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &CommandToken)> {
        self.labels.iter().map(|(label, token)| (label.as_str(), token))
    }

    /// Every token this table can produce.
    pub fn tokens(&self) -> impl Iterator<Item = &CommandToken> {
        self.labels.values().chain(std::iter::once(&self.unknown))
    }

    /// Tokens the remote display has no picture for.
    pub fn unsupported(&self) -> Vec<&CommandToken> {
        self.tokens().filter(|t| !t.is_understood()).collect()
    }
}

/// Parse a `label=TOKEN` pair as given on the command line.
pub fn parse_entry(s: &str) -> Result<(String, CommandToken), EntryError> {
    let (label, token) = s
        .split_once('=')
        .ok_or_else(|| EntryError::MissingSeparator(s.to_string()))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(EntryError::EmptyLabel(s.to_string()));
    }
    Ok((label.to_string(), CommandToken::new(token.trim())?))
}
