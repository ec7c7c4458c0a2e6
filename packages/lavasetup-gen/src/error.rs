//! Error types for the generator
//!
//! Every failure aborts the whole run: the library never exits the process,
//! it hands a `GenError` back to the caller which decides what to do.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Kind of entry a schema error was raised for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A `masters` entry
    Master,
    /// A `slaves` entry
    Slave,
    /// A user of a master
    User,
    /// A `boards` entry
    Board,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntryKind::Master => "master",
            EntryKind::Slave => "slave",
            EntryKind::User => "user",
            EntryKind::Board => "board",
        };
        f.write_str(name)
    }
}

/// Errors raised while loading a setup or generating its output
#[derive(Error, Debug)]
pub enum GenError {
    /// A key outside the allow-list of its entry kind
    #[error("unknown keyword {key} in {kind} entry")]
    UnknownKey {
        /// Kind of the offending entry
        kind: EntryKind,
        /// The unrecognized key
        key: String,
    },

    /// A required field is absent or null
    #[error("missing {field} entry for {kind}{}", describe(.entry))]
    MissingField {
        /// Kind of the offending entry
        kind: EntryKind,
        /// The missing field
        field: &'static str,
        /// Name of the entry, when it has one
        entry: Option<String>,
    },

    /// A field holds a value of the wrong shape
    #[error("invalid value for {field} in {kind} {entry}: {reason}")]
    InvalidValue {
        /// Kind of the offending entry
        kind: EntryKind,
        /// The offending field
        field: &'static str,
        /// Name of the entry
        entry: String,
        /// What the value should have been
        reason: String,
    },

    /// A board refers to a slave that is not declared
    #[error("slave not existing: {slave} (referenced by board {board})")]
    UnresolvedSlave {
        /// Board holding the reference
        board: String,
        /// Slave name that matched nothing
        slave: String,
    },

    /// A slave refers to a master that is not declared
    #[error("cannot find master {master} (remote_master of slave {slave})")]
    UnresolvedMaster {
        /// Slave holding the reference
        slave: String,
        /// Master name that matched nothing
        master: String,
    },

    /// More than one master is declared
    #[error("only one master is supported, found {0}")]
    TooManyMasters(usize),

    /// More than one slave shares the master's host
    #[error("master host {host} can support only one slave, found {first} and {second}")]
    TooManyColocatedSlaves {
        /// The master's host
        host: String,
        /// First slave found on that host
        first: String,
        /// Second slave found on that host
        second: String,
    },

    /// A template failed to load or render
    #[error("failed to render template {template}")]
    Template {
        /// Template name, or the directory when loading failed
        template: String,
        /// Underlying tera error
        #[source]
        source: tera::Error,
    },

    /// A template directory, template or static file is missing
    #[error("missing asset: {0}")]
    MissingAsset(Utf8PathBuf),

    /// The setup file is not valid YAML
    #[error("failed to parse setup file {path}")]
    Yaml {
        /// The setup file
        path: Utf8PathBuf,
        /// Underlying parser error
        #[source]
        source: serde_yaml::Error,
    },

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    /// Whether the error comes from the setup description itself rather
    /// than from the environment the generator runs in.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            GenError::Io(_) | GenError::MissingAsset(_) | GenError::Yaml { .. }
        )
    }
}

fn describe(entry: &Option<String>) -> String {
    match entry {
        Some(name) => format!(": {}", name),
        None => String::new(),
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = GenError::MissingField {
            kind: EntryKind::Master,
            field: "postgre_password",
            entry: None,
        };
        assert_eq!(err.to_string(), "missing postgre_password entry for master");

        let err = GenError::MissingField {
            kind: EntryKind::Board,
            field: "slave",
            entry: Some("bbb-01".to_string()),
        };
        assert_eq!(err.to_string(), "missing slave entry for board: bbb-01");
    }

    #[test]
    fn test_validation_classification() {
        assert!(GenError::TooManyMasters(2).is_validation());
        assert!(!GenError::MissingAsset(Utf8PathBuf::from("squid/squid.conf")).is_validation());
    }
}
