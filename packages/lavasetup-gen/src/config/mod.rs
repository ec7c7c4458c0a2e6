//! Lab setup description
//!
//! The setup file is loaded in two steps: [`RawDocument::load`] parses the
//! YAML into untyped mappings without looking at them, then
//! [`LabSetup::from_raw`] normalizes every entry. Nothing is written to the
//! output tree before both steps succeed.

pub mod entry;

use camino::Utf8Path;
use fs_err as fs;
use log::debug;
use serde::Deserialize;
use serde_yaml::Mapping;

use crate::error::{GenError, Result};

pub use entry::{BoardEntry, MasterEntry, SlaveEntry, UserEntry, ZmqAuth};

/// Setup file as parsed, before any validation
#[derive(Debug, Default, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    /// Raw `masters` entries
    pub masters: Option<Vec<Mapping>>,

    #[serde(default)]
    /// Raw `slaves` entries
    pub slaves: Option<Vec<Mapping>>,

    #[serde(default)]
    /// Raw `boards` entries
    pub boards: Option<Vec<Mapping>>,
}

impl RawDocument {
    /// Load a setup description from a YAML file
    pub fn load<P: AsRef<Utf8Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        Self::parse(&content).map_err(|source| GenError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// An empty document describes an empty lab.
    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// Normalized lab topology
#[derive(Debug, Clone, PartialEq)]
pub struct LabSetup {
    /// Declared masters; generation supports at most one
    pub masters: Vec<MasterEntry>,
    /// Declared dispatchers
    pub slaves: Vec<SlaveEntry>,
    /// `None` when the document has no `boards` key at all
    pub boards: Option<Vec<BoardEntry>>,
}

impl LabSetup {
    /// Normalize every entry of a parsed document, stopping at the first error
    pub fn from_raw(raw: &RawDocument) -> Result<Self> {
        let masters = raw
            .masters
            .iter()
            .flatten()
            .map(MasterEntry::normalize)
            .collect::<Result<Vec<_>>>()?;

        let slaves = raw
            .slaves
            .iter()
            .flatten()
            .map(SlaveEntry::normalize)
            .collect::<Result<Vec<_>>>()?;

        let boards = raw
            .boards
            .as_ref()
            .map(|boards| boards.iter().map(BoardEntry::normalize).collect::<Result<Vec<_>>>())
            .transpose()?;

        debug!(
            "Loaded lab setup: {} master(s), {} slave(s), {} board(s)",
            masters.len(),
            slaves.len(),
            boards.as_ref().map_or(0, Vec::len)
        );

        Ok(Self {
            masters,
            slaves,
            boards,
        })
    }

    /// Load and normalize a setup file
    pub fn load<P: AsRef<Utf8Path>>(path: P) -> Result<Self> {
        Self::from_raw(&RawDocument::load(path)?)
    }

    /// Find a master by name
    pub fn find_master(&self, name: &str) -> Option<&MasterEntry> {
        self.masters.iter().find(|master| master.name == name)
    }

    /// Find a slave by name
    pub fn find_slave(&self, name: &str) -> Option<&SlaveEntry> {
        self.slaves.iter().find(|slave| slave.name == name)
    }

    /// Hosts running a master
    pub fn master_hosts(&self) -> Vec<&str> {
        self.masters.iter().map(|master| master.host.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(yaml: &str) -> Result<LabSetup> {
        LabSetup::from_raw(&RawDocument::parse(yaml).unwrap())
    }

    #[test]
    fn test_empty_document() {
        let lab = setup("").unwrap();
        assert!(lab.masters.is_empty());
        assert!(lab.slaves.is_empty());
        assert!(lab.boards.is_none());
    }

    #[test]
    fn test_basic_setup_parsing() {
        let lab = setup(
            r#"
masters:
  - name: lava-master
    host: server
    postgre_password: secret
    dns_name: lava.example.org
slaves:
  - name: worker-1
    host: rack-1
    remote_master: lava-master
boards:
  - name: qemu-01
    type: qemu
    slave: worker-1
"#,
        )
        .unwrap();

        assert_eq!(lab.masters.len(), 1);
        assert_eq!(lab.master_hosts(), vec!["server"]);
        assert_eq!(lab.find_slave("worker-1").unwrap().host, "rack-1");
        assert!(lab.find_master("lava-master").is_some());
        assert!(lab.find_master("other").is_none());
        assert_eq!(lab.boards.unwrap()[0].device_type, "qemu");
    }

    #[test]
    fn test_empty_boards_key_is_kept() {
        let lab = setup("boards: []").unwrap();
        assert_eq!(lab.boards, Some(Vec::new()));
    }

    #[test]
    fn test_invalid_slave_aborts_normalization() {
        let err = setup("slaves:\n  - name: w\n    bogus: 1\n    remote_master: m").unwrap_err();
        assert!(matches!(err, GenError::UnknownKey { .. }));
    }

    #[test]
    fn test_load_reports_yaml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("lava_setup.yaml")).unwrap();
        std::fs::write(&path, "masters: [unterminated").unwrap();

        let err = RawDocument::load(&path).unwrap_err();
        assert!(matches!(err, GenError::Yaml { .. }));
        assert!(!err.is_validation());
    }
}
