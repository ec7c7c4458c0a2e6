//! Output generation stages
//!
//! [`Generator::run`] drives the stages in a fixed order: the master host
//! (configuration, docker composition, static assets), its boards and
//! provisioning script, then every slave living on a host of its own. The
//! first error stops the run.

pub mod boards;
pub mod master;
pub mod slaves;

pub use master::MasterOutput;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;

use crate::config::LabSetup;
use crate::constants::{DEFAULT_ASSETS_DIR, DEFAULT_OUTPUT_DIR};
use crate::error::Result;
use crate::output;

/// Where to read assets from, where to write, and for which host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Directory holding templates and static assets
    pub assets_dir: Utf8PathBuf,
    /// Root of the generated host trees
    pub output_dir: Utf8PathBuf,
    /// Restrict generation to this host, usually the local hostname
    pub only_host: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            assets_dir: Utf8PathBuf::from(DEFAULT_ASSETS_DIR),
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
            only_host: None,
        }
    }
}

impl GenerateOptions {
    /// Whether artifacts for `host` should be generated on this run
    pub fn includes_host(&self, host: &str) -> bool {
        self.only_host.as_deref().map_or(true, |only| only == host)
    }

    /// Path of an asset relative to the assets directory
    pub fn asset(&self, relative: &str) -> Utf8PathBuf {
        self.assets_dir.join(relative)
    }

    /// Root of the generated host trees
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }
}

/// Hosts for which a tree was generated
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Host of the master, when its tree was generated
    pub master_host: Option<String>,
    /// Standalone dispatcher hosts, in declaration order
    pub slave_hosts: Vec<String>,
}

/// Runs every generation stage over one lab setup
pub struct Generator<'a> {
    setup: &'a LabSetup,
    options: &'a GenerateOptions,
}

impl<'a> Generator<'a> {
    /// Generator over an already normalized setup
    pub fn new(setup: &'a LabSetup, options: &'a GenerateOptions) -> Self {
        Self { setup, options }
    }

    /// Generate the master tree, then every standalone slave tree
    pub fn run(&self) -> Result<GenerationReport> {
        output::ensure_dir(self.options.output_dir())?;

        let mut report = GenerationReport::default();

        if let Some(master) = master::materialize_master(self.setup, self.options)? {
            master::materialize_master_compose(self.setup, self.options, &master)?;
            boards::materialize_boards(self.setup, &master)?;
            boards::materialize_provisioning(self.setup, self.options, &master)?;
            boards::copy_health_checks(self.options, &master)?;
            report.master_host = Some(master.master.host.clone());
        }

        report.slave_hosts = slaves::materialize_slaves(self.setup, self.options)?;

        info!(
            "Generated {} host tree(s) under {}",
            report.master_host.iter().count() + report.slave_hosts.len(),
            self.options.output_dir()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_filter() {
        let mut options = GenerateOptions::default();
        assert!(options.includes_host("anything"));

        options.only_host = Some("lab-server".to_string());
        assert!(options.includes_host("lab-server"));
        assert!(!options.includes_host("local"));
    }
}
