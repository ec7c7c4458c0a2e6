//! LAVA lab setup generator
//!
//! Reads a declarative description of a LAVA lab (one master, its
//! dispatchers and their boards) and writes, for every host involved, the
//! files needed to deploy it: lava-server configuration, device
//! dictionaries, a provisioning script and a docker-compose.yml.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod constants;
pub mod error;
pub mod materialize;
pub mod output;
pub mod render;

// Re-exports for convenience
pub use config::{LabSetup, RawDocument};
pub use error::{GenError, Result};
pub use materialize::{GenerateOptions, GenerationReport, Generator};

use camino::Utf8Path;

/// Generator version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load `setup_file` and generate every host tree it describes
pub fn generate<P: AsRef<Utf8Path>>(
    setup_file: P,
    options: &GenerateOptions,
) -> Result<GenerationReport> {
    let setup = LabSetup::load(setup_file)?;
    Generator::new(&setup, options).run()
}

/// Name of the machine the generator runs on
pub fn local_hostname() -> String {
    rustix::system::uname()
        .nodename()
        .to_string_lossy()
        .into_owned()
}
