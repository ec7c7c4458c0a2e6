use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use lavasetup_gen::constants::{DEFAULT_ASSETS_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_SETUP_FILE};
use lavasetup_gen::{GenError, GenerateOptions, VERSION};
use log::{debug, error, LevelFilter};

#[derive(Parser)]
#[command(name = "lavasetup-gen", version, about = "Generate LAVA host setup")]
struct Cli {
    /// Verbosity level: 0 = ERROR, 1 = WARNING, 2 = INFO, 3 = DEBUG
    #[arg(short, long, value_name = "level", default_value_t = 0)]
    verbose: u8,

    /// Generate configuration only for the current hostname
    #[arg(short, long)]
    only_hostname: bool,

    /// LAVA setup description file
    #[arg(short = 'f', long = "filename", value_name = "filename",
          env = "LAVASETUP_FILE", default_value = DEFAULT_SETUP_FILE)]
    setup_file: Utf8PathBuf,

    /// Directory holding templates and static assets
    #[arg(long, value_name = "dir", env = "LAVASETUP_ASSETS_DIR", default_value = DEFAULT_ASSETS_DIR)]
    assets_dir: Utf8PathBuf,

    /// Root of the generated host trees
    #[arg(long, value_name = "dir", env = "LAVASETUP_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: Utf8PathBuf,
}

fn level_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn init_logger(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(level_filter(verbose))
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .target(env_logger::Target::Stdout)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let options = GenerateOptions {
        assets_dir: cli.assets_dir.clone(),
        output_dir: cli.output_dir.clone(),
        only_host: cli.only_hostname.then(lavasetup_gen::local_hostname),
    };

    lavasetup_gen::generate(&cli.setup_file, &options)
        .with_context(|| format!("Failed to generate lab setup from {}", cli.setup_file))?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    debug!("lavasetup-gen {}", VERSION);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<GenError>() {
                Some(gen_err) if gen_err.is_validation() => error!("{:#}", err),
                _ => {
                    error!("{:#}", err);
                    eprintln!("{:?}", err);
                }
            }
            ExitCode::FAILURE
        }
    }
}
