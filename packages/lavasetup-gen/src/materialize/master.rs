//! Master host generation
//!
//! Builds the master's directory skeleton, copies the static assets the
//! server container needs, renders the lava-server configuration and the
//! host's docker-compose.yml. A dispatcher sharing the master's host is
//! folded into that docker-compose.yml.

use log::{debug, info, warn};
use tera::Context;

use crate::config::{LabSetup, MasterEntry, SlaveEntry};
use crate::constants::{
    COMPOSE_TEMPLATES_DIR, ENV_FILE, INSTANCE_CONF, INSTANCE_TEMPLATE, LAVA_SERVER_ASSETS_DIR,
    MASTER_COMPOSE_TEMPLATE, OVERLAY_RELATIVE_PATH, SERVER_DOCKERFILE, SERVER_DOCKER_ASSETS_DIR,
    SERVER_ENTRYPOINT, SETTINGS_CONF, SETTINGS_TEMPLATE, SQUID_ASSETS_DIR, SQUID_CONF,
};
use crate::error::{GenError, Result};
use crate::materialize::GenerateOptions;
use crate::output::{self, HostLayout};
use crate::render::TemplateSet;

/// What later stages need from the master stage
#[derive(Debug)]
pub struct MasterOutput<'a> {
    /// The normalized master
    pub master: &'a MasterEntry,
    /// Bindings used for the master's templates
    pub context: Context,
    /// Paths of the master host tree
    pub layout: HostLayout,
}

/// Generate the master host tree.
///
/// Returns `None` when the setup has no master or when the master lives on
/// a host excluded by the host filter.
pub fn materialize_master<'a>(
    setup: &'a LabSetup,
    options: &GenerateOptions,
) -> Result<Option<MasterOutput<'a>>> {
    let master = match setup.masters.as_slice() {
        [] => {
            debug!("No master declared");
            return Ok(None);
        }
        [master] => master,
        masters => return Err(GenError::TooManyMasters(masters.len())),
    };

    if !options.includes_host(&master.host) {
        debug!("Skipping master {} on host {}", master.name, master.host);
        return Ok(None);
    }

    let layout = HostLayout::new(options.output_dir(), &master.host);
    output::ensure_dir(layout.root())?;
    for dir in layout.master_skeleton() {
        output::ensure_dir(&dir)?;
    }

    let context = master_context(master);

    info!("Copy Squid configuration");
    output::copy_asset(
        &options.asset(SQUID_ASSETS_DIR).join(SQUID_CONF),
        &layout.squid_dir(),
    )?;

    info!("Copy Dockerfile and entrypoint for master");
    let server_docker = options.asset(SERVER_DOCKER_ASSETS_DIR);
    output::copy_asset(&server_docker.join(SERVER_DOCKERFILE), &layout.server_docker_dir())?;
    output::copy_asset(&server_docker.join(SERVER_ENTRYPOINT), &layout.server_docker_dir())?;

    let lava_server_dir = layout.lava_server_dir();
    output::copy_asset(
        &options.asset(LAVA_SERVER_ASSETS_DIR).join(ENV_FILE),
        &lava_server_dir,
    )?;

    let templates = TemplateSet::load(options.asset(LAVA_SERVER_ASSETS_DIR))?;
    templates.render_to(INSTANCE_TEMPLATE, &context, &lava_server_dir.join(INSTANCE_CONF))?;
    templates.render_to(SETTINGS_TEMPLATE, &context, &lava_server_dir.join(SETTINGS_CONF))?;

    Ok(Some(MasterOutput {
        master,
        context,
        layout,
    }))
}

/// Template bindings describing the master.
///
/// Optional settings are only bound when given, so a template using one
/// the setup file leaves out fails to render.
pub fn master_context(master: &MasterEntry) -> Context {
    let mut context = Context::new();
    context.insert("LAVA_SERVER_DB_HOSTNAME", &master.postgre_hostname);
    context.insert("POSTGRES_USER", &master.postgre_user);
    context.insert("POSTGRES_PASSWORD", &master.postgre_password);
    context.insert("LAVA_SERVER_HOSTNAME", &master.name);
    context.insert("LAVA_SERVER_MASTER_PORT", &master.master_port);
    context.insert("LAVA_SERVER_LOGS_PORT", &master.logger_port);
    context.insert("LAVA_SERVER_OVERLAY_PATH", OVERLAY_RELATIVE_PATH);

    if let Some(dns_name) = &master.dns_name {
        context.insert("LAVA_SERVER_DNS_HOSTNAME", dns_name);
    }
    if let Some(server_port) = &master.server_port {
        context.insert("LAVA_SERVER_HOST_PORT", server_port);
    }
    for (name, value) in master.zmq.bindings() {
        context.insert(name, value);
    }
    context
}

/// The dispatcher sharing the master's host, if any.
///
/// A master host runs at most one co-located dispatcher.
pub fn colocated_slave<'a>(
    setup: &'a LabSetup,
    master: &MasterEntry,
) -> Result<Option<&'a SlaveEntry>> {
    let mut found: Option<&SlaveEntry> = None;
    for slave in setup.slaves.iter().filter(|slave| slave.host == master.host) {
        if let Some(first) = found {
            return Err(GenError::TooManyColocatedSlaves {
                host: master.host.clone(),
                first: first.name.clone(),
                second: slave.name.clone(),
            });
        }
        info!("Master has slave {}", slave.name);
        if slave.remote_master != master.name {
            warn!(
                "Slave {} shares host {} with master {} but reports to {}",
                slave.name, master.host, master.name, slave.remote_master
            );
        }
        found = Some(slave);
    }
    Ok(found)
}

/// Render the master host's docker-compose.yml
pub fn materialize_master_compose(
    setup: &LabSetup,
    options: &GenerateOptions,
    generated: &MasterOutput<'_>,
) -> Result<()> {
    let mut context = generated.context.clone();

    match colocated_slave(setup, generated.master)? {
        Some(slave) => {
            context.insert("HAVE_SLAVE", &true);
            context.insert("DISPATCHER_HOSTNAME", &slave.name);
        }
        None => context.insert("HAVE_SLAVE", &false),
    }

    let templates = TemplateSet::load(options.asset(COMPOSE_TEMPLATES_DIR))?;
    templates.render_to(
        MASTER_COMPOSE_TEMPLATE,
        &context,
        &generated.layout.compose_file(),
    )
}
