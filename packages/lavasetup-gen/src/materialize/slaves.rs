//! Standalone dispatcher hosts
//!
//! Slaves sharing a master's host were folded into the master's
//! docker-compose.yml; every other slave gets a host tree of its own with a
//! docker-compose.yml pointing at its remote master.

use log::{debug, warn};
use tera::Context;

use crate::config::{LabSetup, MasterEntry, SlaveEntry};
use crate::constants::{COMPOSE_TEMPLATES_DIR, SLAVE_COMPOSE_TEMPLATE};
use crate::error::{GenError, Result};
use crate::materialize::GenerateOptions;
use crate::output::{self, HostLayout};
use crate::render::TemplateSet;

/// Template bindings for a standalone dispatcher
pub fn slave_context(master: &MasterEntry, slave: &SlaveEntry) -> Context {
    let mut context = Context::new();
    if let Some(dns_name) = &master.dns_name {
        context.insert("LAVA_SERVER_HOSTNAME", dns_name);
    }
    context.insert("LAVA_SERVER_MASTER_PORT", &master.master_port);
    context.insert("LAVA_SERVER_LOGS_PORT", &master.logger_port);
    context.insert("DISPATCHER_HOSTNAME", &slave.name);
    for (name, value) in slave.zmq.bindings() {
        context.insert(name, value);
    }
    context
}

/// Generate every standalone slave host, returning the hosts written
pub fn materialize_slaves(setup: &LabSetup, options: &GenerateOptions) -> Result<Vec<String>> {
    let master_hosts = setup.master_hosts();
    let mut templates: Option<TemplateSet> = None;
    let mut generated: Vec<String> = Vec::new();

    for slave in &setup.slaves {
        let host = slave.host.as_str();
        if master_hosts.contains(&host) {
            continue;
        }
        if !options.includes_host(host) {
            debug!("Skipping slave {} on host {}", slave.name, host);
            continue;
        }

        let master = setup
            .find_master(&slave.remote_master)
            .ok_or_else(|| GenError::UnresolvedMaster {
                slave: slave.name.clone(),
                master: slave.remote_master.clone(),
            })?;

        if generated.iter().any(|done| done == host) {
            warn!(
                "Host {} already has a dispatcher, slave {} replaces its docker-compose.yml",
                host, slave.name
            );
        }

        let layout = HostLayout::new(options.output_dir(), host);
        output::ensure_dir(layout.root())?;

        let templates = match &mut templates {
            Some(templates) => templates,
            slot => slot.insert(TemplateSet::load(options.asset(COMPOSE_TEMPLATES_DIR))?),
        };
        templates.render_to(
            SLAVE_COMPOSE_TEMPLATE,
            &slave_context(master, slave),
            &layout.compose_file(),
        )?;

        if !generated.iter().any(|done| done == host) {
            generated.push(host.to_string());
        }
    }

    Ok(generated)
}
