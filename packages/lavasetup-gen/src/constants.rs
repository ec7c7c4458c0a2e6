//! Global constants for lavasetup-gen
//!
//! Defines entry defaults, recognized keywords, and the relative paths of
//! every asset read and every file written by the generator.

// ============================================================================
// Command line defaults
// ============================================================================

/// Setup description read when no filename is given
pub const DEFAULT_SETUP_FILE: &str = "lava_setup.yaml";

/// Root of the generated tree
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Directory holding templates and static assets
pub const DEFAULT_ASSETS_DIR: &str = ".";

// ============================================================================
// Entry defaults
// ============================================================================

/// Name of a master that does not declare one
pub const DEFAULT_MASTER_NAME: &str = "master";

/// Name of a slave that does not declare one
pub const DEFAULT_SLAVE_NAME: &str = "slave";

/// Host used by masters and slaves that do not declare one
pub const DEFAULT_HOST: &str = "local";

/// ZMQ port lava-server collects job logs on
pub const DEFAULT_LOGGER_PORT: u16 = 5555;

/// ZMQ port dispatchers connect to
pub const DEFAULT_MASTER_PORT: u16 = 5556;

/// Database user of lava-server
pub const DEFAULT_POSTGRE_USER: &str = "lavaserver";

/// Database service name in the master docker composition
pub const DEFAULT_POSTGRE_HOSTNAME: &str = "database";

/// Default for the `superuser` and `staff` user flags
pub const DEFAULT_USER_FLAG: &str = "no";

// ============================================================================
// Recognized keywords
// ============================================================================

/// Keys a master entry may use
pub const MASTER_KEYWORDS: &[&str] = &[
    "name",
    "type",
    "host",
    "users",
    "groups",
    "postgre_password",
    "logger_port",
    "master_port",
    "postgre_user",
    "postgre_hostname",
    "zmq_auth_key",
    "zmq_auth_key_secret",
    "zmq_auth",
    "server_port",
    "dns_name",
];

/// Keys a slave entry may use
pub const SLAVE_KEYWORDS: &[&str] = &[
    "name",
    "type",
    "host",
    "users",
    "groups",
    "remote_master",
    "zmq_auth_key",
    "zmq_auth_key_secret",
    "zmq_auth",
];

/// Keys a user entry may use
pub const USER_KEYWORDS: &[&str] = &["name", "password", "superuser", "staff"];

// ============================================================================
// Asset paths (relative to the assets directory)
// ============================================================================

/// Directory of the docker composition templates
pub const COMPOSE_TEMPLATES_DIR: &str = "templates";

/// Composition of the master host
pub const MASTER_COMPOSE_TEMPLATE: &str = "docker-compose_master.jinja2";

/// Composition of a standalone dispatcher host
pub const SLAVE_COMPOSE_TEMPLATE: &str = "docker-compose_slave.jinja2";

/// Directory of the lava-server configuration templates
pub const LAVA_SERVER_ASSETS_DIR: &str = "server-overlay/etc/lava-server";

/// Template of `instance.conf`
pub const INSTANCE_TEMPLATE: &str = "instance.jinja2";

/// Template of `settings.conf`
pub const SETTINGS_TEMPLATE: &str = "settings.jinja2";

/// Dispatcher environment, copied as is
pub const ENV_FILE: &str = "env.yaml";

/// Directory of the health-check jobs
pub const HEALTH_CHECKS_ASSETS_DIR: &str =
    "server-overlay/etc/lava-server/dispatcher-config/health-checks";

/// Health-check job copied to every master
pub const HEALTH_CHECK_JOB: &str = "qemu.yaml";

/// Directory of the provisioning script template
pub const PROVISION_ASSETS_DIR: &str = "server-overlay/root";

/// Template of the provisioning script
pub const PROVISION_TEMPLATE: &str = "provision.jinja2";

/// Directory of the squid proxy configuration
pub const SQUID_ASSETS_DIR: &str = "squid";

/// Squid proxy configuration, copied as is
pub const SQUID_CONF: &str = "squid.conf";

/// Build context of the lava-server image
pub const SERVER_DOCKER_ASSETS_DIR: &str = "server-docker";

/// Dockerfile of the lava-server image
pub const SERVER_DOCKERFILE: &str = "Dockerfile";

/// Entrypoint of the lava-server image
pub const SERVER_ENTRYPOINT: &str = "entrypoint.sh";

/// Extension shared by every template and generated device descriptor
pub const TEMPLATE_EXTENSION: &str = "jinja2";

// ============================================================================
// Output names
// ============================================================================

/// Rendered lava-server instance configuration
pub const INSTANCE_CONF: &str = "instance.conf";

/// Rendered lava-server settings
pub const SETTINGS_CONF: &str = "settings.conf";

/// Docker composition written at the root of every host tree
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Provisioning script run by the lava-server entrypoint
pub const PROVISION_SCRIPT: &str = "provision.sh";

/// Overlay path as seen from the host's docker-compose.yml
pub const OVERLAY_RELATIVE_PATH: &str = "./server-overlay";

/// Owner execute bit added to the provisioning script
pub const OWNER_EXECUTE: u32 = 0o100;
