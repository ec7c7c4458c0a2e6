//! Per-host output paths

use camino::{Utf8Path, Utf8PathBuf};

use crate::constants::{
    COMPOSE_FILE, PROVISION_SCRIPT, SERVER_DOCKER_ASSETS_DIR, SQUID_ASSETS_DIR, TEMPLATE_EXTENSION,
};

/// Paths of everything generated for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLayout {
    root: Utf8PathBuf,
}

impl HostLayout {
    /// Layout of `host` under `output_dir`
    pub fn new(output_dir: &Utf8Path, host: &str) -> Self {
        Self {
            root: output_dir.join(host),
        }
    }

    /// output/<host>/
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// output/<host>/docker-compose.yml
    pub fn compose_file(&self) -> Utf8PathBuf {
        self.root.join(COMPOSE_FILE)
    }

    /// output/<host>/server-overlay/etc/lava-server/
    pub fn lava_server_dir(&self) -> Utf8PathBuf {
        self.root.join("server-overlay/etc/lava-server")
    }

    /// output/<host>/server-overlay/etc/lava-server/dispatcher-config/devices/
    pub fn devices_dir(&self) -> Utf8PathBuf {
        self.lava_server_dir().join("dispatcher-config/devices")
    }

    /// output/<host>/.../dispatcher-config/devices/<board>.jinja2
    pub fn device_file(&self, board: &str) -> Utf8PathBuf {
        self.devices_dir().join(format!("{}.{}", board, TEMPLATE_EXTENSION))
    }

    /// output/<host>/server-overlay/etc/lava-server/dispatcher-config/health-checks/
    pub fn health_checks_dir(&self) -> Utf8PathBuf {
        self.lava_server_dir().join("dispatcher-config/health-checks")
    }

    /// output/<host>/server-overlay/root/entrypoint.d/
    pub fn entrypoint_dir(&self) -> Utf8PathBuf {
        self.root.join("server-overlay/root/entrypoint.d")
    }

    /// output/<host>/server-overlay/root/entrypoint.d/provision.sh
    pub fn provision_script(&self) -> Utf8PathBuf {
        self.entrypoint_dir().join(PROVISION_SCRIPT)
    }

    /// output/<host>/squid/
    pub fn squid_dir(&self) -> Utf8PathBuf {
        self.root.join(SQUID_ASSETS_DIR)
    }

    /// output/<host>/server-docker/
    pub fn server_docker_dir(&self) -> Utf8PathBuf {
        self.root.join(SERVER_DOCKER_ASSETS_DIR)
    }

    /// Directories making up a master host's skeleton
    pub fn master_skeleton(&self) -> Vec<Utf8PathBuf> {
        vec![
            self.devices_dir(),
            self.health_checks_dir(),
            self.entrypoint_dir(),
            self.squid_dir(),
            self.server_docker_dir(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_paths() {
        let layout = HostLayout::new(Utf8Path::new("output"), "local");

        assert_eq!(layout.root().as_str(), "output/local");
        assert_eq!(layout.compose_file().as_str(), "output/local/docker-compose.yml");
        assert_eq!(
            layout.device_file("qemu-01").as_str(),
            "output/local/server-overlay/etc/lava-server/dispatcher-config/devices/qemu-01.jinja2"
        );
        assert_eq!(
            layout.provision_script().as_str(),
            "output/local/server-overlay/root/entrypoint.d/provision.sh"
        );
        assert_eq!(layout.master_skeleton().len(), 5);
    }
}
