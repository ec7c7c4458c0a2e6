//! Device dictionaries, provisioning script and health checks for the
//! master host

use log::info;
use tera::Context;

use crate::config::{BoardEntry, LabSetup};
use crate::constants::{
    HEALTH_CHECKS_ASSETS_DIR, HEALTH_CHECK_JOB, OWNER_EXECUTE, PROVISION_ASSETS_DIR,
    PROVISION_TEMPLATE,
};
use crate::error::{GenError, Result};
use crate::materialize::{GenerateOptions, MasterOutput};
use crate::output;
use crate::render::{device_descriptor, TemplateSet};

/// Write one device dictionary per board.
///
/// Every board must reference a declared slave; all references are checked
/// before the first file is written.
pub fn materialize_boards(setup: &LabSetup, generated: &MasterOutput<'_>) -> Result<()> {
    let Some(boards) = &setup.boards else {
        return Ok(());
    };

    if let Some(board) = boards
        .iter()
        .find(|board| setup.find_slave(&board.slave).is_none())
    {
        return Err(GenError::UnresolvedSlave {
            board: board.name.clone(),
            slave: board.slave.clone(),
        });
    }

    output::ensure_dir(generated.layout.devices_dir())?;
    for board in boards {
        info!("Create device dictionary for {}", board.name);
        output::write_file(
            &generated.layout.device_file(&board.name),
            &device_descriptor(board),
        )?;
    }
    Ok(())
}

/// Context for the provisioning script: every user of the master and every
/// board of the lab
pub fn provisioning_context(setup: &LabSetup, generated: &MasterOutput<'_>) -> Context {
    let boards: &[BoardEntry] = setup.boards.as_deref().unwrap_or_default();

    let mut context = Context::new();
    context.insert("USERS", &generated.master.users);
    context.insert("BOARDS", boards);
    context
}

/// Render `entrypoint.d/provision.sh` and make it executable
pub fn materialize_provisioning(
    setup: &LabSetup,
    options: &GenerateOptions,
    generated: &MasterOutput<'_>,
) -> Result<()> {
    let context = provisioning_context(setup, generated);
    let script = generated.layout.provision_script();

    output::ensure_dir(generated.layout.entrypoint_dir())?;
    let templates = TemplateSet::load(options.asset(PROVISION_ASSETS_DIR))?;
    templates.render_to(PROVISION_TEMPLATE, &context, &script)?;

    output::add_mode_bits(&script, OWNER_EXECUTE)
}

/// Copy the default health-check job next to the device dictionaries
pub fn copy_health_checks(options: &GenerateOptions, generated: &MasterOutput<'_>) -> Result<()> {
    info!("Copy health-check jobs");
    output::copy_asset(
        &options.asset(HEALTH_CHECKS_ASSETS_DIR).join(HEALTH_CHECK_JOB),
        &generated.layout.health_checks_dir(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawDocument;
    use crate::materialize::master::master_context;
    use crate::output::HostLayout;
    use camino::Utf8PathBuf;

    fn setup(yaml: &str) -> LabSetup {
        LabSetup::from_raw(&RawDocument::parse(yaml).unwrap()).unwrap()
    }

    fn generated<'a>(lab: &'a LabSetup, output_dir: &Utf8PathBuf) -> MasterOutput<'a> {
        let master = &lab.masters[0];
        MasterOutput {
            master,
            context: master_context(master),
            layout: HostLayout::new(output_dir, &master.host),
        }
    }

    #[test]
    fn test_unresolved_slave_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_dir = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).unwrap();
        let lab = setup(
            r#"
masters:
  - postgre_password: x
slaves:
  - name: worker
    host: rack
    remote_master: master
boards:
  - name: good
    type: qemu
    slave: worker
  - name: bad
    type: qemu
    slave: ghost
"#,
        );
        let master_out = generated(&lab, &output_dir);

        let err = materialize_boards(&lab, &master_out).unwrap_err();
        assert!(matches!(err, GenError::UnresolvedSlave { ref board, ref slave }
            if board == "bad" && slave == "ghost"));
        assert!(!master_out.layout.device_file("good").exists());
        assert!(!master_out.layout.devices_dir().exists());
    }

    #[test]
    fn test_no_boards_key_is_a_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_dir = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).unwrap();
        let lab = setup("masters:\n  - postgre_password: x");

        materialize_boards(&lab, &generated(&lab, &output_dir)).unwrap();
        assert!(!output_dir.join("local").exists());
    }

    #[test]
    fn test_provisioning_context() {
        let lab = setup(
            r#"
masters:
  - postgre_password: x
    users:
      - name: admin
        password: secret
        superuser: "yes"
"#,
        );
        let output_dir = Utf8PathBuf::from("output");
        let context = provisioning_context(&lab, &generated(&lab, &output_dir)).into_json();

        assert_eq!(context["USERS"][0]["name"], "admin");
        assert_eq!(context["USERS"][0]["staff"], "no");
        assert_eq!(context["BOARDS"], tera::Value::Array(Vec::new()));
    }
}
