//! Output tree helpers
//!
//! Directory creation is idempotent and file writes overwrite whatever was
//! there, so a second run over the same output directory converges on the
//! same tree.

pub mod layout;

pub use layout::HostLayout;

use camino::Utf8Path;
use fs_err as fs;
use log::info;
use std::os::unix::fs::PermissionsExt;

use crate::error::{GenError, Result};

/// Create directory recursively if it doesn't exist
pub fn ensure_dir<P: AsRef<Utf8Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Copy an asset unmodified into a directory, keeping its file name
pub fn copy_asset(source: &Utf8Path, target_dir: &Utf8Path) -> Result<()> {
    if !source.is_file() {
        return Err(GenError::MissingAsset(source.to_path_buf()));
    }
    let file_name = source
        .file_name()
        .ok_or_else(|| GenError::MissingAsset(source.to_path_buf()))?;
    let target = target_dir.join(file_name);

    info!("Copy: {}", target);
    fs::copy(source, &target)?;
    Ok(())
}

/// Write a generated file, replacing any previous content
pub fn write_file(path: &Utf8Path, content: &str) -> Result<()> {
    info!("Create: {}", path);
    fs::write(path, content)?;
    Ok(())
}

/// Add `bits` to the file's current permission mode
pub fn add_mode_bits(path: &Utf8Path, bits: u32) -> Result<()> {
    let mode = fs::metadata(path)?.permissions().mode();
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode | bits))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::tempdir;

    fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path).unwrap()
    }

    #[test]
    fn test_ensure_dir_is_idempotent() -> Result<()> {
        let temp_dir = tempdir()?;
        let nested = utf8(temp_dir.path().join("a/b/c"));

        ensure_dir(&nested)?;
        ensure_dir(&nested)?;
        assert!(nested.is_dir());
        Ok(())
    }

    #[test]
    fn test_copy_asset() -> Result<()> {
        let temp_dir = tempdir()?;
        let root = utf8(temp_dir.path().to_path_buf());
        let source = root.join("squid.conf");
        std::fs::write(&source, "http_port 3128\n")?;
        let target_dir = root.join("out");
        ensure_dir(&target_dir)?;

        copy_asset(&source, &target_dir)?;
        assert_eq!(std::fs::read_to_string(target_dir.join("squid.conf"))?, "http_port 3128\n");
        Ok(())
    }

    #[test]
    fn test_copy_missing_asset() {
        let err = copy_asset(Utf8Path::new("/nonexistent/squid.conf"), Utf8Path::new("/tmp"))
            .unwrap_err();
        assert!(matches!(err, GenError::MissingAsset(_)));
    }

    #[test]
    fn test_add_mode_bits_keeps_existing_mode() -> Result<()> {
        let temp_dir = tempdir()?;
        let script = utf8(temp_dir.path().join("provision.sh"));
        write_file(&script, "#!/bin/sh\n")?;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o640))?;

        add_mode_bits(&script, 0o100)?;
        let mode = std::fs::metadata(&script)?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o740);
        Ok(())
    }
}
