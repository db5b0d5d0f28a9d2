//! Filesystem infrastructure — implements `ArtifactWriter`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ArtifactWriter;

/// Writes generated files to the local filesystem. Shell scripts are made
/// executable.
pub struct LocalFs;

impl ArtifactWriter for LocalFs {
    fn write_files(&self, dir: &Path, files: &[(&str, &str)]) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
        let mut written = Vec::with_capacity(files.len());
        for (name, content) in files {
            let path = dir.join(name);
            std::fs::write(&path, content)
                .with_context(|| format!("writing file {}", path.display()))?;
            #[cfg(unix)]
            if name.ends_with(".sh") {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                    .with_context(|| format!("setting permissions on {}", path.display()))?;
            }
            written.push(path);
        }
        Ok(written)
    }
}
