use sha2::{Digest, Sha256};
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use vision::{reference_images, LoadError};

/// Hex SHA-256 of the file's contents.
pub fn file_digest(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Files named directly, plus the reference images inside named directories.
pub fn expand(paths: &[PathBuf]) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(reference_images(path)?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Log the digest of every reference image in `dir`.
pub fn log_reference_digests(dir: &Path) {
    let files = match reference_images(dir) {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "cannot list reference images for hashing");
            return;
        }
    };
    for file in files {
        match file_digest(&file) {
            Ok(sha256) => debug!(file = %file.display(), %sha256, "reference image digest"),
            Err(e) => warn!(file = %file.display(), error = %e, "cannot hash reference image"),
        }
    }
}
