use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

use log::{debug, error, info};
use zip::ZipArchive;

use crate::config::FetchConfig;
use crate::error::ExtractError;
use crate::progress::ProgressFn;

/// Label shown on the extraction progress line.
pub const EXTRACT_LABEL: &str = "Decompression";

/// Expands the downloaded archive into the target directory.
pub struct Extractor {
    /// Archive to read. Never modified or removed.
    pub archive_path: PathBuf,
    /// Directory receiving the members.
    pub target_dir: PathBuf,
    /// Optional progress callback.
    pub progress: Option<ProgressFn>,
}

impl Extractor {
    /// Create an extractor for an explicit archive and target directory.
    pub fn new(archive_path: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
            target_dir: target_dir.into(),
            progress: None,
        }
    }

    /// Create an extractor for the archive and extraction directory of `config`.
    pub fn from_config(config: &FetchConfig, progress: Option<ProgressFn>) -> Self {
        Self {
            archive_path: config.archive_path(),
            target_dir: config.extract_dir(),
            progress,
        }
    }

    /// Extract every member of the archive.
    ///
    /// Returns `false` and logs the reason when the archive is missing, fails
    /// its integrity test, or a member cannot be written.
    pub fn extract_archive(&self) -> bool {
        match self.try_extract() {
            Ok(_) => true,
            Err(e) => {
                error!("Decompression unsuccessful: {e}");
                false
            }
        }
    }

    /// Extract every member, returning how many were extracted.
    ///
    /// Nothing is written, and the target directory is not created, unless the
    /// whole archive passes [`test_archive`].
    pub fn try_extract(&self) -> Result<usize, ExtractError> {
        if !self.archive_path.is_file() {
            return Err(ExtractError::Missing(self.archive_path.clone()));
        }

        let file =
            File::open(&self.archive_path).map_err(ExtractError::io(&self.archive_path))?;
        let mut archive = ZipArchive::new(file).map_err(|source| ExtractError::Open {
            path: self.archive_path.clone(),
            source,
        })?;

        test_archive(&mut archive)?;

        fs::create_dir_all(&self.target_dir).map_err(ExtractError::io(&self.target_dir))?;

        let total = archive.len();
        for i in 0..total {
            self.extract_member(&mut archive, i)?;

            if let Some(progress) = &self.progress {
                progress(EXTRACT_LABEL, (i + 1) as f64 / total as f64);
            }
        }

        info!(
            "extracted {total} members from {} into {}",
            self.archive_path.display(),
            self.target_dir.display()
        );
        Ok(total)
    }

    fn extract_member(
        &self,
        archive: &mut ZipArchive<File>,
        index: usize,
    ) -> Result<(), ExtractError> {
        let mut member = archive.by_index(index).map_err(|e| ExtractError::Corrupted {
            member: format!("#{index}"),
            reason: e.to_string(),
        })?;
        let relative = member
            .enclosed_name()
            .ok_or_else(|| ExtractError::UnsafePath(member.name().to_owned()))?;
        let outpath = self.target_dir.join(relative);

        if member.is_dir() {
            fs::create_dir_all(&outpath).map_err(ExtractError::io(&outpath))?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).map_err(ExtractError::io(parent))?;
            }
            // A read-only copy from a previous update cannot be truncated in place.
            if fs::symlink_metadata(&outpath).is_ok_and(|meta| meta.is_file()) {
                fs::remove_file(&outpath).map_err(ExtractError::io(&outpath))?;
            }
            let mut out = File::create(&outpath).map_err(ExtractError::io(&outpath))?;
            io::copy(&mut member, &mut out).map_err(ExtractError::io(&outpath))?;
        }

        // Preserve permission bits on Unix; directories stay owner-writable so
        // their members, now or on the next update, can be written.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mut mode) = member.unix_mode() {
                if member.is_dir() {
                    mode |= 0o200;
                }
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))
                    .map_err(ExtractError::io(&outpath))?;
            }
        }

        debug!("extracted {}", outpath.display());
        Ok(())
    }
}

/// Verify every member of `archive` without writing anything.
///
/// Each file member is decompressed into a sink so its CRC-32 is checked, and
/// each member name must stay inside the extraction directory.
pub fn test_archive<R>(archive: &mut ZipArchive<R>) -> Result<(), ExtractError>
where
    R: io::Read + io::Seek,
{
    for i in 0..archive.len() {
        let mut member = archive.by_index(i).map_err(|e| ExtractError::Corrupted {
            member: format!("#{i}"),
            reason: e.to_string(),
        })?;
        if member.enclosed_name().is_none() {
            return Err(ExtractError::UnsafePath(member.name().to_owned()));
        }
        if member.is_dir() {
            continue;
        }
        io::copy(&mut member, &mut io::sink()).map_err(|e| ExtractError::Corrupted {
            member: member.name().to_owned(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}
