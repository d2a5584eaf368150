//! ZIP archive extraction and repackaging

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{CoreError, Result};

/// Extract a ZIP archive into `dest`.
///
/// Relative paths are preserved; on Unix, permission bits and symlinks are
/// restored so bundle executables stay executable after extraction.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|source| CoreError::Archive {
        path: archive.to_path_buf(),
        source,
    })?;

    fs::create_dir_all(dest)?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|source| CoreError::Archive {
            path: archive.to_path_buf(),
            source,
        })?;

        // Entries with hostile paths are skipped rather than extracted.
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }

        #[cfg(unix)]
        {
            let unix_mode = entry.unix_mode();
            let is_symlink = unix_mode
                .map(|mode| (mode & 0o170000) == 0o120000)
                .unwrap_or(false);

            if is_symlink {
                let mut target = String::new();
                entry.read_to_string(&mut target)?;
                if outpath.symlink_metadata().is_ok() {
                    fs::remove_file(&outpath)?;
                }
                std::os::unix::fs::symlink(&target, &outpath)?;
                continue;
            }

            let mut outfile = File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;

            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = unix_mode {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o7777))?;
            }
        }

        #[cfg(not(unix))]
        {
            let mut outfile = File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;
        }
    }

    Ok(())
}

/// Repackage a directory tree into a new ZIP archive at `archive`.
///
/// Every file under `tree` is stored with its path relative to `tree`. An
/// existing file at `archive` is replaced, never appended to.
pub fn create(tree: &Path, archive: &Path) -> Result<()> {
    if archive.exists() {
        fs::remove_file(archive)?;
    }

    let file = File::create(archive)?;
    let mut zip = ZipWriter::new(file);
    let zip_err = |source| CoreError::Archive {
        path: archive.to_path_buf(),
        source,
    };

    for entry in WalkDir::new(tree).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry.path().strip_prefix(tree).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "path escaped the tree root")
        })?;
        let name = relative.to_string_lossy().replace('\\', "/");

        let file_type = entry.file_type();
        if file_type.is_dir() {
            zip.add_directory(format!("{name}/"), SimpleFileOptions::default())
                .map_err(zip_err)?;
            continue;
        }

        #[cfg(unix)]
        if file_type.is_symlink() {
            let target = fs::read_link(entry.path())?;
            zip.add_symlink(
                name.as_str(),
                target.to_string_lossy().as_ref(),
                SimpleFileOptions::default(),
            )
            .map_err(zip_err)?;
            continue;
        }

        let options = entry_options(&entry)?;
        zip.start_file(name.as_str(), options).map_err(zip_err)?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut zip)?;
    }

    zip.finish().map_err(zip_err)?;
    Ok(())
}

#[cfg(unix)]
fn entry_options(entry: &walkdir::DirEntry) -> Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;
    let mode = entry.metadata().map_err(io::Error::from)?.permissions().mode();
    Ok(SimpleFileOptions::default().unix_permissions(mode & 0o7777))
}

#[cfg(not(unix))]
fn entry_options(_entry: &walkdir::DirEntry) -> Result<SimpleFileOptions> {
    Ok(SimpleFileOptions::default())
}
