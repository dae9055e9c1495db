//! Chart archive extraction.
//!
//! Streams a gzip-compressed tar through `flate2` and `tar`, writing directory
//! and regular-file entries under the archive's own directory. Links, devices
//! and other special entries are skipped. Entries that would land outside the
//! destination (absolute paths, `..`) are rejected before anything is written.

use flate2::read::GzDecoder;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use tar::EntryType;

use crate::config::ExtractConfig;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("error opening archive {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error reading tar archive")]
    Read(#[source] io::Error),
    #[error("unsafe entry path {0} (absolute or contains '..')")]
    UnsafePath(PathBuf),
    #[error("entry {path} declares {size} bytes, limit is {limit}")]
    EntryTooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("error creating directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error creating file {path}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error writing to file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What an extraction wrote to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractSummary {
    pub directories: usize,
    pub files: usize,
    /// Entries of any other type (symlinks, hard links, devices).
    pub skipped: usize,
}

impl ExtractSummary {
    pub fn entries_written(&self) -> usize {
        self.directories + self.files
    }
}

/// Directory an archive extracts into: the directory containing it.
pub fn destination_of(archive: &Path) -> &Path {
    match archive.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Extract `archive` next to itself with default limits.
pub fn extract_tgz(archive: &Path) -> Result<ExtractSummary, ArchiveError> {
    extract_tgz_with(archive, &ExtractConfig::default())
}

pub fn extract_tgz_with(
    archive: &Path,
    limits: &ExtractConfig,
) -> Result<ExtractSummary, ArchiveError> {
    let file = File::open(archive).map_err(|source| ArchiveError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let dest = destination_of(archive);
    tracing::debug!(archive = %archive.display(), dest = %dest.display(), "extracting");
    unpack_into(BufReader::new(file), dest, limits)
}

/// Unpack a gzip tar stream into `dest`, preserving the archive's internal structure.
pub fn unpack_into<R: Read>(
    reader: R,
    dest: &Path,
    limits: &ExtractConfig,
) -> Result<ExtractSummary, ArchiveError> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    let mut summary = ExtractSummary::default();

    for entry in archive.entries().map_err(ArchiveError::Read)? {
        let mut entry = entry.map_err(ArchiveError::Read)?;
        let rel = entry.path().map_err(ArchiveError::Read)?.into_owned();
        check_entry_path(&rel)?;
        let dest_path = dest.join(&rel);

        match entry.header().entry_type() {
            EntryType::Directory => {
                create_dir(&dest_path)?;
                summary.directories += 1;
            }
            EntryType::Regular => {
                let size = entry.header().size().map_err(ArchiveError::Read)?;
                if let Some(limit) = limits.max_entry_bytes {
                    if size > limit {
                        return Err(ArchiveError::EntryTooLarge {
                            path: rel,
                            size,
                            limit,
                        });
                    }
                }
                if let Some(parent) = dest_path.parent() {
                    create_dir(parent)?;
                }
                let mut out = File::create(&dest_path).map_err(|source| ArchiveError::CreateFile {
                    path: dest_path.clone(),
                    source,
                })?;
                io::copy(&mut entry, &mut out).map_err(|source| ArchiveError::Write {
                    path: dest_path.clone(),
                    source,
                })?;
                summary.files += 1;
            }
            other => {
                tracing::debug!(path = %rel.display(), "skipping {:?} entry", other);
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

fn create_dir(path: &Path) -> Result<(), ArchiveError> {
    fs::create_dir_all(path).map_err(|source| ArchiveError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn check_entry_path(path: &Path) -> Result<(), ArchiveError> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::UnsafePath(path.to_path_buf()));
            }
        }
    }
    Ok(())
}

/// Remove a directory tree if present. Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
