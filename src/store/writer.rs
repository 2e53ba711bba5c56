//! Store serializer
//!
//! Artifacts are written to a temporary file next to the destination and
//! renamed into place on `commit`, so a crash mid-build never leaves a
//! half-written store behind. `publish` moves several staged artifacts into
//! place together and rolls back the ones already renamed if a later rename
//! fails. A SHA-256 digest of the bytes is computed on the
//! way out for reproducibility checks.

use super::{NumberRecord, SequenceRecord};
use crate::error::{Result, VoeisError};
use sha2::{Digest, Sha256};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

/// Characters that would break the line grammar if left in a name
const NAME_BREAKS: [char; 3] = ['\t', '\n', '\r'];

/// Write one sequence artifact line
///
/// Tabs and line breaks inside the name are flattened to spaces so the line
/// stays parseable.
pub fn write_sequence_line<W: Write>(out: &mut W, record: &SequenceRecord) -> io::Result<()> {
    write!(out, "{}\t", record.id.number())?;
    if record.name.contains(NAME_BREAKS) {
        out.write_all(record.name.replace(NAME_BREAKS, " ").as_bytes())?;
    } else {
        out.write_all(record.name.as_bytes())?;
    }
    out.write_all(b"\t")?;
    write_joined(out, record.terms.iter(), " ")?;
    out.write_all(b"\n")
}

/// Write one number artifact line
pub fn write_number_line<W: Write>(out: &mut W, record: &NumberRecord) -> io::Result<()> {
    write!(
        out,
        "{} {} {}\t",
        record.value, record.total_count, record.total_sequence_count
    )?;

    for (i, (position, count)) in record.index_counts.iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        write!(out, "{position} {count}")?;
    }
    out.write_all(b"\t")?;

    for (slot, table) in record.neighbors.iter().enumerate() {
        if slot > 0 {
            out.write_all(b";")?;
        }
        for (i, neighbor) in table.iter().enumerate() {
            if i > 0 {
                out.write_all(b",")?;
            }
            write!(out, "{} {}", neighbor.value, neighbor.count)?;
        }
    }
    out.write_all(b"\n")
}

fn write_joined<W: Write, T: std::fmt::Display>(
    out: &mut W,
    items: impl Iterator<Item = T>,
    sep: &str,
) -> io::Result<()> {
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.write_all(sep.as_bytes())?;
        }
        write!(out, "{item}")?;
    }
    Ok(())
}

/// Passes bytes through while hashing them
struct DigestWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// An artifact being written; invisible at its final path until `commit`
pub struct ArtifactWriter {
    path: PathBuf,
    out: BufWriter<DigestWriter<NamedTempFile>>,
}

impl ArtifactWriter {
    /// Start writing the artifact that will end up at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| VoeisError::io(&dir, e))?;
        let temp = NamedTempFile::new_in(&dir).map_err(|e| VoeisError::io(&dir, e))?;

        Ok(Self {
            path,
            out: BufWriter::new(DigestWriter {
                inner: temp,
                hasher: Sha256::new(),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_sequence(&mut self, record: &SequenceRecord) -> Result<()> {
        write_sequence_line(&mut self.out, record).map_err(|e| VoeisError::io(&self.path, e))
    }

    pub fn write_number(&mut self, record: &NumberRecord) -> Result<()> {
        write_number_line(&mut self.out, record).map_err(|e| VoeisError::io(&self.path, e))
    }

    /// Flush and fsync the staged bytes without publishing them
    pub fn finish(self) -> Result<StagedArtifact> {
        let path = self.path;
        let digest_writer = self
            .out
            .into_inner()
            .map_err(|e| VoeisError::io(&path, e.into_error()))?;
        let digest = hex::encode(digest_writer.hasher.finalize());
        let temp = digest_writer.inner;
        temp.as_file().sync_all().map_err(|e| VoeisError::io(&path, e))?;

        Ok(StagedArtifact { path, temp, digest })
    }

    /// Finish and atomically move the artifact into place
    ///
    /// Returns the hex SHA-256 digest of the written bytes. Any existing file
    /// at the destination is replaced.
    pub fn commit(self) -> Result<String> {
        self.finish()?.persist()
    }
}

/// A fully written artifact still sitting in its temporary file
#[derive(Debug)]
pub struct StagedArtifact {
    path: PathBuf,
    temp: NamedTempFile,
    digest: String,
}

impl StagedArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hex SHA-256 of the staged bytes
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Rename into place, replacing any existing file
    pub fn persist(self) -> Result<String> {
        let Self { path, temp, digest } = self;
        temp.persist(&path).map_err(|e| VoeisError::io(&path, e.error))?;
        Ok(digest)
    }
}

/// Link (or copy) the current file at `path` into `backup_dir`
fn back_up(path: &Path, backup_dir: &Path) -> Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    let name = path.file_name().ok_or_else(|| {
        VoeisError::MalformedArtifact(format!("no file name in {}", path.display()))
    })?;
    let backup = backup_dir.join(name);
    if std::fs::hard_link(path, &backup).is_err() {
        std::fs::copy(path, &backup).map_err(|e| VoeisError::io(path, e))?;
    }
    Ok(Some(backup))
}

/// Put the pre-publish state of `path` back
fn restore(path: &Path, backup: Option<&Path>) -> io::Result<()> {
    match backup {
        Some(backup) => std::fs::rename(backup, path),
        None => std::fs::remove_file(path),
    }
}

/// Publish several staged artifacts as one unit
///
/// Existing destinations are linked into a backup directory first. If any
/// rename fails, the artifacts already published are rolled back, so
/// readers see either all the old files or all the new ones (apart from the
/// short window between renames). Digests come back in input order.
pub fn publish(staged: Vec<StagedArtifact>) -> Result<Vec<String>> {
    let Some(first) = staged.first() else {
        return Ok(Vec::new());
    };
    let dir = match first.path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let backup_dir = tempfile::Builder::new()
        .prefix(".voeis-backup-")
        .tempdir_in(&dir)
        .map_err(|e| VoeisError::io(&dir, e))?;

    let mut backups = Vec::with_capacity(staged.len());
    for artifact in &staged {
        backups.push(back_up(&artifact.path, backup_dir.path())?);
    }

    let mut digests = Vec::with_capacity(staged.len());
    let mut published: Vec<(PathBuf, Option<PathBuf>)> = Vec::new();
    for (artifact, backup) in staged.into_iter().zip(backups) {
        let path = artifact.path.clone();
        match artifact.persist() {
            Ok(digest) => {
                digests.push(digest);
                published.push((path, backup));
            }
            Err(e) => {
                for (path, backup) in published.iter().rev() {
                    if let Err(restore_err) = restore(path, backup.as_deref()) {
                        warn!(path = %path.display(), "rollback failed: {restore_err}");
                    }
                }
                return Err(e);
            }
        }
    }

    Ok(digests)
}

/// Write a complete sequence artifact, returning its digest
pub fn write_sequences<'a>(
    path: impl AsRef<Path>,
    records: impl IntoIterator<Item = &'a SequenceRecord>,
) -> Result<String> {
    let mut writer = ArtifactWriter::create(path)?;
    for record in records {
        writer.write_sequence(record)?;
    }
    writer.commit()
}

/// Write a complete number artifact, returning its digest
pub fn write_numbers<'a>(
    path: impl AsRef<Path>,
    records: impl IntoIterator<Item = &'a NumberRecord>,
) -> Result<String> {
    let mut writer = ArtifactWriter::create(path)?;
    for record in records {
        writer.write_number(record)?;
    }
    writer.commit()
}
