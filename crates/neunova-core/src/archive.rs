//! In-memory ZIP bundling for batch operations.
//!
//! A batch (split, page rendering) appends one entry per unit and only
//! calls [`ArchiveBuilder::finish`] once every unit has succeeded. Dropping
//! the builder early discards everything, so a failed unit never leaks a
//! partial archive to the caller.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PdfError;

pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(9)),
            entries: 0,
        }
    }

    /// Append a named entry.
    pub fn append(&mut self, name: &str, data: &[u8]) -> Result<(), PdfError> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(data)?;
        self.entries += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Write the central directory and hand back the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>, PdfError> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an archive from `units`, rendering each with `render`.
///
/// All-or-nothing: the first failing unit aborts the batch.
pub fn collect_archive<T, E, F>(
    units: impl IntoIterator<Item = T>,
    mut render: F,
) -> Result<Vec<u8>, E>
where
    F: FnMut(T) -> Result<(String, Vec<u8>), E>,
    E: From<PdfError>,
{
    let mut archive = ArchiveBuilder::new();
    for unit in units {
        let (name, data) = render(unit)?;
        archive.append(&name, &data)?;
    }
    Ok(archive.finish()?)
}
