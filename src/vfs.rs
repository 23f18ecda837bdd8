//! vfs opens database files and provides random-access reads over them.
//! The file is immutable while attached; every access is an absolute seek
//! followed by an exact-length read.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error opening db file: {0}")]
    OpenFailed(std::io::Error),
    #[error("Error reading db file at offset {offset}: {source}")]
    ReadFailed {
        offset: u64,
        source: std::io::Error,
    },
}

/// An attachment to one database file, opened read-only.
///
/// Concurrent readers are fine as long as each owns its own attachment;
/// there is no mutable state behind the file.
pub struct DbAttachment {
    f: File,
}

impl DbAttachment {
    pub fn open(path: &str) -> Result<DbAttachment, Error> {
        let f = std::fs::OpenOptions::new()
            .read(true)
            .write(false)
            .create(false)
            .open(path)
            .map_err(Error::OpenFailed)?;
        Ok(DbAttachment { f })
    }

    /// Fills `buf` with the bytes starting at `offset`.
    /// A file that ends before `buf` is full is an error, not a short read.
    pub fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Error> {
        self.f
            .seek(SeekFrom::Start(offset))
            .map_err(|e| Error::ReadFailed { offset, source: e })?;
        self.f
            .read_exact(buf)
            .map_err(|e| Error::ReadFailed { offset, source: e })?;
        Ok(())
    }

    pub fn get_header(&mut self) -> Result<crate::dbheader::DbfileHeader, crate::dbheader::Error> {
        let mut v = vec![0_u8; crate::dbheader::SQLITE_DB_HEADER_BYTES];
        self.read_exact_at(0, &mut v[..])
            .map_err(|_| crate::dbheader::Error::ReadFailed)?;
        crate::dbheader::parse_header(&v)
    }
}
