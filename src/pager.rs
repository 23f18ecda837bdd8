//! pager provides read-only access to the pages of one database file.
//!
//! All pages have the same size, given by the file header.  Pages are
//! loaded from disk on first access and cached for the lifetime of the
//! Pager, which is one CLI invocation.

use std::collections::HashMap;

use tracing::debug;

use crate::dbheader::DbfileHeader;
use crate::vfs::DbAttachment;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Pager: page {0} is beyond the end of the database file.")]
    PageNumberBeyondLimits(PageNum),
    #[error("Pager: internal error.")]
    Internal,
    #[error("Pager: error accessing database file: {0}")]
    Vfs(#[from] crate::vfs::Error),
    #[error("Pager: error in database header: {0}")]
    DbHdr(#[from] crate::dbheader::Error),
}

/// Page numbers are 1-based, to match how SQLite numbers pages.  Page `n`
/// starts at byte offset `(n - 1) * pagesize`.
pub type PageNum = usize;

/// A pager owns the attachment to one open database file and the page data
/// read from it so far.
pub struct Pager {
    vfs: DbAttachment,
    header: DbfileHeader,
    pages: HashMap<PageNum, Vec<u8>>,
}

impl Pager {
    /// Opens a database file read-only and validates its header.
    pub fn open(path: &str) -> Result<Pager, Error> {
        let mut vfs = DbAttachment::open(path)?;
        let header = vfs.get_header()?;
        debug!(
            pagesize = header.pagesize,
            numpages = header.numpages,
            "opened database"
        );
        Ok(Pager {
            vfs,
            header,
            pages: HashMap::new(),
        })
    }

    pub fn page_size(&self) -> u32 {
        self.header.pagesize
    }

    pub fn num_pages(&self) -> u32 {
        self.header.numpages
    }

    /// Returns page `pn`, reading it from disk the first time it is asked
    /// for.
    pub fn get_page_ro(&mut self, pn: PageNum) -> Result<&[u8], Error> {
        if pn < 1 || pn > self.header.numpages as usize {
            return Err(Error::PageNumberBeyondLimits(pn));
        }
        if !self.pages.contains_key(&pn) {
            let mut v = vec![0_u8; self.header.pagesize as usize];
            let offset = (pn as u64 - 1) * self.header.pagesize as u64;
            self.vfs.read_exact_at(offset, &mut v[..])?;
            debug!(page = pn, "loaded page on demand");
            self.pages.insert(pn, v);
        }
        self.pages.get(&pn).map(|v| v.as_slice()).ok_or(Error::Internal)
    }
}
