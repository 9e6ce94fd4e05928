use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::ClipweaveResult;

/// Readable, seekable byte stream handed to decoders.
pub trait ByteStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> ByteStream for T {}

/// Opens a fresh byte stream for a resource on every call.
///
/// A resource may be opened several times per render, e.g. once for its picture and once for
/// its demuxed audio.
pub trait StreamFactory: Send + Sync {
    /// Open a new independent stream positioned at the start.
    fn open(&self) -> ClipweaveResult<Box<dyn ByteStream>>;

    /// Filesystem location, when the bytes live in a file.
    fn path(&self) -> Option<&std::path::Path> {
        None
    }
}

/// Resource backed by a file on disk.
#[derive(Clone, Debug)]
pub struct FileStream {
    path: PathBuf,
}

impl FileStream {
    /// Stream factory for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StreamFactory for FileStream {
    fn open(&self) -> ClipweaveResult<Box<dyn ByteStream>> {
        let f = std::fs::File::open(&self.path)
            .with_context(|| format!("open resource '{}'", self.path.display()))?;
        Ok(Box::new(std::io::BufReader::new(f)))
    }

    fn path(&self) -> Option<&std::path::Path> {
        Some(&self.path)
    }
}

/// Resource backed by shared in-memory bytes.
#[derive(Clone, Debug)]
pub struct MemoryStream {
    bytes: Arc<[u8]>,
}

impl MemoryStream {
    /// Stream factory over `bytes`.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl StreamFactory for MemoryStream {
    fn open(&self) -> ClipweaveResult<Box<dyn ByteStream>> {
        Ok(Box::new(Cursor::new(ArcBytes(self.bytes.clone()))))
    }
}

struct ArcBytes(Arc<[u8]>);

impl AsRef<[u8]> for ArcBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A media source referenced by track items through its id.
#[derive(Clone)]
pub struct Resource {
    /// Identifier used by [`ClipTiming::resource_id`](crate::ClipTiming::resource_id).
    pub id: String,
    factory: Arc<dyn StreamFactory>,
}

impl Resource {
    /// Resource with a custom stream factory.
    pub fn new(id: impl Into<String>, factory: impl StreamFactory + 'static) -> Self {
        Self {
            id: id.into(),
            factory: Arc::new(factory),
        }
    }

    /// Resource reading from a file.
    pub fn from_path(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(id, FileStream::new(path))
    }

    /// Resource reading from shared in-memory bytes.
    pub fn from_bytes(id: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(id, MemoryStream::new(bytes))
    }

    /// Open a fresh stream over the resource bytes.
    pub fn open(&self) -> ClipweaveResult<Box<dyn ByteStream>> {
        self.factory.open()
    }

    /// Filesystem location, when the resource is file-backed.
    pub fn path(&self) -> Option<&std::path::Path> {
        self.factory.path()
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("path", &self.path())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/resource.rs"]
mod tests;
