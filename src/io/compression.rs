use std::fs;
use std::io::{self, Write};
use std::path::{self, Path};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::settings::OutputCompression;

/// Check whether `path` ends with a `.gz` extension, returning the path without it
pub fn is_gzipped_extension(path: path::PathBuf) -> (bool, path::PathBuf) {
    if let Some(ext) = path.extension() {
        if ext.to_ascii_lowercase() == "gz" {
            (true, path.with_extension(""))
        } else {
            (false, path)
        }
    } else {
        (false, path)
    }
}

/// An output stream that is optionally gzip-compressed
pub enum CompressedWriter<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> CompressedWriter<W> {
    pub fn new(inner: W, gzip: bool) -> Self {
        if gzip {
            Self::Gzip(GzEncoder::new(inner, Compression::default()))
        } else {
            Self::Plain(inner)
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Gzip(_))
    }

    /// Write any pending compressed data and the gzip trailer, returning the wrapped stream
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Plain(mut inner) => {
                inner.flush()?;
                Ok(inner)
            }
            Self::Gzip(encoder) => {
                let mut inner = encoder.finish()?;
                inner.flush()?;
                Ok(inner)
            }
        }
    }
}

impl CompressedWriter<fs::File> {
    /// Create the file at `path`, compressing it according to `compression`
    pub fn create<P: AsRef<Path>>(path: P, compression: OutputCompression) -> io::Result<Self> {
        let path = path.as_ref();
        let gzip = match compression {
            OutputCompression::Auto => is_gzipped_extension(path.to_path_buf()).0,
            OutputCompression::Gzip => true,
            OutputCompression::None => false,
        };
        let handle = fs::File::create(path)?;
        Ok(Self::new(handle, gzip))
    }
}

impl<W: Write> Write for CompressedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(inner) => inner.write(buf),
            Self::Gzip(inner) => inner.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(inner) => inner.flush(),
            Self::Gzip(inner) => inner.flush(),
        }
    }
}
