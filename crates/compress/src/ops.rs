//! Compression Operations

use crate::Compression;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use flate2::{Compression as GzCompression, read::MultiGzDecoder, write::GzEncoder};
use std::io::{Read, Write};
use tracing::instrument;

// Use the highest compression level available; this crate prioritizes
// storage space over speed.
const GZIP_LEVEL: GzCompression = GzCompression::best();

impl Compression {
    /// Compress a byte slice in memory.
    ///
    /// For [`Gzip`](Compression::Gzip) the output is one complete gzip
    /// member, so successive calls can be concatenated into a valid
    /// multi-member `.warc.gz` file.
    ///
    /// # Examples
    ///
    /// ```
    /// use vwarc_compress::Compression;
    ///
    /// let record = b"WARC/1.1\r\n\r\n";
    /// let member = Compression::Gzip.compress(record).unwrap();
    /// assert!(member.starts_with(&[0x1F, 0x8B]));
    /// ```
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.compress_into(input, &mut output)?;
        Ok(output)
    }

    /// Decompress a byte slice in memory.
    ///
    /// Concatenated gzip members are decompressed as one continuous stream.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vwarc_compress::Compression;
    ///
    /// let mut file = Compression::Gzip.compress(b"first ").unwrap();
    /// file.extend(Compression::Gzip.compress(b"second").unwrap());
    /// let decompressed = Compression::Gzip.decompress(&file).unwrap();
    /// assert_eq!(decompressed, b"first second");
    /// ```
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decompress_into(input, &mut output)?;
        Ok(output)
    }

    /// Compress `input`, appending to `output`. Returns the number of bytes appended.
    #[instrument(level = "trace", skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn compress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let before = output.len();
        match self {
            Compression::None => output.extend_from_slice(input),
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(&mut *output, GZIP_LEVEL);
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
            },
        };
        let size = output.len() - before;
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }

    /// Decompress `input`, appending to `output`. Returns the number of bytes appended.
    #[instrument(level = "trace", skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn decompress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let size = match self {
            Compression::None => {
                output.extend_from_slice(input);
                input.len()
            },
            Compression::Gzip => {
                let mut decoder = MultiGzDecoder::new(input);
                decoder.read_to_end(output).or_raise(|| ErrorKind::InvalidData)?
            },
        };
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }
}
