use crate::error::{Error, Result};

use byteorder::{ReadBytesExt, WriteBytesExt, LittleEndian};
use flate2::{Compression};
use flate2::read::{MultiGzDecoder};
use flate2::write::{GzEncoder};
use memmap::{Mmap};
use serde::{Deserialize, Serialize};

use std::fs::{File};
use std::io::{self, Read, Write, Cursor};
use std::path::{Path};

const MASK_DELTA: u32 = 0xa282_ead8;

/// Outer compression of a TFRecord file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordCompression {
  None,
  #[default]
  Gzip,
}

pub fn masked_crc32c(data: &[u8]) -> u32 {
  let crc = crc32c::crc32c(data);
  ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

/// Sequential reader over TFRecord framing:
/// `len: u64 | crc(len): u32 | data | crc(data): u32`, all little-endian.
pub struct TfRecordReader<R> {
  inner:    R,
  records:  usize,
}

impl TfRecordReader<Box<dyn Read>> {
  /// Maps the file and layers the decompressor on top of it.
  pub fn open(path: &Path, compression: RecordCompression) -> Result<TfRecordReader<Box<dyn Read>>> {
    let file = File::open(path)?;
    let source: Box<dyn Read> = if file.metadata()?.len() == 0 {
      // Zero-length files cannot be mapped.
      Box::new(io::empty())
    } else {
      let map = unsafe { Mmap::map(&file)? };
      Box::new(Cursor::new(map))
    };
    let inner: Box<dyn Read> = match compression {
      RecordCompression::None => source,
      RecordCompression::Gzip => Box::new(MultiGzDecoder::new(source)),
    };
    Ok(TfRecordReader::new(inner))
  }
}

impl<R: Read> TfRecordReader<R> {
  pub fn new(inner: R) -> TfRecordReader<R> {
    TfRecordReader{inner, records: 0}
  }

  /// Number of records returned so far.
  pub fn records_read(&self) -> usize {
    self.records
  }

  /// Returns `Ok(None)` on a clean end of stream, i.e. when no byte of the
  /// next length header exists.
  pub fn next_record(&mut self) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 8];
    let mut filled = 0;
    while filled < len_buf.len() {
      match self.inner.read(&mut len_buf[filled ..]) {
        Ok(0) => break,
        Ok(n) => filled += n,
        Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
        Err(e) => return Err(e.into()),
      }
    }
    if filled == 0 {
      return Ok(None);
    }
    if filled < len_buf.len() {
      return Err(Error::CorruptRecord(format!(
          "truncated length header after record {}", self.records)));
    }

    let len_crc = self.read_u32_or_truncated("length crc")?;
    if masked_crc32c(&len_buf) != len_crc {
      return Err(Error::CorruptRecord(format!(
          "length crc mismatch at record {}", self.records)));
    }
    let len = Cursor::new(&len_buf[..]).read_u64::<LittleEndian>()? as usize;

    let mut data = vec![0u8; len];
    if let Err(e) = self.inner.read_exact(&mut data) {
      return Err(self.truncated(e, "data"));
    }
    let data_crc = self.read_u32_or_truncated("data crc")?;
    if masked_crc32c(&data) != data_crc {
      return Err(Error::CorruptRecord(format!(
          "data crc mismatch at record {}", self.records)));
    }

    self.records += 1;
    Ok(Some(data))
  }

  fn read_u32_or_truncated(&mut self, what: &str) -> Result<u32> {
    match self.inner.read_u32::<LittleEndian>() {
      Ok(x) => Ok(x),
      Err(e) => Err(self.truncated(e, what)),
    }
  }

  fn truncated(&self, e: io::Error, what: &str) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
      Error::CorruptRecord(format!("truncated {} in record {}", what, self.records))
    } else {
      Error::Io(e)
    }
  }
}

impl<R: Read> Iterator for TfRecordReader<R> {
  type Item = Result<Vec<u8>>;

  fn next(&mut self) -> Option<Result<Vec<u8>>> {
    self.next_record().transpose()
  }
}

enum WriterSink<W: Write> {
  Plain(W),
  Gzip(GzEncoder<W>),
}

/// Writes TFRecord framing, optionally gzip-compressed.
pub struct TfRecordWriter<W: Write> {
  sink: WriterSink<W>,
}

impl TfRecordWriter<File> {
  pub fn create(path: &Path, compression: RecordCompression) -> Result<TfRecordWriter<File>> {
    Ok(TfRecordWriter::new(File::create(path)?, compression))
  }
}

impl<W: Write> TfRecordWriter<W> {
  pub fn new(inner: W, compression: RecordCompression) -> TfRecordWriter<W> {
    let sink = match compression {
      RecordCompression::None => WriterSink::Plain(inner),
      RecordCompression::Gzip => WriterSink::Gzip(GzEncoder::new(inner, Compression::default())),
    };
    TfRecordWriter{sink}
  }

  pub fn write_record(&mut self, data: &[u8]) -> Result<()> {
    let mut header = Vec::with_capacity(12);
    header.write_u64::<LittleEndian>(data.len() as u64)?;
    let len_crc = masked_crc32c(&header);
    header.write_u32::<LittleEndian>(len_crc)?;
    let w: &mut dyn Write = match self.sink {
      WriterSink::Plain(ref mut w) => w,
      WriterSink::Gzip(ref mut w) => w,
    };
    w.write_all(&header)?;
    w.write_all(data)?;
    w.write_u32::<LittleEndian>(masked_crc32c(data))?;
    Ok(())
  }

  /// Flushes the compressor trailer and hands back the underlying writer.
  pub fn finish(self) -> Result<W> {
    match self.sink {
      WriterSink::Plain(mut w) => {
        w.flush()?;
        Ok(w)
      }
      WriterSink::Gzip(w) => Ok(w.finish()?),
    }
  }
}
