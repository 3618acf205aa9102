//! `.npy` v1.0 encoding and `.npz` (zip of `.npy`) archives.

use crate::error::{Error, Result};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt, LittleEndian};
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn};
use zip::{CompressionMethod, ZipArchive, ZipWriter};
use zip::write::{FileOptions};

use std::fs::{File};
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

const MAGIC: &[u8] = b"\x93NUMPY";
const HEADER_ALIGN: usize = 64;

/// Element types that have a numpy `descr`.
pub trait NpyElement: Copy + Default {
  const DESCR: &'static str;

  fn write_slice<W: Write>(values: &[Self], writer: &mut W) -> Result<()>;
  fn read_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<Self>>;
}

impl NpyElement for u8 {
  const DESCR: &'static str = "|u1";

  fn write_slice<W: Write>(values: &[u8], writer: &mut W) -> Result<()> {
    writer.write_all(values)?;
    Ok(())
  }

  fn read_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
  }
}

impl NpyElement for f32 {
  const DESCR: &'static str = "<f4";

  fn write_slice<W: Write>(values: &[f32], writer: &mut W) -> Result<()> {
    for &v in values {
      writer.write_f32::<LittleEndian>(v)?;
    }
    Ok(())
  }

  fn read_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<f32>> {
    let mut buf = vec![0.0; len];
    reader.read_f32_into::<LittleEndian>(&mut buf)?;
    Ok(buf)
  }
}

impl NpyElement for f64 {
  const DESCR: &'static str = "<f8";

  fn write_slice<W: Write>(values: &[f64], writer: &mut W) -> Result<()> {
    for &v in values {
      writer.write_f64::<LittleEndian>(v)?;
    }
    Ok(())
  }

  fn read_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<f64>> {
    let mut buf = vec![0.0; len];
    reader.read_f64_into::<LittleEndian>(&mut buf)?;
    Ok(buf)
  }
}

fn shape_tuple(shape: &[usize]) -> String {
  match shape.len() {
    0 => "()".to_string(),
    1 => format!("({},)", shape[0]),
    _ => {
      let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
      format!("({})", dims.join(", "))
    }
  }
}

/// Builds the full v1.0 preamble: magic, version, header length and the
/// space-padded dict, so that the data starts on a 64-byte boundary.
pub fn npy_header(descr: &str, shape: &[usize]) -> Vec<u8> {
  let mut dict = format!(
      "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
      descr, shape_tuple(shape));
  let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
  let pad = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
  for _ in 0 .. pad {
    dict.push(' ');
  }
  dict.push('\n');

  let mut out = Vec::with_capacity(MAGIC.len() + 4 + dict.len());
  out.extend_from_slice(MAGIC);
  out.push(1);
  out.push(0);
  let mut len = [0u8; 2];
  LittleEndian::write_u16(&mut len, dict.len() as u16);
  out.extend_from_slice(&len);
  out.extend_from_slice(dict.as_bytes());
  out
}

pub fn write_npy<T, S, D, W>(array: &ArrayBase<S, D>, writer: &mut W) -> Result<()>
where T: NpyElement, S: Data<Elem = T>, D: Dimension, W: Write
{
  writer.write_all(&npy_header(T::DESCR, array.shape()))?;
  let standard = array.as_standard_layout();
  match standard.as_slice() {
    Some(values) => T::write_slice(values, writer),
    None => {
      let values: Vec<T> = standard.iter().cloned().collect();
      T::write_slice(&values, writer)
    }
  }
}

/// Parses one `.npy` stream. `origin` is only used in error messages.
pub fn read_npy<T: NpyElement, R: Read>(reader: &mut R, origin: &Path) -> Result<ArrayD<T>> {
  let mut magic = [0u8; 6];
  reader.read_exact(&mut magic)?;
  if &magic[..] != MAGIC {
    return Err(Error::npy(origin, "bad magic"));
  }
  let major = reader.read_u8()?;
  let _minor = reader.read_u8()?;
  let header_len = match major {
    1 => reader.read_u16::<LittleEndian>()? as usize,
    2 | 3 => reader.read_u32::<LittleEndian>()? as usize,
    v => return Err(Error::npy(origin, format!("unsupported version {}", v))),
  };
  let mut header = vec![0u8; header_len];
  reader.read_exact(&mut header)?;
  let header = String::from_utf8_lossy(&header).into_owned();

  let descr = dict_value(&header, "descr")
    .map(|v| v.trim_matches('\'').to_string())
    .ok_or_else(|| Error::npy(origin, "missing descr"))?;
  if descr != T::DESCR {
    return Err(Error::npy(origin, format!("dtype {} does not match {}", descr, T::DESCR)));
  }
  if dict_value(&header, "fortran_order").as_ref().map(|v| v.as_str()) != Some("False") {
    return Err(Error::npy(origin, "fortran order is not supported"));
  }
  let shape_str = dict_value(&header, "shape")
    .ok_or_else(|| Error::npy(origin, "missing shape"))?;
  let mut shape = Vec::new();
  for tok in shape_str.trim_matches(|c| c == '(' || c == ')').split(',') {
    let tok = tok.trim();
    if tok.is_empty() {
      continue;
    }
    let dim = tok.parse::<usize>()
      .map_err(|_| Error::npy(origin, format!("bad shape entry {:?}", tok)))?;
    shape.push(dim);
  }

  let len = shape.iter().product();
  let values = T::read_vec(reader, len)?;
  Ok(ArrayD::from_shape_vec(IxDyn(&shape), values)?)
}

/// Extracts the raw text of `'key': value` from a numpy header dict.
/// Tuples are returned with their parentheses.
fn dict_value(header: &str, key: &str) -> Option<String> {
  let pat = format!("'{}':", key);
  let start = header.find(&pat)? + pat.len();
  let rest = header[start ..].trim_start();
  let end = if rest.starts_with('(') {
    rest.find(')')? + 1
  } else {
    rest.find(',').or_else(|| rest.find('}'))?
  };
  Some(rest[.. end].trim().to_string())
}

/// Writes named arrays into a deflate-compressed `.npz` archive.
pub struct NpzWriter<W: Write + Seek> {
  zip:  ZipWriter<W>,
}

impl NpzWriter<BufWriter<File>> {
  pub fn create(path: &Path) -> Result<NpzWriter<BufWriter<File>>> {
    Ok(NpzWriter::new(BufWriter::new(File::create(path)?)))
  }
}

impl<W: Write + Seek> NpzWriter<W> {
  pub fn new(inner: W) -> NpzWriter<W> {
    NpzWriter{zip: ZipWriter::new(inner)}
  }

  /// Adds `<name>.npy`.
  pub fn add_array<T, S, D>(&mut self, name: &str, array: &ArrayBase<S, D>) -> Result<()>
  where T: NpyElement, S: Data<Elem = T>, D: Dimension
  {
    let nbytes = array.len() * ::std::mem::size_of::<T>() + HEADER_ALIGN * 4;
    let options = FileOptions::default()
      .compression_method(CompressionMethod::Deflated)
      .large_file(nbytes as u64 >= u32::MAX as u64);
    self.zip.start_file(format!("{}.npy", name), options)?;
    write_npy(array, &mut self.zip)
  }

  pub fn finish(mut self) -> Result<W> {
    Ok(self.zip.finish()?)
  }
}

/// Reads the array stored as `<name>.npy` inside an `.npz` archive.
pub fn read_npz_array<T: NpyElement>(path: &Path, name: &str) -> Result<ArrayD<T>> {
  let mut archive = ZipArchive::new(File::open(path)?)?;
  let entry_name = format!("{}.npy", name);
  let mut entry = archive.by_name(&entry_name)?;
  let origin: PathBuf = path.join(&entry_name);
  read_npy(&mut entry, &origin)
}

/// Entry names in the archive with the `.npy` suffix removed.
pub fn npz_array_names(path: &Path) -> Result<Vec<String>> {
  let archive = ZipArchive::new(File::open(path)?)?;
  let mut names: Vec<String> = archive.file_names()
    .map(|n| n.trim_end_matches(".npy").to_string())
    .collect();
  names.sort();
  Ok(names)
}
