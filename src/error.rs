use std::io;
use std::path::{PathBuf};

pub type Result<T> = ::std::result::Result<T, Error>;

/// Every failure the loaders, the record reader and the archive writer
/// can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("i/o error: {0}")]
  Io(#[from] io::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  /// Malformed manifest header or row. `line` is 1-based.
  #[error("format error at line {line}: {msg}")]
  Format { line: usize, msg: String },

  #[error("index {index} out of range for partition of length {len}")]
  IndexOutOfRange { index: usize, len: usize },

  #[error("corrupt record: {0}")]
  CorruptRecord(String),

  #[error("protobuf decode error: {0}")]
  Decode(#[from] prost::DecodeError),

  #[error("missing feature: {0}")]
  MissingFeature(String),

  #[error("feature {name}: expected {expected} values, got {got}")]
  FeatureShape { name: String, expected: usize, got: usize },

  #[error("image error: {0}")]
  Image(#[from] image::ImageError),

  #[error("zip error: {0}")]
  Zip(#[from] zip::result::ZipError),

  #[error("shape error: {0}")]
  Shape(#[from] ndarray::ShapeError),

  #[error("npy error in {path:?}: {msg}")]
  Npy { path: PathBuf, msg: String },

  #[error("config error: {0}")]
  Config(#[from] serde_json::Error),
}

impl Error {
  pub fn format(line: usize, msg: impl Into<String>) -> Self {
    Error::Format{line, msg: msg.into()}
  }

  pub fn npy(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
    Error::Npy{path: path.into(), msg: msg.into()}
  }
}
