extern crate byteorder;
extern crate crc32c;
extern crate csv;
extern crate flate2;
extern crate image;
#[macro_use] extern crate log;
extern crate memmap;
extern crate ndarray;
extern crate prost;
extern crate zip;

extern crate rand;
extern crate serde;
extern crate serde_json;
extern crate time;

pub use crate::celeba::{AttributeRecord, AttributeSample, CelebA, CelebAConfig, Partition};
pub use crate::clevr::{
  ClevrConfig, SceneExtractor, SceneGeometry, SceneRecord, SplitArchive, SplitSpec, SplitSummary,
  extract_from, extract_scenes,
};
pub use crate::error::{Error, Result};
pub use crate::tfrecord::{RecordCompression, TfRecordReader, TfRecordWriter};
pub use crate::transform::{Identity, ImageOp, ImageTransform, Pipeline};

pub mod celeba;
pub mod clevr;
pub mod error;
pub mod example;
pub mod npz;
pub mod tfrecord;
pub mod transform;
