//! CelebA-style attribute dataset.
//!
//! The attribute file has a count line, a line of whitespace-separated
//! attribute names, then one `filename,v1,...,vN` row per image. Rows are
//! shuffled with a fixed seed; the first `NUM_TEST_RECORDS` form the test
//! partition and the rest the train partition.

use crate::error::{Error, Result};
use crate::transform::{ImageTransform};

use csv::{ReaderBuilder};
use image::io::{Reader as ImageReader};
use rand::{SeedableRng};
use rand::rngs::{StdRng};
use rand::seq::{SliceRandom};

use std::cmp::{min};
use std::collections::{HashMap};
use std::fs::{File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::{FromStr};

pub const SHUFFLE_SEED: u64 = 1234;
pub const NUM_TEST_RECORDS: usize = 1999;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
  Train,
  Test,
}

impl FromStr for Partition {
  type Err = String;

  fn from_str(s: &str) -> ::std::result::Result<Partition, String> {
    match s {
      "train" => Ok(Partition::Train),
      "test" => Ok(Partition::Test),
      _ => Err(format!("unknown partition: {:?}", s)),
    }
  }
}

#[derive(Clone, Debug)]
pub struct CelebAConfig {
  pub image_dir:  PathBuf,
  pub attr_path:  PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeRecord {
  pub filename:   String,
  pub attributes: Vec<bool>,
}

impl AttributeRecord {
  /// Attributes as 1.0/0.0 floats.
  pub fn label(&self) -> Vec<f32> {
    self.attributes.iter().map(|&a| if a { 1.0 } else { 0.0 }).collect()
  }
}

#[derive(Clone, Debug)]
pub struct AttributeSample<T> {
  pub filename:   String,
  pub attributes: Vec<bool>,
  pub image:      T,
}

#[derive(Clone, Debug)]
pub struct CelebA {
  image_dir:  PathBuf,
  attr_names: Vec<String>,
  attr2idx:   HashMap<String, usize>,
  train:      Vec<AttributeRecord>,
  test:       Vec<AttributeRecord>,
}

impl CelebA {
  pub fn load(config: &CelebAConfig) -> Result<CelebA> {
    let file = File::open(&config.attr_path)?;
    let celeba = CelebA::from_reader(&config.image_dir, BufReader::new(file))?;
    info!("loaded {:?}: {} attributes, {} train, {} test",
        config.attr_path, celeba.num_attrs(), celeba.train.len(), celeba.test.len());
    Ok(celeba)
  }

  pub fn from_reader<R: BufRead>(image_dir: &Path, mut reader: R) -> Result<CelebA> {
    let mut count_line = String::new();
    if reader.read_line(&mut count_line)? == 0 {
      return Err(Error::format(1, "missing count line"));
    }
    let mut names_line = String::new();
    if reader.read_line(&mut names_line)? == 0 {
      return Err(Error::format(2, "missing attribute names"));
    }
    let attr_names: Vec<String> = names_line.split_whitespace().map(|s| s.to_string()).collect();
    if attr_names.is_empty() {
      return Err(Error::format(2, "empty attribute names"));
    }
    let mut attr2idx = HashMap::with_capacity(attr_names.len());
    for (idx, name) in attr_names.iter().enumerate() {
      attr2idx.insert(name.clone(), idx);
    }

    let mut rows = ReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .from_reader(reader);
    let mut records = Vec::new();
    for row in rows.records() {
      let row = row.map_err(|e| {
        if e.is_io_error() {
          Error::Csv(e)
        } else {
          let line = e.position().map(|p| p.line() as usize + 2).unwrap_or(0);
          Error::format(line, e.to_string())
        }
      })?;
      let line = row.position().map(|p| p.line() as usize + 2).unwrap_or(0);
      if row.len() == 1 && row[0].trim().is_empty() {
        continue;
      }
      if row.len() != attr_names.len() + 1 {
        return Err(Error::format(line, format!(
            "expected {} fields, got {}", attr_names.len() + 1, row.len())));
      }
      // Trailing whitespace belongs to the line, not to the last flag.
      let last = row.len() - 1;
      let attributes = row.iter().enumerate().skip(1)
        .map(|(i, v)| if i == last { v.trim_end() == "1" } else { v == "1" })
        .collect();
      records.push(AttributeRecord{
        filename: row[0].to_string(),
        attributes,
      });
    }

    let mut rng = StdRng::seed_from_u64(SHUFFLE_SEED);
    records.shuffle(&mut rng);
    let split = min(NUM_TEST_RECORDS, records.len());
    let train = records.split_off(split);
    let test = records;

    Ok(CelebA{
      image_dir: image_dir.to_path_buf(),
      attr_names,
      attr2idx,
      train,
      test,
    })
  }

  pub fn num_attrs(&self) -> usize {
    self.attr_names.len()
  }

  pub fn attr_names(&self) -> &[String] {
    &self.attr_names
  }

  pub fn attr_index(&self, name: &str) -> Option<usize> {
    self.attr2idx.get(name).cloned()
  }

  pub fn attr_name(&self, idx: usize) -> Option<&str> {
    self.attr_names.get(idx).map(|s| s.as_str())
  }

  pub fn partition(&self, mode: Partition) -> &[AttributeRecord] {
    match mode {
      Partition::Train => &self.train,
      Partition::Test => &self.test,
    }
  }

  pub fn len(&self, mode: Partition) -> usize {
    self.partition(mode).len()
  }

  pub fn is_empty(&self, mode: Partition) -> bool {
    self.partition(mode).is_empty()
  }

  pub fn record(&self, index: usize, mode: Partition) -> Result<&AttributeRecord> {
    let part = self.partition(mode);
    part.get(index).ok_or(Error::IndexOutOfRange{index, len: part.len()})
  }

  pub fn image_path(&self, record: &AttributeRecord) -> PathBuf {
    self.image_dir.join(&record.filename)
  }

  /// Decodes the image of the `index`-th record of `mode` and runs it
  /// through `transform`.
  pub fn get<T: ImageTransform>(&self, index: usize, mode: Partition, transform: &T) -> Result<AttributeSample<T::Output>> {
    let record = self.record(index, mode)?;
    // Format comes from the file content, not the extension.
    let image = ImageReader::open(self.image_path(record))?
      .with_guessed_format()?
      .decode()?;
    Ok(AttributeSample{
      filename:   record.filename.clone(),
      attributes: record.attributes.clone(),
      image:      transform.apply(image)?,
    })
  }
}
