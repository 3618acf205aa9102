//! CLEVR-with-masks extraction: scenes are pulled from one shared TFRecord
//! stream, filtered by summed visibility, transposed to CHW and written as
//! one `.npz` archive per split.

use crate::error::{Error, Result};
use crate::example::{Example, Feature};
use crate::npz::{NpzWriter};
use crate::tfrecord::{RecordCompression, TfRecordReader};

use ndarray::{s, Array2, Array3, Array4, Array5, Axis};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime};

use std::fs::{self, File};
use std::io::{Read};
use std::path::{Path, PathBuf};

pub const MAX_NUM_ENTITIES: usize = 11;
pub const IMAGE_HEIGHT: usize = 240;
pub const IMAGE_WIDTH: usize = 320;
pub const IMAGE_CHANNELS: usize = 3;
pub const MAX_VISIBILITY_SUM: f64 = 7.0;
pub const PROGRESS_INTERVAL: usize = 1000;
pub const DATASET_NAME: &str = "clevr_with_masks_6";

const ENTITY_FLOAT_FEATURES: &[&str] = &["x", "y", "z", "rotation", "visibility"];
const ENTITY_BYTE_FEATURES: &[&str] = &["size", "material", "shape", "color"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneGeometry {
  pub height:       usize,
  pub width:        usize,
  pub channels:     usize,
  pub max_entities: usize,
}

impl Default for SceneGeometry {
  fn default() -> SceneGeometry {
    SceneGeometry{
      height:       IMAGE_HEIGHT,
      width:        IMAGE_WIDTH,
      channels:     IMAGE_CHANNELS,
      max_entities: MAX_NUM_ENTITIES,
    }
  }
}

impl SceneGeometry {
  pub fn image_len(&self) -> usize {
    self.height * self.width * self.channels
  }

  pub fn mask_len(&self) -> usize {
    self.max_entities * self.height * self.width
  }
}

/// One decoded scene, in the layout of the record stream: the image is
/// HWC and the masks are E×H×W×1.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneRecord {
  pub image:        Array3<u8>,
  pub masks:        Array4<u8>,
  pub visibility:   Vec<f32>,
  pub x:            Vec<f32>,
  pub y:            Vec<f32>,
  pub z:            Vec<f32>,
  pub rotation:     Vec<f32>,
  pub pixel_coords: Array2<f32>,
  pub size:         Vec<u8>,
  pub material:     Vec<u8>,
  pub shape:        Vec<u8>,
  pub color:        Vec<u8>,
}

impl SceneRecord {
  /// A scene of all zeros, handy as a starting point when building records.
  pub fn zeros(geometry: &SceneGeometry) -> SceneRecord {
    let g = geometry;
    let e = g.max_entities;
    SceneRecord{
      image:        Array3::zeros((g.height, g.width, g.channels)),
      masks:        Array4::zeros((e, g.height, g.width, 1)),
      visibility:   vec![0.0; e],
      x:            vec![0.0; e],
      y:            vec![0.0; e],
      z:            vec![0.0; e],
      rotation:     vec![0.0; e],
      pixel_coords: Array2::zeros((e, 3)),
      size:         vec![0; e],
      material:     vec![0; e],
      shape:        vec![0; e],
      color:        vec![0; e],
    }
  }

  pub fn decode(buf: &[u8], geometry: &SceneGeometry) -> Result<SceneRecord> {
    SceneRecord::from_example(&Example::decode_from(buf)?, geometry)
  }

  /// Every schema field must be present with its fixed element count.
  pub fn from_example(ex: &Example, geometry: &SceneGeometry) -> Result<SceneRecord> {
    let g = geometry;
    let e = g.max_entities;
    let image = Array3::from_shape_vec(
        (g.height, g.width, g.channels),
        ex.raw_bytes("image", g.image_len())?)?;
    let masks = Array4::from_shape_vec(
        (e, g.height, g.width, 1),
        ex.raw_bytes("mask", g.mask_len())?)?;
    let pixel_coords = Array2::from_shape_vec((e, 3), ex.floats("pixel_coords", e * 3)?)?;
    Ok(SceneRecord{
      image,
      masks,
      visibility:   ex.floats("visibility", e)?,
      x:            ex.floats("x", e)?,
      y:            ex.floats("y", e)?,
      z:            ex.floats("z", e)?,
      rotation:     ex.floats("rotation", e)?,
      pixel_coords,
      size:         ex.raw_bytes("size", e)?,
      material:     ex.raw_bytes("material", e)?,
      shape:        ex.raw_bytes("shape", e)?,
      color:        ex.raw_bytes("color", e)?,
    })
  }

  /// Encodes the scene the way the CLEVR TFRecords store it: every byte
  /// field is a list of one-byte strings.
  pub fn to_example(&self) -> Example {
    fn byte_strings<'a, I: Iterator<Item = &'a u8>>(it: I) -> Feature {
      Feature::bytes(it.map(|&b| vec![b]).collect())
    }

    let mut ex = Example::default();
    ex.insert("image", byte_strings(self.image.iter()));
    ex.insert("mask", byte_strings(self.masks.iter()));
    ex.insert("pixel_coords", Feature::floats(self.pixel_coords.iter().cloned().collect()));
    let floats = [&self.x, &self.y, &self.z, &self.rotation, &self.visibility];
    for (name, values) in ENTITY_FLOAT_FEATURES.iter().zip(floats.iter()) {
      ex.insert(name, Feature::floats(values.to_vec()));
    }
    let bytes = [&self.size, &self.material, &self.shape, &self.color];
    for (name, values) in ENTITY_BYTE_FEATURES.iter().zip(bytes.iter()) {
      ex.insert(name, byte_strings(values.iter()));
    }
    ex
  }

  pub fn visibility_sum(&self) -> f64 {
    self.visibility.iter().map(|&v| v as f64).sum()
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitSpec {
  pub name:   String,
  pub budget: usize,
  /// Unset means every split except `train` keeps its masks.
  #[serde(default)]
  pub include_masks: Option<bool>,
}

impl SplitSpec {
  pub fn new(name: &str, budget: usize) -> SplitSpec {
    SplitSpec{name: name.to_string(), budget, include_masks: None}
  }

  pub fn includes_masks(&self) -> bool {
    self.include_masks.unwrap_or(self.name != "train")
  }
}

pub fn default_splits() -> Vec<SplitSpec> {
  vec![
    SplitSpec::new("train", 70_000),
    SplitSpec::new("val",   15_000),
    SplitSpec::new("test",  14_998),
  ]
}

fn default_dataset_name() -> String {
  DATASET_NAME.to_string()
}

fn default_max_visibility_sum() -> f64 {
  MAX_VISIBILITY_SUM
}

fn default_progress_interval() -> usize {
  PROGRESS_INTERVAL
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClevrConfig {
  pub source_path:  PathBuf,
  pub output_dir:   PathBuf,

  #[serde(default = "default_dataset_name")]
  pub dataset_name: String,
  #[serde(default = "default_splits")]
  pub splits:       Vec<SplitSpec>,

  #[serde(default)]
  pub compression:  RecordCompression,
  #[serde(default)]
  pub geometry:     SceneGeometry,
  #[serde(default = "default_max_visibility_sum")]
  pub max_visibility_sum: f64,
  #[serde(default = "default_progress_interval")]
  pub progress_interval:  usize,
  /// Records dropped from the stream between consecutive splits.
  #[serde(default)]
  pub skip_between_splits: usize,
}

impl ClevrConfig {
  /// The reference deployment: gzip records, 70000/15000/14998 splits.
  pub fn new(source_path: &Path, output_dir: &Path) -> ClevrConfig {
    ClevrConfig{
      source_path:  source_path.to_path_buf(),
      output_dir:   output_dir.to_path_buf(),

      dataset_name: default_dataset_name(),
      splits:       default_splits(),

      compression:  RecordCompression::Gzip,
      geometry:     SceneGeometry::default(),
      max_visibility_sum: MAX_VISIBILITY_SUM,
      progress_interval:  PROGRESS_INTERVAL,
      skip_between_splits: 0,
    }
  }

  pub fn from_json_file(path: &Path) -> Result<ClevrConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
  }

  pub fn dataset_dir(&self) -> PathBuf {
    self.output_dir.join(&self.dataset_name)
  }

  /// `<output_dir>/<dataset>/<dataset>_<split>.npz`
  pub fn archive_path(&self, split: &str) -> PathBuf {
    self.dataset_dir().join(format!("{}_{}.npz", self.dataset_name, split))
  }
}

/// Fixed-capacity output buffers for one split. Images are N×C×H×W, masks
/// N×E×1×H×W and visibility N×E.
pub struct SplitArchive {
  name:       String,
  capacity:   usize,
  count:      usize,
  geometry:   SceneGeometry,
  images:     Array4<u8>,
  masks:      Option<Array5<u8>>,
  visibility: Array2<f64>,
}

impl SplitArchive {
  pub fn new(name: &str, capacity: usize, geometry: &SceneGeometry, include_masks: bool) -> SplitArchive {
    let g = geometry;
    let masks = if include_masks {
      Some(Array5::zeros((capacity, g.max_entities, 1, g.height, g.width)))
    } else {
      None
    };
    SplitArchive{
      name:       name.to_string(),
      capacity,
      count:      0,
      geometry:   *g,
      images:     Array4::zeros((capacity, g.channels, g.height, g.width)),
      masks,
      visibility: Array2::zeros((capacity, g.max_entities)),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn len(&self) -> usize {
    self.count
  }

  pub fn is_empty(&self) -> bool {
    self.count == 0
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn is_full(&self) -> bool {
    self.count >= self.capacity
  }

  pub fn images(&self) -> &Array4<u8> {
    &self.images
  }

  pub fn masks(&self) -> Option<&Array5<u8>> {
    self.masks.as_ref()
  }

  pub fn visibility(&self) -> &Array2<f64> {
    &self.visibility
  }

  /// Copies the scene into the next free slot. Returns `false` without
  /// writing when the archive is already full.
  pub fn push(&mut self, scene: &SceneRecord) -> Result<bool> {
    if self.is_full() {
      return Ok(false);
    }
    let g = &self.geometry;
    let expected_image = (g.height, g.width, g.channels);
    if scene.image.dim() != expected_image {
      return Err(Error::FeatureShape{
        name: "image".to_string(),
        expected: g.image_len(),
        got: scene.image.len(),
      });
    }
    if scene.masks.dim() != (g.max_entities, g.height, g.width, 1) {
      return Err(Error::FeatureShape{
        name: "mask".to_string(),
        expected: g.mask_len(),
        got: scene.masks.len(),
      });
    }
    if scene.visibility.len() != g.max_entities {
      return Err(Error::FeatureShape{
        name: "visibility".to_string(),
        expected: g.max_entities,
        got: scene.visibility.len(),
      });
    }

    let idx = self.count;
    self.images.index_axis_mut(Axis(0), idx)
      .assign(&scene.image.view().permuted_axes([2, 0, 1]));
    if let Some(ref mut masks) = self.masks {
      masks.index_axis_mut(Axis(0), idx)
        .assign(&scene.masks.view().permuted_axes([0, 3, 1, 2]));
    }
    for (dst, &v) in self.visibility.row_mut(idx).iter_mut().zip(scene.visibility.iter()) {
      *dst = v as f64;
    }
    self.count += 1;
    Ok(true)
  }

  /// Drops the unfilled tail so every array has `len()` rows.
  pub fn truncate(&mut self) {
    let n = self.count;
    self.images.slice_collapse(s![.. n, .., .., ..]);
    if let Some(ref mut masks) = self.masks {
      masks.slice_collapse(s![.. n, .., .., .., ..]);
    }
    self.visibility.slice_collapse(s![.. n, ..]);
    self.capacity = n;
  }

  /// Writes `images`, `masks` (if kept) and `visibility` into one archive.
  pub fn write_npz(&self, path: &Path) -> Result<()> {
    let n = self.count;
    let mut npz = NpzWriter::create(path)?;
    npz.add_array("images", &self.images.slice(s![.. n, .., .., ..]))?;
    if let Some(ref masks) = self.masks {
      npz.add_array("masks", &masks.slice(s![.. n, .., .., .., ..]))?;
    }
    npz.add_array("visibility", &self.visibility.slice(s![.. n, ..]))?;
    npz.finish()?;
    Ok(())
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SplitSummary {
  pub name:       String,
  /// Records pulled from the stream for this split.
  pub attempted:  usize,
  pub retained:   usize,
  pub discarded:  usize,
  /// The stream ran out before the budget was met.
  pub exhausted:  bool,
  pub archive_path: PathBuf,
}

/// True on every `interval`-th attempt; an interval of 0 disables reports.
fn progress_due(attempted: usize, interval: usize) -> bool {
  interval > 0 && attempted > 0 && attempted % interval == 0
}

pub struct SceneExtractor<R> {
  config:     ClevrConfig,
  records:    TfRecordReader<R>,
  exhausted:  bool,
}

impl SceneExtractor<Box<dyn Read>> {
  pub fn open(config: &ClevrConfig) -> Result<SceneExtractor<Box<dyn Read>>> {
    let records = TfRecordReader::open(&config.source_path, config.compression)?;
    Ok(SceneExtractor::new(config, records))
  }
}

impl<R: Read> SceneExtractor<R> {
  pub fn new(config: &ClevrConfig, records: TfRecordReader<R>) -> SceneExtractor<R> {
    SceneExtractor{
      config:     config.clone(),
      records,
      exhausted:  false,
    }
  }

  fn next_scene(&mut self) -> Result<Option<SceneRecord>> {
    if self.exhausted {
      return Ok(None);
    }
    match self.records.next_record()? {
      None => {
        self.exhausted = true;
        Ok(None)
      }
      Some(buf) => Ok(Some(SceneRecord::decode(&buf, &self.config.geometry)?)),
    }
  }

  fn skip_records(&mut self, n: usize) -> Result<usize> {
    let mut skipped = 0;
    while skipped < n && !self.exhausted {
      match self.records.next_record()? {
        None => self.exhausted = true,
        Some(_) => skipped += 1,
      }
    }
    Ok(skipped)
  }

  /// Pulls scenes until the split budget is filled or the stream ends.
  /// The returned archive is already truncated.
  pub fn fill_split(&mut self, spec: &SplitSpec) -> Result<(SplitArchive, SplitSummary)> {
    let start_time = OffsetDateTime::now_utc();
    let interval = self.config.progress_interval;
    let mut archive = SplitArchive::new(
        &spec.name, spec.budget, &self.config.geometry, spec.includes_masks());
    let mut attempted = 0;
    let mut discarded = 0;
    let mut exhausted = false;

    while !archive.is_full() {
      let scene = match self.next_scene()? {
        None => {
          info!("{}: stream exhausted at index {}", spec.name, attempted);
          exhausted = true;
          break;
        }
        Some(scene) => scene,
      };
      attempted += 1;
      if progress_due(attempted, interval) {
        let elapsed = (OffsetDateTime::now_utc() - start_time).as_seconds_f32();
        info!("{}: attempted: {} retained: {} elapsed: {:.3}",
            spec.name, attempted, archive.len(), elapsed);
      }
      if scene.visibility_sum() > self.config.max_visibility_sum {
        discarded += 1;
        continue;
      }
      archive.push(&scene)?;
    }

    archive.truncate();
    let summary = SplitSummary{
      name:       spec.name.clone(),
      attempted,
      retained:   archive.len(),
      discarded,
      exhausted,
      archive_path: self.config.archive_path(&spec.name),
    };
    Ok((archive, summary))
  }

  /// Processes every configured split in order over the one stream and
  /// writes an archive per split.
  pub fn run(&mut self) -> Result<Vec<SplitSummary>> {
    let splits = self.config.splits.clone();
    let mut summaries = Vec::with_capacity(splits.len());
    for (split_idx, spec) in splits.iter().enumerate() {
      if split_idx > 0 && self.config.skip_between_splits > 0 {
        let skipped = self.skip_records(self.config.skip_between_splits)?;
        debug!("skipped {} records before {}", skipped, spec.name);
      }
      info!("{} started", spec.name);
      let (archive, summary) = self.fill_split(spec)?;

      fs::create_dir_all(self.config.dataset_dir())?;
      archive.write_npz(&summary.archive_path)?;
      info!("{}: wrote {} scenes ({} discarded) to {:?}",
          spec.name, summary.retained, summary.discarded, summary.archive_path);
      summaries.push(summary);
    }
    info!("done");
    Ok(summaries)
  }
}

/// Opens `config.source_path` and runs the whole extraction.
pub fn extract_scenes(config: &ClevrConfig) -> Result<Vec<SplitSummary>> {
  SceneExtractor::open(config)?.run()
}

/// Runs the extraction over an already open record stream.
pub fn extract_from<R: Read>(config: &ClevrConfig, records: TfRecordReader<R>) -> Result<Vec<SplitSummary>> {
  SceneExtractor::new(config, records).run()
}

#[cfg(test)]
mod tests {
  use super::*;

  use crate::tfrecord::{TfRecordWriter};
  use prost::{Message};
  use std::io::{Cursor};

  fn tiny() -> SceneGeometry {
    SceneGeometry{height: 2, width: 3, channels: 3, max_entities: 4}
  }

  fn scene(tag: u8, visibility: [f32; 4]) -> SceneRecord {
    let g = tiny();
    let mut s = SceneRecord::zeros(&g);
    s.image = Array3::from_shape_fn((2, 3, 3), |(h, w, c)| tag * 20 + (h * 9 + w * 3 + c) as u8);
    s.masks = Array4::from_shape_fn((4, 2, 3, 1), |(e, h, w, _)| tag + (e * 6 + h * 3 + w) as u8);
    s.visibility = visibility.to_vec();
    s
  }

  fn stream(scenes: &[SceneRecord]) -> TfRecordReader<Cursor<Vec<u8>>> {
    let mut w = TfRecordWriter::new(Vec::new(), RecordCompression::None);
    for s in scenes {
      w.write_record(&s.to_example().encode_to_vec()).unwrap();
    }
    TfRecordReader::new(Cursor::new(w.finish().unwrap()))
  }

  fn config(splits: Vec<SplitSpec>) -> ClevrConfig {
    let mut c = ClevrConfig::new(Path::new("unused.tfrecords"), Path::new("out"));
    c.geometry = tiny();
    c.splits = splits;
    c
  }

  #[test]
  fn scene_survives_example_encoding() {
    let s = scene(1, [1.0, 0.5, 0.0, 0.0]);
    let buf = s.to_example().encode_to_vec();
    assert_eq!(SceneRecord::decode(&buf, &tiny()).unwrap(), s);
  }

  #[test]
  fn decode_rejects_wrong_geometry() {
    let s = scene(1, [0.0; 4]);
    let buf = s.to_example().encode_to_vec();
    let other = SceneGeometry{height: 3, ..tiny()};
    assert!(matches!(SceneRecord::decode(&buf, &other), Err(Error::FeatureShape{..})));
  }

  #[test]
  fn push_transposes_image_and_masks() {
    let s = scene(2, [1.0, 2.0, 3.0, 4.0]);
    let mut archive = SplitArchive::new("val", 2, &tiny(), true);
    assert!(archive.push(&s).unwrap());
    let images = archive.images();
    for c in 0 .. 3 {
      for h in 0 .. 2 {
        for w in 0 .. 3 {
          assert_eq!(images[[0, c, h, w]], s.image[[h, w, c]]);
        }
      }
    }
    let masks = archive.masks().unwrap();
    assert_eq!(masks[[0, 3, 0, 1, 2]], s.masks[[3, 1, 2, 0]]);
    assert_eq!(archive.visibility().row(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
  }

  #[test]
  fn full_archive_refuses_more() {
    let mut archive = SplitArchive::new("train", 1, &tiny(), false);
    assert!(archive.masks().is_none());
    assert!(archive.push(&scene(0, [0.0; 4])).unwrap());
    assert!(!archive.push(&scene(1, [0.0; 4])).unwrap());
    assert_eq!(archive.len(), 1);
  }

  #[test]
  fn truncate_shrinks_every_array() {
    let mut archive = SplitArchive::new("val", 5, &tiny(), true);
    archive.push(&scene(0, [0.0; 4])).unwrap();
    archive.push(&scene(1, [0.0; 4])).unwrap();
    archive.truncate();
    assert_eq!(archive.images().shape(), &[2, 3, 2, 3]);
    assert_eq!(archive.masks().unwrap().shape(), &[2, 4, 1, 2, 3]);
    assert_eq!(archive.visibility().shape(), &[2, 4]);
  }

  #[test]
  fn budget_counts_retained_scenes_only() {
    // Positions 2 and 7 sum above the limit.
    let scenes: Vec<SceneRecord> = (0 .. 10u8).map(|i| {
      if i == 2 || i == 7 {
        scene(i, [4.0, 4.0, 0.0, 0.0])
      } else {
        scene(i, [1.0, 1.0, 0.0, 0.0])
      }
    }).collect();
    let cfg = config(vec![SplitSpec::new("val", 5)]);
    let mut ex = SceneExtractor::new(&cfg, stream(&scenes));
    let (archive, summary) = ex.fill_split(&cfg.splits[0]).unwrap();

    assert_eq!(summary.retained, 5);
    assert_eq!(summary.attempted, 6);
    assert_eq!(summary.discarded, 1);
    assert!(!summary.exhausted);
    let kept: Vec<u8> = (0 .. archive.len()).map(|i| archive.images()[[i, 0, 0, 0]] / 20).collect();
    assert_eq!(kept, vec![0, 1, 3, 4, 5]);
  }

  #[test]
  fn visibility_at_the_limit_is_kept() {
    let scenes = vec![scene(0, [3.5, 3.5, 0.0, 0.0]), scene(1, [3.5, 3.5, 0.5, 0.0])];
    let cfg = config(vec![SplitSpec::new("test", 10)]);
    let mut ex = SceneExtractor::new(&cfg, stream(&scenes));
    let (archive, summary) = ex.fill_split(&cfg.splits[0]).unwrap();
    assert_eq!(archive.len(), 1);
    assert!(summary.exhausted);
    assert_eq!(summary.attempted, 2);
  }

  #[test]
  fn splits_share_one_advancing_stream() {
    let scenes: Vec<SceneRecord> = (0 .. 6u8).map(|i| scene(i, [0.0; 4])).collect();
    let mut cfg = config(vec![SplitSpec::new("train", 2), SplitSpec::new("val", 2)]);
    cfg.skip_between_splits = 1;
    let mut ex = SceneExtractor::new(&cfg, stream(&scenes));
    let (a, _) = ex.fill_split(&cfg.splits[0]).unwrap();
    ex.skip_records(cfg.skip_between_splits).unwrap();
    let (b, _) = ex.fill_split(&cfg.splits[1]).unwrap();
    assert_eq!(a.images()[[1, 0, 0, 0]] / 20, 1);
    assert_eq!(b.images()[[0, 0, 0, 0]] / 20, 3);
    assert_eq!(b.images()[[1, 0, 0, 0]] / 20, 4);
  }

  #[test]
  fn progress_reported_every_interval_attempts() {
    let due: Vec<usize> = (1 .. 3001).filter(|&a| progress_due(a, PROGRESS_INTERVAL)).collect();
    assert_eq!(due, vec![1000, 2000, 3000]);
    let due: Vec<usize> = (1 .. 8).filter(|&a| progress_due(a, 2)).collect();
    assert_eq!(due, vec![2, 4, 6]);
    assert!(!progress_due(0, 2));
    assert!((1 .. 100).all(|a| !progress_due(a, 0)));
  }

  #[test]
  fn corrupt_scene_aborts() {
    let mut w = TfRecordWriter::new(Vec::new(), RecordCompression::None);
    w.write_record(&Example::default().encode_to_vec()).unwrap();
    let records = TfRecordReader::new(Cursor::new(w.finish().unwrap()));
    let cfg = config(vec![SplitSpec::new("val", 3)]);
    let mut ex = SceneExtractor::new(&cfg, records);
    assert!(matches!(ex.fill_split(&cfg.splits[0]), Err(Error::MissingFeature(_))));
  }

  #[test]
  fn config_json_fills_defaults() {
    let cfg: ClevrConfig = serde_json::from_str(
        r#"{"source_path": "in.tfrecords", "output_dir": "/tmp/out"}"#).unwrap();
    assert_eq!(cfg.dataset_name, DATASET_NAME);
    assert_eq!(cfg.splits, default_splits());
    assert_eq!(cfg.compression, RecordCompression::Gzip);
    assert_eq!(cfg.geometry, SceneGeometry::default());
    assert_eq!(cfg.max_visibility_sum, 7.0);
    assert!(!cfg.splits[0].includes_masks());
    assert!(cfg.splits[1].includes_masks());
    assert_eq!(
        cfg.archive_path("val"),
        PathBuf::from("/tmp/out/clevr_with_masks_6/clevr_with_masks_6_val.npz"));
  }
}
