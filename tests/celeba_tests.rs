extern crate celeba_clevr_preproc;
extern crate image;
extern crate tempfile;

use celeba_clevr_preproc::{CelebA, CelebAConfig, Error, Identity, Partition, Pipeline};

use image::{GenericImageView, Rgb, RgbImage};

use std::collections::{HashSet};
use std::fs;
use std::path::{Path};

fn write_manifest(dir: &Path, rows: usize) -> CelebAConfig {
  let mut text = format!("{}\nBlond_Hair Male Smiling\n", rows);
  for i in 0 .. rows {
    text.push_str(&format!("{:06}.jpg,{},{},-1\n", i, if i % 2 == 0 { 1 } else { -1 }, i % 3));
  }
  let attr_path = dir.join("list_attr_celeba.txt");
  fs::write(&attr_path, text).unwrap();
  CelebAConfig{
    image_dir: dir.join("images"),
    attr_path,
  }
}

#[test]
fn test_2001_rows_split_1999_test_2_train() {
  let dir = tempfile::tempdir().unwrap();
  let config = write_manifest(dir.path(), 2001);
  let ds = CelebA::load(&config).unwrap();

  assert_eq!(ds.len(Partition::Test), 1999);
  assert_eq!(ds.len(Partition::Train), 2);
  assert_eq!(ds.len(Partition::Test) + ds.len(Partition::Train), 2001);
  assert_eq!(ds.num_attrs(), 3);
}

#[test]
fn test_partitions_are_deterministic() {
  let dir = tempfile::tempdir().unwrap();
  let config = write_manifest(dir.path(), 2100);
  let a = CelebA::load(&config).unwrap();
  let b = CelebA::load(&config).unwrap();
  assert_eq!(a.partition(Partition::Train), b.partition(Partition::Train));
  assert_eq!(a.partition(Partition::Test), b.partition(Partition::Test));

  // Shuffled, not file order.
  let first: Vec<&str> = a.partition(Partition::Test).iter().take(20).map(|r| r.filename.as_str()).collect();
  let file_order: Vec<String> = (0 .. 20).map(|i| format!("{:06}.jpg", i)).collect();
  assert_ne!(first, file_order.iter().map(|s| s.as_str()).collect::<Vec<_>>());
}

#[test]
fn test_every_record_comes_from_the_manifest() {
  let dir = tempfile::tempdir().unwrap();
  let config = write_manifest(dir.path(), 2050);
  let ds = CelebA::load(&config).unwrap();

  let expected: HashSet<String> = (0 .. 2050).map(|i| format!("{:06}.jpg", i)).collect();
  let mut seen = HashSet::new();
  for &mode in [Partition::Train, Partition::Test].iter() {
    for i in 0 .. ds.len(mode) {
      let r = ds.record(i, mode).unwrap();
      assert!(expected.contains(&r.filename));
      assert_eq!(r.attributes.len(), 3);
      let idx: usize = r.filename[.. 6].parse().unwrap();
      assert_eq!(r.attributes, vec![idx % 2 == 0, idx % 3 == 1, false]);
      assert!(seen.insert(r.filename.clone()));
    }
  }
  assert_eq!(seen, expected);
}

#[test]
fn test_index_at_len_is_out_of_range() {
  let dir = tempfile::tempdir().unwrap();
  let config = write_manifest(dir.path(), 2001);
  let ds = CelebA::load(&config).unwrap();
  match ds.get(2, Partition::Train, &Identity) {
    Err(Error::IndexOutOfRange{index: 2, len: 2}) => {}
    other => panic!("unexpected: {:?}", other.map(|s| s.filename)),
  }
  assert!(matches!(
      ds.record(1999, Partition::Test),
      Err(Error::IndexOutOfRange{index: 1999, len: 1999})));
}

#[test]
fn test_get_decodes_and_transforms_image() {
  let dir = tempfile::tempdir().unwrap();
  let config = write_manifest(dir.path(), 3);
  fs::create_dir_all(&config.image_dir).unwrap();
  for i in 0 .. 3u8 {
    let img = RgbImage::from_fn(10, 8, |x, _| Rgb([i * 50, x as u8, 0]));
    img.save_with_format(config.image_dir.join(format!("{:06}.jpg", i)), image::ImageFormat::Png).unwrap();
  }
  let ds = CelebA::load(&config).unwrap();

  let sample = ds.get(0, Partition::Test, &Identity).unwrap();
  assert_eq!(sample.image.dimensions(), (10, 8));
  let idx: u8 = sample.filename[.. 6].parse().unwrap();
  assert_eq!(sample.image.to_rgb8().get_pixel(0, 0)[0], idx * 50);
  assert_eq!(sample.attributes, ds.record(0, Partition::Test).unwrap().attributes);

  let sample = ds.get(1, Partition::Test, &Pipeline::celeba(8, 4)).unwrap();
  assert_eq!(sample.image.shape(), &[3, 4, 4]);
  assert!(sample.image.iter().all(|&v| v >= -1.0 && v <= 1.0));
}

#[test]
fn test_missing_image_is_an_error() {
  let dir = tempfile::tempdir().unwrap();
  let config = write_manifest(dir.path(), 2);
  let ds = CelebA::load(&config).unwrap();
  assert!(ds.get(0, Partition::Test, &Identity).is_err());
}

#[test]
fn test_unreadable_manifest() {
  let dir = tempfile::tempdir().unwrap();
  let config = CelebAConfig{
    image_dir: dir.path().to_path_buf(),
    attr_path: dir.path().join("nope.txt"),
  };
  assert!(matches!(CelebA::load(&config), Err(Error::Io(_))));
}
