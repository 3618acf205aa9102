extern crate celeba_clevr_preproc;
extern crate env_logger;

use celeba_clevr_preproc::{CelebA, CelebAConfig, Partition};

use std::env;
use std::path::{PathBuf};
use std::process;

fn main() {
  env_logger::init();

  let args: Vec<String> = env::args().skip(1).collect();
  if args.len() != 2 {
    eprintln!("usage: inspect-celeba <list_attr_celeba.txt> <image_dir>");
    process::exit(2);
  }
  let config = CelebAConfig{
    attr_path:  PathBuf::from(&args[0]),
    image_dir:  PathBuf::from(&args[1]),
  };

  let celeba = match CelebA::load(&config) {
    Err(e) => {
      eprintln!("failed to load {:?}: {}", config.attr_path, e);
      process::exit(1);
    }
    Ok(celeba) => celeba,
  };

  println!("attributes: {}", celeba.attr_names().join(" "));
  for &mode in [Partition::Train, Partition::Test].iter() {
    let records = celeba.partition(mode);
    let mut positives = vec![0usize; celeba.num_attrs()];
    let mut missing = 0;
    for record in records.iter() {
      for (count, &a) in positives.iter_mut().zip(record.attributes.iter()) {
        if a {
          *count += 1;
        }
      }
      if !celeba.image_path(record).is_file() {
        missing += 1;
      }
    }
    println!("{:?}: {} records, {} missing images", mode, records.len(), missing);
    for (idx, count) in positives.iter().enumerate() {
      println!("  {:>3} {:<24} {}", idx, celeba.attr_name(idx).unwrap_or("?"), count);
    }
  }
}
