extern crate celeba_clevr_preproc;
extern crate env_logger;

use celeba_clevr_preproc::{ClevrConfig, extract_scenes};

use std::env;
use std::path::{PathBuf};
use std::process;

fn main() {
  env_logger::init();

  let args: Vec<String> = env::args().skip(1).collect();
  let config = match args.len() {
    1 => match ClevrConfig::from_json_file(&PathBuf::from(&args[0])) {
      Err(e) => {
        eprintln!("failed to read config {}: {}", args[0], e);
        process::exit(1);
      }
      Ok(config) => config,
    },
    2 => ClevrConfig::new(&PathBuf::from(&args[0]), &PathBuf::from(&args[1])),
    _ => {
      eprintln!("usage: preproc-clevr <config.json>");
      eprintln!("       preproc-clevr <clevr_with_masks_train.tfrecords> <output_dir>");
      process::exit(2);
    }
  };

  match extract_scenes(&config) {
    Err(e) => {
      eprintln!("extraction failed: {}", e);
      process::exit(1);
    }
    Ok(summaries) => {
      for s in summaries.iter() {
        println!("{}: retained: {} discarded: {} exhausted: {} -> {}",
            s.name, s.retained, s.discarded, s.exhausted, s.archive_path.display());
      }
    }
  }
}
