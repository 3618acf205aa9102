//! Image transforms applied by `CelebA::get` after decoding.

use crate::error::{Result};

use image::{DynamicImage, GenericImageView};
use image::imageops::{FilterType};
use ndarray::{Array3};
use rand::{Rng, thread_rng};

use std::cmp::{min};

pub trait ImageTransform {
  type Output;

  fn apply(&self, image: DynamicImage) -> Result<Self::Output>;
}

/// Returns the decoded image untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl ImageTransform for Identity {
  type Output = DynamicImage;

  fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
    Ok(image)
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageOp {
  /// Square crop of the given side around the image center.
  CenterCrop(u32),
  /// Scales so the smaller side equals the given size, keeping the
  /// aspect ratio.
  Resize(u32),
  /// Mirrors left-right with the given probability.
  RandomHorizontalFlip(f64),
}

impl ImageOp {
  pub fn apply(&self, image: DynamicImage) -> DynamicImage {
    match *self {
      ImageOp::CenterCrop(side) => {
        let (w, h) = image.dimensions();
        let cw = min(side, w);
        let ch = min(side, h);
        image.crop_imm((w - cw) / 2, (h - ch) / 2, cw, ch)
      }
      ImageOp::Resize(smaller_dim) => {
        let (old_width, old_height) = image.dimensions();
        let (new_width, new_height) = if old_width < old_height {
          (smaller_dim, (smaller_dim as f32 / old_width as f32 * old_height as f32).round() as u32)
        } else if old_width > old_height {
          ((smaller_dim as f32 / old_height as f32 * old_width as f32).round() as u32, smaller_dim)
        } else {
          (smaller_dim, smaller_dim)
        };
        image.resize_exact(new_width, new_height, FilterType::Lanczos3)
      }
      ImageOp::RandomHorizontalFlip(p) => {
        if thread_rng().gen::<f64>() < p {
          image.fliph()
        } else {
          image
        }
      }
    }
  }
}

/// Ordered image ops followed by conversion to a CHW `f32` RGB tensor in
/// `[0, 1]`, optionally normalized per channel as `(x - mean) / std`.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
  pub ops:        Vec<ImageOp>,
  pub normalize:  Option<([f32; 3], [f32; 3])>,
}

impl Pipeline {
  pub fn new() -> Pipeline {
    Pipeline::default()
  }

  pub fn then(mut self, op: ImageOp) -> Pipeline {
    self.ops.push(op);
    self
  }

  pub fn normalized(mut self, mean: [f32; 3], std: [f32; 3]) -> Pipeline {
    self.normalize = Some((mean, std));
    self
  }

  /// Random flip, center crop, resize, then normalize to `[-1, 1]`.
  pub fn celeba(crop_size: u32, image_size: u32) -> Pipeline {
    Pipeline::new()
      .then(ImageOp::RandomHorizontalFlip(0.5))
      .then(ImageOp::CenterCrop(crop_size))
      .then(ImageOp::Resize(image_size))
      .normalized([0.5; 3], [0.5; 3])
  }
}

impl ImageTransform for Pipeline {
  type Output = Array3<f32>;

  fn apply(&self, image: DynamicImage) -> Result<Array3<f32>> {
    let mut image = image;
    for op in self.ops.iter() {
      image = op.apply(image);
    }
    let rgb = image.to_rgb8();
    let (w, h) = rgb.dimensions();
    let mut tensor = Array3::from_shape_fn((3, h as usize, w as usize), |(c, y, x)| {
      rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    });
    if let Some((mean, std)) = self.normalize {
      for (c, mut plane) in tensor.outer_iter_mut().enumerate() {
        plane.mapv_inplace(|v| (v - mean[c]) / std[c]);
      }
    }
    Ok(tensor)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use image::{Rgb, RgbImage};

  fn gradient(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| Rgb([x as u8, y as u8, 255])))
  }

  #[test]
  fn center_crop_takes_the_middle() {
    let out = ImageOp::CenterCrop(2).apply(gradient(6, 4));
    assert_eq!(out.dimensions(), (2, 2));
    assert_eq!(out.to_rgb8().get_pixel(0, 0), &Rgb([2, 1, 255]));
  }

  #[test]
  fn crop_larger_than_image_keeps_it() {
    let out = ImageOp::CenterCrop(10).apply(gradient(6, 4));
    assert_eq!(out.dimensions(), (6, 4));
  }

  #[test]
  fn resize_keeps_aspect_on_smaller_side() {
    assert_eq!(ImageOp::Resize(4).apply(gradient(16, 8)).dimensions(), (8, 4));
    assert_eq!(ImageOp::Resize(4).apply(gradient(8, 16)).dimensions(), (4, 8));
    assert_eq!(ImageOp::Resize(4).apply(gradient(8, 8)).dimensions(), (4, 4));
  }

  #[test]
  fn tensor_is_chw_and_normalized() {
    let p = Pipeline::new().normalized([0.5; 3], [0.5; 3]);
    let t = p.apply(gradient(3, 2)).unwrap();
    assert_eq!(t.shape(), &[3, 2, 3]);
    assert_eq!(t[[2, 1, 2]], 1.0);
    assert_eq!(t[[0, 0, 0]], -1.0);

    let raw = Pipeline::new().apply(gradient(3, 2)).unwrap();
    assert_eq!(raw[[0, 1, 2]], 2.0 / 255.0);
    assert_eq!(raw[[1, 1, 2]], 1.0 / 255.0);
  }

  #[test]
  fn celeba_preset_output_shape() {
    let t = Pipeline::celeba(6, 4).apply(gradient(8, 10)).unwrap();
    assert_eq!(t.shape(), &[3, 4, 4]);
  }
}
