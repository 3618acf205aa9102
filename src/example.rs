//! `tf.Example` messages, declared with prost derives so no build step
//! is needed. Field tags follow `tensorflow/core/example/feature.proto`.

use crate::error::{Error, Result};

use prost::{Message};

use std::collections::{HashMap};

#[derive(Clone, PartialEq, Message)]
pub struct BytesList {
  #[prost(bytes = "vec", repeated, tag = "1")]
  pub value: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FloatList {
  #[prost(float, repeated, tag = "1")]
  pub value: Vec<f32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Int64List {
  #[prost(int64, repeated, tag = "1")]
  pub value: Vec<i64>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Feature {
  #[prost(oneof = "feature::Kind", tags = "1, 2, 3")]
  pub kind: Option<feature::Kind>,
}

pub mod feature {
  #[derive(Clone, PartialEq, prost::Oneof)]
  pub enum Kind {
    #[prost(message, tag = "1")]
    BytesList(super::BytesList),
    #[prost(message, tag = "2")]
    FloatList(super::FloatList),
    #[prost(message, tag = "3")]
    Int64List(super::Int64List),
  }
}

#[derive(Clone, PartialEq, Message)]
pub struct Features {
  #[prost(map = "string, message", tag = "1")]
  pub feature: HashMap<String, Feature>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Example {
  #[prost(message, optional, tag = "1")]
  pub features: Option<Features>,
}

impl Feature {
  pub fn bytes(values: Vec<Vec<u8>>) -> Feature {
    Feature{kind: Some(feature::Kind::BytesList(BytesList{value: values}))}
  }

  pub fn floats(values: Vec<f32>) -> Feature {
    Feature{kind: Some(feature::Kind::FloatList(FloatList{value: values}))}
  }

  pub fn int64s(values: Vec<i64>) -> Feature {
    Feature{kind: Some(feature::Kind::Int64List(Int64List{value: values}))}
  }
}

impl Example {
  pub fn decode_from(buf: &[u8]) -> Result<Example> {
    Ok(Example::decode(buf)?)
  }

  pub fn insert(&mut self, name: &str, feature: Feature) {
    self.features.get_or_insert_with(Features::default)
      .feature.insert(name.to_string(), feature);
  }

  pub fn feature(&self, name: &str) -> Result<&Feature> {
    self.features.as_ref()
      .and_then(|f| f.feature.get(name))
      .ok_or_else(|| Error::MissingFeature(name.to_string()))
  }

  /// Concatenates every entry of a bytes feature and checks the total
  /// length, like a fixed-length string feature followed by a raw u8
  /// decode.
  pub fn raw_bytes(&self, name: &str, expected: usize) -> Result<Vec<u8>> {
    let list = match self.feature(name)?.kind {
      Some(feature::Kind::BytesList(ref list)) => list,
      _ => return Err(Error::MissingFeature(format!("{} (bytes list)", name))),
    };
    let got: usize = list.value.iter().map(|v| v.len()).sum();
    if got != expected {
      return Err(Error::FeatureShape{name: name.to_string(), expected, got});
    }
    let mut out = Vec::with_capacity(expected);
    for v in list.value.iter() {
      out.extend_from_slice(v);
    }
    Ok(out)
  }

  pub fn floats(&self, name: &str, expected: usize) -> Result<Vec<f32>> {
    let list = match self.feature(name)?.kind {
      Some(feature::Kind::FloatList(ref list)) => list,
      _ => return Err(Error::MissingFeature(format!("{} (float list)", name))),
    };
    if list.value.len() != expected {
      return Err(Error::FeatureShape{name: name.to_string(), expected, got: list.value.len()});
    }
    Ok(list.value.clone())
  }
}
