// nichegen/src/envelope.rs

//! Normalization of the upstream API's response envelopes.
//!
//! The search endpoint has been observed to answer in three shapes:
//!
//! ```text
//! {"data": {"products": [...]}}   -> Enveloped
//! {"products": [...]}             -> Flat
//! [...]                           -> BareList
//! ```
//!
//! Anything else is `Unrecognized` and yields no products. That is not an error:
//! the caller sees an empty list and treats the niche accordingly.

use serde_json::{Map, Value};

/// A product record exactly as the API returned it.
pub type RawProduct = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
  Enveloped(Vec<Value>),
  Flat(Vec<Value>),
  BareList(Vec<Value>),
  Unrecognized,
}

impl ResponseEnvelope {
  /// Classifies a search response. Variants are checked in declaration order.
  pub fn classify(json: Value) -> Self {
    match json {
      Value::Object(mut top) => {
        if let Some(Value::Array(items)) = top
          .get_mut("data")
          .and_then(Value::as_object_mut)
          .and_then(|data| data.remove("products"))
        {
          return ResponseEnvelope::Enveloped(items);
        }
        match top.remove("products") {
          Some(Value::Array(items)) => ResponseEnvelope::Flat(items),
          _ => ResponseEnvelope::Unrecognized,
        }
      }
      Value::Array(items) => ResponseEnvelope::BareList(items),
      _ => ResponseEnvelope::Unrecognized,
    }
  }

  pub fn into_products(self) -> Vec<RawProduct> {
    let items = match self {
      ResponseEnvelope::Enveloped(items) | ResponseEnvelope::Flat(items) | ResponseEnvelope::BareList(items) => items,
      ResponseEnvelope::Unrecognized => return Vec::new(),
    };
    items
      .into_iter()
      .filter_map(|item| match item {
        Value::Object(map) => Some(map),
        _ => None,
      })
      .collect()
  }

  pub fn variant_name(&self) -> &'static str {
    match self {
      ResponseEnvelope::Enveloped(_) => "enveloped",
      ResponseEnvelope::Flat(_) => "flat",
      ResponseEnvelope::BareList(_) => "bare_list",
      ResponseEnvelope::Unrecognized => "unrecognized",
    }
  }
}

/// Search response -> raw products, possibly empty.
pub fn extract_product_list(json: Value) -> Vec<RawProduct> {
  ResponseEnvelope::classify(json).into_products()
}

/// Detail response -> the single product record it carries.
///
/// An object with a `data` key yields whatever object sits under it (nothing if
/// it is not an object), an object without `data` is taken as the record itself,
/// and non-objects yield nothing.
pub fn extract_product_detail(json: Value) -> Option<RawProduct> {
  match json {
    Value::Object(mut top) => match top.remove("data") {
      Some(Value::Object(inner)) => Some(inner),
      Some(_) => None,
      None => Some(top),
    },
    _ => None,
  }
}
