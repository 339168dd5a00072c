// nichegen/src/extract.rs

//! Raw API record -> canonical [`Product`].
//!
//! Search results and detail responses name the same fields differently
//! (`title` vs `product_title`, ...). Resolution walks [`FIELD_SOURCES`] and
//! takes the first key holding a non-empty value.

use crate::envelope::RawProduct;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub const PRICE_NOT_AVAILABLE: &str = "Price not available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Title,
  Image,
  Asin,
  Price,
  OriginalPrice,
}

/// Source keys per field, simple (search) schema first, detailed schema second.
pub const FIELD_SOURCES: &[(Field, &[&str])] = &[
  (Field::Title, &["title", "product_title"]),
  (Field::Image, &["image", "product_photo"]),
  (Field::Asin, &["asin", "product_asin"]),
  (Field::Price, &["price", "product_price"]),
  (Field::OriginalPrice, &["original_price", "product_original_price"]),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
  pub title: String,
  pub image: String,
  pub asin: String,
  /// `$`-prefixed display price, or [`PRICE_NOT_AVAILABLE`].
  pub price: String,
  /// `$`-prefixed display price, or empty.
  pub original_price: String,
  /// Whole percent off, 0 when not computable.
  pub discount: u32,
  pub affiliate_link: String,
}

/// Text form of a JSON value, or `None` for anything that counts as absent
/// (missing, null, empty string, zero, non-scalar).
fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
    _ => None,
  }
}

/// First non-empty value among `keys`, in order.
pub fn resolve_first(raw: &RawProduct, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|key| raw.get(*key).and_then(scalar_text))
}

/// Resolves `field` through its [`FIELD_SOURCES`] entry.
pub fn resolve_field(raw: &RawProduct, field: Field) -> Option<String> {
  FIELD_SOURCES
    .iter()
    .find(|(f, _)| *f == field)
    .and_then(|(_, keys)| resolve_first(raw, keys))
}

/// Drops the currency symbol, thousands separators and surrounding whitespace.
pub fn normalize_price(text: &str) -> String {
  text.replace(['$', ','], "").trim().to_string()
}

/// Whole percent saved, rounded down. 0 unless both sides are numbers and
/// `original` is strictly greater than `price`.
pub fn discount_percent(price: &str, original: &str) -> u32 {
  let (Ok(price_val), Ok(original_val)) = (price.parse::<f64>(), original.parse::<f64>()) else {
    return 0;
  };
  if !price_val.is_finite() || !original_val.is_finite() || original_val == 0.0 {
    return 0;
  }
  if original_val > price_val {
    (((original_val - price_val) / original_val) * 100.0).floor() as u32
  } else {
    0
  }
}

pub fn affiliate_link(asin: &str, affiliate_tag: &str) -> String {
  if asin.is_empty() {
    String::new()
  } else {
    format!("https://www.amazon.com/dp/{}?tag={}", asin, affiliate_tag)
  }
}

/// Builds a [`Product`] from `raw`, or `None` when title, image or ASIN is missing.
pub fn extract(raw: &RawProduct, affiliate_tag: &str) -> Option<Product> {
  let title = resolve_field(raw, Field::Title).unwrap_or_default();
  let image = resolve_field(raw, Field::Image).unwrap_or_default();
  let asin = resolve_field(raw, Field::Asin).unwrap_or_default();

  let price = resolve_field(raw, Field::Price).map(|p| normalize_price(&p)).unwrap_or_default();
  let original_price = resolve_field(raw, Field::OriginalPrice)
    .map(|p| normalize_price(&p))
    .unwrap_or_default();

  let discount = if price.is_empty() || original_price.is_empty() {
    0
  } else {
    discount_percent(&price, &original_price)
  };

  if title.is_empty() || image.is_empty() || asin.is_empty() {
    warn!("Missing required fields for product: {}", asin);
    return None;
  }

  Some(Product {
    affiliate_link: affiliate_link(&asin, affiliate_tag),
    price: if price.is_empty() {
      PRICE_NOT_AVAILABLE.to_string()
    } else {
      format!("${}", price)
    },
    original_price: if original_price.is_empty() {
      String::new()
    } else {
      format!("${}", original_price)
    },
    title,
    image,
    asin,
    discount,
  })
}

/// ASIN of a raw record under either naming scheme, without extracting the rest.
pub fn raw_asin(raw: &RawProduct) -> Option<String> {
  resolve_field(raw, Field::Asin)
}
