// nichegen/src/render.rs

//! Page rendering by literal placeholder substitution.
//!
//! Values are inserted verbatim: nothing is HTML-escaped, and a placeholder
//! token appearing inside a niche name or product title is itself replaced by
//! the later substitutions. Output is a pure function of the inputs, so
//! re-rendering the same products yields byte-identical pages.

use crate::extract::Product;

pub const NICHE_TITLE_PLACEHOLDER: &str = "{{NICHE_TITLE}}";
pub const META_DESCRIPTION_PLACEHOLDER: &str = "{{META_DESCRIPTION}}";
pub const PRODUCTS_PLACEHOLDER: &str = "{{PRODUCTS}}";

pub fn meta_description(niche: &str) -> String {
  format!(
    "Discover the best {} available on Amazon. \
     Our expert-curated list features the top-rated products with detailed reviews, \
     pricing, and direct purchase links. Updated daily with the latest deals.",
    niche.to_lowercase()
  )
}

/// HTML block for one product card.
pub fn product_fragment(product: &Product) -> String {
  let old_price = if product.original_price.is_empty() {
    String::new()
  } else {
    format!(r#"<span class="old">{}</span>"#, product.original_price)
  };
  let discount = if product.discount > 0 {
    format!(r#"<span class="discount">{}% off</span>"#, product.discount)
  } else {
    String::new()
  };

  format!(
    concat!(
      "\n",
      "    <div class=\"product\">\n",
      "        <h2>{title}</h2>\n",
      "        <img src=\"{image}\" alt=\"{title}\">\n",
      "        <div class=\"price-info\">\n",
      "            <span class=\"price\">{price}</span>\n",
      "            {old_price}\n",
      "            {discount}\n",
      "        </div>\n",
      "        <a href=\"{link}\" target=\"_blank\" rel=\"noopener noreferrer\">View on Amazon</a>\n",
      "    </div>\n",
      "    "
    ),
    title = product.title,
    image = product.image,
    price = product.price,
    old_price = old_price,
    discount = discount,
    link = product.affiliate_link,
  )
}

/// Product cards in the given order, newline separated.
pub fn products_block(products: &[Product]) -> String {
  products.iter().map(product_fragment).collect::<Vec<_>>().join("\n")
}

/// Fills `template` for one niche. Substitution order is title, description, products.
pub fn render(template: &str, niche: &str, products: &[Product]) -> String {
  template
    .replace(NICHE_TITLE_PLACEHOLDER, niche)
    .replace(META_DESCRIPTION_PLACEHOLDER, &meta_description(niche))
    .replace(PRODUCTS_PLACEHOLDER, &products_block(products))
}
