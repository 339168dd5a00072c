// nichegen/src/slug.rs

use deunicode::deunicode;

/// Filesystem and URL safe form of a niche name.
///
/// Transliterates to ASCII (`Кофеварки` becomes `kofevarki`, `Crème` becomes
/// `creme`), lowercases, drops apostrophes and quotes and turns every other run
/// of non-alphanumeric characters into a single `-`. "Men's Running Shoes"
/// becomes `mens-running-shoes`.
///
/// The result is empty when the name has nothing transliterable, e.g. `"!!!"`.
pub fn slugify(input: &str) -> String {
  let ascii = deunicode(input);
  let mut out = String::with_capacity(ascii.len());
  let mut pending_dash = false;

  for ch in ascii.chars() {
    if matches!(ch, '\'' | '"' | '`') {
      continue;
    }
    if !ch.is_ascii_alphanumeric() {
      pending_dash = true;
      continue;
    }
    if pending_dash && !out.is_empty() {
      out.push('-');
    }
    pending_dash = false;
    out.push(ch.to_ascii_lowercase());
  }

  out
}

/// A slug usable as a single directory name under the output root.
pub fn is_usable(slug: &str) -> bool {
  !slug.is_empty() && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
