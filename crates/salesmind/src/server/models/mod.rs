//! Domain records shared by services, handlers and the document store

pub mod api_keys;
pub mod history;
pub mod research;
pub mod status;

/// Clip `text` to at most `limit` characters without splitting a code point
pub fn clip_chars(text: &str, limit: usize) -> &str {
  match text.char_indices().nth(limit) {
    Some((byte_index, _)) => &text[..byte_index],
    None => text,
  }
}
