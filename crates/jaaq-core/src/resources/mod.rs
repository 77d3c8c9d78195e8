//! Typed resource accessors over the HTTP core

mod collections;
mod videos;

pub use collections::Collections;
pub use videos::{VideoLookup, Videos};

/// Percent-encode an identifier for use as a single path segment.
///
/// The identifier is decoded to raw bytes first, so an already-encoded
/// value is sent unchanged instead of being encoded twice, even when its
/// escapes are not valid UTF-8.
pub fn encode_path_segment(id: &str) -> String {
    let decoded = urlencoding::decode_binary(id.as_bytes());
    urlencoding::encode_binary(&decoded).into_owned()
}
