//! Key hashing and cache key construction

use sha2::{Digest, Sha256};

/// Length of every hashed key
pub const HASH_LEN: usize = 64;

/// Hash a cache key into a fixed-length, filesystem-safe identifier
///
/// The result is the lowercase hex encoding of the key's SHA-256 digest, so it
/// never contains path separators and is identical across runs and platforms.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether a file name has the shape of a hashed key
pub fn is_hashed_name(name: &str) -> bool {
    name.len() == HASH_LEN && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Join the non-empty parts with `_`
pub fn build_cache_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter(|part| !part.as_ref().is_empty())
        .map(|part| part.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join("_")
}

/// Like [`build_cache_key`], with `prefix` as the first part
pub fn build_prefixed_cache_key<I, S>(prefix: &str, parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let rest = build_cache_key(parts);
    build_cache_key([prefix, rest.as_str()])
}
