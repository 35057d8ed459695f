// Store path utilities.
// Maps the database, its manifest, and each record key onto the filesystem.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::config::StoreConfig;

/// The single collection every record lives in.
pub const COLLECTION: &str = "kv";

const RECORD_EXTENSION: &str = ".json";

/// Longest escaped key used verbatim as a file name. Leaves room for the
/// extension and temp-file suffix under the usual 255-byte name limit.
const MAX_ENCODED_LEN: usize = 200;

/// Marks digest-named records; never produced by `encode_key`.
const DIGEST_PREFIX: char = '~';

/// Path to the database directory.
pub fn database_dir(config: &StoreConfig) -> PathBuf {
    config.root.join(encode_key(&config.name))
}

/// Path to the database manifest.
pub fn manifest_path(config: &StoreConfig) -> PathBuf {
    database_dir(config).join("meta.json")
}

/// Path to the record collection directory.
pub fn collection_dir(config: &StoreConfig) -> PathBuf {
    database_dir(config).join(COLLECTION)
}

/// File name of the record stored under `key`.
///
/// Short keys are escaped so the name stays readable; long ones are named by
/// the SHA-256 of the key. Either way two distinct keys never map to names
/// that differ only in letter case.
pub fn record_file_name(key: &str) -> String {
    let encoded = encode_key(key);
    if encoded.len() <= MAX_ENCODED_LEN {
        return format!("{}{}", encoded, RECORD_EXTENSION);
    }
    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    format!("{}{}{}", DIGEST_PREFIX, digest, RECORD_EXTENSION)
}

/// Whether a directory entry holds a record (as opposed to a temp file).
pub fn is_record_file_name(file_name: &str) -> bool {
    file_name.ends_with(RECORD_EXTENSION)
}

/// Escape a key into a file-name-safe form.
/// Bytes outside `[a-z0-9._-]` become `%XX` with uppercase hex. Uppercase
/// letters are escaped too, so the result is unique even on case-insensitive
/// filesystems.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    // "." and ".." are not usable as names
    if out.chars().all(|c| c == '.') {
        return out.replace('.', "%2E");
    }
    out
}
