use std::path::Path;

use tower_lsp::lsp_types::Url;

/// 64-bit FNV-1a; stable across runs, used to name cache shards
pub fn fnv1a_64(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    text.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}

/// Filesystem path of a `file://` URI, as a string
pub fn uri_to_path_string(uri: &Url) -> Option<String> {
    uri.to_file_path()
        .ok()
        .map(|path| path.to_string_lossy().to_string())
}

/// Extension of `path` without the dot, lower-cased
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}
