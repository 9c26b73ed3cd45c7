/*
 * SHA256 helpers. Exported images downloaded from the web are named after a digest
 * of their URL, so two different URLs that end in the same file name do not
 * overwrite each other inside a page's `src/` folder.
 */
use sha2::{Digest, Sha256};

// Hex-encoded SHA256 of `text`.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

// A short, stable file stem for `url`: the first 16 hex digits of its digest.
pub fn url_file_stem(url: &str) -> String {
    let mut hex = sha256_hex(url);
    hex.truncate(16);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_values() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_url_file_stem_is_stable_and_distinct() {
        let a = url_file_stem("https://example.com/a/cat.png");
        let b = url_file_stem("https://example.com/b/cat.png");
        assert_eq!(a.len(), 16);
        assert_eq!(a, url_file_stem("https://example.com/a/cat.png"));
        assert_ne!(a, b);
    }
}
