/*
 * Text conversions at the host boundary. The UI and the rest of the crate speak
 * UTF-8, and file bytes may start with a byte-order mark.
 * Percent-encoding is used for the local-file marker URIs the UI embeds in image
 * blocks.
 */

// Prefix of URIs that point at an image outside the workspace on the local disk.
pub const LOCAL_FILE_PREFIX: &str = "https://veritnote.app/local-file/";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

// File bytes as UI text: a leading BOM is dropped and invalid UTF-8 replaced.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(strip_utf8_bom(bytes)).into_owned()
}

// `None` when the escapes do not decode to valid UTF-8.
pub fn percent_decode(encoded: &str) -> Option<String> {
    urlencoding::decode(encoded).ok().map(|s| s.into_owned())
}

/*
 * Builds the marker URI for a local file. Each path segment is percent-encoded on
 * its own so the `/` separators survive; Windows backslashes become `%5C` and come
 * back when the export pipeline decodes the marker.
 */
pub fn local_file_uri(path: &str) -> String {
    let encoded: Vec<String> = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{LOCAL_FILE_PREFIX}{}", encoded.join("/"))
}
