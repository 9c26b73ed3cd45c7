/*
 * Page documents as stored on disk. Two shapes are accepted when reading: the legacy
 * shape is a bare array of blocks, the current shape is `{"config": {...}, "blocks":
 * [...]}`. Writers always produce the current shape, pretty-printed with two-space
 * indentation.
 *
 * Blocks are kept as raw JSON. The editor owns their schema; the backend only needs
 * the `id` and `children` keys to locate a referenced block.
 */
use serde_json::{Map, Value, json};

pub const PAGE_EXTENSION: &str = ".veritnote";

#[derive(Debug)]
pub enum DocumentError {
    Json(serde_json::Error),
    UnsupportedShape(&'static str),
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Json(err)
    }
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Json(e) => write!(f, "Invalid page JSON: {e}"),
            DocumentError::UnsupportedShape(kind) => {
                write!(f, "Page document must be an array or an object, found {kind}")
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Json(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Clone, PartialEq)]
pub struct PageDocument {
    pub config: Value,
    pub blocks: Vec<Value>,
}

impl PageDocument {
    pub fn new(config: Value, blocks: Vec<Value>) -> Self {
        PageDocument { config, blocks }
    }

    // What a freshly created page contains.
    pub fn empty_page() -> Self {
        PageDocument {
            config: json!({ "page": {} }),
            blocks: Vec::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(strip_bom(text))?;
        Self::from_value(value)
    }

    /*
     * Normalises either accepted shape. An object without `blocks` reads as an empty
     * page, and a missing or non-object `config` reads as `{}`.
     */
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(blocks) => Ok(PageDocument {
                config: Value::Object(Map::new()),
                blocks,
            }),
            Value::Object(mut map) => {
                let blocks = match map.remove("blocks") {
                    Some(Value::Array(blocks)) => blocks,
                    _ => Vec::new(),
                };
                let config = match map.remove("config") {
                    Some(config @ Value::Object(_)) => config,
                    _ => Value::Object(Map::new()),
                };
                Ok(PageDocument { config, blocks })
            }
            Value::Null => Err(DocumentError::UnsupportedShape("null")),
            Value::Bool(_) => Err(DocumentError::UnsupportedShape("a boolean")),
            Value::Number(_) => Err(DocumentError::UnsupportedShape("a number")),
            Value::String(_) => Err(DocumentError::UnsupportedShape("a string")),
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "config": self.config,
            "blocks": self.blocks,
        })
    }

    pub fn to_pretty_string(&self) -> String {
        to_pretty_json(&self.to_value())
    }

    pub fn find_block(&self, block_id: &str) -> Option<&Value> {
        find_block_in(&self.blocks, block_id)
    }
}

/*
 * Depth-first, pre-order search for the first block whose `id` equals `block_id`.
 * A block is checked before its children, and children before later siblings.
 */
pub fn find_block_in<'a>(blocks: &'a [Value], block_id: &str) -> Option<&'a Value> {
    for block in blocks {
        if block.get("id").and_then(Value::as_str) == Some(block_id) {
            return Some(block);
        }
        if let Some(children) = block.get("children").and_then(Value::as_array) {
            if let Some(found) = find_block_in(children, block_id) {
                return Some(found);
            }
        }
    }
    None
}

// serde_json's pretty printer indents with two spaces.
pub fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_array_shape() {
        let text = r#"[{"id":"x","type":"paragraph","content":"hi","children":[]}]"#;
        let doc = PageDocument::parse(text).unwrap();
        assert_eq!(doc.config, json!({}));
        assert_eq!(
            Value::Array(doc.blocks),
            json!([{"id":"x","type":"paragraph","content":"hi","children":[]}])
        );
    }

    #[test]
    fn test_parse_current_shape() {
        let text = r#"{"config":{"page":{"theme":"dark"}},"blocks":[{"id":"a"}]}"#;
        let doc = PageDocument::parse(text).unwrap();
        assert_eq!(doc.config, json!({"page": {"theme": "dark"}}));
        assert_eq!(doc.blocks, vec![json!({"id": "a"})]);
    }

    #[test]
    fn test_parse_object_with_missing_keys() {
        let doc = PageDocument::parse("{}").unwrap();
        assert_eq!(doc.config, json!({}));
        assert!(doc.blocks.is_empty());
    }

    #[test]
    fn test_parse_strips_leading_bom() {
        let doc = PageDocument::parse("\u{feff}[]").unwrap();
        assert!(doc.blocks.is_empty());
    }

    #[test]
    fn test_parse_rejects_scalars_and_garbage() {
        assert!(matches!(
            PageDocument::parse("\"text\""),
            Err(DocumentError::UnsupportedShape(_))
        ));
        assert!(matches!(
            PageDocument::parse("{not json"),
            Err(DocumentError::Json(_))
        ));
    }

    #[test]
    fn test_pretty_string_is_current_shape_with_two_space_indent() {
        let doc = PageDocument::empty_page();
        let text = doc.to_pretty_string();
        assert!(text.contains("\n  \"blocks\": []"));
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, json!({"config": {"page": {}}, "blocks": []}));
    }

    #[test]
    fn test_find_block_depth_first() {
        let blocks = vec![
            json!({"id": "a", "children": [{"id": "b", "content": "target"}]}),
            json!({"id": "b", "content": "later sibling"}),
        ];
        let found = find_block_in(&blocks, "b").unwrap();
        assert_eq!(found, &json!({"id": "b", "content": "target"}));
        assert!(find_block_in(&blocks, "zzz").is_none());
    }

    #[test]
    fn test_find_block_ignores_malformed_children() {
        let blocks = vec![json!({"id": "a", "children": "oops"}), json!("not a block")];
        assert!(find_block_in(&blocks, "b").is_none());
        assert!(find_block_in(&blocks, "a").is_some());
    }
}
