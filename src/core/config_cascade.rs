/*
 * Folder configuration cascade. Every folder in a workspace may hold a
 * `veritnoteconfig` file: a JSON object of category -> key -> value. A page's
 * effective configuration starts from the `config` embedded in the page itself; the
 * folders from the page's parent up to the workspace root then fill in any key that
 * is absent or set to the sentinel `"inherit"`. Nearer folders win over farther ones
 * because a key, once filled with a concrete value, is no longer eligible.
 *
 * The merge only goes one level deep (category -> key). A value that is itself an
 * object is copied wholesale.
 *
 * The walk is written against `IdentifierTree` rather than `std::path`, so the same
 * code runs over filesystem paths and over document-provider URIs.
 */
use serde_json::{Map, Value, json};

pub const CONFIG_FILE_NAME: &str = "veritnoteconfig";
pub const INHERIT: &str = "inherit";

/*
 * The identifier-based primitives the cascade needs. `read_json_file` returns `{}`
 * for anything missing or unparsable; a missing folder config is the common case.
 */
pub trait IdentifierTree {
    fn read_json_file(&self, identifier: &str) -> Value;
    fn parent_identifier(&self, identifier: &str) -> String;
    fn combine_identifier(&self, parent: &str, child_name: &str) -> String;
}

// The skeleton written into folders that have no config yet.
pub fn default_folder_config() -> Value {
    json!({ "page": {} })
}

/*
 * Fills `target` from `ancestor` for every category/key that `target` lacks or marks
 * as `"inherit"`. Categories that are not objects on either side are left alone.
 */
pub fn merge_inherited(target: &mut Value, ancestor: &Value) {
    let Some(ancestor_categories) = ancestor.as_object() else {
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Some(target_categories) = target.as_object_mut() else {
        return;
    };

    for (category, ancestor_keys) in ancestor_categories {
        let Some(ancestor_keys) = ancestor_keys.as_object() else {
            continue;
        };
        let target_keys = target_categories
            .entry(category.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(target_keys) = target_keys.as_object_mut() else {
            continue;
        };
        for (key, value) in ancestor_keys {
            let inherits = match target_keys.get(key) {
                None => true,
                Some(Value::String(s)) => s == INHERIT,
                Some(_) => false,
            };
            if inherits {
                target_keys.insert(key.clone(), value.clone());
            }
        }
    }
}

/*
 * Resolves the effective configuration of the document at `file_identifier` inside
 * the workspace rooted at `workspace_root`.
 *
 * The walk stops once the root has been merged, once the current folder identifier
 * becomes shorter than the root (the file lies outside it), or when the parent of a
 * folder is the folder itself (the top of the hierarchy was reached).
 */
pub fn resolve_file_configuration<T: IdentifierTree + ?Sized>(
    tree: &T,
    workspace_root: &str,
    file_identifier: &str,
) -> Value {
    let file_content = tree.read_json_file(file_identifier);
    let mut resolved = match file_content.get("config") {
        Some(config @ Value::Object(_)) => config.clone(),
        _ => Value::Object(Map::new()),
    };

    let root = workspace_root.trim_end_matches(['/', '\\']);
    let mut dir = tree.parent_identifier(file_identifier);
    loop {
        let current = dir.trim_end_matches(['/', '\\']);
        if current.len() < root.len() {
            break;
        }
        let folder_config = tree.read_json_file(&tree.combine_identifier(&dir, CONFIG_FILE_NAME));
        merge_inherited(&mut resolved, &folder_config);

        if current == root {
            break;
        }
        let parent = tree.parent_identifier(&dir);
        if parent == dir || parent.is_empty() {
            log::debug!("ConfigCascade: Reached top of hierarchy at '{dir}' without meeting root '{workspace_root}'");
            break;
        }
        dir = parent;
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // In-memory tree keyed by '/'-separated identifiers.
    struct MemoryTree {
        files: HashMap<String, Value>,
    }

    impl MemoryTree {
        fn new(files: &[(&str, Value)]) -> Self {
            MemoryTree {
                files: files
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            }
        }
    }

    impl IdentifierTree for MemoryTree {
        fn read_json_file(&self, identifier: &str) -> Value {
            self.files.get(identifier).cloned().unwrap_or_else(|| json!({}))
        }
        fn parent_identifier(&self, identifier: &str) -> String {
            match identifier.rfind('/') {
                Some(0) => "/".to_string(),
                Some(i) => identifier[..i].to_string(),
                None => String::new(),
            }
        }
        fn combine_identifier(&self, parent: &str, child_name: &str) -> String {
            format!("{}/{}", parent.trim_end_matches('/'), child_name)
        }
    }

    #[test]
    fn test_ancestor_fills_inherit_and_missing_keys() {
        let tree = MemoryTree::new(&[
            ("/w/veritnoteconfig", json!({"page": {"theme": "dark"}})),
            (
                "/w/sub/veritnoteconfig",
                json!({"page": {"theme": "inherit", "font": "serif"}}),
            ),
            ("/w/sub/doc.veritnote", json!({"config": {}, "blocks": []})),
        ]);
        let resolved = resolve_file_configuration(&tree, "/w", "/w/sub/doc.veritnote");
        assert_eq!(resolved, json!({"page": {"theme": "dark", "font": "serif"}}));
    }

    #[test]
    fn test_own_config_takes_precedence() {
        let tree = MemoryTree::new(&[
            ("/w/veritnoteconfig", json!({"page": {"theme": "dark"}})),
            (
                "/w/sub/doc.veritnote",
                json!({"config": {"page": {"theme": "light"}}, "blocks": []}),
            ),
        ]);
        let resolved = resolve_file_configuration(&tree, "/w", "/w/sub/doc.veritnote");
        assert_eq!(resolved, json!({"page": {"theme": "light"}}));
    }

    #[test]
    fn test_nearest_concrete_value_wins() {
        let tree = MemoryTree::new(&[
            ("/w/veritnoteconfig", json!({"page": {"width": "wide"}})),
            ("/w/a/veritnoteconfig", json!({"page": {"width": "narrow"}})),
            ("/w/a/b/doc.veritnote", json!({"config": {"page": {"width": "inherit"}}})),
        ]);
        let resolved = resolve_file_configuration(&tree, "/w", "/w/a/b/doc.veritnote");
        assert_eq!(resolved, json!({"page": {"width": "narrow"}}));
    }

    #[test]
    fn test_walk_stops_at_root() {
        let tree = MemoryTree::new(&[
            ("/veritnoteconfig", json!({"page": {"leak": true}})),
            ("/w/doc.veritnote", json!([])),
        ]);
        let resolved = resolve_file_configuration(&tree, "/w", "/w/doc.veritnote");
        assert_eq!(resolved, json!({}));
    }

    #[test]
    fn test_file_outside_root_terminates() {
        let tree = MemoryTree::new(&[("/other/veritnoteconfig", json!({"page": {"x": 1}}))]);
        let resolved = resolve_file_configuration(&tree, "/w/deep/root", "/other/doc.veritnote");
        assert_eq!(resolved, json!({}));
    }

    #[test]
    fn test_merge_is_one_level_deep() {
        let mut target = json!({"page": {"margins": {"top": 1}}});
        merge_inherited(
            &mut target,
            &json!({"page": {"margins": {"top": 5, "left": 5}, "font": "mono"}}),
        );
        assert_eq!(
            target,
            json!({"page": {"margins": {"top": 1}, "font": "mono"}})
        );
    }

    #[test]
    fn test_merge_ignores_non_object_categories() {
        let mut target = json!({"page": "broken"});
        merge_inherited(&mut target, &json!({"page": {"a": 1}, "graph": 3}));
        assert_eq!(target, json!({"page": "broken"}));
    }
}
