/*
 * Turns a raw directory listing, as produced by a platform adapter, into the tree the
 * sidebar renders. Only folders and the document types the editor understands are
 * shown; the export output folder `build` is hidden at every depth.
 *
 * Also defines the typed items a user can create (`ItemKind`) together with the
 * file extension and initial content of each.
 */
use crate::core::page_document::{PAGE_EXTENSION, PageDocument, to_pretty_json};
use serde::Serialize;
use serde_json::json;

pub const EXPORT_DIR_NAME: &str = "build";

/*
 * One entry of a raw listing. `identifier` is whatever the host uses to address the
 * entry (an absolute path on desktop, a document URI on Android). Directories listed
 * without recursion simply have no children.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub identifier: String,
    pub is_directory: bool,
    pub children: Vec<DirEntry>,
}

impl DirEntry {
    pub fn file(name: &str, identifier: &str) -> Self {
        DirEntry {
            name: name.to_string(),
            identifier: identifier.to_string(),
            is_directory: false,
            children: Vec::new(),
        }
    }

    pub fn directory(name: &str, identifier: &str, children: Vec<DirEntry>) -> Self {
        DirEntry {
            name: name.to_string(),
            identifier: identifier.to_string(),
            is_directory: true,
            children,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Folder,
    Page,
    Graph,
    Database,
}

impl ItemKind {
    // Unknown type names fall back to a page.
    pub fn from_type_name(type_name: &str) -> ItemKind {
        match type_name {
            "folder" => ItemKind::Folder,
            "graph" => ItemKind::Graph,
            "database" | "csv" => ItemKind::Database,
            _ => ItemKind::Page,
        }
    }

    pub fn extension(self) -> Option<&'static str> {
        match self {
            ItemKind::Folder => None,
            ItemKind::Page => Some(PAGE_EXTENSION),
            ItemKind::Graph => Some(".veritnotegraph"),
            ItemKind::Database => Some(".csv"),
        }
    }

    pub fn is_directory(self) -> bool {
        self == ItemKind::Folder
    }

    /*
     * The on-disk name for a new item called `name`. The extension is appended
     * unless the user already typed it.
     */
    pub fn file_name_for(self, name: &str) -> String {
        match self.extension() {
            Some(ext) if !name.ends_with(ext) => format!("{name}{ext}"),
            _ => name.to_string(),
        }
    }

    pub fn initial_content(self) -> Option<String> {
        match self {
            ItemKind::Folder => None,
            ItemKind::Page => Some(PageDocument::empty_page().to_pretty_string()),
            ItemKind::Graph => Some(to_pretty_json(&json!({ "nodes": [], "edges": [] }))),
            ItemKind::Database => Some(String::new()),
        }
    }

    // Maps a file name to its kind and display name (the name without extension).
    pub fn classify_file(file_name: &str) -> Option<(ItemKind, &str)> {
        [ItemKind::Page, ItemKind::Graph, ItemKind::Database]
            .into_iter()
            .find_map(|kind| {
                let ext = kind.extension()?;
                let stem = file_name.strip_suffix(ext)?;
                (!stem.is_empty()).then_some((kind, stem))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceNode {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<WorkspaceNode>>,
}

impl WorkspaceNode {
    pub fn is_empty_folder(&self) -> bool {
        self.children.as_ref().is_some_and(|c| c.is_empty())
    }
}

// A page entry for the link picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRef {
    pub name: String,
    pub path: String,
}

/*
 * Builds the sidebar tree rooted at `root`. The root keeps its own name and is
 * always reported as a folder. Folders sort before documents, each group by name.
 */
pub fn build_workspace_tree(root: &DirEntry) -> WorkspaceNode {
    WorkspaceNode {
        name: root.name.clone(),
        path: root.identifier.clone(),
        kind: ItemKind::Folder,
        children: Some(build_children(&root.children)),
    }
}

fn build_children(entries: &[DirEntry]) -> Vec<WorkspaceNode> {
    let mut nodes: Vec<WorkspaceNode> = entries
        .iter()
        .filter_map(|entry| {
            if entry.is_directory {
                if entry.name == EXPORT_DIR_NAME {
                    return None;
                }
                return Some(WorkspaceNode {
                    name: entry.name.clone(),
                    path: entry.identifier.clone(),
                    kind: ItemKind::Folder,
                    children: Some(build_children(&entry.children)),
                });
            }
            let (kind, display_name) = ItemKind::classify_file(&entry.name)?;
            Some(WorkspaceNode {
                name: display_name.to_string(),
                path: entry.identifier.clone(),
                kind,
                children: None,
            })
        })
        .collect();
    nodes.sort_by(|a, b| {
        (a.kind != ItemKind::Folder)
            .cmp(&(b.kind != ItemKind::Folder))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    nodes
}

// Every page document below `root`, depth-first, skipping `build`.
pub fn collect_pages(root: &DirEntry) -> Vec<NoteRef> {
    let mut notes = Vec::new();
    collect_pages_into(&root.children, &mut notes);
    notes
}

fn collect_pages_into(entries: &[DirEntry], notes: &mut Vec<NoteRef>) {
    for entry in entries {
        if entry.is_directory {
            if entry.name != EXPORT_DIR_NAME {
                collect_pages_into(&entry.children, notes);
            }
        } else if let Some((ItemKind::Page, stem)) = ItemKind::classify_file(&entry.name) {
            notes.push(NoteRef {
                name: stem.to_string(),
                path: entry.identifier.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing() -> DirEntry {
        DirEntry::directory(
            "w",
            "/w",
            vec![
                DirEntry::file("b.veritnote", "/w/b.veritnote"),
                DirEntry::file("notes.txt", "/w/notes.txt"),
                DirEntry::file("veritnoteconfig", "/w/veritnoteconfig"),
                DirEntry::directory(
                    "build",
                    "/w/build",
                    vec![DirEntry::file("b.veritnote", "/w/build/b.veritnote")],
                ),
                DirEntry::directory(
                    "sub",
                    "/w/sub",
                    vec![
                        DirEntry::directory("build", "/w/sub/build", vec![]),
                        DirEntry::file("a.veritnote", "/w/sub/a.veritnote"),
                        DirEntry::file("flow.veritnotegraph", "/w/sub/flow.veritnotegraph"),
                        DirEntry::file("table.csv", "/w/sub/table.csv"),
                    ],
                ),
            ],
        )
    }

    fn contains_build(node: &WorkspaceNode) -> bool {
        node.children.iter().flatten().any(|c| {
            (c.kind == ItemKind::Folder && c.name == EXPORT_DIR_NAME) || contains_build(c)
        })
    }

    #[test]
    fn test_tree_skips_build_at_every_depth() {
        let tree = build_workspace_tree(&sample_listing());
        assert!(!contains_build(&tree));
    }

    #[test]
    fn test_tree_shapes_nodes() {
        let tree = build_workspace_tree(&sample_listing());
        assert_eq!(tree.kind, ItemKind::Folder);
        assert_eq!(tree.name, "w");
        let children = tree.children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "sub");
        assert_eq!(children[1].name, "b");
        assert_eq!(children[1].kind, ItemKind::Page);
        assert!(children[1].children.is_none());

        let sub: Vec<(&str, ItemKind)> = children[0]
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|n| (n.name.as_str(), n.kind))
            .collect();
        assert_eq!(
            sub,
            vec![
                ("a", ItemKind::Page),
                ("flow", ItemKind::Graph),
                ("table", ItemKind::Database)
            ]
        );
    }

    #[test]
    fn test_tree_serializes_type_key() {
        let node = WorkspaceNode {
            name: "a".into(),
            path: "/w/a.veritnote".into(),
            kind: ItemKind::Page,
            children: None,
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({"name": "a", "path": "/w/a.veritnote", "type": "page"})
        );
    }

    #[test]
    fn test_collect_pages_recurses_and_skips_build() {
        let notes = collect_pages(&sample_listing());
        let paths: Vec<&str> = notes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["/w/b.veritnote", "/w/sub/a.veritnote"]);
        assert_eq!(notes[0].name, "b");
    }

    #[test]
    fn test_item_kind_file_names() {
        assert_eq!(ItemKind::Page.file_name_for("Doc"), "Doc.veritnote");
        assert_eq!(ItemKind::Page.file_name_for("Doc.veritnote"), "Doc.veritnote");
        assert_eq!(ItemKind::Graph.file_name_for("G"), "G.veritnotegraph");
        assert_eq!(ItemKind::Database.file_name_for("T"), "T.csv");
        assert_eq!(ItemKind::Folder.file_name_for("F"), "F");
        assert_eq!(ItemKind::from_type_name("mystery"), ItemKind::Page);
    }

    #[test]
    fn test_classify_file() {
        assert_eq!(
            ItemKind::classify_file("x.veritnotegraph"),
            Some((ItemKind::Graph, "x"))
        );
        assert_eq!(ItemKind::classify_file(".veritnote"), None);
        assert_eq!(ItemKind::classify_file("readme.md"), None);
    }

    #[test]
    fn test_initial_page_content_is_current_shape() {
        let text = ItemKind::Page.initial_content().unwrap();
        let doc = PageDocument::parse(&text).unwrap();
        assert_eq!(doc, PageDocument::empty_page());
        assert!(ItemKind::Folder.initial_content().is_none());
    }
}
