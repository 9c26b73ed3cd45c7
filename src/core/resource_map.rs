/*
 * The static table of bundled UI resources. Every file the backend may need to
 * materialise on disk (the first-run welcome page, the stylesheet fragments that make
 * up an export's `style.css`, and the vendor libraries blocks ask for) is addressed by
 * its virtual path, e.g. `/components/main/theme.css`, and mapped to a numeric
 * `ResourceHandle`.
 *
 * On Windows the handle is the RCDATA id compiled into the executable from `app.rc`;
 * hosts that store resources by path (Android assets, the headless host's asset
 * directory) turn a handle back into its virtual path with `ResourceMap::path_for`.
 * The table never changes after startup.
 */
use std::collections::HashMap;

// Opaque handle to one bundled resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(pub u16);

pub const WELCOME_PAGE: &str = "/welcome.veritnote";

/*
 * The stylesheet fragments concatenated into an export's `style.css`, in cascade
 * order. Later fragments override earlier ones, so this order is part of the
 * export format.
 */
pub const EXPORT_CSS_FRAGMENTS: [&str; 14] = [
    "/components/main/theme.css",
    "/page-theme.css",
    "/components/main/main.css",
    "/components/page-editor/page-editor.css",
    "/components/blocks/shared/block-core.css",
    "/components/blocks/callout/callout.css",
    "/components/blocks/code/code.css",
    "/components/blocks/columns/columns.css",
    "/components/blocks/heading/heading.css",
    "/components/blocks/image/image.css",
    "/components/blocks/link-button/link-button.css",
    "/components/blocks/list-items/list-item-shared.css",
    "/components/blocks/quote/quote.css",
    "/components/blocks/table/table.css",
];

// Keep in sync with app.rc.
const RESOURCE_TABLE: &[(&str, u16)] = &[
    (WELCOME_PAGE, 101),
    ("/components/main/theme.css", 110),
    ("/page-theme.css", 111),
    ("/components/main/main.css", 112),
    ("/components/page-editor/page-editor.css", 113),
    ("/components/blocks/shared/block-core.css", 114),
    ("/components/blocks/callout/callout.css", 115),
    ("/components/blocks/code/code.css", 116),
    ("/components/blocks/columns/columns.css", 117),
    ("/components/blocks/heading/heading.css", 118),
    ("/components/blocks/image/image.css", 119),
    ("/components/blocks/link-button/link-button.css", 120),
    ("/components/blocks/list-items/list-item-shared.css", 121),
    ("/components/blocks/quote/quote.css", 122),
    ("/components/blocks/table/table.css", 123),
    ("/vendor/highlight/highlight.min.js", 140),
    ("/vendor/highlight/theme.css", 141),
];

#[derive(Debug, Clone)]
pub struct ResourceMap {
    by_path: HashMap<String, ResourceHandle>,
}

impl ResourceMap {
    // The table the application ships with.
    pub fn bundled() -> Self {
        Self::from_entries(
            RESOURCE_TABLE
                .iter()
                .map(|(path, id)| (path.to_string(), ResourceHandle(*id))),
        )
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, ResourceHandle)>) -> Self {
        ResourceMap {
            by_path: entries.into_iter().collect(),
        }
    }

    pub fn lookup(&self, virtual_path: &str) -> Option<ResourceHandle> {
        self.by_path.get(virtual_path).copied()
    }

    /*
     * Reverse lookup used by hosts whose bundles are keyed by path. Linear, but the
     * table is small and this only runs on export and first-run seeding.
     */
    pub fn path_for(&self, handle: ResourceHandle) -> Option<&str> {
        self.by_path
            .iter()
            .find(|(_, h)| **h == handle)
            .map(|(path, _)| path.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

impl Default for ResourceMap {
    fn default() -> Self {
        Self::bundled()
    }
}

/*
 * Normalises a library path as sent by the UI (`vendor\highlight\x.js`,
 * `vendor/highlight/x.js` or `/vendor/highlight/x.js`) into the virtual path form
 * used as the table key.
 */
pub fn normalize_virtual_path(raw: &str) -> String {
    let forward = raw.replace('\\', "/");
    let trimmed = forward.trim_start_matches('/');
    format!("/{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bundled_map_contains_every_css_fragment_and_welcome_page() {
        let map = ResourceMap::bundled();
        assert!(map.lookup(WELCOME_PAGE).is_some());
        for fragment in EXPORT_CSS_FRAGMENTS {
            assert!(
                map.lookup(fragment).is_some(),
                "Missing fragment {fragment}"
            );
        }
    }

    #[test]
    fn test_bundled_handles_are_unique() {
        let ids: HashSet<u16> = RESOURCE_TABLE.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids.len(), RESOURCE_TABLE.len());
    }

    #[test]
    fn test_path_for_reverses_lookup() {
        let map = ResourceMap::bundled();
        let handle = map.lookup("/components/blocks/code/code.css").unwrap();
        assert_eq!(map.path_for(handle), Some("/components/blocks/code/code.css"));
        assert_eq!(map.path_for(ResourceHandle(9999)), None);
    }

    #[test]
    fn test_unknown_path_is_absent() {
        assert!(ResourceMap::bundled().lookup("/nope.css").is_none());
    }

    #[test]
    fn test_normalize_virtual_path() {
        assert_eq!(
            normalize_virtual_path("vendor\\highlight\\highlight.min.js"),
            "/vendor/highlight/highlight.min.js"
        );
        assert_eq!(normalize_virtual_path("/vendor/a.css"), "/vendor/a.css");
        assert_eq!(normalize_virtual_path("vendor/a.css"), "/vendor/a.css");
    }
}
