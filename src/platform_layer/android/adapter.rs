/*
 * The Android adapter. Identifiers are Storage Access Framework document URIs, and
 * everything touching the document store is a platform-service request to the Kotlin
 * runtime, correlated through `ServiceCorrelator`. Continuations run on whichever
 * thread delivers the result.
 *
 * The folder-config cascade needs synchronous parent/child navigation. URIs cannot be
 * taken apart by string manipulation, so those primitives block on a service round
 * trip; callers must therefore never run on the thread that delivers results.
 * A child of a folder URI that may not exist yet is written `<folderUri>#<name>` and
 * sent to the runtime as `{uri: folderUri, childFilename: name}`.
 */
use crate::core::config_cascade::IdentifierTree;
use crate::core::page_document::to_pretty_json;
use crate::core::resource_map::{ResourceHandle, ResourceMap};
use crate::platform_layer::adapter::PlatformAdapter;
use crate::platform_layer::android::correlator::{ServiceContinuation, ServiceCorrelator};
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use crate::platform_layer::types::{Completion, DirEntry};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;

pub const CHILD_SEPARATOR: char = '#';
pub const DEFAULT_BLOCKING_TIMEOUT: Duration = Duration::from_secs(30);
const ROOT_DISPLAY_NAME: &str = "root";

// The calls into the host runtime. Implemented over JNI in `jni_bridge`.
pub trait HostBridge: Send + Sync + 'static {
    fn post_message_to_js(&self, message_json: &str) -> PlatformResult<()>;
    fn navigate_to_url(&self, url: &str) -> PlatformResult<()>;
    fn request_platform_service(&self, request_json: &str) -> PlatformResult<()>;
    // Reads a file from the APK's assets, `asset_path` having no leading '/'.
    fn load_asset(&self, asset_path: &str) -> Option<Vec<u8>>;
}

// Splits `folder#child` into its parts; plain URIs have no child part.
fn split_identifier(identifier: &str) -> (&str, Option<&str>) {
    match identifier.rsplit_once(CHILD_SEPARATOR) {
        Some((uri, child)) if !child.is_empty() && uri.contains("://") => (uri, Some(child)),
        _ => (identifier, None),
    }
}

fn file_payload(identifier: &str) -> Map<String, Value> {
    let (uri, child) = split_identifier(identifier);
    let mut payload = Map::new();
    payload.insert("uri".to_string(), Value::from(uri));
    if let Some(child) = child {
        payload.insert("childFilename".to_string(), Value::from(child));
    }
    payload
}

fn data_string(data: &Value, key: &str) -> PlatformResult<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PlatformError::Service(format!("Service result has no '{key}'.")))
}

fn listing_from_service(root: &str, data: &Value) -> DirEntry {
    let children = data
        .get("files")
        .and_then(Value::as_array)
        .map(|files| {
            files
                .iter()
                .filter_map(|file| {
                    let name = file.get("name")?.as_str()?;
                    let uri = file.get("uri")?.as_str()?;
                    let is_directory = file
                        .get("isDirectory")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    Some(if is_directory {
                        DirEntry::directory(name, uri, Vec::new())
                    } else {
                        DirEntry::file(name, uri)
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    DirEntry::directory(ROOT_DISPLAY_NAME, root, children)
}

pub struct AndroidAdapter<B: HostBridge> {
    bridge: Arc<B>,
    correlator: Arc<ServiceCorrelator>,
    resources: ResourceMap,
    blocking_timeout: Option<Duration>,
}

impl<B: HostBridge> AndroidAdapter<B> {
    pub fn new(bridge: B) -> Self {
        AndroidAdapter {
            bridge: Arc::new(bridge),
            correlator: Arc::new(ServiceCorrelator::new()),
            resources: ResourceMap::bundled(),
            blocking_timeout: Some(DEFAULT_BLOCKING_TIMEOUT),
        }
    }

    pub fn with_blocking_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.blocking_timeout = timeout;
        self
    }

    pub fn correlator(&self) -> &ServiceCorrelator {
        &self.correlator
    }

    // Entry point for `nativeOnPlatformServiceResult`.
    pub fn on_platform_service_result(&self, result_json: &str) {
        self.correlator.on_result(result_json);
    }

    fn request(&self, action: &str, payload: Value, continuation: ServiceContinuation) {
        let bridge = self.bridge.clone();
        self.correlator.request(
            action,
            payload,
            move |request| bridge.request_platform_service(request),
            continuation,
        );
    }

    // Requests `action` and hands `extract(data)` to `done`.
    fn request_mapped<T: Send + 'static>(
        &self,
        action: &str,
        payload: Value,
        extract: impl FnOnce(Value) -> PlatformResult<T> + Send + 'static,
        done: Completion<T>,
    ) {
        self.request(
            action,
            payload,
            Box::new(move |result| done(result.and_then(extract))),
        );
    }

    fn request_blocking(&self, action: &str, payload: Value) -> PlatformResult<Value> {
        self.correlator.request_blocking(
            action,
            payload,
            |request| self.bridge.request_platform_service(request),
            self.blocking_timeout,
        )
    }

    // The runtime reports a cancelled picker as a failure.
    fn pick(&self, action: &str, done: Completion<Option<String>>) {
        let action_name = action.to_string();
        self.request(
            action,
            json!({}),
            Box::new(move |result| match result {
                Ok(data) => done(Ok(data
                    .get("uri")
                    .and_then(Value::as_str)
                    .filter(|uri| !uri.is_empty())
                    .map(str::to_string))),
                Err(e) => {
                    log::debug!("AndroidAdapter: '{action_name}' ended without a choice: {e}");
                    done(Ok(None));
                }
            }),
        );
    }
}

impl<B: HostBridge> IdentifierTree for AndroidAdapter<B> {
    fn read_json_file(&self, identifier: &str) -> Value {
        let empty = || Value::Object(Map::new());
        match self
            .request_blocking("readFile", Value::Object(file_payload(identifier)))
            .and_then(|data| data_string(&data, "content"))
        {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::debug!("AndroidAdapter: '{identifier}' is not valid JSON: {e}");
                empty()
            }),
            Err(e) => {
                log::debug!("AndroidAdapter: No readable JSON at '{identifier}': {e}");
                empty()
            }
        }
    }

    fn parent_identifier(&self, identifier: &str) -> String {
        if let (uri, Some(_)) = split_identifier(identifier) {
            return uri.to_string();
        }
        self.request_blocking("getParentUri", json!({ "uri": identifier }))
            .and_then(|data| data_string(&data, "parentUri"))
            .unwrap_or_else(|e| {
                log::debug!("AndroidAdapter: No parent for '{identifier}': {e}");
                String::new()
            })
    }

    fn combine_identifier(&self, parent: &str, child_name: &str) -> String {
        format!("{parent}{CHILD_SEPARATOR}{child_name}")
    }
}

impl<B: HostBridge> PlatformAdapter for AndroidAdapter<B> {
    fn post_message(&self, message_json: &str) {
        if let Err(e) = self.bridge.post_message_to_js(message_json) {
            log::error!("AndroidAdapter: Failed to post message: {e}");
        }
    }

    fn navigate_to(&self, url: &str) {
        if let Err(e) = self.bridge.navigate_to_url(url) {
            log::error!("AndroidAdapter: Failed to navigate to {url}: {e}");
        }
    }

    fn open_external_link(&self, url: &str) {
        let url_owned = url.to_string();
        self.request(
            "openExternalLink",
            json!({ "url": url }),
            Box::new(move |result| {
                if let Err(e) = result {
                    log::warn!("AndroidAdapter: Opening '{url_owned}' failed: {e}");
                }
            }),
        );
    }

    fn open_file_dialog(&self, done: Completion<Option<String>>) {
        self.pick("openImagePicker", done);
    }

    fn open_workspace_dialog(&self, done: Completion<Option<String>>) {
        self.pick("openWorkspaceDialog", done);
    }

    fn load_resource_data(&self, handle: ResourceHandle) -> Option<Vec<u8>> {
        let virtual_path = self.resources.path_for(handle)?;
        let asset_path = virtual_path.trim_start_matches('/');
        let data = self.bridge.load_asset(asset_path);
        if data.is_none() {
            log::debug!("AndroidAdapter: Asset '{asset_path}' not available.");
        }
        data
    }

    fn download_file(
        &self,
        url: &str,
        _destination: &std::path::Path,
        _on_progress: &mut dyn FnMut(u8),
    ) -> PlatformResult<()> {
        Err(PlatformError::Unsupported(format!(
            "Downloading '{url}' is not supported on this platform."
        )))
    }

    fn write_json_file(&self, identifier: &str, data: &Value) -> PlatformResult<()> {
        let mut payload = file_payload(identifier);
        payload.insert("content".to_string(), Value::from(to_pretty_json(data)));
        self.request_blocking("writeFile", Value::Object(payload))
            .map(|_| ())
    }

    fn is_absolute_identifier(&self, identifier: &str) -> bool {
        identifier.contains("://")
    }

    fn list_workspace(&self, root: &str, done: Completion<DirEntry>) {
        let root_owned = root.to_string();
        self.request_mapped(
            "listDirectory",
            json!({ "uri": root }),
            move |data| Ok(listing_from_service(&root_owned, &data)),
            done,
        );
    }

    fn read_text_file(&self, identifier: &str, done: Completion<String>) {
        self.request_mapped(
            "readFile",
            Value::Object(file_payload(identifier)),
            |data| data_string(&data, "content"),
            done,
        );
    }

    fn write_text_file(&self, identifier: &str, content: &str, done: Completion<()>) {
        let mut payload = file_payload(identifier);
        payload.insert("content".to_string(), Value::from(content));
        self.request_mapped("writeFile", Value::Object(payload), |_| Ok(()), done);
    }

    fn create_item(&self, parent: &str, name: &str, is_directory: bool, done: Completion<String>) {
        self.request_mapped(
            "createItem",
            json!({ "parentUri": parent, "name": name, "isDirectory": is_directory }),
            |data| data_string(&data, "uri"),
            done,
        );
    }

    fn delete_item(&self, identifier: &str, done: Completion<()>) {
        self.request_mapped("deleteItem", json!({ "uri": identifier }), |_| Ok(()), done);
    }

    fn list_all_subdirectories(&self, root: &str, done: Completion<Vec<String>>) {
        self.request_mapped(
            "listAllSubdirectories",
            json!({ "rootUri": root }),
            |data| {
                Ok(data
                    .get("directories")
                    .and_then(Value::as_array)
                    .map(|dirs| {
                        dirs.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default())
            },
            done,
        );
    }
}
