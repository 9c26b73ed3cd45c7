use crate::app_logic::export::{self, ImageExportTask};
use crate::app_logic::session_state::SessionState;
use crate::core::config_cascade::{CONFIG_FILE_NAME, default_folder_config};
use crate::core::message::{
    Action, InboundMessage, OutboundMessage, array_field, bool_field, callback_id, notify,
    object_field, opt_str_field, str_field,
};
use crate::core::page_document::{PageDocument, to_pretty_json};
use crate::core::path_utils::workspace_relative;
use crate::core::resource_map::{ResourceMap, WELCOME_PAGE};
use crate::core::workspace_tree::{ItemKind, WorkspaceNode, build_workspace_tree, collect_pages};
use crate::core::{APP_NAME, ConfigManagerOperations, resolve_file_configuration};
use crate::platform_layer::codec::local_file_uri;
use crate::platform_layer::{
    DirEntry, PlatformAdapter, PlatformError, PlatformResult, WindowState,
};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::sync::Arc;

pub const EDITOR_URL: &str = "https://veritnote.app/index.html";
pub const DASHBOARD_URL: &str = "https://veritnote.app/dashboard.html";
pub(crate) const WELCOME_FILE_NAME: &str = "welcome.veritnote";
pub(crate) const EXPORT_UNSUPPORTED: &str = "Export is not supported on this platform.";
pub(crate) const NO_WORKSPACE: &str = "Workspace root not set.";
pub(crate) const NO_PATH: &str = "No file path given.";

/*
 * The action router. Decodes each message from the web UI, dispatches it to one
 * handler and answers through the platform adapter. Handlers are written only
 * against `PlatformAdapter`, so the same code serves the desktop host (where every
 * adapter call completes before it returns) and the Android host (where document
 * operations complete later, on another thread).
 *
 * `Backend` is a cheap handle around shared state; adapter continuations capture a
 * clone of it to send their answer. Nothing a handler does can fail the dispatch:
 * errors become an `error` field in the response or a log line.
 */
#[derive(Clone)]
pub struct Backend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    adapter: Arc<dyn PlatformAdapter>,
    config_manager: Arc<dyn ConfigManagerOperations>,
    resources: ResourceMap,
    session: SessionState,
}

impl Backend {
    pub fn new(
        adapter: Arc<dyn PlatformAdapter>,
        config_manager: Arc<dyn ConfigManagerOperations>,
    ) -> Self {
        Backend {
            inner: Arc::new(BackendInner {
                adapter,
                config_manager,
                resources: ResourceMap::bundled(),
                session: SessionState::new(),
            }),
        }
    }

    pub fn adapter(&self) -> &dyn PlatformAdapter {
        self.inner.adapter.as_ref()
    }

    pub fn session(&self) -> &SessionState {
        &self.inner.session
    }

    /*
     * Entry point for every message from the UI. A message that is not valid JSON
     * is dropped without an answer; an unknown action is logged and ignored.
     */
    pub fn handle_message(&self, raw: &str) {
        let message = match InboundMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                log::debug!("Backend: Dropping malformed message ({e})");
                return;
            }
        };
        let Some(action) = Action::from_name(&message.action) else {
            log::warn!("Backend: Unknown action '{}'", message.action);
            return;
        };
        log::trace!("Backend: Dispatching '{}'", action.name());
        self.dispatch(action, &message.payload);
    }

    // The host finished loading its web view; start on the dashboard.
    pub fn on_ui_ready(&self) {
        self.go_to_dashboard();
    }

    fn dispatch(&self, action: Action, payload: &Value) {
        match action {
            Action::SetWorkspace => self.set_workspace(payload),
            Action::JsReady => self.on_js_ready(),
            Action::ListWorkspace => self.list_workspace(),
            Action::LoadPage => self.load_page(payload),
            Action::SavePage => self.save_page(payload),
            Action::LoadData => self.load_data(payload),
            Action::SaveData => self.save_data(payload),
            Action::ExportPageAsHtml => self.export_page_as_html(payload),
            Action::CreateItem => self.create_item(payload),
            Action::DeleteItem => self.delete_item(payload),
            Action::RequestNoteList => self.request_note_list(),
            Action::OpenFileDialog => self.open_file_dialog(),
            Action::PrepareExportLibs => self.prepare_export_libs(payload),
            Action::ProcessExportImages => self.process_export_images(payload),
            Action::CancelExport => self.cancel_export(),
            Action::OpenWorkspaceDialog => self.open_workspace_dialog(),
            Action::OpenWorkspace => self.open_workspace(payload),
            Action::GoToDashboard => self.go_to_dashboard(),
            Action::ToggleFullscreen => self.toggle_fullscreen(),
            Action::MinimizeWindow => self.adapter().minimize_window(),
            Action::MaximizeWindow => self.toggle_maximize(),
            Action::CloseWindow => self.adapter().close_window(),
            Action::StartWindowDrag => self.adapter().start_window_drag(),
            Action::CheckWindowState => self.check_window_state(),
            Action::FetchQuoteContent => self.fetch_quote_content(payload),
            Action::FetchDataContent => self.fetch_data_content(payload),
            Action::EnsureWorkspaceConfigs => self.ensure_workspace_configs(),
            Action::ReadConfigFile => self.read_config_file(payload),
            Action::WriteConfigFile => self.write_config_file(payload),
            Action::ResolveFileConfiguration => self.resolve_configuration(payload),
        }
    }

    // --- Helpers ---

    fn send(&self, message: OutboundMessage) {
        match message.encode() {
            Ok(json) => self.adapter().post_message(&json),
            Err(e) => log::error!("Backend: Failed to encode '{}': {e}", message.action),
        }
    }

    fn send_workspace_updated(&self) {
        self.send(OutboundMessage::new(notify::WORKSPACE_UPDATED));
    }

    fn send_window_state(&self, state: WindowState) {
        self.send(
            OutboundMessage::new(notify::WINDOW_STATE_CHANGED)
                .with_payload(json!({ "state": state.as_str() })),
        );
    }

    /*
     * Turns a path from the UI into a full identifier. Workspace-relative paths are
     * combined with the root; absolute ones pass through.
     */
    fn resolve_identifier(&self, raw: &str) -> String {
        let root = self.session().workspace_root();
        if raw.is_empty() || root.is_empty() || self.adapter().is_absolute_identifier(raw) {
            return raw.to_string();
        }
        self.adapter().combine_identifier(&root, raw)
    }

    // The local folder of the workspace, when the host has one. Export needs it.
    fn local_workspace_root(&self) -> Result<PathBuf, &'static str> {
        let root = self.session().workspace_root();
        if root.is_empty() {
            return Err(NO_WORKSPACE);
        }
        self.adapter().local_path(&root).ok_or(EXPORT_UNSUPPORTED)
    }

    fn remember_workspace(&self, root: &str) {
        let saved = if root.is_empty() { None } else { Some(root) };
        if let Err(e) = self
            .inner
            .config_manager
            .save_last_workspace_path(APP_NAME, saved)
        {
            log::warn!("Backend: Could not persist last workspace: {e}");
        }
    }

    // --- Workspace ---

    fn set_workspace(&self, payload: &Value) {
        let root = match payload {
            Value::String(path) => path.clone(),
            other => str_field(other, "path"),
        };
        log::info!("Backend: Workspace root set to '{root}'");
        self.session().set_workspace_root(&root);
        self.remember_workspace(&root);
    }

    fn on_js_ready(&self) {
        if self.session().has_workspace_root() {
            self.list_workspace();
        }
    }

    fn list_workspace(&self) {
        self.list_workspace_with_seeding(true);
    }

    /*
     * Lists the workspace and answers `workspaceListed`. When the listing turns out
     * empty and `allow_seed` is set, the bundled welcome page is written into the
     * root first and the listing repeated once.
     */
    fn list_workspace_with_seeding(&self, allow_seed: bool) {
        let root = self.session().workspace_root();
        if root.is_empty() {
            self.send(OutboundMessage::new(notify::WORKSPACE_LISTED).with_error(NO_WORKSPACE));
            return;
        }
        let backend = self.clone();
        let listed_root = root.clone();
        self.adapter().list_workspace(
            &root,
            Box::new(move |result: PlatformResult<DirEntry>| match result {
                Ok(listing) => {
                    let tree = build_workspace_tree(&listing);
                    if allow_seed && tree.is_empty_folder() {
                        backend.seed_welcome_page(&listed_root, tree);
                    } else {
                        backend.send_workspace_tree(&tree);
                    }
                }
                Err(e) => {
                    log::error!("Backend: Listing '{listed_root}' failed: {e}");
                    backend.send(
                        OutboundMessage::new(notify::WORKSPACE_LISTED).with_error(e.to_string()),
                    );
                }
            }),
        );
    }

    fn send_workspace_tree(&self, tree: &WorkspaceNode) {
        match serde_json::to_value(tree) {
            Ok(payload) => {
                self.send(OutboundMessage::new(notify::WORKSPACE_LISTED).with_payload(payload))
            }
            Err(e) => log::error!("Backend: Failed to serialize workspace tree: {e}"),
        }
    }

    /*
     * First-run convenience. Any failure falls back to answering with the empty
     * tree that triggered the seeding.
     */
    fn seed_welcome_page(&self, root: &str, empty_tree: WorkspaceNode) {
        if let Some(local_root) = self.adapter().local_path(root) {
            let destination = local_root.join(WELCOME_FILE_NAME);
            if export::extract_resource_to_file(
                self.adapter(),
                &self.inner.resources,
                WELCOME_PAGE,
                &destination,
            ) {
                self.list_workspace_with_seeding(false);
            } else {
                self.send_workspace_tree(&empty_tree);
            }
            return;
        }

        let Some(bytes) = self
            .inner
            .resources
            .lookup(WELCOME_PAGE)
            .and_then(|handle| self.adapter().load_resource_data(handle))
        else {
            log::warn!("Backend: Welcome page resource unavailable.");
            self.send_workspace_tree(&empty_tree);
            return;
        };
        let content = self.adapter().decode_text(&bytes);
        let backend = self.clone();
        self.adapter().create_item(
            root,
            WELCOME_FILE_NAME,
            false,
            Box::new(move |created| match created {
                Ok(identifier) => {
                    let after_write = backend.clone();
                    backend.adapter().write_text_file(
                        &identifier,
                        &content,
                        Box::new(move |written| {
                            if let Err(e) = written {
                                log::warn!("Backend: Writing welcome page failed: {e}");
                            }
                            after_write.list_workspace_with_seeding(false);
                        }),
                    );
                }
                Err(e) => {
                    log::warn!("Backend: Creating welcome page failed: {e}");
                    backend.send_workspace_tree(&empty_tree);
                }
            }),
        );
    }

    fn open_workspace(&self, payload: &Value) {
        let Some(path) = opt_str_field(payload, "path") else {
            return;
        };
        self.session().set_workspace_root(&path);
        self.session().set_pending_workspace_path(Some(&path));
        self.remember_workspace(&path);
        self.adapter().navigate_to(EDITOR_URL);
    }

    fn go_to_dashboard(&self) {
        self.session().clear_workspace_root();
        self.adapter().navigate_to(DASHBOARD_URL);
    }

    fn open_workspace_dialog(&self) {
        let backend = self.clone();
        self.adapter()
            .open_workspace_dialog(Box::new(move |picked| match picked {
                Ok(Some(path)) => backend.send(
                    OutboundMessage::new(notify::WORKSPACE_DIALOG_CLOSED)
                        .with_payload(json!({ "path": path })),
                ),
                Ok(None) => log::debug!("Backend: Workspace dialog cancelled."),
                Err(e) => log::error!("Backend: Workspace dialog failed: {e}"),
            }));
    }

    // --- Documents ---

    fn load_page(&self, payload: &Value) {
        let raw_path = str_field(payload, "path");
        let mut echo = match payload {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        echo.insert("path".to_string(), Value::from(raw_path.clone()));
        echo.insert("fromPreview".to_string(), Value::from(bool_field(payload, "fromPreview")));
        if raw_path.is_empty() {
            log::warn!("Backend: loadPage without a path.");
            self.send(
                OutboundMessage::new(notify::PAGE_LOADED)
                    .with_payload(Value::Object(echo))
                    .with_error(NO_PATH),
            );
            return;
        }
        let identifier = self.resolve_identifier(&raw_path);

        let backend = self.clone();
        self.adapter().read_text_file(
            &identifier,
            Box::new(move |read| {
                let parsed = read.map_err(|e| e.to_string()).and_then(|text| {
                    PageDocument::parse(&text).map_err(|e| e.to_string())
                });
                let message = match parsed {
                    Ok(document) => {
                        echo.insert("content".to_string(), Value::Array(document.blocks));
                        echo.insert("config".to_string(), document.config);
                        OutboundMessage::new(notify::PAGE_LOADED)
                            .with_payload(Value::Object(echo))
                    }
                    Err(error) => {
                        log::warn!("Backend: Loading page '{raw_path}' failed: {error}");
                        OutboundMessage::new(notify::PAGE_LOADED)
                            .with_payload(Value::Object(echo))
                            .with_error(error)
                    }
                };
                backend.send(message);
            }),
        );
    }

    fn save_page(&self, payload: &Value) {
        let raw_path = str_field(payload, "path");
        if raw_path.is_empty() {
            log::warn!("Backend: savePage without a path.");
            self.send_save_refused(notify::PAGE_SAVED);
            return;
        }
        let document = PageDocument::new(
            object_field(payload, "config"),
            array_field(payload, "blocks"),
        );
        let identifier = self.resolve_identifier(&raw_path);
        let backend = self.clone();
        self.adapter().write_text_file(
            &identifier,
            &document.to_pretty_string(),
            Box::new(move |written| {
                let message = OutboundMessage::new(notify::PAGE_SAVED)
                    .with_payload(json!({ "path": raw_path, "success": written.is_ok() }));
                backend.send(match written {
                    Ok(()) => message,
                    Err(e) => message.with_error(e.to_string()),
                });
            }),
        );
    }

    fn load_data(&self, payload: &Value) {
        let raw_path = str_field(payload, "path");
        if raw_path.is_empty() {
            log::warn!("Backend: loadData without a path.");
            self.send(
                OutboundMessage::new(notify::DATA_LOADED)
                    .with_payload(json!({ "path": "" }))
                    .with_error(NO_PATH),
            );
            return;
        }
        let identifier = self.resolve_identifier(&raw_path);
        let backend = self.clone();
        self.adapter().read_text_file(
            &identifier,
            Box::new(move |read| {
                let message = match read {
                    Ok(content) => OutboundMessage::new(notify::DATA_LOADED)
                        .with_payload(json!({ "path": raw_path, "content": content })),
                    Err(e) => OutboundMessage::new(notify::DATA_LOADED)
                        .with_payload(json!({ "path": raw_path }))
                        .with_error(e.to_string()),
                };
                backend.send(message);
            }),
        );
    }

    fn save_data(&self, payload: &Value) {
        let raw_path = str_field(payload, "path");
        if raw_path.is_empty() {
            log::warn!("Backend: saveData without a path.");
            self.send_save_refused(notify::DATA_SAVED);
            return;
        }
        let content = str_field(payload, "content");
        let identifier = self.resolve_identifier(&raw_path);
        let backend = self.clone();
        self.adapter().write_text_file(
            &identifier,
            &content,
            Box::new(move |written| {
                let message = OutboundMessage::new(notify::DATA_SAVED)
                    .with_payload(json!({ "path": raw_path, "success": written.is_ok() }));
                backend.send(match written {
                    Ok(()) => message,
                    Err(e) => message.with_error(e.to_string()),
                });
            }),
        );
    }

    fn send_save_refused(&self, action: &str) {
        self.send(
            OutboundMessage::new(action)
                .with_payload(json!({ "path": "", "success": false }))
                .with_error(NO_PATH),
        );
    }

    fn fetch_data_content(&self, payload: &Value) {
        let data_block_id = str_field(payload, "dataBlockId");
        let raw_path = str_field(payload, "path");
        if raw_path.is_empty() {
            self.send(OutboundMessage::new(notify::DATA_CONTENT_FETCHED).with_payload(
                json!({ "dataBlockId": data_block_id, "error": "No data file given." }),
            ));
            return;
        }
        let identifier = self.resolve_identifier(&raw_path);
        let backend = self.clone();
        self.adapter().read_text_file(
            &identifier,
            Box::new(move |read| {
                let payload = match read {
                    Ok(content) => json!({ "dataBlockId": data_block_id, "content": content }),
                    Err(e) => json!({ "dataBlockId": data_block_id, "error": e.to_string() }),
                };
                backend.send(
                    OutboundMessage::new(notify::DATA_CONTENT_FETCHED).with_payload(payload),
                );
            }),
        );
    }

    /*
     * `referenceLink` is `path` or `path#blockId`. Without a block id the whole
     * top-level block list is returned; with one, the first matching block anywhere
     * in the tree, or nothing.
     */
    fn fetch_quote_content(&self, payload: &Value) {
        let quote_block_id = str_field(payload, "quoteBlockId");
        let reference = str_field(payload, "referenceLink");
        let (raw_path, block_id) = match reference.split_once('#') {
            Some((path, block)) => (path.to_string(), block.to_string()),
            None => (reference.clone(), String::new()),
        };
        let identifier = self.resolve_identifier(&raw_path);
        let backend = self.clone();
        self.adapter().read_text_file(
            &identifier,
            Box::new(move |read| {
                let content = read
                    .map_err(|_| format!("Referenced file not found: {raw_path}"))
                    .and_then(|text| PageDocument::parse(&text).map_err(|e| e.to_string()))
                    .map(|document| {
                        if block_id.is_empty() {
                            Value::Array(document.blocks)
                        } else {
                            match document.find_block(&block_id) {
                                Some(block) => Value::Array(vec![block.clone()]),
                                None => Value::Array(Vec::new()),
                            }
                        }
                    });
                let payload = match content {
                    Ok(content) => json!({ "quoteBlockId": quote_block_id, "content": content }),
                    Err(error) => json!({ "quoteBlockId": quote_block_id, "error": error }),
                };
                backend.send(OutboundMessage::new(notify::QUOTE_CONTENT_LOADED).with_payload(payload));
            }),
        );
    }

    // --- Items ---

    fn create_item(&self, payload: &Value) {
        let parent = self.resolve_identifier(&str_field(payload, "parentPath"));
        let name = str_field(payload, "name");
        if parent.is_empty() || name.is_empty() {
            log::warn!("Backend: createItem needs both a parent and a name.");
            self.send_workspace_updated();
            return;
        }
        let kind = ItemKind::from_type_name(&str_field(payload, "type"));
        let file_name = kind.file_name_for(&name);
        let failed_name = file_name.clone();
        let backend = self.clone();
        self.adapter().create_item(
            &parent,
            &file_name,
            kind.is_directory(),
            Box::new(move |created| match created {
                Ok(identifier) => match kind.initial_content().filter(|c| !c.is_empty()) {
                    Some(content) => {
                        let after_write = backend.clone();
                        let seeded = identifier.clone();
                        backend.adapter().write_text_file(
                            &identifier,
                            &content,
                            Box::new(move |written| {
                                if let Err(e) = written {
                                    log::warn!("Backend: Seeding '{seeded}' failed: {e}");
                                }
                                after_write.send_workspace_updated();
                            }),
                        );
                    }
                    None => backend.send_workspace_updated(),
                },
                Err(e) => {
                    log::warn!("Backend: Creating '{failed_name}' failed: {e}");
                    backend.send_workspace_updated();
                }
            }),
        );
    }

    fn delete_item(&self, payload: &Value) {
        let identifier = self.resolve_identifier(&str_field(payload, "path"));
        if identifier.is_empty() {
            self.send_workspace_updated();
            return;
        }
        let backend = self.clone();
        let deleted_identifier = identifier.clone();
        self.adapter().delete_item(
            &identifier,
            Box::new(move |deleted| {
                if let Err(e) = deleted {
                    log::warn!("Backend: Deleting '{deleted_identifier}' failed: {e}");
                }
                backend.send_workspace_updated();
            }),
        );
    }

    fn request_note_list(&self) {
        let root = self.session().workspace_root();
        if root.is_empty() {
            self.send(OutboundMessage::new(notify::NOTE_LIST_RECEIVED).with_payload(json!([])));
            return;
        }
        let backend = self.clone();
        self.adapter().list_workspace(
            &root,
            Box::new(move |result| {
                let message = match result {
                    Ok(listing) => match serde_json::to_value(collect_pages(&listing)) {
                        Ok(notes) => OutboundMessage::new(notify::NOTE_LIST_RECEIVED)
                            .with_payload(notes),
                        Err(e) => OutboundMessage::new(notify::NOTE_LIST_RECEIVED)
                            .with_payload(json!([]))
                            .with_error(e.to_string()),
                    },
                    Err(e) => OutboundMessage::new(notify::NOTE_LIST_RECEIVED)
                        .with_payload(json!([]))
                        .with_error(e.to_string()),
                };
                backend.send(message);
            }),
        );
    }

    /*
     * Image picker. A picked local file inside the workspace is answered with its
     * workspace-relative path; one outside with a local-file marker URI. Hosts whose
     * pickers return document URIs get them back unchanged.
     */
    fn open_file_dialog(&self) {
        let backend = self.clone();
        self.adapter().open_file_dialog(Box::new(move |picked| {
            let picked = match picked {
                Ok(Some(picked)) => picked,
                Ok(None) => {
                    log::debug!("Backend: File dialog cancelled.");
                    return;
                }
                Err(e) => {
                    log::error!("Backend: File dialog failed: {e}");
                    return;
                }
            };
            let adapter = backend.adapter();
            let root = backend.session().workspace_root();
            let path = match adapter.local_path(&picked) {
                Some(local) => adapter
                    .local_path(&root)
                    .and_then(|local_root| workspace_relative(&local_root, &local))
                    .filter(|relative| !relative.is_empty())
                    .unwrap_or_else(|| local_file_uri(&local.to_string_lossy())),
                None => picked,
            };
            backend.send(
                OutboundMessage::new(notify::FILE_DIALOG_CLOSED)
                    .with_payload(json!({ "path": path })),
            );
        }));
    }

    // --- Export ---

    fn export_error(&self, error: impl Into<String>) {
        self.send(OutboundMessage::new(notify::EXPORT_ERROR).with_error(error));
    }

    fn prepare_export_libs(&self, payload: &Value) {
        let root = match self.local_workspace_root() {
            Ok(root) => root,
            Err(reason) => return self.export_error(reason),
        };
        self.session().reset_export_cancel();
        let libraries: Vec<String> = array_field(payload, "paths")
            .iter()
            .filter_map(|p| p.as_str().map(str::to_string))
            .collect();
        match export::prepare_export_libs(self.adapter(), &self.inner.resources, &root, &libraries)
        {
            Ok(()) => self.send(OutboundMessage::new(notify::EXPORT_LIBS_READY)),
            Err(e) => {
                log::error!("Backend: Preparing export failed: {e}");
                self.export_error(match e {
                    PlatformError::NotFound(detail) => detail,
                    other => other.to_string(),
                });
            }
        }
    }

    fn process_export_images(&self, payload: &Value) {
        let failed = |error: String| {
            OutboundMessage::new(notify::EXPORT_IMAGES_PROCESSED)
                .with_payload(json!({ "srcMap": {} }))
                .with_error(error)
        };
        let root = match self.local_workspace_root() {
            Ok(root) => root,
            Err(reason) => return self.send(failed(reason.to_string())),
        };
        let tasks: Vec<ImageExportTask> = match payload.get("tasks") {
            Some(Value::Array(items)) => export::parse_image_tasks(items),
            _ => {
                return self.send(failed("Image processing tasks must be an array.".to_string()));
            }
        };

        let session = self.session();
        let mut report_progress = |original_src: &str, percentage: u8| {
            self.send(
                OutboundMessage::new(notify::EXPORT_IMAGE_PROGRESS)
                    .with_payload(json!({ "originalSrc": original_src, "percentage": percentage })),
            );
        };
        let src_map = export::process_export_images(
            self.adapter(),
            &root,
            &tasks,
            &|| session.export_cancel_requested(),
            &mut report_progress,
        );
        if let Some(src_map) = src_map {
            self.send(
                OutboundMessage::new(notify::EXPORT_IMAGES_PROCESSED)
                    .with_payload(json!({ "srcMap": src_map })),
            );
        }
    }

    fn export_page_as_html(&self, payload: &Value) {
        let root = match self.local_workspace_root() {
            Ok(root) => root,
            Err(reason) => {
                log::warn!("Backend: exportPageAsHtml ignored: {reason}");
                return;
            }
        };
        let page_path = str_field(payload, "path");
        let html = str_field(payload, "html");
        match export::write_page_html(&root, &page_path, &html) {
            Ok(target) => log::debug!("Backend: Exported '{page_path}' to {target:?}"),
            Err(e) => log::error!("Backend: Exporting '{page_path}' failed: {e}"),
        }
    }

    fn cancel_export(&self) {
        self.session().request_export_cancel();
        if let Ok(root) = self.local_workspace_root() {
            if let Err(e) = export::remove_export_dir(&root) {
                log::warn!("Backend: Removing export output failed: {e}");
            }
        }
        self.send(OutboundMessage::new(notify::EXPORT_CANCELLED));
    }

    // --- Window ---

    fn toggle_fullscreen(&self) {
        let Some(state) = self.adapter().toggle_fullscreen() else {
            return;
        };
        self.send_window_state(state);
        if state == WindowState::RestoredFromFullscreen {
            self.check_window_state();
        }
    }

    fn toggle_maximize(&self) {
        if let Some(state) = self.adapter().toggle_maximize() {
            self.send_window_state(state);
        }
    }

    fn check_window_state(&self) {
        let state = if self.adapter().is_fullscreen() {
            Some(WindowState::Fullscreen)
        } else {
            self.adapter().window_state()
        };
        if let Some(state) = state {
            self.send_window_state(state);
        }
    }

    // --- Folder configuration ---

    /*
     * Makes sure the root and every folder below it hold a `veritnoteconfig`.
     * Creation fails for folders that already have one, which leaves them untouched.
     */
    fn ensure_workspace_configs(&self) {
        let root = self.session().workspace_root();
        if root.is_empty() {
            return;
        }
        let backend = self.clone();
        let listed_root = root.clone();
        self.adapter().list_all_subdirectories(
            &root,
            Box::new(move |listed| match listed {
                Ok(mut folders) => {
                    folders.push(listed_root);
                    for folder in folders {
                        backend.ensure_folder_config(&folder);
                    }
                }
                Err(e) => log::warn!("Backend: Listing folders for configs failed: {e}"),
            }),
        );
    }

    fn ensure_folder_config(&self, folder: &str) {
        let backend = self.clone();
        let folder_owned = folder.to_string();
        self.adapter().create_item(
            folder,
            CONFIG_FILE_NAME,
            false,
            Box::new(move |created| match created {
                Ok(identifier) => backend.adapter().write_text_file(
                    &identifier,
                    &to_pretty_json(&default_folder_config()),
                    Box::new(move |written| {
                        if let Err(e) = written {
                            log::warn!("Backend: Writing default config failed: {e}");
                        }
                    }),
                ),
                Err(e) => log::trace!("Backend: Keeping config in '{folder_owned}': {e}"),
            }),
        );
    }

    fn read_config_file(&self, payload: &Value) {
        let identifier = self.resolve_identifier(&str_field(payload, "path"));
        let data = if identifier.is_empty() {
            Value::Object(Map::new())
        } else {
            self.adapter().read_json_file(&identifier)
        };
        self.send(
            OutboundMessage::new(notify::CONFIG_FILE_READ)
                .with_payload(json!({ "callbackId": callback_id(payload), "data": data })),
        );
    }

    fn write_config_file(&self, payload: &Value) {
        let identifier = self.resolve_identifier(&str_field(payload, "path"));
        if identifier.is_empty() {
            return;
        }
        if let Err(e) = self
            .adapter()
            .write_json_file(&identifier, &object_field(payload, "data"))
        {
            log::error!("Backend: Writing config '{identifier}' failed: {e}");
        }
    }

    fn resolve_configuration(&self, payload: &Value) {
        let identifier = self.resolve_identifier(&str_field(payload, "path"));
        let root = self.session().workspace_root();
        let config = resolve_file_configuration(self.adapter(), &root, &identifier);
        self.send(
            OutboundMessage::new(notify::FILE_CONFIGURATION_RESOLVED)
                .with_payload(json!({ "callbackId": callback_id(payload), "config": config })),
        );
    }
}
