/*
 * The wire format exchanged with the web UI. Every message in either direction is a
 * JSON object `{action, payload}`; outbound messages may also carry a top-level
 * `error` string. Inbound payloads are loosely typed, so this module also provides
 * the defaulting accessors handlers use to read them: a missing or mistyped field
 * yields an empty value instead of an error.
 */
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub action: String,
    #[serde(default = "empty_object")]
    pub payload: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl InboundMessage {
    /*
     * Parses one raw envelope. Anything that is not a JSON object (including valid
     * JSON arrays or strings) is rejected; the router drops such input silently.
     */
    pub fn decode(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutboundMessage {
    pub fn new(action: &str) -> Self {
        OutboundMessage {
            action: action.to_string(),
            payload: None,
            error: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/*
 * The fixed inbound vocabulary. Keeping the names in one place lets the router match
 * exhaustively, so adding an action without a handler is a compile error.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SetWorkspace,
    JsReady,
    ListWorkspace,
    LoadPage,
    SavePage,
    LoadData,
    SaveData,
    ExportPageAsHtml,
    CreateItem,
    DeleteItem,
    RequestNoteList,
    OpenFileDialog,
    PrepareExportLibs,
    ProcessExportImages,
    CancelExport,
    OpenWorkspaceDialog,
    OpenWorkspace,
    GoToDashboard,
    ToggleFullscreen,
    MinimizeWindow,
    MaximizeWindow,
    CloseWindow,
    StartWindowDrag,
    CheckWindowState,
    FetchQuoteContent,
    FetchDataContent,
    EnsureWorkspaceConfigs,
    ReadConfigFile,
    WriteConfigFile,
    ResolveFileConfiguration,
}

const ACTION_NAMES: &[(&str, Action)] = &[
    ("setWorkspace", Action::SetWorkspace),
    ("jsReady", Action::JsReady),
    ("listWorkspace", Action::ListWorkspace),
    ("loadPage", Action::LoadPage),
    ("savePage", Action::SavePage),
    ("loadData", Action::LoadData),
    ("saveData", Action::SaveData),
    ("exportPageAsHtml", Action::ExportPageAsHtml),
    ("createItem", Action::CreateItem),
    ("deleteItem", Action::DeleteItem),
    ("requestNoteList", Action::RequestNoteList),
    ("openFileDialog", Action::OpenFileDialog),
    ("prepareExportLibs", Action::PrepareExportLibs),
    ("processExportImages", Action::ProcessExportImages),
    ("cancelExport", Action::CancelExport),
    ("openWorkspaceDialog", Action::OpenWorkspaceDialog),
    ("openWorkspace", Action::OpenWorkspace),
    ("goToDashboard", Action::GoToDashboard),
    ("toggleFullscreen", Action::ToggleFullscreen),
    ("minimizeWindow", Action::MinimizeWindow),
    ("maximizeWindow", Action::MaximizeWindow),
    ("closeWindow", Action::CloseWindow),
    ("startWindowDrag", Action::StartWindowDrag),
    ("checkWindowState", Action::CheckWindowState),
    ("fetchQuoteContent", Action::FetchQuoteContent),
    ("fetchDataContent", Action::FetchDataContent),
    ("ensureWorkspaceConfigs", Action::EnsureWorkspaceConfigs),
    ("readConfigFile", Action::ReadConfigFile),
    ("writeConfigFile", Action::WriteConfigFile),
    ("resolveFileConfiguration", Action::ResolveFileConfiguration),
];

impl Action {
    pub fn from_name(name: &str) -> Option<Action> {
        ACTION_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, action)| *action)
    }

    pub fn name(self) -> &'static str {
        ACTION_NAMES
            .iter()
            .find(|(_, a)| *a == self)
            .map(|(n, _)| *n)
            .unwrap_or("unknown")
    }
}

// Outbound action names.
pub mod notify {
    pub const WORKSPACE_LISTED: &str = "workspaceListed";
    pub const WORKSPACE_UPDATED: &str = "workspaceUpdated";
    pub const PAGE_LOADED: &str = "pageLoaded";
    pub const PAGE_SAVED: &str = "pageSaved";
    pub const DATA_LOADED: &str = "dataLoaded";
    pub const DATA_SAVED: &str = "dataSaved";
    pub const NOTE_LIST_RECEIVED: &str = "noteListReceived";
    pub const FILE_DIALOG_CLOSED: &str = "fileDialogClosed";
    pub const WORKSPACE_DIALOG_CLOSED: &str = "workspaceDialogClosed";
    pub const EXPORT_LIBS_READY: &str = "exportLibsReady";
    pub const EXPORT_IMAGES_PROCESSED: &str = "exportImagesProcessed";
    pub const EXPORT_IMAGE_PROGRESS: &str = "exportImageProgress";
    pub const EXPORT_CANCELLED: &str = "exportCancelled";
    pub const EXPORT_ERROR: &str = "exportError";
    pub const WINDOW_STATE_CHANGED: &str = "windowStateChanged";
    pub const QUOTE_CONTENT_LOADED: &str = "quoteContentLoaded";
    pub const DATA_CONTENT_FETCHED: &str = "dataContentFetched";
    pub const CONFIG_FILE_READ: &str = "configFileRead";
    pub const FILE_CONFIGURATION_RESOLVED: &str = "fileConfigurationResolved";
}

// --- Payload accessors ---

pub fn str_field(payload: &Value, key: &str) -> String {
    payload
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// `None` for absent, mistyped and empty strings alike.
pub fn opt_str_field(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn bool_field(payload: &Value, key: &str) -> bool {
    payload.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub fn object_field(payload: &Value, key: &str) -> Value {
    match payload.get(key) {
        Some(v @ Value::Object(_)) => v.clone(),
        _ => empty_object(),
    }
}

pub fn array_field(payload: &Value, key: &str) -> Vec<Value> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/*
 * The UI correlates some answers with a `callbackId` it picked itself, which may
 * arrive as a string or a number. It is always echoed back as a string.
 */
pub fn callback_id(payload: &Value) -> String {
    match payload.get("callbackId") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.to_string(),
        },
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_defaults_missing_payload_to_empty_object() {
        let msg = InboundMessage::decode(r#"{"action":"listWorkspace"}"#).unwrap();
        assert_eq!(msg.action, "listWorkspace");
        assert_eq!(msg.payload, json!({}));
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(InboundMessage::decode("not json").is_err());
        assert!(InboundMessage::decode("[1,2,3]").is_err());
        assert!(InboundMessage::decode("\"loadPage\"").is_err());
    }

    #[test]
    fn test_decode_keeps_string_payload() {
        let msg = InboundMessage::decode(r#"{"action":"setWorkspace","payload":"C:/w"}"#).unwrap();
        assert_eq!(msg.payload, json!("C:/w"));
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let text = OutboundMessage::new("workspaceUpdated").encode().unwrap();
        assert_eq!(text, r#"{"action":"workspaceUpdated"}"#);

        let text = OutboundMessage::new("exportError")
            .with_error("boom")
            .encode()
            .unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!({"action": "exportError", "error": "boom"}));
    }

    #[test]
    fn test_action_names_round_trip() {
        for (name, action) in ACTION_NAMES {
            assert_eq!(Action::from_name(name), Some(*action));
            assert_eq!(action.name(), *name);
        }
        assert_eq!(Action::from_name("launchRockets"), None);
    }

    #[test]
    fn test_callback_id_coercion() {
        assert_eq!(callback_id(&json!({"callbackId": "cb-7"})), "cb-7");
        assert_eq!(callback_id(&json!({"callbackId": 42})), "42");
        assert_eq!(callback_id(&json!({"callbackId": null})), "");
        assert_eq!(callback_id(&json!({})), "");
        assert_eq!(callback_id(&json!("string payload")), "");
    }

    #[test]
    fn test_field_accessors_default_on_missing_or_mistyped() {
        let payload = json!({"path": 5, "fromPreview": "yes", "config": [], "tasks": {}});
        assert_eq!(str_field(&payload, "path"), "");
        assert!(!bool_field(&payload, "fromPreview"));
        assert_eq!(object_field(&payload, "config"), json!({}));
        assert!(array_field(&payload, "tasks").is_empty());
        assert_eq!(opt_str_field(&json!({"id": ""}), "id"), None);
        assert_eq!(opt_str_field(&json!({"id": "b"}), "id"), Some("b".to_string()));
    }
}
