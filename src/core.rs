/*
 * The platform-agnostic core: the message envelope exchanged with the web UI, the
 * page document and folder-config formats, the bundled resource table, and the
 * workspace listing model. Nothing in here calls into the operating system except
 * `config`/`path_utils`, which only touch the application's own settings directory.
 */
pub mod checksum_utils;
pub mod config;
pub mod config_cascade;
pub mod message;
pub mod page_document;
pub mod path_utils;
pub mod resource_map;
pub mod workspace_tree;

pub use config::{APP_NAME, ConfigError, ConfigManagerOperations, CoreConfigManager};
pub use config_cascade::{IdentifierTree, resolve_file_configuration};
pub use message::{Action, InboundMessage, OutboundMessage};
pub use page_document::{DocumentError, PageDocument};
pub use resource_map::{ResourceHandle, ResourceMap};
pub use workspace_tree::{DirEntry, ItemKind, NoteRef, WorkspaceNode};
