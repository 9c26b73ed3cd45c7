/*
 * The `extern "system"` entry points `MainActivity` declares as `native`, and the
 * `HostBridge` that calls back into it.
 *
 * Web messages are handed to a worker thread rather than routed on the calling
 * thread: some handlers block on a platform-service round trip, and the Kotlin side
 * delivers service results from its UI thread. Every entry point catches panics so
 * that none unwinds across the FFI boundary.
 */
use crate::app_logic::Backend;
use crate::core::CoreConfigManager;
use crate::platform_layer::PlatformAdapter;
use crate::platform_layer::android::adapter::{AndroidAdapter, HostBridge};
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::sys::jstring;
use jni::{JNIEnv, JavaVM};
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, RwLock};
use std::thread;

const LOG_FILE_NAME: &str = "veritnote.log";
const STRING_ARG_VOID: &str = "(Ljava/lang/String;)V";
const ASSET_READ_CHUNK: i32 = 16 * 1024;

pub struct JniHostBridge {
    vm: JavaVM,
    activity: GlobalRef,
}

impl JniHostBridge {
    fn call_string_method(&self, method: &str, argument: &str) -> PlatformResult<()> {
        let mut env = self.vm.attach_current_thread()?;
        let text = env.new_string(argument)?;
        let outcome = env.call_method(
            self.activity.as_obj(),
            method,
            STRING_ARG_VOID,
            &[JValue::Object(&text)],
        );
        if outcome.is_err() {
            let _ = env.exception_clear();
        }
        outcome?;
        Ok(())
    }

    fn read_asset(&self, asset_path: &str) -> PlatformResult<Vec<u8>> {
        let mut env = self.vm.attach_current_thread()?;
        let outcome = read_asset_with(&mut env, self.activity.as_obj(), asset_path);
        if outcome.is_err() {
            let _ = env.exception_clear();
        }
        outcome
    }
}

// `activity.getAssets().open(path)`, drained through a reusable byte array.
fn read_asset_with(
    env: &mut JNIEnv,
    activity: &JObject,
    asset_path: &str,
) -> PlatformResult<Vec<u8>> {
    let assets = env
        .call_method(activity, "getAssets", "()Landroid/content/res/AssetManager;", &[])?
        .l()?;
    let path = env.new_string(asset_path)?;
    let stream = env
        .call_method(
            &assets,
            "open",
            "(Ljava/lang/String;)Ljava/io/InputStream;",
            &[JValue::Object(&path)],
        )?
        .l()?;

    let buffer = env.new_byte_array(ASSET_READ_CHUNK)?;
    let mut chunk = vec![0i8; ASSET_READ_CHUNK as usize];
    let mut bytes = Vec::new();
    loop {
        let read = env
            .call_method(&stream, "read", "([B)I", &[JValue::Object(&buffer)])?
            .i()?;
        if read < 0 {
            break;
        }
        let read = read as usize;
        env.get_byte_array_region(&buffer, 0, &mut chunk[..read])?;
        bytes.extend(chunk[..read].iter().map(|b| *b as u8));
    }
    env.call_method(&stream, "close", "()V", &[])?;
    Ok(bytes)
}

impl HostBridge for JniHostBridge {
    fn post_message_to_js(&self, message_json: &str) -> PlatformResult<()> {
        self.call_string_method("postMessageToJs", message_json)
    }

    fn navigate_to_url(&self, url: &str) -> PlatformResult<()> {
        self.call_string_method("navigateToUrl", url)
    }

    fn request_platform_service(&self, request_json: &str) -> PlatformResult<()> {
        self.call_string_method("requestPlatformService", request_json)
    }

    fn load_asset(&self, asset_path: &str) -> Option<Vec<u8>> {
        match self.read_asset(asset_path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("JniHostBridge: Asset '{asset_path}' unavailable: {e}");
                None
            }
        }
    }
}

// Everything `nativeInit` sets up and `nativeDestroy` tears down.
struct AndroidRuntime {
    backend: Backend,
    adapter: Arc<AndroidAdapter<JniHostBridge>>,
    web_messages: Sender<String>,
}

static RUNTIME: RwLock<Option<Arc<AndroidRuntime>>> = RwLock::new(None);

fn current_runtime() -> Option<Arc<AndroidRuntime>> {
    let guard = match RUNTIME.read() {
        Ok(g) => g,
        Err(p) => p.into_inner(),
    };
    guard.clone()
}

fn guarded(entry_point: &str, body: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(body)).is_err() {
        log::error!("JNI: Panic caught in {entry_point}");
    }
}

fn java_string(env: &mut JNIEnv, value: &JString) -> Option<String> {
    match env.get_string(value) {
        Ok(s) => Some(s.into()),
        Err(e) => {
            log::error!("JNI: Could not read Java string: {e}");
            None
        }
    }
}

fn files_dir(env: &mut JNIEnv, activity: &JObject) -> PlatformResult<PathBuf> {
    let dir = env
        .call_method(activity, "getFilesDir", "()Ljava/io/File;", &[])?
        .l()?;
    let path = env
        .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])?
        .l()?;
    let path = JString::from(path);
    let path: String = env.get_string(&path)?.into();
    Ok(PathBuf::from(path))
}

fn initialize_logging(files_dir: &Path) {
    if let Ok(file) = File::create(files_dir.join(LOG_FILE_NAME)) {
        // A second init after a destroy finds the logger already set.
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), file);
    }
}

fn start_runtime(
    env: &mut JNIEnv,
    activity: &JObject,
    files_dir: Option<&Path>,
) -> PlatformResult<Arc<AndroidRuntime>> {
    let bridge = JniHostBridge {
        vm: env.get_java_vm()?,
        activity: env.new_global_ref(activity)?,
    };
    let adapter = Arc::new(AndroidAdapter::new(bridge));
    let config_manager = Arc::new(match files_dir {
        Some(dir) => CoreConfigManager::with_config_dir(dir),
        None => CoreConfigManager::new(),
    });
    let backend = Backend::new(adapter.clone(), config_manager);

    let (web_messages, inbox) = mpsc::channel::<String>();
    let worker_backend = backend.clone();
    thread::Builder::new()
        .name("veritnote-router".to_string())
        .spawn(move || {
            for message in inbox {
                let backend = &worker_backend;
                guarded("router", || backend.handle_message(&message));
            }
            log::debug!("JNI: Router thread finished.");
        })
        .map_err(PlatformError::from)?;

    Ok(Arc::new(AndroidRuntime {
        backend,
        adapter,
        web_messages,
    }))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_veritnet_veritnote_MainActivity_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    activity: JObject<'local>,
) {
    guarded("nativeInit", || {
        let mut slot = match RUNTIME.write() {
            Ok(g) => g,
            Err(p) => p.into_inner(),
        };
        if slot.is_some() {
            return;
        }
        let app_files_dir = match files_dir(&mut env, &activity) {
            Ok(dir) => Some(dir),
            Err(_) => {
                let _ = env.exception_clear();
                None
            }
        };
        if let Some(dir) = &app_files_dir {
            initialize_logging(dir);
        }
        log::debug!("JNI: nativeInit");
        match start_runtime(&mut env, &activity, app_files_dir.as_deref()) {
            Ok(runtime) => *slot = Some(runtime),
            Err(e) => log::error!("JNI: Backend failed to start: {e}"),
        }
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_veritnet_veritnote_MainActivity_nativeDestroy<'local>(
    _env: JNIEnv<'local>,
    _activity: JObject<'local>,
) {
    guarded("nativeDestroy", || {
        log::debug!("JNI: nativeDestroy");
        let mut slot = match RUNTIME.write() {
            Ok(g) => g,
            Err(p) => p.into_inner(),
        };
        // Dropping the sender ends the router thread once it drains.
        *slot = None;
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_veritnet_veritnote_MainActivity_nativeOnUiReady<'local>(
    _env: JNIEnv<'local>,
    _activity: JObject<'local>,
) {
    guarded("nativeOnUiReady", || {
        if let Some(runtime) = current_runtime() {
            runtime.backend.on_ui_ready();
        }
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_veritnet_veritnote_MainActivity_nativeOnWebMessage<'local>(
    mut env: JNIEnv<'local>,
    _activity: JObject<'local>,
    message: JString<'local>,
) {
    guarded("nativeOnWebMessage", || {
        let Some(runtime) = current_runtime() else {
            return;
        };
        if let Some(message) = java_string(&mut env, &message) {
            if runtime.web_messages.send(message).is_err() {
                log::warn!("JNI: Router thread is gone; message dropped.");
            }
        }
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_veritnet_veritnote_MainActivity_nativeOnPlatformServiceResult<
    'local,
>(
    mut env: JNIEnv<'local>,
    _activity: JObject<'local>,
    result_json: JString<'local>,
) {
    guarded("nativeOnPlatformServiceResult", || {
        let Some(runtime) = current_runtime() else {
            return;
        };
        if let Some(result) = java_string(&mut env, &result_json) {
            runtime.adapter.on_platform_service_result(&result);
        }
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_veritnet_veritnote_MainActivity_nativeGetPendingWorkspacePath<
    'local,
>(
    mut env: JNIEnv<'local>,
    _activity: JObject<'local>,
) -> jstring {
    let pending = catch_unwind(AssertUnwindSafe(|| {
        current_runtime().and_then(|runtime| runtime.backend.session().pending_workspace_path())
    }))
    .unwrap_or(None);
    match pending {
        Some(path) => match env.new_string(path) {
            Ok(text) => text.into_raw(),
            Err(e) => {
                log::error!("JNI: Could not return pending workspace path: {e}");
                std::ptr::null_mut()
            }
        },
        None => std::ptr::null_mut(),
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_veritnet_veritnote_MainActivity_nativeClearPendingWorkspacePath<
    'local,
>(
    _env: JNIEnv<'local>,
    _activity: JObject<'local>,
) {
    guarded("nativeClearPendingWorkspacePath", || {
        if let Some(runtime) = current_runtime() {
            runtime.backend.session().set_pending_workspace_path(None);
        }
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_veritnet_veritnote_MainActivity_nativeOnExternalLinkNavigation<
    'local,
>(
    mut env: JNIEnv<'local>,
    _activity: JObject<'local>,
    url: JString<'local>,
) {
    guarded("nativeOnExternalLinkNavigation", || {
        let Some(runtime) = current_runtime() else {
            return;
        };
        if let Some(url) = java_string(&mut env, &url) {
            runtime.adapter.open_external_link(&url);
        }
    });
}
