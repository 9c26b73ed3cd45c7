/*
 * The Android host: the adapter over the Kotlin runtime's platform services, the
 * request/result correlator it uses, and (on Android builds only) the JNI entry
 * points that wire both to `MainActivity`.
 */
pub mod adapter;
pub mod correlator;
#[cfg(target_os = "android")]
pub mod jni_bridge;

pub use adapter::{AndroidAdapter, HostBridge};
pub use correlator::{ServiceCorrelator, ServiceResult};
