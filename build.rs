fn main() {
    // Tell Cargo to rerun this build script if app.rc changes.
    println!("cargo:rerun-if-changed=app.rc");

    // The resource compiler only exists on Windows hosts, and only Windows targets
    // carry an RCDATA table. Android builds read the same files from the APK assets.
    #[cfg(target_os = "windows")]
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        let _ = embed_resource::compile("app.rc", &[] as &[&str]);
    }
}
