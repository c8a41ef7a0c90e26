fn main() {
    println!("cargo:rerun-if-env-changed=Q3_ENGINE_LIB_DIR");

    // The engine is built by the Xcode project; we only need to find it.
    if std::env::var_os("CARGO_FEATURE_ENGINE").is_some() {
        if let Some(dir) = std::env::var_os("Q3_ENGINE_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
        }
        println!("cargo:rustc-link-lib=static=quake3");
    }
}
