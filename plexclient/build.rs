use std::env;

const LIB_DIR_VAR: &str = "PLEXCLIENT_LIB_DIR";

#[cfg(windows)]
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={}", LIB_DIR_VAR);

    if env::var_os("CARGO_FEATURE_SDK").is_none() {
        return;
    }

    // PlexClient.lib is the import library for PlexClient.dll, which must
    // also be on PATH at runtime
    println!("cargo:rustc-link-lib=dylib=PlexClient");
    println!("cargo:rustc-link-search=native={}", lib_dir());
}

#[cfg(not(windows))]
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={}", LIB_DIR_VAR);

    if env::var_os("CARGO_FEATURE_SDK").is_none() {
        return;
    }

    // The vendor only ships a Windows DLL. Linking here expects a
    // compatible libPlexClient.so to have been supplied by hand.
    println!("cargo:warning=PlexClient is distributed for Windows only");
    println!("cargo:rustc-link-lib=dylib=PlexClient");
    println!("cargo:rustc-link-search=native={}", lib_dir());
}

fn lib_dir() -> String {
    env::var(LIB_DIR_VAR).unwrap_or_else(|_| String::from("lib/"))
}
