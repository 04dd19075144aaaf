//! Build metadata generated by the build script

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Crate version from Cargo.toml
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// One-line version banner, e.g. "0.1.0 (abc1234, built 2026-01-01 00:00:00 UTC)"
pub fn long_version() -> String {
    format!("{} ({}, built {})", version(), git_hash(), build_time())
}
