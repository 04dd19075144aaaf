use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let out_dir = env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo");
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("version.rs");
    let cargo_toml_path = Path::new(&manifest_dir).join("Cargo.toml");

    if !needs_regeneration(&dest_path, &cargo_toml_path) {
        return;
    }

    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let contents = format!(
        "pub const BUILD_TIME: &str = \"{}\";\npub const GIT_HASH: &str = \"{}\";\n",
        build_time,
        git_hash()
    );
    if let Err(e) = fs::write(&dest_path, contents) {
        panic!("cannot write {}: {}", dest_path.display(), e);
    }
}

/// Regenerate when the output is missing, older than Cargo.toml, or either
/// modification time is unavailable
fn needs_regeneration(generated: &Path, manifest: &Path) -> bool {
    match (modified(generated), modified(manifest)) {
        (Some(generated), Some(manifest)) => manifest > generated,
        _ => true,
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn git_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
