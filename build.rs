use std::env;
use std::error::Error;
use std::process::Command;

fn exec_git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let output = String::from_utf8(output.stdout).ok()?;
    Some(output.trim().to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cargo_version = env::var("CARGO_PKG_VERSION")?;

    // Building from a tarball has no git metadata, fall back to the bare version.
    let describe = exec_git(&["describe", "--tags"]);
    let short_sha = exec_git(&["rev-parse", "--short", "HEAD"]);

    let stable_tag = format!("v{cargo_version}");
    let (version, build_type) = match (describe, short_sha) {
        (Some(describe), _) if describe == stable_tag => (cargo_version, "stable"),
        (_, Some(sha)) => (format!("{cargo_version}-dev_{sha}"), "dev"),
        (_, None) => (cargo_version, "unknown"),
    };

    println!("cargo:rustc-env=EGG_HATCHER_VERSION={version}");
    println!("cargo:rustc-env=EGG_HATCHER_BUILD_TYPE={build_type}");

    Ok(())
}
