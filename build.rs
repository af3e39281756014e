use std::env::consts::{ARCH, OS};
use std::process::Command;

fn main() -> anyhow::Result<()> {
    // Build a version string to use in the user-agent and `--version` flag for the CLI.
    #[cfg(debug_assertions)]
    const BUILD_TYPE: &str = "debug";
    #[cfg(not(debug_assertions))]
    const BUILD_TYPE: &str = "release";

    // Outside of a git checkout (e.g. a packaged crate) the git details are
    // simply left blank.
    let commit = get_commit_hash().unwrap_or_default();
    let dirty = if is_working_tree_clean().unwrap_or(true) {
        ""
    } else {
        "+"
    };

    let version_string = if commit.is_empty() {
        format!(
            "{} ({}, {}/{})",
            env!("CARGO_PKG_VERSION"),
            BUILD_TYPE,
            OS,
            ARCH
        )
    } else {
        format!(
            "{} ({}{}, {}, {}/{})",
            env!("CARGO_PKG_VERSION"),
            commit,
            dirty,
            BUILD_TYPE,
            OS,
            ARCH
        )
    };

    println!("cargo:rustc-env=NYCKEL_VERSION={}", version_string);
    println!("cargo:rerun-if-changed=build.rs");

    // Pick up new commits and branch switches, when there is a checkout.
    let git_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".git");
    if git_dir.exists() {
        println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
        println!("cargo:rerun-if-changed={}", git_dir.join("index").display());
    }
    Ok(())
}

fn get_commit_hash() -> anyhow::Result<String> {
    let output = Command::new("git")
        .arg("log")
        .arg("-1")
        .arg("--pretty=format:%h") // Abbreviated commit hash
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()?;

    if !output.status.success() {
        anyhow::bail!("not a git checkout");
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn is_working_tree_clean() -> anyhow::Result<bool> {
    let status = Command::new("git")
        .arg("diff")
        .arg("--quiet")
        .arg("--exit-code")
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .status()?;

    Ok(status.code() == Some(0))
}
