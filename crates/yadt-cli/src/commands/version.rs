//! Version command
//!
//! Usage: yadt version

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit the binary was built from, injected through `GIT_COMMIT`
const GIT_COMMIT: &str = match option_env!("GIT_COMMIT") {
    Some(commit) => commit,
    None => "HEAD",
};

/// Version banner
pub fn banner() -> String {
    format!("Version: {}\nGit Commit: {}", VERSION, GIT_COMMIT)
}

/// Execute version command
pub fn execute() -> anyhow::Result<()> {
    println!("{}", banner());
    Ok(())
}
