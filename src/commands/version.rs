use anyhow::Result;
use std::process::ExitCode;

/// Run the version command - display version and build information
pub fn run() -> Result<ExitCode> {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");

    println!("{} v{}", name, version);
    println!();
    println!("License: MIT");

    // Show build info if available
    if let Some(hash) = option_env!("UPSTREAM_WATCH_BUILD_HASH") {
        println!("Build: {}", hash);
    }

    Ok(ExitCode::SUCCESS)
}
