use crate::app::App;
use crate::error::ProvisionResult;
use crate::retry::{DEFAULT_MAX_RUNS, run_with_retry};
use crate::system::System;

/// Clone the tier's repository, or pull when a checkout already
/// exists at the target directory.
pub fn checkout(system: &dyn System, app: &App, dir: &str) -> ProvisionResult<()> {
    if system.path_exists(dir) {
        eprintln!("  {} already checked out, pulling {}", app.name, app.branch);
        system.run("git", &["-C", dir, "pull", "origin", &app.branch])?;
    } else {
        eprintln!("  cloning {} ({})", app.repo, app.branch);
        system.run(
            "git",
            &["clone", "--branch", &app.branch, &app.repo, dir],
        )?;
    }
    Ok(())
}

/// Install the tier's language-ecosystem dependencies.
pub fn install_dependencies(system: &dyn System, app: &App, dir: &str) -> ProvisionResult<()> {
    eprintln!("  installing dependencies for {}", app.name);
    run_in_dir(system, dir, &app.install_command)?;
    Ok(())
}

/// Run the tier's build command, retrying up to the flat budget.
/// Tiers without a build command skip this step. Returns the
/// attempt count on success.
pub fn build(system: &dyn System, app: &App, dir: &str) -> ProvisionResult<u32> {
    let Some(build_command) = &app.build_command else {
        return Ok(0);
    };

    eprintln!("  building {}", app.name);
    let attempts = run_with_retry(build_command, DEFAULT_MAX_RUNS, || {
        run_in_dir(system, dir, build_command)?;
        Ok(())
    })?;

    if attempts > 1 {
        eprintln!("  build succeeded on attempt {attempts}");
    }
    Ok(attempts)
}

// The directory is quoted; install dirs with spaces must not split.
fn run_in_dir(system: &dyn System, dir: &str, command: &str) -> ProvisionResult<String> {
    system.run("sh", &["-c", &format!("cd '{dir}' && {command}")])
}
