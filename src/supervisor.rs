use serde::Deserialize;

use crate::app::App;
use crate::error::ProvisionResult;
use crate::system::System;

#[derive(Debug, Deserialize)]
struct Process {
    name: String,
}

/// Parse `pm2 jlist` output into process names. An empty listing
/// (fresh host, pm2 daemon not yet started) is an empty list, not
/// an error.
pub fn parse_process_list(json: &str) -> ProvisionResult<Vec<String>> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let processes: Vec<Process> = serde_json::from_str(trimmed)?;
    Ok(processes.into_iter().map(|p| p.name).collect())
}

/// Whether the supervisor already manages a process by this name.
pub fn is_running(system: &dyn System, name: &str) -> ProvisionResult<bool> {
    let output = system.run("pm2", &["jlist"])?;
    Ok(parse_process_list(&output)?.iter().any(|n| n == name))
}

/// Command line the supervisor launches for a tier: the tier's env
/// pairs prefixed onto its start command.
#[must_use]
pub fn launch_command(app: &App) -> String {
    if app.env.is_empty() {
        return app.start_command.clone();
    }
    let mut parts: Vec<String> = app.env.iter().map(|(k, v)| format!("{k}={v}")).collect();
    parts.push(app.start_command.clone());
    parts.join(" ")
}

/// Start a tier under the supervisor. Restarts in place when the
/// name is already managed, so re-provisioning picks up new builds
/// without duplicating processes.
pub fn start(system: &dyn System, app: &App, dir: &str) -> ProvisionResult<()> {
    if is_running(system, &app.name)? {
        eprintln!("  {} already supervised, restarting", app.name);
        system.run("pm2", &["restart", &app.name, "--update-env"])?;
        return Ok(());
    }

    eprintln!("  starting {} under pm2", app.name);
    let command = launch_command(app);
    system.run(
        "pm2",
        &["start", &command, "--name", &app.name, "--cwd", dir],
    )?;
    Ok(())
}

/// Remove a tier from the supervisor. Missing names are fine.
pub fn delete(system: &dyn System, name: &str) -> ProvisionResult<()> {
    if is_running(system, name)? {
        system.run("pm2", &["delete", name])?;
        eprintln!("  {name} removed from pm2");
    }
    Ok(())
}

/// Print the supervisor's process table.
pub fn status(system: &dyn System) -> ProvisionResult<()> {
    let output = system.run("pm2", &["list"])?;
    println!("{output}");
    Ok(())
}
