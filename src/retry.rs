use crate::error::{ProvisionError, ProvisionResult};

/// Flat retry budget for the frontend build. Transient memory
/// exhaustion during the build clears on a plain re-run, so there
/// is no backoff.
pub const DEFAULT_MAX_RUNS: u32 = 10;

/// Run `op` up to `max_runs` times, stopping at the first success.
///
/// Returns the 1-based attempt number that succeeded. When every
/// attempt fails the error is fatal to the whole run.
pub fn run_with_retry<F>(operation: &str, max_runs: u32, mut op: F) -> ProvisionResult<u32>
where
    F: FnMut() -> ProvisionResult<()>,
{
    for attempt in 1..=max_runs {
        match op() {
            Ok(()) => return Ok(attempt),
            Err(e) => {
                eprintln!("  '{operation}' attempt {attempt}/{max_runs} failed: {e}");
            }
        }
    }

    Err(ProvisionError::RetriesExhausted {
        operation: operation.to_string(),
        attempts: max_runs,
    })
}
