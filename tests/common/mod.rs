use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use stacklift::error::{ProvisionError, ProvisionResult};
use stacklift::system::{PackageState, ServiceAction, System};

/// In-memory stand-in for a real host. Records every mutation so
/// tests can assert on ordering and idempotence, and simulates just
/// enough side effects (clones creating directories, the supervisor
/// remembering started processes) for re-runs to behave like they
/// would on a real machine.
#[derive(Default)]
pub struct FakeSystem {
    pub installed: RefCell<HashSet<String>>,
    pub files: RefCell<HashMap<String, String>>,
    pub paths: RefCell<HashSet<String>>,
    pub actions: RefCell<Vec<String>>,
    pub outputs: RefCell<HashMap<String, String>>,
    pub failing: RefCell<HashSet<String>>,
    pub processes: RefCell<Vec<String>>,
}

impl FakeSystem {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.outputs.borrow_mut().insert(
            "cat".to_string(),
            "ID=ubuntu\nVERSION_CODENAME=jammy\n".to_string(),
        );
        fake
    }

    pub fn with_installed(packages: &[&str]) -> Self {
        let fake = Self::new();
        for package in packages {
            fake.installed.borrow_mut().insert((*package).to_string());
        }
        fake
    }

    /// Make every invocation of `program` fail.
    pub fn fail_on(&self, program: &str) {
        self.failing.borrow_mut().insert(program.to_string());
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.borrow().clone()
    }

    pub fn install_count(&self) -> usize {
        self.actions()
            .iter()
            .filter(|a| a.starts_with("install "))
            .count()
    }

    fn record(&self, action: String) {
        self.actions.borrow_mut().push(action);
    }

    fn check_failing(&self, program: &str) -> ProvisionResult<()> {
        if self.failing.borrow().contains(program) {
            return Err(ProvisionError::Other(format!("{program} is broken")));
        }
        Ok(())
    }

    fn pm2(&self, args: &[&str]) -> String {
        match args.first() {
            Some(&"jlist") => {
                let list: Vec<serde_json::Value> = self
                    .processes
                    .borrow()
                    .iter()
                    .map(|name| serde_json::json!({ "name": name }))
                    .collect();
                serde_json::to_string(&list).expect("process list serializes")
            }
            Some(&"start") => {
                if let Some(pos) = args.iter().position(|a| *a == "--name") {
                    self.processes.borrow_mut().push(args[pos + 1].to_string());
                }
                String::new()
            }
            Some(&"delete") => {
                self.processes.borrow_mut().retain(|n| n != args[1]);
                String::new()
            }
            _ => String::new(),
        }
    }
}

impl System for FakeSystem {
    fn package_state(&self, package: &str) -> ProvisionResult<PackageState> {
        Ok(if self.installed.borrow().contains(package) {
            PackageState::Installed
        } else {
            PackageState::NotInstalled
        })
    }

    fn install_package(&self, package: &str) -> ProvisionResult<()> {
        self.check_failing("apt-get")?;
        self.record(format!("install {package}"));
        self.installed.borrow_mut().insert(package.to_string());
        Ok(())
    }

    fn write_file(&self, path: &str, content: &str) -> ProvisionResult<()> {
        self.record(format!("write {path}"));
        self.files
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        self.paths.borrow_mut().insert(path.to_string());
        Ok(())
    }

    fn run(&self, program: &str, args: &[&str]) -> ProvisionResult<String> {
        self.check_failing(program)?;
        self.record(format!("{program} {}", args.join(" ")));

        // Side effects a real host would have.
        if program == "git" && args.first() == Some(&"clone") {
            if let Some(dir) = args.last() {
                self.paths.borrow_mut().insert((*dir).to_string());
            }
        }
        if program == "openssl" {
            for flag in ["-keyout", "-out"] {
                if let Some(pos) = args.iter().position(|a| *a == flag) {
                    self.paths.borrow_mut().insert(args[pos + 1].to_string());
                }
            }
        }
        if program == "ln" {
            if let Some(dest) = args.last() {
                self.paths.borrow_mut().insert((*dest).to_string());
            }
        }
        if program == "pm2" {
            return Ok(self.pm2(args));
        }

        Ok(self
            .outputs
            .borrow()
            .get(program)
            .cloned()
            .unwrap_or_default())
    }

    fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        _stdin: &[u8],
    ) -> ProvisionResult<String> {
        self.check_failing(program)?;
        self.record(format!("{program} {} <stdin", args.join(" ")));
        Ok(String::new())
    }

    fn control_service(&self, service: &str, action: ServiceAction) -> ProvisionResult<()> {
        self.check_failing("systemctl")?;
        self.record(format!("systemctl {} {service}", action.as_str()));
        Ok(())
    }

    fn path_exists(&self, path: &str) -> bool {
        self.paths.borrow().contains(path)
    }

    fn settle(&self, duration: Duration) {
        self.record(format!("sleep {}s", duration.as_secs()));
    }
}
