/// Defines one tier of the stack: where its source lives, how its
/// dependencies are installed, how it is built, and how the
/// supervisor starts it.
///
/// # Example
///
/// ```
/// use stacklift::App;
///
/// let web = App::new("web", "https://git.example.com/forum-web.git")
///     .branch("release")
///     .port(3000)
///     .env("NODE_ENV", "production")
///     .build_command("npm run build")
///     .start_command("npm run serve");
///
/// assert_eq!(web.name, "web");
/// assert_eq!(web.port, Some(3000));
/// ```
#[derive(Debug, Clone)]
pub struct App {
    pub name: String,
    pub repo: String,
    pub branch: String,
    pub port: Option<u16>,
    pub env: Vec<(String, String)>,
    pub install_command: String,
    pub build_command: Option<String>,
    pub start_command: String,
}

impl App {
    #[must_use]
    pub fn new(name: &str, repo: &str) -> Self {
        Self {
            name: name.to_string(),
            repo: repo.to_string(),
            branch: "main".to_string(),
            port: None,
            env: Vec::new(),
            install_command: "npm install".to_string(),
            build_command: None,
            start_command: "npm start".to_string(),
        }
    }

    #[must_use]
    pub fn branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn install_command(mut self, command: &str) -> Self {
        self.install_command = command.to_string();
        self
    }

    /// Set a build command. Only tiers with a build command go
    /// through the retrying build step.
    #[must_use]
    pub fn build_command(mut self, command: &str) -> Self {
        self.build_command = Some(command.to_string());
        self
    }

    #[must_use]
    pub fn start_command(mut self, command: &str) -> Self {
        self.start_command = command.to_string();
        self
    }
}
