use stacklift::error::ProvisionError;

#[test]
fn display_command_not_found() {
    let err = ProvisionError::CommandNotFound("mongosh".into());
    assert_eq!(err.to_string(), "command not found: mongosh");
}

#[test]
fn display_prerequisite_missing() {
    let err = ProvisionError::PrerequisiteMissing("git".into());
    assert_eq!(err.to_string(), "prerequisite missing: git");
}

#[test]
fn display_config_missing() {
    let err = ProvisionError::ConfigMissing("db.password".into());
    assert_eq!(
        err.to_string(),
        "required configuration value missing: db.password"
    );
}

#[test]
fn display_unsupported_release() {
    let err = ProvisionError::UnsupportedRelease("debian bookworm".into());
    assert_eq!(err.to_string(), "unsupported OS release: debian bookworm");
}

#[test]
fn display_retries_exhausted() {
    let err = ProvisionError::RetriesExhausted {
        operation: "npm run build".into(),
        attempts: 10,
    };
    assert_eq!(err.to_string(), "'npm run build' failed after 10 attempts");
}

#[test]
fn display_service_failed() {
    let err = ProvisionError::ServiceFailed("systemctl start mongod".into());
    assert_eq!(
        err.to_string(),
        "service operation failed: systemctl start mongod"
    );
}

#[test]
fn display_file_not_found() {
    let err = ProvisionError::FileNotFound("stacklift.yml".into());
    assert_eq!(err.to_string(), "file not found: stacklift.yml");
}

#[test]
fn display_other() {
    let err = ProvisionError::Other("custom error".into());
    assert_eq!(err.to_string(), "custom error");
}

#[test]
fn from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err: ProvisionError = io_err.into();
    assert!(matches!(err, ProvisionError::Io(_)));
}

#[test]
fn from_json_error() {
    let json_err = serde_json::from_str::<Vec<u64>>("invalid").unwrap_err();
    let err: ProvisionError = json_err.into();
    assert!(matches!(err, ProvisionError::Json(_)));
}

#[test]
fn from_yaml_error() {
    let yaml_err = serde_yaml::from_str::<Vec<u64>>(": not yaml").unwrap_err();
    let err: ProvisionError = yaml_err.into();
    assert!(matches!(err, ProvisionError::Yaml(_)));
}
