use stacklift::config::Config;
use stacklift::database::{OsRelease, apt_source_line, bootstrap_script, detect_release, unit_file};
use stacklift::error::ProvisionError;

fn config() -> Config {
    Config::from_yaml(
        r"
domain: forum.example.com
frontend_repo: r1
backend_repo: r2
db: {name: forum, user: forum_app, password: hunter2}
oauth: {client_id: id, client_secret: secret}
storage: {region: us-east-1, access_key: ak, secret_key: sk, bucket: b}
",
    )
    .expect("config should parse")
}

#[test]
fn detects_supported_release() {
    let release = detect_release("NAME=\"Ubuntu\"\nID=ubuntu\nVERSION_CODENAME=jammy\n")
        .expect("jammy is supported");

    assert_eq!(
        release,
        OsRelease {
            id: "ubuntu".into(),
            codename: "jammy".into()
        }
    );
}

#[test]
fn strips_quotes_from_fields() {
    let release = detect_release("ID=\"ubuntu\"\nVERSION_CODENAME=\"noble\"\n")
        .expect("quoted fields should parse");

    assert_eq!(release.codename, "noble");
}

#[test]
fn rejects_non_ubuntu() {
    let err = detect_release("ID=debian\nVERSION_CODENAME=bookworm\n")
        .expect_err("debian is unsupported");

    assert!(matches!(err, ProvisionError::UnsupportedRelease(msg) if msg == "debian bookworm"));
}

#[test]
fn rejects_unknown_codename() {
    assert!(detect_release("ID=ubuntu\nVERSION_CODENAME=trusty\n").is_err());
}

#[test]
fn rejects_missing_fields() {
    assert!(detect_release("NAME=Linux\n").is_err());
    assert!(detect_release("ID=ubuntu\n").is_err());
}

#[test]
fn apt_source_points_at_vendor_repo() {
    let release = OsRelease {
        id: "ubuntu".into(),
        codename: "jammy".into(),
    };
    let line = apt_source_line(&release, "7.0");

    assert!(line.starts_with("deb "));
    assert!(line.contains("signed-by=/usr/share/keyrings/mongodb-server-7.0.gpg"));
    assert!(line.contains("https://repo.mongodb.org/apt/ubuntu jammy/mongodb-org/7.0"));
    assert!(line.ends_with("multiverse"));
}

#[test]
fn unit_file_runs_mongod() {
    let unit = unit_file();

    assert!(unit.contains("[Unit]"));
    assert!(unit.contains("ExecStart=/usr/bin/mongod --config /etc/mongod.conf"));
    assert!(unit.contains("User=mongodb"));
    assert!(unit.contains("WantedBy=multi-user.target"));
}

#[test]
fn bootstrap_creates_user_in_app_database() {
    let script = bootstrap_script(&config());

    assert!(script.contains("db.getSiblingDB(\"forum\")"));
    assert!(script.contains("user: \"forum_app\""));
    assert!(script.contains("pwd: \"hunter2\""));
    assert!(script.contains("role: \"readWrite\", db: \"forum\""));
}

#[test]
fn bootstrap_skips_existing_user() {
    let script = bootstrap_script(&config());
    assert!(script.contains("if (db.getUser(\"forum_app\") === null)"));
}
