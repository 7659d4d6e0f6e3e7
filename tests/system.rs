mod common;

use common::FakeSystem;
use stacklift::system::{PackageCheck, ensure_package, is_package_installed};

#[test]
fn no_arguments_is_invalid_usage() {
    let system = FakeSystem::new();
    let status = is_package_installed(&system, &[]);

    assert_eq!(status, PackageCheck::InvalidUsage);
    assert_eq!(status.code(), 1);
}

#[test]
fn two_arguments_is_invalid_usage() {
    let system = FakeSystem::new();
    let status = is_package_installed(&system, &["a", "b"]);

    assert_eq!(status, PackageCheck::InvalidUsage);
    assert_eq!(status.code(), 1);
}

#[test]
fn whitespace_name_is_invalid() {
    let system = FakeSystem::new();

    assert_eq!(
        is_package_installed(&system, &["  "]),
        PackageCheck::InvalidName
    );
    assert_eq!(
        is_package_installed(&system, &[""]),
        PackageCheck::InvalidName
    );
    assert_eq!(is_package_installed(&system, &[""]).code(), 2);
}

#[test]
fn present_package_reports_installed() {
    let system = FakeSystem::with_installed(&["bash"]);
    let status = is_package_installed(&system, &["bash"]);

    assert_eq!(status, PackageCheck::Installed);
    assert_eq!(status.code(), 0);
}

#[test]
fn absent_package_reports_not_installed() {
    let system = FakeSystem::new();
    let status = is_package_installed(&system, &["definitely-not-a-real-package"]);

    assert_eq!(status, PackageCheck::NotInstalled);
    assert_eq!(status.code(), 3);
}

#[test]
fn ensure_package_installs_absent_package() {
    let system = FakeSystem::new();

    ensure_package(&system, "nginx").expect("install should succeed");

    assert!(system.installed.borrow().contains("nginx"));
    assert_eq!(system.install_count(), 1);
}

#[test]
fn ensure_package_twice_installs_once() {
    let system = FakeSystem::new();

    ensure_package(&system, "nginx").expect("first call");
    ensure_package(&system, "nginx").expect("second call");

    assert_eq!(system.install_count(), 1);
}

#[test]
fn ensure_package_skips_preinstalled() {
    let system = FakeSystem::with_installed(&["git"]);

    ensure_package(&system, "git").expect("should be a no-op");

    assert_eq!(system.install_count(), 0);
}

#[test]
fn ensure_package_rejects_blank_name() {
    let system = FakeSystem::new();

    assert!(ensure_package(&system, "  ").is_err());
    assert_eq!(system.install_count(), 0);
}
