use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// 测试目录本身位于系统临时目录下，默认策略会拦截，因此用只拦截 /etc 的配置
struct Fixture {
    _root: TempDir,
    work: PathBuf,
    config: PathBuf,
}

fn fixture() -> Fixture {
    let root = tempdir().unwrap();
    let work = root.path().join("work");
    fs::create_dir(&work).unwrap();
    let config = root.path().join("filedelete.toml");
    fs::write(&config, "[safety]\ndangerous_paths = [\"/etc\"]\n").unwrap();
    Fixture { _root: root, work, config }
}

fn write_logs(dir: &Path, n: usize) -> Vec<PathBuf> {
    (0..n)
        .map(|i| {
            let p = dir.join(format!("app{i}.log"));
            fs::write(&p, "log line").unwrap();
            p
        })
        .collect()
}

fn cmd(fx: &Fixture) -> Command {
    let mut cmd = Command::cargo_bin("filedelete").unwrap();
    cmd.arg("--path").arg(&fx.work).arg("--config").arg(&fx.config);
    cmd
}

#[test]
fn test_dry_run_is_default_and_keeps_files() {
    let fx = fixture();
    let logs = write_logs(&fx.work, 3);
    fs::write(fx.work.join("notes.txt"), "keep").unwrap();

    cmd(&fx)
        .args(["--ext", "log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode=dry-run"))
        .stdout(predicate::str::contains("matched=3 deleted=3 errors=0"))
        .stdout(predicate::str::contains("Re-run with --apply"));

    assert!(logs.iter().all(|p| p.exists()));
}

#[test]
fn test_apply_deletes_matched_files_only() {
    let fx = fixture();
    let logs = write_logs(&fx.work, 2);
    let notes = fx.work.join("notes.txt");
    fs::write(&notes, "keep").unwrap();

    cmd(&fx)
        .args(["--ext", ".LOG", "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode=apply"))
        .stdout(predicate::str::contains("deleted=2"));

    assert!(logs.iter().all(|p| !p.exists()));
    assert!(notes.exists());
}

#[test]
fn test_no_match_exits_nothing_to_do() {
    let fx = fixture();
    write_logs(&fx.work, 2);

    cmd(&fx).args(["--ext", "tmp", "--apply"]).assert().code(5);
}

#[test]
fn test_invalid_size_and_date_are_argument_errors() {
    let fx = fixture();
    let logs = write_logs(&fx.work, 2);

    cmd(&fx).args(["--min-size", "10X", "--apply"]).assert().code(2);
    cmd(&fx).args(["--before-date", "2024-01-01", "--apply"]).assert().code(2);
    cmd(&fx).args(["--name-regex", "(unclosed", "--apply"]).assert().code(2);

    assert!(logs.iter().all(|p| p.exists()));
}

#[test]
fn test_missing_path_is_argument_error() {
    let fx = fixture();
    Command::cargo_bin("filedelete")
        .unwrap()
        .arg("--path")
        .arg(fx.work.join("does-not-exist"))
        .arg("--config")
        .arg(&fx.config)
        .assert()
        .code(2);
}

#[cfg(unix)]
#[test]
fn test_dangerous_path_is_blocked() {
    Command::cargo_bin("filedelete")
        .unwrap()
        .args(["--path", "/etc", "--apply", "--ext", "conf"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("path rejected"));
}

#[test]
fn test_relative_path_skips_depth_rule() {
    let fx = fixture();
    let logs = write_logs(&fx.work, 2);
    let root = fx.work.parent().unwrap();

    Command::cargo_bin("filedelete")
        .unwrap()
        .current_dir(root)
        .args(["--path", "work", "--ext", "log", "--apply"])
        .arg("--config")
        .arg(&fx.config)
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted=2"));

    assert!(logs.iter().all(|p| !p.exists()));
}

#[test]
fn test_over_threshold_with_no_prompt_aborts() {
    let fx = fixture();
    let logs = write_logs(&fx.work, 3);

    cmd(&fx).args(["--ext", "log", "--apply", "--max-delete", "2", "--no-prompt"]).assert().code(3);

    assert!(logs.iter().all(|p| p.exists()));
}

#[test]
fn test_over_threshold_declined_keeps_files() {
    let fx = fixture();
    let logs = write_logs(&fx.work, 3);

    cmd(&fx)
        .args(["--ext", "log", "--apply", "--max-delete", "2"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Do you want to continue? (y/N)"));

    assert!(logs.iter().all(|p| p.exists()));
}

#[test]
fn test_over_threshold_confirmed_deletes() {
    let fx = fixture();
    let logs = write_logs(&fx.work, 3);

    cmd(&fx).args(["--ext", "log", "--apply", "--max-delete", "2"]).write_stdin("yes\n").assert().success();

    assert!(logs.iter().all(|p| !p.exists()));
}

#[test]
fn test_force_skips_confirmation() {
    let fx = fixture();
    let logs = write_logs(&fx.work, 3);

    cmd(&fx).args(["--ext", "log", "--apply", "--max-delete", "1", "--force", "--no-prompt"]).assert().success();

    assert!(logs.iter().all(|p| !p.exists()));
}

#[test]
fn test_threshold_from_config_file() {
    let fx = fixture();
    write_logs(&fx.work, 3);
    fs::write(&fx.config, "[safety]\ndangerous_paths = [\"/etc\"]\nmax_delete = 2\n").unwrap();

    cmd(&fx).args(["--ext", "log", "--apply", "--no-prompt"]).assert().code(3);
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let fx = fixture();
    write_logs(&fx.work, 1);
    fs::write(&fx.config, "[safety]\nmax_delet = 2\n").unwrap();

    cmd(&fx).args(["--ext", "log"]).assert().code(2);
}

#[test]
fn test_json_summary() {
    let fx = fixture();
    write_logs(&fx.work, 2);
    fs::write(fx.work.join("notes.txt"), "keep").unwrap();

    let output = cmd(&fx).args(["--ext", "log", "--apply", "--json"]).output().unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["mode"], "apply");
    assert_eq!(summary["scanned"], 3);
    assert_eq!(summary["matched"], 2);
    assert_eq!(summary["deleted"], 2);
    assert_eq!(summary["errors"], 0);
    assert_eq!(summary["exit_code"], 0);
}

#[test]
fn test_recursive_delete_with_empty_dir_cleanup() {
    let fx = fixture();
    let nested = fx.work.join("2024/01");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("old.log"), "x").unwrap();
    fs::write(fx.work.join("top.log"), "x").unwrap();

    cmd(&fx)
        .args(["--ext", "log", "--recursive", "--apply", "--delete-empty-dirs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted=2"))
        .stdout(predicate::str::contains("removed_dirs=2"));

    assert!(fx.work.exists());
    assert_eq!(fs::read_dir(&fx.work).unwrap().count(), 0);
}

#[test]
fn test_non_recursive_ignores_subdirectories() {
    let fx = fixture();
    fs::create_dir(fx.work.join("sub")).unwrap();
    let nested = fx.work.join("sub/deep.log");
    fs::write(&nested, "x").unwrap();
    fs::write(fx.work.join("top.log"), "x").unwrap();

    cmd(&fx).args(["--ext", "log", "--apply"]).assert().success().stdout(predicate::str::contains("deleted=1"));

    assert!(nested.exists());
}

#[test]
fn test_glob_and_size_filters_combine() {
    let fx = fixture();
    fs::write(fx.work.join("x.log"), vec![b'a'; 2048]).unwrap();
    fs::write(fx.work.join("y.log"), b"tiny").unwrap();
    let keep = fx.work.join("keep.log");
    fs::write(&keep, vec![b'a'; 2048]).unwrap();

    cmd(&fx)
        .args(["--include-glob", "*.log", "--exclude-glob", "keep*", "--min-size", "1K", "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("matched=1"));

    assert!(!fx.work.join("x.log").exists());
    assert!(fx.work.join("y.log").exists());
    assert!(keep.exists());
}

#[test]
fn test_dry_run_conflicts_with_apply() {
    let fx = fixture();
    cmd(&fx).args(["--dry-run", "--apply"]).assert().code(2);
}

#[test]
fn test_log_file_receives_events() {
    let fx = fixture();
    write_logs(&fx.work, 1);
    let log_path = fx.config.with_file_name("run.log");

    cmd(&fx).args(["--ext", "log"]).arg("--log-file").arg(&log_path).assert().success();

    let text = fs::read_to_string(&log_path).unwrap();
    assert!(text.contains("[DRY-RUN] would delete"));
}
