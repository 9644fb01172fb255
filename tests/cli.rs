//  命令行集成测试

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use tempfile::TempDir;

const PAGE: &str = "<html><body><p>The quick brown fox jumps over the lazy dog.</p></body></html>";

fn write_fixtures(dir: &Path) {
    fs::write(dir.join("page.html"), PAGE).unwrap();
    fs::write(
        dir.join("dictionary.toml"),
        r#"
        [es]
        quick = "rápido"
        brown = "marrón"
        fox = "zorro"
        jumps = "salta"
        lazy = "perezoso"
        dog = "perro"
        "#,
    )
    .unwrap();
    fs::write(dir.join("wordweave.toml"), "").unwrap();
}

fn wordweave(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("WORDWEAVE_CONFIG")
        .args(["--config", "wordweave.toml", "--dictionary", "dictionary.toml"])
        .args(["--source", "en", "--target", "es", "--seed", "1"]);
    cmd
}

#[test]
fn translates_page_with_dictionary() {
    let dir = TempDir::new().unwrap();
    write_fixtures(dir.path());

    let out = wordweave(dir.path())
        .args(["--rate", "intensive", "page.html"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let html = String::from_utf8(out.stdout).unwrap();
    assert!(html.contains("class=\"ww-word\""));
    assert!(html.contains("data-original="));
}

#[test]
fn restore_flag_writes_original_page() {
    let dir = TempDir::new().unwrap();
    write_fixtures(dir.path());

    wordweave(dir.path())
        .args(["--restore", "--output", "out.html", "page.html"])
        .assert()
        .success();

    let html = fs::read_to_string(dir.path().join("out.html")).unwrap();
    assert!(!html.contains("ww-word"));
    assert!(html.contains("The quick brown fox jumps over the lazy dog."));
}

#[test]
fn rejects_unknown_rate() {
    let dir = TempDir::new().unwrap();
    write_fixtures(dir.path());

    wordweave(dir.path())
        .args(["--rate", "extreme", "page.html"])
        .assert()
        .failure();
}

#[test]
fn requires_a_provider() {
    let dir = TempDir::new().unwrap();
    write_fixtures(dir.path());

    Command::cargo_bin(env!("CARGO_PKG_NAME"))
        .unwrap()
        .current_dir(dir.path())
        .args(["--config", "wordweave.toml", "page.html"])
        .assert()
        .failure();
}

/// 提供者按命令行顺序组成回退链：不可达的主提供者之后由词典兜底
#[test]
fn falls_back_to_later_provider_in_command_line_order() {
    let dir = TempDir::new().unwrap();
    write_fixtures(dir.path());

    let out = Command::cargo_bin(env!("CARGO_PKG_NAME"))
        .unwrap()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("WORDWEAVE_CONFIG")
        .args(["--config", "wordweave.toml"])
        .args(["--libretranslate", "http://127.0.0.1:9"])
        .args(["--dictionary", "dictionary.toml"])
        .args(["--source", "en", "--target", "es", "--seed", "1"])
        .args(["--rate", "intensive", "page.html"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let html = String::from_utf8(out.stdout).unwrap();
    assert!(html.contains("class=\"ww-word\""));
}

#[test]
fn help_lists_environment_variables() {
    let out = Command::cargo_bin(env!("CARGO_PKG_NAME"))
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(out.status.success());
    let help = String::from_utf8(out.stdout).unwrap();
    assert!(help.contains("WORDWEAVE_CONFIG"));
    assert!(help.contains("WORDWEAVE_TARGET_LANGUAGE"));
}
