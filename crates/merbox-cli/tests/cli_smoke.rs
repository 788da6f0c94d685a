use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("merbox-cli"))
}

fn stdout_of(cmd: &mut Command) -> String {
    let out = cmd.output().expect("run merbox-cli");
    assert!(
        out.status.success(),
        "merbox-cli failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).expect("utf-8 stdout")
}

#[test]
fn encode_then_decode_round_trips() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let src = tmp.path().join("diagram.mmd");
    fs::write(&src, "flowchart LR\n  A-->B\n").unwrap();

    let fragment = stdout_of(cli().args(["encode", "--theme", "forest", src.to_str().unwrap()]));
    let fragment = fragment.trim();
    assert!(fragment.starts_with("#pako:"), "got {fragment}");

    let json = stdout_of(cli().args(["decode", fragment]));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"code": "flowchart LR\n  A-->B", "theme": "forest"})
    );

    let bare = fragment.trim_start_matches("#pako:");
    let again = stdout_of(cli().args(["decode", bare]));
    assert_eq!(json, again);
}

#[test]
fn encode_with_base_url_and_custom_config() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("theme.json");
    fs::write(&config, r#"{"theme":"base","fontSize":20}"#).unwrap();

    let url = stdout_of(
        cli()
            .args([
                "encode",
                "--theme",
                "custom",
                "--theme-config",
                config.to_str().unwrap(),
                "--base-url",
                "https://example.test/editor#old",
                "-",
            ])
            .write_stdin("pie\n  \"a\": 1"),
    );
    assert!(url.starts_with("https://example.test/editor#pako:"));

    let rendered = stdout_of(cli().args(["config", url.trim()]));
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["theme"], "base");
    assert_eq!(value["fontSize"], 20);
    assert_eq!(value["securityLevel"], "strict");
    assert_eq!(value["startOnLoad"], false);

    let embed = stdout_of(cli().args(["embed", url.trim()]));
    assert!(embed.contains(r#"theme: "default""#));
    assert!(embed.contains("pie\n  \"a\": 1"));
}

#[test]
fn undecodable_tokens_exit_with_3() {
    cli().args(["decode", "not-a-token"]).assert().code(3);
    cli().args(["config", "#pako:"]).assert().code(3);
}

#[test]
fn usage_errors_exit_with_2() {
    cli().args(["export", "--format", "gif"]).assert().code(2);
    cli().args(["encode", "--theme", "sepia"]).assert().code(2);
    cli().args(["config"]).assert().code(2);
    cli().args(["--help"]).assert().code(2);
}

#[test]
fn blank_source_is_not_encoded() {
    cli().args(["encode", "-"]).write_stdin("  \n").assert().code(1);
}

#[test]
fn store_file_backs_decode_fallback() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = tmp.path().join("state.json");
    let store_arg = store.to_str().unwrap();

    cli()
        .args(["encode", "--theme", "dark", "--store", store_arg, "-"])
        .write_stdin("gantt")
        .assert()
        .success();
    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&store).unwrap()).unwrap();
    assert_eq!(saved["mermaid_code"], "gantt");
    assert_eq!(saved["mermaid_theme"], "dark");

    let json = stdout_of(cli().args(["decode", "--store", store_arg, "#pako:garbage"]));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["source"], "storage");
    assert_eq!(value["clearFragment"], true);
    assert_eq!(value["state"]["code"], "gantt");
}

#[test]
fn exports_standalone_svg_to_stdout() {
    let fixture = repo_root().join("fixtures").join("svg").join("flowchart.svg");
    let svg = stdout_of(cli().args(["export", fixture.to_str().unwrap()]));
    assert!(svg.starts_with("<svg "));
    assert!(!svg.contains("<foreignObject"));
    assert!(!svg.contains("<style"));
    assert!(svg.contains("Christmas"));
}

#[test]
fn exports_png_next_to_input_by_default() {
    let fixture = repo_root().join("fixtures").join("svg").join("flowchart.svg");
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("chart.svg");
    fs::copy(&fixture, &input).expect("copy fixture");

    cli()
        .args(["export", "--format", "png", "--width", "300"])
        .arg(&input)
        .assert()
        .success();

    let bytes = fs::read(input.with_extension("png")).expect("read png");
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "output is not a PNG");
}

#[test]
fn exports_jpeg_to_explicit_path() {
    let fixture = repo_root().join("fixtures").join("svg").join("flowchart.svg");
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("out.jpg");

    cli()
        .args(["export", "--format", "jpg", "--background", "#fafafa", "--out"])
        .arg(&out)
        .arg(&fixture)
        .assert()
        .success();

    let bytes = fs::read(&out).expect("read jpg");
    assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));
}

#[test]
fn export_without_svg_exits_with_3() {
    cli()
        .args(["export", "-"])
        .write_stdin("<html><body/></html>")
        .assert()
        .code(3);
}
