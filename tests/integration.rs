use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn flatconf_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_flatconf"));
    cmd.current_dir(dir.path());
    cmd
}

fn run_with_stdin(cmd: &mut Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn run_silent(cmd: &mut Command) -> Output {
    cmd.stdin(Stdio::null()).output().unwrap()
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_ini_print_sink() {
    let dir = TempDir::new().unwrap();
    let conf = write_file(&dir, "app.conf", "[db]\nhost = localhost\n[web]\nport = 80\n");

    let output = run_silent(flatconf_cmd(&dir).arg(&conf).args(["--sink", "1"]));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("db_host = localhost"));
    assert!(stdout.contains("web_port = 80"));
}

#[test]
fn test_yaml_print_sink_flattens_nested() {
    let dir = TempDir::new().unwrap();
    let yaml = write_file(
        &dir,
        "app.yaml",
        "db:\n  host: localhost\n  opts:\n    pool: 5\nlist: [1, 2, 3]\n",
    );

    let output = run_silent(flatconf_cmd(&dir).arg(&yaml).args(["--sink", "1"]));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("db_host = localhost"));
    assert!(stdout.contains("db_opts_pool = 5"));
    // Scalars in a sequence share one key; the last element wins.
    assert!(stdout.contains("list = 3"));
    assert!(!stdout.contains("list = 1"));
}

#[test]
fn test_ini_without_sections_uses_default_namespace() {
    let dir = TempDir::new().unwrap();
    let conf = write_file(&dir, "plain.conf", "x=1\n#comment\ny=2\n");

    let output = run_silent(flatconf_cmd(&dir).arg(&conf).args(["--sink", "1"]));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("default_x = 1"));
    assert!(stdout.contains("default_y = 2"));
    assert!(!stdout.contains("comment"));
}

#[test]
fn test_fallback_malformed_line_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let conf = write_file(&dir, "plain.conf", "x=1\nnoequalsign\n");

    let output = run_silent(flatconf_cmd(&dir).arg(&conf).args(["--sink", "1"]));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed line 2"));
}

#[test]
fn test_unsupported_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let txt = write_file(&dir, "notes.txt", "not a config");

    let output = run_silent(flatconf_cmd(&dir).arg(&txt).args(["--sink", "1"]));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a supported config file type"));
}

#[test]
fn test_missing_file_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.yaml");

    let output = run_silent(
        flatconf_cmd(&dir)
            .arg(absent.to_str().unwrap())
            .args(["--sink", "1"]),
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_env_export_updates_key_in_place() {
    let dir = TempDir::new().unwrap();
    let first = write_file(&dir, "one.conf", "[s]\na = 1\n");
    let second = write_file(&dir, "two.conf", "[s]\na = 2\n");
    let env_file = dir.path().join("vars.env");
    let env_arg = env_file.to_str().unwrap().to_string();

    let output = run_silent(
        flatconf_cmd(&dir)
            .arg(&first)
            .args(["--sink", "2", "--output", &env_arg]),
    );
    assert!(output.status.success());
    let output = run_silent(
        flatconf_cmd(&dir)
            .arg(&second)
            .args(["--sink", "2", "--output", &env_arg]),
    );
    assert!(output.status.success());

    let content = fs::read_to_string(&env_file).unwrap();
    assert_eq!(content, "s_a=2\n");
}

#[test]
fn test_env_export_default_path_on_empty_answer() {
    let dir = TempDir::new().unwrap();
    let conf = write_file(&dir, "app.conf", "[s]\nk = v\n");

    // Sink chosen by flag; the empty line answers the output-path prompt.
    let output = run_with_stdin(flatconf_cmd(&dir).arg(&conf).args(["--sink", "2"]), "\n");

    assert!(output.status.success());
    let content = fs::read_to_string(dir.path().join(".env")).unwrap();
    assert_eq!(content, "s_k=v\n");
}

#[test]
fn test_json_export_creates_default_file() {
    let dir = TempDir::new().unwrap();
    let conf = write_file(&dir, "app.conf", "[db]\nhost = localhost\n");

    let output = run_with_stdin(flatconf_cmd(&dir).arg(&conf).args(["--sink", "3"]), "\n");

    assert!(output.status.success());
    let content = fs::read_to_string(dir.path().join("result.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["app.conf"]["db_host"], "localhost");
}

#[test]
fn test_json_export_merges_into_existing_file() {
    let dir = TempDir::new().unwrap();
    let conf = write_file(&dir, "cfgA.conf", "[s]\nx = 1\n");
    let target = write_file(&dir, "result.json", r#"{"cfgB.ini":{"y":"2"}}"#);

    let output = run_silent(
        flatconf_cmd(&dir)
            .arg(&conf)
            .args(["--sink", "3", "--output", &target]),
    );

    assert!(output.status.success());
    let content = fs::read_to_string(Path::new(&target)).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["cfgA.conf"]["s_x"], "1");
    assert_eq!(doc["cfgB.ini"]["y"], "2");
}

#[test]
fn test_fully_interactive_run() {
    let dir = TempDir::new().unwrap();
    let yaml = write_file(&dir, "app.yaml", "top: value\n");

    let output = run_with_stdin(&mut flatconf_cmd(&dir), &format!("{yaml}\n1\n"));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("top = value"));
}

#[test]
fn test_invalid_choice_recoverable_no_export() {
    let dir = TempDir::new().unwrap();
    let conf = write_file(&dir, "app.conf", "[s]\nk = v\n");

    let output = run_silent(flatconf_cmd(&dir).arg(&conf).args(["--sink", "7"]));

    // Reported and swallowed: normal exit, nothing exported.
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Invalid choice"));
    assert!(!dir.path().join("result.json").exists());
    assert!(!dir.path().join(".env").exists());
}

#[test]
fn test_log_file_written() {
    let dir = TempDir::new().unwrap();
    let conf = write_file(&dir, "app.conf", "[s]\nk = v\n");

    let output = run_silent(flatconf_cmd(&dir).arg(&conf).args(["--sink", "1"]));

    assert!(output.status.success());
    let log = fs::read_to_string(dir.path().join("flatconf.log")).unwrap();
    assert!(log.contains("reading config file"));
}

#[test]
fn test_interpolation_end_to_end() {
    let dir = TempDir::new().unwrap();
    let conf = write_file(
        &dir,
        "app.ini",
        "[paths]\nhome = /srv/app\nlogs = ${home}/logs\n[web]\nroot = ${paths:home}/www\n",
    );

    let output = run_silent(flatconf_cmd(&dir).arg(&conf).args(["--sink", "1"]));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("paths_logs = /srv/app/logs"));
    assert!(stdout.contains("web_root = /srv/app/www"));
}
