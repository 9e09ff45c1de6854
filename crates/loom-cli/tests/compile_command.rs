//! `loom compile` end to end through the built binary.

use std::process::Command;

const LESSON: &str = "Here is the lesson:\n```tsx\nfunction LessonComponent() {\n  return <Card><Text>Levers</Text></Card>;\n}\n```\n";

fn loom() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_loom"));
    cmd.env_remove("LOOM_LOG");
    cmd
}

#[test]
fn raw_format_prints_module_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lesson.txt");
    std::fs::write(&input, LESSON).unwrap();

    let out = loom()
        .args(["--format", "raw", "compile"])
        .arg(&input)
        .output()
        .unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("function LessonComponent()"), "{stdout}");
    assert!(stdout.contains(r#"React.createElement(Card, null, React.createElement(Text, null, "Levers"))"#));
}

#[test]
fn out_flag_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lesson.txt");
    let output = dir.path().join("lesson.js");
    std::fs::write(&input, LESSON).unwrap();

    let status = loom()
        .arg("compile")
        .arg(&input)
        .arg("--out")
        .arg(&output)
        .status()
        .unwrap();

    assert!(status.success());
    let code = std::fs::read_to_string(&output).unwrap();
    assert!(code.contains("React.createElement(Card"));
}

#[test]
fn stage_failure_exits_nonzero_with_stage_name() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.txt");
    std::fs::write(&input, "function LeverLesson() { return null; }").unwrap();

    let out = loom().arg("compile").arg(&input).output().unwrap();

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("normalize stage failed"), "{stderr}");
    assert!(stderr.contains("model did not generate LessonComponent"), "{stderr}");
}
