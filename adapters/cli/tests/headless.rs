use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sum-ten"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to invoke the sum-ten binary")
}

fn layout_line(stdout: &str) -> &str {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("layout: "))
        .expect("summary prints the layout")
}

#[test]
fn headless_run_streams_json_events_and_summary() {
    let output = run(&["--seed", "3", "--moves", "5", "--frame-ms", "50", "--json"]);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains(r#""event":"session_started""#));
    assert!(stdout.contains("status: Running"));
    assert!(layout_line(&stdout).starts_with("sum:v1:5x5:"));
}

#[test]
fn printed_layout_restores_the_same_board() {
    let first = run(&["--seed", "8", "--moves", "0", "--difficulty", "hard"]);
    assert!(first.status.success(), "{first:?}");
    let first_stdout = String::from_utf8(first.stdout).expect("utf-8 output");
    let layout = layout_line(&first_stdout);
    assert!(layout.starts_with("sum:v1:6x6:"));

    let second = run(&["--layout", layout, "--moves", "0"]);
    assert!(second.status.success(), "{second:?}");
    let second_stdout = String::from_utf8(second.stdout).expect("utf-8 output");
    assert_eq!(layout_line(&second_stdout), layout);
}

#[test]
fn unknown_difficulty_is_refused() {
    let output = run(&["--difficulty", "brutal"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(stderr.contains("unknown difficulty"), "{stderr}");
}
