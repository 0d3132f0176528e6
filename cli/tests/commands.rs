use std::path::PathBuf;
use std::process::{Command, Output};

fn cli() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_jigsaw-cli"));
    command.env("RUST_LOG", "warn");
    command.env_remove("JIGSAW_RULES");
    command
}

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("jigsaw-cli-it-{}-{name}", std::process::id()))
}

fn run(command: &mut Command) -> String {
    let Output {
        status,
        stdout,
        stderr,
    } = command.output().expect("spawn cli");
    assert!(
        status.success(),
        "cli failed: {}",
        String::from_utf8_lossy(&stderr)
    );
    String::from_utf8(stdout).expect("utf8 stdout")
}

#[test]
fn new_solve_render_round_trip() {
    let save = scratch("puzzle.bin");
    let solved = scratch("solved.json");
    let picture = scratch("board.svg");

    let created = run(cli().args(["new", "--image-width", "900", "--image-height", "600"])
        .args(["--pieces", "24", "--seed", "0x2a", "--image-src", "photo.jpg"])
        .arg("--out")
        .arg(&save));
    assert!(created.contains("grid: 24 pieces (6x4)"), "{created}");

    let info = run(cli().arg("info").arg(&save));
    assert!(info.contains("locked: 0/24"), "{info}");
    assert!(info.contains("image_src: photo.jpg"), "{info}");

    let report = run(cli()
        .args(["bot", "solve", "--seed", "3"])
        .arg(&save)
        .arg("--out")
        .arg(&solved));
    assert!(report.contains("completed 24 pieces"), "{report}");

    let info = run(cli().arg("info").arg(&solved));
    assert!(info.contains("locked: 24/24"), "{info}");

    run(cli().arg("render").arg(&solved).arg("--guide").arg("--out").arg(&picture));
    let svg = std::fs::read_to_string(&picture).expect("svg");
    assert_eq!(svg.matches("<clipPath").count(), 24);
    assert!(svg.contains("href=\"photo.jpg\""));

    for path in [save, solved, picture] {
        let _ = std::fs::remove_file(path);
    }
}

#[test]
fn levels_lists_the_difficulty_menu() {
    let out = run(cli().args(["levels", "--image-width", "1600", "--image-height", "1200"]));
    assert_eq!(out.lines().count(), 5);
    assert!(out.lines().next().is_some_and(|line| line.starts_with("12 pieces")), "{out}");
}

#[test]
fn corrupt_save_is_rejected() {
    let save = scratch("broken.json");
    std::fs::write(&save, "{\"pieces\": []}").expect("write");
    let output = cli().arg("info").arg(&save).output().expect("spawn cli");
    let _ = std::fs::remove_file(&save);
    assert!(!output.status.success());
}
