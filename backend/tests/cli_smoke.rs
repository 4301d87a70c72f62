use std::process::Command;

#[test]
fn help_displays_overview() {
    let binary = env!("CARGO_BIN_EXE_tf2-stats");
    let output = Command::new(binary)
        .arg("--help")
        .output()
        .expect("invoke tf2-stats --help");

    assert!(output.status.success(), "help command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("TF2 currency price API and terminal charts"),
        "expected overview text in help output"
    );
    assert!(stdout.contains("chart"), "expected chart subcommand listed");
}
