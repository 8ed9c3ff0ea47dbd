use std::{fs, process::Command};

fn lane_battle() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lane-battle"))
}

#[test]
fn built_in_battle_prints_summary() {
    let output = lane_battle()
        .args(["--max-ticks", "400"])
        .output()
        .expect("runner starts");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.starts_with("winner: "), "{stdout}");
    assert!(stdout.contains("player: base"));
    assert!(stdout.contains("ai: base"));
}

#[test]
fn json_format_streams_events_then_final_state() {
    let output = lane_battle()
        .args(["--max-ticks", "50", "--format", "json"])
        .output()
        .expect("runner starts");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("every line is json"))
        .collect();

    let last = lines.last().expect("final line");
    assert_eq!(last["type"], "FINAL");
    assert!(last["ticks"].as_u64().expect("ticks") <= 50);
    assert!(lines.iter().any(|line| line["type"] == "SPAWN"));
}

#[test]
fn logs_default_to_info_on_stderr() {
    let output = lane_battle()
        .env_remove("RUST_LOG")
        .args(["--max-ticks", "5"])
        .output()
        .expect("runner starts");

    assert!(output.status.success(), "{output:?}");
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("template ready"), "{stderr}");
    assert!(!stderr.contains("tick resolved"), "{stderr}");
}

#[test]
fn rust_log_enables_tick_level_logs() {
    let output = lane_battle()
        .env("RUST_LOG", "debug")
        .args(["--max-ticks", "5"])
        .output()
        .expect("runner starts");

    assert!(output.status.success(), "{output:?}");
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("tick resolved"), "{stderr}");
    assert!(!String::from_utf8(output.stdout).expect("utf8").contains("tick resolved"));
}

#[test]
fn missing_battle_file_fails_with_context() {
    let output = lane_battle()
        .args(["--battle", "/definitely/not/here.toml"])
        .output()
        .expect("runner starts");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("failed to read battle file"), "{stderr}");
}

#[test]
fn custom_battle_file_is_used() {
    let dir = std::env::temp_dir().join(format!("lane-battle-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("battle.toml");

    let mut contents = String::from(concat!(
        "[match]\ninitial_base_hp = 1\n\n",
        "[decks]\nplayer = [1, 2, 3, 4, 5]\nai = [6, 7, 8, 9, 10]\n",
    ));
    for id in 1..=10 {
        // Player runners kill a fodder unit in one hit; fodder barely moves.
        let (hp, attack, speed, interval) = if id <= 5 {
            (10.0, 6.0, 2.0, 2.0)
        } else {
            (5.0, 1.0, 0.2, 5.0)
        };
        contents.push_str(&format!(
            "\n[[templates]]\nid = {id}\nname = \"unit {id}\"\nmax_hp = {hp:.1}\n\
             attack = {attack:.1}\nspeed = {speed:.1}\nrange = 1.0\n\
             attack_interval = {interval:.1}\n"
        ));
    }
    fs::write(&path, contents).expect("battle written");

    let output = lane_battle()
        .arg("--battle")
        .arg(&path)
        .output()
        .expect("runner starts");
    let _ = fs::remove_dir_all(&dir);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.starts_with("winner: player"), "{stdout}");
}
