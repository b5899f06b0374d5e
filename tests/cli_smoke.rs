use std::path::PathBuf;

fn vidsmith_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_vidsmith")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "vidsmith.exe"
            } else {
                "vidsmith"
            });
            p
        })
}

#[test]
fn cli_image_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let out_arg = dir.to_string_lossy().to_string();
    let status = std::process::Command::new(vidsmith_exe())
        .args([
            "image",
            "a small red house on a hill",
            "--offline",
            "--seed",
            "3",
            "--out-dir",
            out_arg.as_str(),
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let wrote_png = std::fs::read_dir(&dir).unwrap().any(|e| {
        let name = e.unwrap().file_name();
        let name = name.to_string_lossy();
        name.starts_with("generated_") && name.ends_with(".png")
    });
    assert!(wrote_png);
}

#[test]
fn cli_rejects_empty_prompt() {
    let status = std::process::Command::new(vidsmith_exe())
        .args(["image", "  ", "--offline"])
        .status()
        .unwrap();
    assert!(!status.success());
}
