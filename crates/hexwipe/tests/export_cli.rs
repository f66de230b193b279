use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

fn write_solid(dir: &Path, name: &str, color: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(16, 16, Rgba(color))
        .save(&path)
        .expect("write source image");
    path
}

fn hexwipe(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hexwipe"))
        .args(args)
        .current_dir(dir.path())
        // Keep the user's own scene file out of the way.
        .env("HEXWIPE_CONFIG_DIR", dir.path().join("config"))
        .env("RUST_LOG", "warn")
        .output()
        .expect("spawn hexwipe")
}

#[test]
fn exports_a_still_frame_at_the_requested_size() {
    let dir = TempDir::new().unwrap();
    write_solid(dir.path(), "from.png", [200, 20, 20, 255]);
    write_solid(dir.path(), "to.png", [20, 20, 200, 255]);

    let output = hexwipe(
        &dir,
        &[
            "--from", "from.png", "--to", "to.png", "--export", "out.png", "--size", "64x32",
            "--progress", "0.5",
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let frame = image::open(dir.path().join("out.png")).unwrap().to_rgba8();
    assert_eq!(frame.dimensions(), (64, 32));
}

#[test]
fn scene_file_drives_the_export() {
    let dir = TempDir::new().unwrap();
    let scenes = dir.path().join("scenes");
    std::fs::create_dir_all(&scenes).unwrap();
    write_solid(&scenes, "a.png", [255, 0, 0, 255]);
    write_solid(&scenes, "b.png", [0, 255, 0, 255]);
    std::fs::write(
        scenes.join("wipe.toml"),
        "version = 1\n\
         [sources]\nfrom = \"a.png\"\nto = \"b.png\"\n\
         [window]\nsize = \"24x24\"\n\
         [transition]\nprogress = 1.0\n",
    )
    .unwrap();

    let output = hexwipe(
        &dir,
        &["--config", "scenes/wipe.toml", "--export", "done.png"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let frame = image::open(dir.path().join("done.png")).unwrap().to_rgba8();
    assert_eq!(frame.dimensions(), (24, 24));
    assert!(frame.pixels().all(|pixel| pixel.0 == [0, 255, 0, 255]));
}

#[test]
fn missing_sources_fail_before_rendering() {
    let dir = TempDir::new().unwrap();
    let output = hexwipe(&dir, &["--export", "never.png"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--from"));
    assert!(!dir.path().join("never.png").exists());
}

#[test]
fn paths_subcommand_reports_the_override() {
    let dir = TempDir::new().unwrap();
    let output = hexwipe(&dir, &["paths"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hexwipe.toml"), "{stdout}");
    assert!(stdout.contains("(missing)"), "{stdout}");
}
