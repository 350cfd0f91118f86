//! Command line tests against the built binary
//!
//! No font is needed: these cover argument handling and `--inspect`.

use std::path::PathBuf;
use std::process::{Command, Output};

fn dffont(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dffont"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run dffont")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dffont-cli-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_help() {
    let out = dffont(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("USAGE:"));
    assert!(stdout.contains("--spread=N"));
}

#[test]
fn test_version() {
    let out = dffont(&["--version"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        format!("dffont {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_rejects_bad_arguments() {
    for args in [
        &["font.ttf", "0", "256,256"][..],
        &["font.ttf", "32", "256"],
        &["font.ttf", "32", "256,256", "--scale=0"],
        &["font.ttf", "32", "256,256", "--padding=1,2"],
        &["font.ttf", "32", "256,256", "--bogus=1"],
        &["font.ttf", "32"],
    ] {
        let out = dffont(args);
        assert!(!out.status.success(), "{:?} should fail", args);
    }
}

#[test]
fn test_inspect_missing_files_fails() {
    let dir = scratch_dir("missing");
    let info = dir.join("nope_info");
    let image = dir.join("nope.png");
    let out = dffont(&["--inspect", info.to_str().unwrap(), image.to_str().unwrap()]);
    assert!(!out.status.success());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_inspect_valid_atlas() {
    let dir = scratch_dir("valid");
    let info = dir.join("atlas_info");
    let image = dir.join("atlas.png");

    std::fs::write(
        &info,
        "num_chars=2\nppem=16\nline_gap=1\n\
         char=33, x=0, y=0, w=4, h=10, xoff=1, yoff=-9, xadv=5, yadv=0\n\
         char=34, x=4, y=0, w=6, h=5, xoff=0, yoff=-9, xadv=6, yadv=0\n",
    )
    .unwrap();
    image::GrayImage::new(16, 16).save(&image).unwrap();

    let out = dffont(&["--inspect", info.to_str().unwrap(), image.to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("2 glyphs, ppem=16, line_gap=1"), "{}", stdout);
    assert!(stdout.contains("16x16"), "{}", stdout);
    assert!(stdout.contains("tallest glyph 10px"), "{}", stdout);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_inspect_rejects_glyph_outside_image() {
    let dir = scratch_dir("outside");
    let info = dir.join("atlas_info");
    let image = dir.join("atlas.png");

    std::fs::write(
        &info,
        "num_chars=1\nppem=16\nline_gap=0\n\
         char=33, x=12, y=0, w=8, h=10, xoff=0, yoff=-9, xadv=5, yadv=0\n",
    )
    .unwrap();
    image::GrayImage::new(16, 16).save(&image).unwrap();

    let out = dffont(&["--inspect", info.to_str().unwrap(), image.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("outside"));

    std::fs::remove_dir_all(&dir).unwrap();
}
