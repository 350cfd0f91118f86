//! dffont - distance field glyph atlas generator
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │        Config (TOML + command line)      │
//! ├──────────────────────────────────────────┤
//! │  Rasterizer (fontdue) → binary mask      │
//! │                          ↓               │
//! │  Distance transform → dual-field encode  │
//! │                          ↓               │
//! │  Downsample → shelf packing              │
//! │                          ↓               │
//! │  Atlas PNG + font info                   │
//! └──────────────────────────────────────────┘
//! ```

mod atlas;
mod config;
mod constants;
mod df;
mod error;
mod font;
mod pipeline;

use anyhow::{bail, Context, Result};
use atlas::metadata::FontInfo;
use config::args::{parse_args, Command, Overrides};
use config::{Config, Settings};
use font::FontdueRasterizer;
use log::info;
use std::path::Path;

/// Print help message
fn print_help() {
    println!(
        r#"dffont {} - distance field glyph atlas generator

USAGE:
    dffont <path-to-ttf> <glyph-size> <width,height> [OPTIONS]
    dffont --config=<path> [OPTIONS]
    dffont --inspect <info> <image>

ARGS:
    <path-to-ttf>           A path to a TTF file
    <glyph-size>            The ppem that each glyph will be rendered at
    <width,height>          The width and height of the output image

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --spread=N              How far from the edge of a glyph the distance field reaches
                            (default: glyph-size / 14, rounded up)
    --scale=N               Compute fields on glyphs N times larger than glyph-size;
                            larger is more accurate but slower (default: 5)
    --padding=L,R,T,B       Padding between glyphs (default: 0,0,0,0)
    --overflow=stop|skip    On a glyph that does not fit: stop (default) drops it and
                            every glyph after it, skip drops only that glyph
    --out-image=PATH        Output image path (default: ./dffont_image.png)
    --out-font=PATH         Output font info path (default: ./dffont_info)
    --config=PATH           Config file (default: ~/.config/dffont/config.toml)
    --init-config[=PATH]    Write a config file template
    --inspect INFO IMAGE    Check a generated atlas and print a summary

ENVIRONMENT:
    DFFONT_FONT             Font used when no font path is given
    RUST_LOG                Log filter (default: info)"#,
        env!("CARGO_PKG_VERSION")
    );
}

fn generate(overrides: Overrides) -> Result<()> {
    let cfg = Config::load(overrides.config.as_deref())?;
    let settings = Settings::resolve(&cfg, &overrides)?;
    let a = &settings.atlas;

    info!(
        "ppem={} spread={} scale={} atlas={}x{} padding={:?}",
        a.ppem,
        a.spread,
        a.scale,
        a.width,
        a.height,
        a.padding.to_array()
    );

    let (font_data, font_path) = font::load_font(settings.font.as_deref())?;
    let rasterizer = FontdueRasterizer::new(&font_data, a.render_px())
        .with_context(|| format!("'{}'", font_path.display()))?;

    let build = pipeline::build_atlas(&rasterizer, a)?;

    // Nothing is written until the whole atlas is built
    atlas::files::save_atlas(
        &settings.image_path,
        &build.canvas,
        &settings.info_path,
        &build.info,
    )?;

    if !build.skipped.is_empty() {
        let chars: String = build.skipped.iter().collect();
        eprintln!("warning: {} glyphs missing from font: {}", build.skipped.len(), chars);
    }
    if build.dropped > 0 {
        eprintln!(
            "warning: {} glyphs did not fit into the {}x{} image",
            build.dropped, a.width, a.height
        );
    }
    Ok(())
}

fn inspect(info_path: &Path, image_path: &Path) -> Result<()> {
    let font_info = FontInfo::load(info_path)?;
    let image = atlas::files::load_png(image_path)?;

    for g in &font_info.glyphs {
        if !g.rect.fits_within(image.width, image.height) {
            bail!(
                "glyph {} at ({}, {}) {}x{} lies outside the {}x{} image",
                g.codepoint,
                g.rect.x,
                g.rect.y,
                g.rect.w,
                g.rect.h,
                image.width,
                image.height
            );
        }
    }

    let used: u64 = font_info
        .glyphs
        .iter()
        .map(|g| g.rect.w as u64 * g.rect.h as u64)
        .sum();
    let total = image.width as u64 * image.height as u64;
    let tallest = font_info.glyphs.iter().map(|g| g.rect.h).max().unwrap_or(0);

    println!(
        "{}: {} glyphs, ppem={}, line_gap={}",
        info_path.display(),
        font_info.glyphs.len(),
        font_info.ppem,
        font_info.line_gap
    );
    println!(
        "{}: {}x{}, {:.1}% covered by glyphs, tallest glyph {}px",
        image_path.display(),
        image.width,
        image.height,
        if total > 0 { used as f64 * 100.0 / total as f64 } else { 0.0 },
        tallest
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let command = parse_args(std::env::args().skip(1)).context("use --help for more information")?;

    match command {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            println!("dffont {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::InitConfig(path) => {
            let path = Config::write_template(path.as_deref())?;
            println!("Config file generated: {}", path.display());
            Ok(())
        }
        Command::Inspect { info, image } => inspect(&info, &image),
        Command::Generate(overrides) => generate(overrides),
    }
}
