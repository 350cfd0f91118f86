//! Configuration file management
//!
//! Loads TOML configuration files and merges them with command line
//! overrides into validated [`Settings`].
//! Default config path: ~/.config/dffont/config.toml

pub mod args;

use crate::atlas::files::write_atomically;
use crate::atlas::{OverflowPolicy, Padding};
use crate::constants::{default_spread, DEFAULT_IMAGE_PATH, DEFAULT_INFO_PATH, DEFAULT_SCALE};
use crate::error::DfError;
use args::Overrides;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Application settings as read from the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Font settings
    pub font: FontConfig,
    /// Atlas layout settings
    pub atlas: AtlasConfig,
    /// Output path settings
    pub output: OutputConfig,
}

/// Font settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font file path (searches system fonts if empty)
    pub path: String,
}

/// Atlas layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Pixels per em each glyph is rendered at
    pub ppem: u32,
    /// Output image width
    pub width: u32,
    /// Output image height
    pub height: u32,
    /// Distance from the glyph edge the field reaches (default: ppem / 14, rounded up)
    pub spread: Option<u32>,
    /// Supersampling factor used when computing the field
    pub scale: u32,
    /// Padding between glyphs: [left, right, top, bottom]
    pub padding: [u32; 4],
    /// Glyph that does not fit: "stop" drops it and the rest, "skip" drops only it
    pub overflow: OverflowPolicy,
}

/// Output path settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Atlas image path
    pub image: String,
    /// Font info path
    pub info: String,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            ppem: 32,
            width: 512,
            height: 512,
            spread: None,
            scale: DEFAULT_SCALE,
            padding: [0; 4],
            overflow: OverflowPolicy::Stop,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE_PATH.to_string(),
            info: DEFAULT_INFO_PATH.to_string(),
        }
    }
}

impl Config {
    /// Load settings.
    ///
    /// An explicit path must load. Without one, the default path is tried
    /// and built-in defaults are used if it is missing or unreadable.
    pub fn load(explicit: Option<&Path>) -> Result<Self, DfError> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!("Loaded config: {}", path.display());
            return Ok(config);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => {
                        info!("Loaded config: {}", path.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!("Failed to load config {}: {}", path.display(), e);
                    }
                }
            }
        }
        info!("Using built-in default config");
        Ok(Self::default())
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self, DfError> {
        let content = std::fs::read_to_string(path).map_err(|e| DfError::io(path, e))?;
        Self::from_toml(&content)
            .map_err(|e| DfError::config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Commented template with every default filled in
    pub fn template() -> Result<String, DfError> {
        let body = toml::to_string_pretty(&Self::default())
            .map_err(|e| DfError::config(format!("failed to serialize config: {}", e)))?;
        Ok(format!(
            "# dffont configuration\n\
             #\n\
             # Command line arguments override every value here.\n\
             # [font] path: font file, empty searches DFFONT_FONT then system fonts\n\
             # [atlas] spread: defaults to ppem / 14 (rounded up) when absent\n\
             # [atlas] padding: [left, right, top, bottom]\n\
             # [atlas] overflow: \"stop\" or \"skip\"\n\n{}",
            body
        ))
    }

    /// Write the template to `path` (or the default config path)
    pub fn write_template(path: Option<&Path>) -> Result<PathBuf, DfError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()
                .ok_or_else(|| DfError::config("config directory not found"))?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DfError::io(parent, e))?;
        }
        let body = Self::template()?;
        write_atomically(&path, |out| out.write_all(body.as_bytes()))?;
        Ok(path)
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dffont").join("config.toml"))
}

/// Validated atlas parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasSettings {
    pub ppem: u32,
    pub width: u32,
    pub height: u32,
    pub spread: u32,
    pub scale: u32,
    pub padding: Padding,
    pub overflow: OverflowPolicy,
}

impl AtlasSettings {
    /// Rasterize size in working pixels
    pub fn render_px(&self) -> f32 {
        self.ppem.saturating_mul(self.scale) as f32
    }
}

/// Everything a generation run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Font file; `None` searches the system
    pub font: Option<PathBuf>,
    pub atlas: AtlasSettings,
    pub image_path: PathBuf,
    pub info_path: PathBuf,
}

impl Settings {
    /// Merge command line overrides over the config file and validate
    pub fn resolve(config: &Config, cli: &Overrides) -> Result<Self, DfError> {
        let ppem = cli.ppem.unwrap_or(config.atlas.ppem);
        let (width, height) = cli.size.unwrap_or((config.atlas.width, config.atlas.height));
        let scale = cli.scale.unwrap_or(config.atlas.scale);

        if ppem == 0 {
            return Err(DfError::config("ppem must be positive"));
        }
        if width == 0 || height == 0 {
            return Err(DfError::config(format!(
                "image size must be positive, got {}x{}",
                width, height
            )));
        }
        if scale == 0 {
            return Err(DfError::config("scale must be positive"));
        }

        let spread = cli
            .spread
            .or(config.atlas.spread)
            .unwrap_or_else(|| default_spread(ppem));

        // An em square plus spread on both sides, at working resolution
        let working = spread
            .checked_mul(2)
            .and_then(|pad| pad.checked_add(ppem))
            .and_then(|extent| extent.checked_mul(scale));
        if working.is_none() {
            return Err(DfError::config(format!(
                "ppem {} with spread {} at scale {} is too large",
                ppem, spread, scale
            )));
        }

        let font = cli.font.clone().or_else(|| {
            (!config.font.path.is_empty()).then(|| PathBuf::from(&config.font.path))
        });

        let image_path = cli
            .out_image
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.image));
        let info_path = cli
            .out_info
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.info));
        if image_path.as_os_str().is_empty() || info_path.as_os_str().is_empty() {
            return Err(DfError::config("output paths must not be empty"));
        }
        if image_path == info_path {
            return Err(DfError::config(format!(
                "image and font info would both be written to '{}'",
                image_path.display()
            )));
        }

        Ok(Self {
            font,
            atlas: AtlasSettings {
                ppem,
                width,
                height,
                spread,
                scale,
                padding: Padding::from_array(cli.padding.unwrap_or(config.atlas.padding)),
                overflow: cli.overflow.unwrap_or(config.atlas.overflow),
            },
            image_path,
            info_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&Config::default(), &Overrides::default()).unwrap();
        assert_eq!(settings.atlas.ppem, 32);
        assert_eq!(settings.atlas.spread, 3);
        assert_eq!(settings.atlas.scale, 5);
        assert_eq!(settings.atlas.padding, Padding::default());
        assert_eq!(settings.atlas.overflow, OverflowPolicy::Stop);
        assert_eq!(settings.image_path, PathBuf::from(DEFAULT_IMAGE_PATH));
        assert_eq!(settings.info_path, PathBuf::from(DEFAULT_INFO_PATH));
        assert_eq!(settings.font, None);
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::from_toml(
            r#"
            [font]
            path = "/fonts/a.ttf"

            [atlas]
            ppem = 48
            width = 1024
            height = 256
            padding = [1, 2, 3, 4]
            overflow = "skip"
            "#,
        )
        .unwrap();
        let settings = Settings::resolve(&config, &Overrides::default()).unwrap();
        assert_eq!(settings.font, Some(PathBuf::from("/fonts/a.ttf")));
        assert_eq!(settings.atlas.ppem, 48);
        assert_eq!((settings.atlas.width, settings.atlas.height), (1024, 256));
        assert_eq!(settings.atlas.spread, 4);
        assert_eq!(settings.atlas.padding, Padding::from_array([1, 2, 3, 4]));
        assert_eq!(settings.atlas.overflow, OverflowPolicy::Skip);
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = Config::from_toml("[atlas]\nppem = 48\nspread = 9\n").unwrap();
        let cli = Overrides {
            ppem: Some(20),
            spread: Some(1),
            size: Some((64, 32)),
            ..Default::default()
        };
        let settings = Settings::resolve(&config, &cli).unwrap();
        assert_eq!(settings.atlas.ppem, 20);
        assert_eq!(settings.atlas.spread, 1);
        assert_eq!((settings.atlas.width, settings.atlas.height), (64, 32));
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_toml("[atlas]\nppem = -4\n").is_err());
        assert!(Config::from_toml("[atlas]\npadding = [1, 2]\n").is_err());
        assert!(Config::from_toml("[atlas]\noverflow = \"wrap\"\n").is_err());

        let zero_scale = Config::from_toml("[atlas]\nscale = 0\n").unwrap();
        let err = Settings::resolve(&zero_scale, &Overrides::default()).unwrap_err();
        assert!(matches!(err, DfError::Config(_)));

        let zero_width = Config::from_toml("[atlas]\nwidth = 0\n").unwrap();
        assert!(Settings::resolve(&zero_width, &Overrides::default()).is_err());
    }

    #[test]
    fn test_huge_values_are_config_errors() {
        let huge_spread = match args::parse_args(
            ["font.ttf", "32", "64,64", "--spread=3000000000"]
                .iter()
                .map(|s| s.to_string()),
        )
        .unwrap()
        {
            args::Command::Generate(o) => o,
            other => panic!("expected Generate, got {:?}", other),
        };
        let err = Settings::resolve(&Config::default(), &huge_spread).unwrap_err();
        assert!(matches!(err, DfError::Config(_)));

        for cli in [
            Overrides {
                spread: Some(500_000_000),
                ..Default::default()
            },
            Overrides {
                ppem: Some(1_000_000_000),
                scale: Some(5),
                ..Default::default()
            },
            Overrides {
                scale: Some(u32::MAX),
                ..Default::default()
            },
        ] {
            let err = Settings::resolve(&Config::default(), &cli).unwrap_err();
            assert!(matches!(err, DfError::Config(_)), "{:?}", cli);
        }
    }

    #[test]
    fn test_same_output_paths_rejected() {
        let cli = Overrides {
            out_image: Some(PathBuf::from("out/atlas")),
            out_info: Some(PathBuf::from("out/atlas")),
            ..Default::default()
        };
        let err = Settings::resolve(&Config::default(), &cli).unwrap_err();
        assert!(matches!(err, DfError::Config(_)));
    }

    #[test]
    fn test_render_px() {
        let settings = Settings::resolve(&Config::default(), &Overrides::default()).unwrap();
        assert_eq!(settings.atlas.render_px(), 160.0);
    }

    #[test]
    fn test_template_parses_back() {
        let text = Config::template().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }

    #[test]
    fn test_write_template_loads_back() {
        let dir = std::env::temp_dir().join(format!("dffont_template_{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");
        assert_eq!(Config::write_template(Some(&path)).unwrap(), path);
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_explicit_config_must_load() {
        let err = Config::load(Some(Path::new("/nonexistent/dffont.toml"))).unwrap_err();
        assert!(matches!(err, DfError::Io { .. }));
    }
}
