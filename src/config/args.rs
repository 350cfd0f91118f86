//! Command line parsing
//!
//! ```text
//! dffont <font> <ppem> <width,height> [OPTIONS]
//! ```
//!
//! Positionals may be omitted entirely when the config file provides them.

use crate::atlas::OverflowPolicy;
use crate::error::DfError;
use std::path::PathBuf;

/// Values given on the command line; each one overrides the config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub font: Option<PathBuf>,
    pub ppem: Option<u32>,
    pub size: Option<(u32, u32)>,
    pub spread: Option<u32>,
    pub scale: Option<u32>,
    pub padding: Option<[u32; 4]>,
    pub out_image: Option<PathBuf>,
    pub out_info: Option<PathBuf>,
    pub overflow: Option<OverflowPolicy>,
    pub config: Option<PathBuf>,
}

/// What the invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    /// Write a template config file
    InitConfig(Option<PathBuf>),
    /// Check a generated atlas against its font info
    Inspect { info: PathBuf, image: PathBuf },
    Generate(Overrides),
}

fn parse_int(input: &str, nonzero: bool) -> Option<u32> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = input.parse::<u32>().ok()?;
    (!nonzero || value > 0).then_some(value)
}

fn parse_int_list<const N: usize>(input: &str, nonzero: bool) -> Option<[u32; N]> {
    let parts: Vec<&str> = input.split(',').collect();
    if parts.len() != N {
        return None;
    }
    let mut values = [0u32; N];
    for (value, part) in values.iter_mut().zip(parts) {
        *value = parse_int(part, nonzero)?;
    }
    Some(values)
}

fn option_value<'a>(arg: &'a str, name: &str) -> Result<&'a str, DfError> {
    match arg.split_once('=') {
        Some((_, value)) => Ok(value),
        None => Err(DfError::config(format!(
            "option '{}' was not assigned a value",
            name
        ))),
    }
}

/// Parse arguments (without the program name)
pub fn parse_args<I>(args: I) -> Result<Command, DfError>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();

    match args.as_slice() {
        [] => return Ok(Command::Help),
        [only] if only == "--help" || only == "-h" => return Ok(Command::Help),
        [only] if only == "--version" || only == "-V" => return Ok(Command::Version),
        _ => {}
    }

    if args.iter().any(|a| a == "-h" || a.starts_with("--help")) {
        return Err(DfError::config(
            "use of '--help' is not valid in this context",
        ));
    }

    if args[0] == "--inspect" {
        return match &args[1..] {
            [info, image] => Ok(Command::Inspect {
                info: PathBuf::from(info),
                image: PathBuf::from(image),
            }),
            _ => Err(DfError::config("usage: dffont --inspect <info> <image>")),
        };
    }

    if args[0].starts_with("--init-config") {
        if args.len() != 1 {
            return Err(DfError::config("--init-config takes no other arguments"));
        }
        let path = args[0]
            .split_once('=')
            .map(|(_, p)| PathBuf::from(p))
            .filter(|p| !p.as_os_str().is_empty());
        return Ok(Command::InitConfig(path));
    }

    let mut overrides = Overrides::default();
    let mut positionals = Vec::new();

    for arg in &args {
        if !arg.starts_with("--") {
            positionals.push(arg.as_str());
            continue;
        }

        let name = arg.split('=').next().unwrap_or(arg);
        match name {
            "--spread" => {
                let value = option_value(arg, name)?;
                overrides.spread = Some(parse_int(value, false).ok_or_else(|| {
                    DfError::config(format!("'{}': invalid value for spread", value))
                })?);
            }
            "--scale" => {
                let value = option_value(arg, name)?;
                overrides.scale = Some(parse_int(value, true).ok_or_else(|| {
                    DfError::config(format!("'{}': invalid value for scale", value))
                })?);
            }
            "--padding" => {
                let value = option_value(arg, name)?;
                overrides.padding = Some(parse_int_list::<4>(value, false).ok_or_else(|| {
                    DfError::config(format!("'{}': invalid value for padding", value))
                })?);
            }
            "--overflow" => {
                let value = option_value(arg, name)?;
                overrides.overflow = Some(value.parse().map_err(DfError::Config)?);
            }
            "--out-image" => {
                overrides.out_image = Some(PathBuf::from(option_value(arg, name)?));
            }
            "--out-font" => {
                overrides.out_info = Some(PathBuf::from(option_value(arg, name)?));
            }
            "--config" => {
                overrides.config = Some(PathBuf::from(option_value(arg, name)?));
            }
            _ => {
                return Err(DfError::config(format!("'{}': unknown option", name)));
            }
        }
    }

    match positionals.as_slice() {
        [] => {}
        [font, ppem, size] => {
            overrides.font = Some(PathBuf::from(font));
            overrides.ppem = Some(
                parse_int(ppem, true)
                    .ok_or_else(|| DfError::config(format!("'{}': invalid glyph size", ppem)))?,
            );
            let [w, h] = parse_int_list::<2>(size, true)
                .ok_or_else(|| DfError::config(format!("'{}': invalid image size", size)))?;
            overrides.size = Some((w, h));
        }
        _ => {
            return Err(DfError::config(
                "invalid arguments: use --help for more information",
            ));
        }
    }

    Ok(Command::Generate(overrides))
}
