use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inkmargin_core::{
    decode_page, layout, Anchor, DecodedPage, EngineConfig, MarginSettings, Rotation, Size,
};
use inkmargin_storage::read_sidecar_file;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "inkmargin")]
#[command(about = "Inkmargin annotation geometry tools")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute where a page sits inside its drawing surface.
    Frame {
        /// Un-rotated page width in points
        #[arg(long)]
        width: f32,
        /// Un-rotated page height in points
        #[arg(long)]
        height: f32,
        /// Page rotation in degrees (multiple of 90)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        rotation: i32,
        /// Anchor on the 3x3 grid (e.g. top-left, center); enables margins
        #[arg(long)]
        anchor: Option<String>,
        /// Page scale in (0, 1]; enables margins
        #[arg(long)]
        scale: Option<f32>,
        /// Surface size as a multiple of the page size
        #[arg(long)]
        expansion_factor: Option<f32>,
    },
    /// Summarize the strokes stored in a sidecar file.
    Inspect {
        #[arg(value_name = "SIDECAR")]
        file: PathBuf,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct SizeOutput {
    width: f32,
    height: f32,
}

#[derive(Debug, Serialize)]
struct RectOutput {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

#[derive(Debug, Serialize)]
struct FrameOutput {
    rotation: u16,
    margins_enabled: bool,
    true_size: SizeOutput,
    surface: SizeOutput,
    page: RectOutput,
}

#[derive(Debug, Serialize)]
struct InspectOutput {
    path: String,
    version: u32,
    page_count: usize,
    pages: Vec<PageSummary>,
}

#[derive(Debug, Serialize)]
struct PageSummary {
    index: usize,
    format: &'static str,
    page_anchored: usize,
    margin_anchored: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Frame { width, height, rotation, anchor, scale, expansion_factor } => {
            run_frame(width, height, rotation, anchor.as_deref(), scale, expansion_factor)
        }
        Commands::Inspect { file } => run_inspect(&file),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_frame(
    width: f32,
    height: f32,
    rotation: i32,
    anchor: Option<&str>,
    scale: Option<f32>,
    expansion_factor: Option<f32>,
) -> Result<()> {
    let page_size = Size::new(width, height);
    if !page_size.has_area() {
        anyhow::bail!("page size must be positive, got {width}x{height}");
    }

    let rotation = Rotation::from_degrees(rotation)?;

    let mut config = EngineConfig::from_env();
    if let Some(factor) = expansion_factor {
        config = config.with_expansion_factor(factor);
    }
    config.validate()?;

    let margin = if anchor.is_some() || scale.is_some() {
        let anchor = match anchor {
            Some(name) => {
                Anchor::from_name(name).with_context(|| format!("unknown anchor: {name}"))?
            }
            None => Anchor::Center,
        };
        MarginSettings::new(anchor, scale.unwrap_or(1.0))?
    } else {
        MarginSettings::disabled()
    };

    let frame = layout::resolve(page_size, rotation, &margin, config.expansion_factor);
    let true_size = layout::true_size(page_size, rotation);

    let payload = FrameOutput {
        rotation: rotation.degrees(),
        margins_enabled: margin.enabled,
        true_size: SizeOutput { width: true_size.width, height: true_size.height },
        surface: SizeOutput { width: frame.surface.width, height: frame.surface.height },
        page: RectOutput {
            x: frame.rect.x,
            y: frame.rect.y,
            width: frame.rect.width,
            height: frame.rect.height,
        },
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_inspect(file: &Path) -> Result<()> {
    ensure_file_exists(file)?;

    let sidecar = read_sidecar_file(file).context("failed to read sidecar")?;

    let pages = sidecar
        .pages
        .keys()
        .map(|&index| summarize_page(&sidecar, index))
        .collect();

    let payload = InspectOutput {
        path: file.display().to_string(),
        version: sidecar.version,
        page_count: sidecar.page_count,
        pages,
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn summarize_page(sidecar: &inkmargin_storage::Sidecar, index: usize) -> PageSummary {
    let decoded = sidecar
        .page_blob(index)
        .map_err(|err| err.to_string())
        .and_then(|blob| decode_page(&blob.unwrap_or_default()).map_err(|err| err.to_string()));

    match decoded {
        Ok(DecodedPage::Current(set)) => PageSummary {
            index,
            format: "current",
            page_anchored: set.page_anchored.len(),
            margin_anchored: set.margin_anchored.len(),
            error: None,
        },
        Ok(DecodedPage::Legacy(strokes)) => PageSummary {
            index,
            format: "legacy",
            page_anchored: strokes.len(),
            margin_anchored: 0,
            error: None,
        },
        Err(error) => {
            log::warn!("page {index}: {error}");
            PageSummary {
                index,
                format: "undecodable",
                page_anchored: 0,
                margin_anchored: 0,
                error: Some(error),
            }
        }
    }
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
