use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use repix::{
    CropMode, ExtendMode, FillColor, Format, PipelineOptions, ResizeMode, convert, decode_file,
    optimize_file, output_path,
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "repix")]
#[command(version)]
#[command(about = "Convert, optimize, and transform images")]
#[command(long_about = "\
Convert, optimize, and transform images

Supported formats: jpg, png, webp, avif, jxl, qoi. The input format is
detected from magic bytes, so a mislabeled .png that is really a JPEG
still decodes correctly.

Transforms always apply in a fixed order: crop, then resize, then extend.

  repix convert photo.jpg --to webp --quality 75
  repix convert photo.png --to avif --fit 1600x1600
  repix optimize gallery/ --recursive --quality 70
  repix crop photo.jpg --aspect 16:9
  repix extend logo.png --size 512x512 --color #ffffff")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Flags shared by every command.
#[derive(Args, Clone)]
struct CommonArgs {
    /// Input file, or a directory with --recursive
    input: PathBuf,

    /// Encoding quality, 0-100
    #[arg(short, long, default_value_t = 80)]
    quality: u8,

    /// Output file or directory (default: next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Process every supported image under a directory
    #[arg(short, long)]
    recursive: bool,
}

#[derive(Args, Clone)]
#[group(multiple = false)]
struct CropArgs {
    /// Crop to an aspect ratio, centered (e.g. 16:9)
    #[arg(long, value_name = "W:H", value_parser = parse_ratio)]
    crop_aspect: Option<(u32, u32)>,

    /// Crop an exact region (e.g. 10,20,640x480)
    #[arg(long, value_name = "X,Y,WxH", value_parser = parse_region)]
    crop_region: Option<(u32, u32, u32, u32)>,
}

#[derive(Args, Clone)]
#[group(multiple = false)]
struct ResizeArgs {
    /// Resize to a width, keeping the aspect ratio
    #[arg(long)]
    width: Option<u32>,

    /// Resize to a height, keeping the aspect ratio
    #[arg(long)]
    height: Option<u32>,

    /// Resize to exact dimensions, ignoring the aspect ratio (e.g. 640x480)
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    exact: Option<(u32, u32)>,

    /// Shrink to fit within a bounding box, never upscaling (e.g. 1600x1600)
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    fit: Option<(u32, u32)>,

    /// Resize by a factor (e.g. 0.5)
    #[arg(long)]
    scale: Option<f64>,
}

#[derive(Args, Clone)]
#[group(multiple = false)]
struct ExtendArgs {
    /// Pad out to an aspect ratio, centered (e.g. 1:1)
    #[arg(long, value_name = "W:H", value_parser = parse_ratio)]
    pad_aspect: Option<(u32, u32)>,

    /// Pad out to an exact canvas size, centered (e.g. 1000x1000)
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pad_size: Option<(u32, u32)>,
}

#[derive(Args, Clone)]
struct FillArg {
    /// Fill color for padded pixels: "transparent", #RRGGBB, or #RRGGBBAA
    #[arg(long, default_value = "transparent", value_parser = parse_fill)]
    fill: FillColor,
}

#[derive(Subcommand)]
enum Command {
    /// Convert to another format, optionally transforming on the way
    Convert {
        #[command(flatten)]
        common: CommonArgs,

        /// Target format
        #[arg(long, value_name = "FORMAT")]
        to: Format,

        #[command(flatten)]
        crop: CropArgs,

        #[command(flatten)]
        resize: ResizeArgs,

        #[command(flatten)]
        extend: ExtendArgs,

        #[command(flatten)]
        fill: FillArg,
    },
    /// Re-encode in the same format at a new quality
    Optimize {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Crop to a region or aspect ratio
    Crop {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        crop: CropArgs,
    },
    /// Resize by width, height, exact size, bounding box, or scale factor
    Resize {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        resize: ResizeArgs,
    },
    /// Pad out to a larger canvas or aspect ratio
    Extend {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        extend: ExtendArgs,

        #[command(flatten)]
        fill: FillArg,
    },
}

fn parse_ratio(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(':')
        .ok_or_else(|| format!("expected W:H, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    if w == 0 || h == 0 {
        return Err("ratio terms must be non-zero".to_string());
    }
    Ok((w, h))
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    Ok((w, h))
}

fn parse_region(s: &str) -> Result<(u32, u32, u32, u32), String> {
    let mut parts = s.splitn(3, ',');
    let x = parts.next().unwrap_or_default();
    let y = parts
        .next()
        .ok_or_else(|| format!("expected X,Y,WxH, got '{s}'"))?;
    let size = parts
        .next()
        .ok_or_else(|| format!("expected X,Y,WxH, got '{s}'"))?;
    let x: u32 = x.trim().parse().map_err(|_| format!("bad x '{x}'"))?;
    let y: u32 = y.trim().parse().map_err(|_| format!("bad y '{y}'"))?;
    let (w, h) = parse_size(size)?;
    Ok((x, y, w, h))
}

fn parse_fill(s: &str) -> Result<FillColor, String> {
    FillColor::parse(s).map_err(|e| e.to_string())
}

impl CropArgs {
    fn mode(&self) -> Option<CropMode> {
        if let Some((x, y, width, height)) = self.crop_region {
            Some(CropMode::Region {
                x,
                y,
                width,
                height,
            })
        } else {
            self.crop_aspect
                .map(|(width, height)| CropMode::AspectRatio { width, height })
        }
    }
}

impl ResizeArgs {
    fn mode(&self) -> Option<ResizeMode> {
        if let Some(w) = self.width {
            Some(ResizeMode::Width(w))
        } else if let Some(h) = self.height {
            Some(ResizeMode::Height(h))
        } else if let Some((w, h)) = self.exact {
            Some(ResizeMode::Exact(w, h))
        } else if let Some((w, h)) = self.fit {
            Some(ResizeMode::Fit(w, h))
        } else {
            self.scale.map(ResizeMode::Scale)
        }
    }
}

impl ExtendArgs {
    fn mode(&self) -> Option<ExtendMode> {
        if let Some((width, height)) = self.pad_size {
            Some(ExtendMode::Size { width, height })
        } else {
            self.pad_aspect
                .map(|(width, height)| ExtendMode::AspectRatio { width, height })
        }
    }
}

/// One file's outcome, for the batch report.
struct Report {
    input: PathBuf,
    output: PathBuf,
    before: u64,
    after: u64,
}

fn collect_inputs(common: &CommonArgs) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if !common.input.is_dir() {
        return Ok(vec![common.input.clone()]);
    }
    if !common.recursive {
        return Err(format!(
            "'{}' is a directory; pass --recursive to process its contents",
            common.input.display()
        )
        .into());
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(&common.input) {
        let entry = entry?;
        if entry.file_type().is_file() && Format::from_path(entry.path()).is_some() {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn run_one(
    input: &Path,
    common: &CommonArgs,
    format: Option<Format>,
    options: &PipelineOptions,
) -> Result<Report, Box<dyn std::error::Error>> {
    let before = std::fs::metadata(input)?.len();
    let image = decode_file(input)?;

    // "same as the source" when no target format was given
    let format = match format.or(image.source) {
        Some(f) => f,
        None => return Err(format!("cannot detect format of '{}'", input.display()).into()),
    };

    let options = PipelineOptions {
        format,
        ..options.clone()
    };
    let encoded = convert(&image, &options)?;

    let out = output_path(input, format, common.output.as_deref());
    encoded.save(&out)?;
    let after = encoded.data.len() as u64;

    Ok(Report {
        input: input.to_path_buf(),
        output: out,
        before,
        after,
    })
}

fn run_optimize(input: &Path, common: &CommonArgs) -> Result<Report, Box<dyn std::error::Error>> {
    let before = std::fs::metadata(input)?.len();
    let encoded = optimize_file(input, common.quality)?;
    let out = output_path(input, encoded.format, common.output.as_deref());
    encoded.save(&out)?;
    let after = encoded.data.len() as u64;

    Ok(Report {
        input: input.to_path_buf(),
        output: out,
        before,
        after,
    })
}

fn print_report(report: &Report) {
    let delta = if report.before > 0 {
        100.0 - (report.after as f64 / report.before as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "{} -> {}  {} -> {} bytes ({:+.1}% saved)",
        report.input.display(),
        report.output.display(),
        report.before,
        report.after,
        delta,
    );
}

/// With several inputs, a file `--output` would make every result overwrite
/// the same path; only a directory target is meaningful.
fn validate_batch_output(output: Option<&Path>, inputs: usize) -> Result<(), String> {
    match output {
        Some(out) if inputs > 1 && !out.is_dir() => Err(format!(
            "--output must be a directory when processing {inputs} files, got '{}'",
            out.display()
        )),
        _ => Ok(()),
    }
}

fn run_batch<F>(common: &CommonArgs, f: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: Fn(&Path) -> Result<Report, Box<dyn std::error::Error>> + Sync,
{
    let inputs = collect_inputs(common)?;
    validate_batch_output(common.output.as_deref(), inputs.len())?;

    let results: Vec<(PathBuf, Result<Report, String>)> = inputs
        .par_iter()
        .map(|path| (path.clone(), f(path).map_err(|e| e.to_string())))
        .collect();

    let mut failures = 0usize;
    for (path, result) in &results {
        match result {
            Ok(report) => print_report(report),
            Err(message) => {
                eprintln!("{}: {message}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} files failed", results.len()).into());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            common,
            to,
            crop,
            resize,
            extend,
            fill,
        } => {
            let options = PipelineOptions {
                format: to,
                quality: common.quality,
                crop: crop.mode(),
                resize: resize.mode(),
                extend: extend.mode(),
                fill: fill.fill,
            };
            run_batch(&common, |path| run_one(path, &common, Some(to), &options))
        }
        Command::Optimize { common } => run_batch(&common, |path| run_optimize(path, &common)),
        Command::Crop { common, crop } => {
            let Some(mode) = crop.mode() else {
                return Err("crop requires --crop-aspect or --crop-region".into());
            };
            let mut options = PipelineOptions::new(Format::Png, common.quality);
            options.crop = Some(mode);
            run_batch(&common, |path| run_one(path, &common, None, &options))
        }
        Command::Resize { common, resize } => {
            let Some(mode) = resize.mode() else {
                return Err(
                    "resize requires one of --width, --height, --exact, --fit, --scale".into(),
                );
            };
            let mut options = PipelineOptions::new(Format::Png, common.quality);
            options.resize = Some(mode);
            run_batch(&common, |path| run_one(path, &common, None, &options))
        }
        Command::Extend {
            common,
            extend,
            fill,
        } => {
            let Some(mode) = extend.mode() else {
                return Err("extend requires --pad-aspect or --pad-size".into());
            };
            let mut options = PipelineOptions::new(Format::Png, common.quality);
            options.extend = Some(mode);
            options.fill = fill.fill;
            run_batch(&common, |path| run_one(path, &common, None, &options))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_parsing() {
        assert_eq!(parse_ratio("16:9").unwrap(), (16, 9));
        assert_eq!(parse_ratio(" 1 : 1 ").unwrap(), (1, 1));
        assert!(parse_ratio("16x9").is_err());
        assert!(parse_ratio("0:9").is_err());
    }

    #[test]
    fn size_parsing() {
        assert_eq!(parse_size("640x480").unwrap(), (640, 480));
        assert!(parse_size("640,480").is_err());
    }

    #[test]
    fn region_parsing() {
        assert_eq!(parse_region("10,20,640x480").unwrap(), (10, 20, 640, 480));
        assert!(parse_region("10,20").is_err());
        assert!(parse_region("10,20,640").is_err());
    }

    #[test]
    fn batch_output_must_be_a_directory_for_multiple_inputs() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("out.png");
        std::fs::write(&file, b"x").unwrap();

        assert!(validate_batch_output(Some(&file), 2).is_err());
        assert!(validate_batch_output(Some(&file), 1).is_ok());
        assert!(validate_batch_output(Some(dir.path()), 2).is_ok());
        assert!(validate_batch_output(None, 2).is_ok());
    }

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
