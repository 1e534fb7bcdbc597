use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::pipeline::batch::decode_folder;
use crate::pipeline::decode::{ResizeFilter, decode_file};
use crate::pipeline::export::{self, CursorReport, FolderReport};

/// Decode Windows .cur/.ani cursors into a JSON report with a PNG sprite sheet.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// A .cur or .ani file to decode.
    #[arg(required_unless_present = "folder", conflicts_with = "folder")]
    pub file: Option<PathBuf>,

    /// Decode every .cur/.ani file in a directory.
    #[arg(long, value_name = "DIR")]
    pub folder: Option<PathBuf>,

    /// Also write each sprite sheet as `<name>.png` into this directory.
    #[arg(long, value_name = "DIR")]
    pub png_out: Option<PathBuf>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,

    /// Descend into subdirectories in folder mode.
    #[arg(long)]
    pub recursive: bool,

    /// Worker threads for folder mode (0 = one per core).
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Resampling filter used when frames differ in size.
    #[arg(long, value_name = "NAME")]
    pub filter: Option<ResizeFilter>,

    /// Config file to use instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Flags given on the command line win over the config file.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(threads) = self.threads {
            config.thread_count = threads;
        }
        if let Some(filter) = self.filter {
            config.resize_filter = filter;
        }
        if self.recursive {
            config.recursive = true;
        }
        if self.pretty {
            config.pretty = true;
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

/// What the binary prints, plus whether the run counts as a success.
#[derive(Debug)]
pub struct Outcome {
    pub json: String,
    pub success: bool,
}

pub fn run(args: &Args, config: &Config) -> Result<Outcome> {
    match (&args.folder, &args.file) {
        (Some(dir), _) => run_folder(dir, args.png_out.as_deref(), config),
        (None, Some(file)) => run_file(file, args.png_out.as_deref(), config),
        (None, None) => anyhow::bail!("Either a file or --folder is required"),
    }
}

fn run_file(path: &Path, png_out: Option<&Path>, config: &Config) -> Result<Outcome> {
    log::info!("Decoding {}", path.display());
    let result = decode_file(path, &config.decode_options());

    if let (Some(out_dir), Ok(cursor)) = (png_out, &result) {
        let name = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("cursor");
        export::write_png(&cursor.sheet, &out_dir.join(format!("{name}.png")))?;
    }

    let report = CursorReport::from_result(&result);
    Ok(Outcome {
        success: report.success,
        json: export::to_json(&report, config.pretty)?,
    })
}

fn run_folder(dir: &Path, png_out: Option<&Path>, config: &Config) -> Result<Outcome> {
    let entries = decode_folder(dir, &config.batch_options())?;

    if let Some(out_dir) = png_out {
        let written = export::export_sheets(&entries, out_dir)?;
        log::info!("Wrote {} sprite sheets to {}", written.len(), out_dir.display());
    }

    let report = FolderReport::from_entries(&entries);
    Ok(Outcome {
        success: report.success,
        json: export::to_json(&report, config.pretty)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_file_or_folder_required() {
        assert!(Args::try_parse_from(["curconvert"]).is_err());
        assert!(Args::try_parse_from(["curconvert", "a.cur", "--folder", "dir"]).is_err());

        let args = Args::try_parse_from(["curconvert", "--folder", "theme"]).unwrap();
        assert_eq!(args.folder, Some(PathBuf::from("theme")));
        assert!(args.file.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "curconvert",
            "arrow.cur",
            "--filter",
            "nearest",
            "--threads",
            "2",
            "--pretty",
            "-vv",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.resize_filter, ResizeFilter::Nearest);
        assert_eq!(config.thread_count, 2);
        assert!(config.pretty);
        assert!(!config.recursive);
        assert_eq!(args.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_config_kept_without_flags() {
        let args = Args::try_parse_from(["curconvert", "arrow.cur"]).unwrap();
        let mut config = Config {
            thread_count: 8,
            resize_filter: ResizeFilter::Gaussian,
            recursive: true,
            pretty: true,
        };
        args.apply_to(&mut config);
        assert_eq!(config.thread_count, 8);
        assert_eq!(config.resize_filter, ResizeFilter::Gaussian);
        assert!(config.recursive);
        assert_eq!(args.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_bad_filter_rejected() {
        assert!(Args::try_parse_from(["curconvert", "a.cur", "--filter", "bicubic"]).is_err());
    }
}
