//! Scanprep: dataset preparation for 3D visual grounding.
//!
//! Scanprep loads ScanNet scans, attaches per-object point clouds and boxes,
//! optionally aligns every scan into a shared frame and overlays detector
//! boxes, then writes the whole set as one artifact for model training.
//!
//! # Modules
//!
//! - [`scan`]: Scan types, registry, geometry reader and per-scan loader
//! - [`batch`]: Scan enumeration, view filtering and the parallel loader
//! - [`artifact`]: Output tag derivation and the persisted artifact
//! - [`stats`]: Max object count over precomputed box files
//! - [`prepare`]: The end-to-end pipeline behind `scanprep prepare`
//! - [`error`]: Error types for scanprep operations

pub mod artifact;
pub mod batch;
pub mod error;
pub mod prepare;
pub mod scan;
pub mod stats;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

pub use error::ScanprepError;

use batch::{FailurePolicy, ScanSource, AUTO_WORKERS};
use prepare::PrepareConfig;
use scan::RegistryPaths;

/// Flags historically spelled with a single dash.
const LEGACY_FLAGS: [&str; 2] = ["-top-scan-dir", "-top-save-dir"];

const DEFAULT_TRAIN_SPLIT: &str = "../data/scannet/splits/official/v2/scannetv2_train.txt";
const DEFAULT_VAL_SPLIT: &str = "../data/scannet/splits/official/v2/scannetv2_val.txt";
const DEFAULT_IDX_TO_SEMANTIC_CLASS: &str = "../data/mappings/scannet_idx_to_semantic_class.json";
const DEFAULT_INSTANCE_TO_SEMANTIC_CLASS: &str =
    "../data/mappings/scannet_instance_class_to_semantic_class.json";
const DEFAULT_AXIS_ALIGNMENT: &str = "../data/scannet/scans_axis_alignment_matrices.json";

/// The scanprep CLI application.
#[derive(Parser)]
#[command(name = "scanprep")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Load scans and save them as a single tagged artifact.
    Prepare(PrepareArgs),
    /// Report the largest detected-box count over a split's primary views.
    MaxObjects(MaxObjectsArgs),
}

/// Arguments for the prepare subcommand.
#[derive(clap::Args, Debug)]
struct PrepareArgs {
    /// Path to the downloaded ScanNet scans (one subdirectory per scan).
    #[arg(long = "top-scan-dir", env = "SCANPREP_TOP_SCAN_DIR")]
    top_scan_dir: PathBuf,

    /// Directory under which the preprocessed artifact is saved.
    #[arg(long = "top-save-dir", env = "SCANPREP_TOP_SAVE_DIR")]
    top_save_dir: PathBuf,

    /// Number of workers; -1 uses the available maximum.
    #[arg(long, default_value_t = AUTO_WORKERS, allow_negative_numbers = true)]
    n_processes: i64,

    /// Only use the 00 view of each scene.
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_parser = parse_bool_flag)]
    process_only_zero_view: bool,

    /// Log progress and timing.
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_parser = parse_bool_flag)]
    verbose: bool,

    /// Rotate/translate each scan to align it with the other scans.
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_parser = parse_bool_flag)]
    apply_global_alignment: bool,

    /// Take scan ids from the train/val split files instead of the scan directory.
    #[arg(long)]
    specific_scans: bool,

    /// Directory holding <scan_id>_pred_boxes.npy files to overlay.
    #[arg(long)]
    hardcode_boxes: Option<PathBuf>,

    /// Training split file (used with --specific-scans).
    #[arg(long, env = "SCANPREP_TRAIN_SPLIT", default_value = DEFAULT_TRAIN_SPLIT)]
    train_split: PathBuf,

    /// Validation split file (used with --specific-scans).
    #[arg(long, env = "SCANPREP_VAL_SPLIT", default_value = DEFAULT_VAL_SPLIT)]
    val_split: PathBuf,

    /// JSON mapping from class index to semantic class.
    #[arg(long, env = "SCANPREP_IDX_TO_SEMANTIC_CLASS", default_value = DEFAULT_IDX_TO_SEMANTIC_CLASS)]
    idx_to_semantic_class: PathBuf,

    /// JSON mapping from instance label to semantic class.
    #[arg(long, env = "SCANPREP_INSTANCE_TO_SEMANTIC_CLASS", default_value = DEFAULT_INSTANCE_TO_SEMANTIC_CLASS)]
    instance_to_semantic_class: PathBuf,

    /// JSON mapping from scan id to its 4x4 alignment matrix.
    #[arg(long, env = "SCANPREP_AXIS_ALIGNMENT", default_value = DEFAULT_AXIS_ALIGNMENT)]
    axis_alignment: PathBuf,

    /// What to do when a scan fails to load.
    #[arg(long, value_enum, env = "SCANPREP_ON_SCAN_ERROR", default_value_t = FailurePolicy::Abort)]
    on_scan_error: FailurePolicy,
}

/// Arguments for the max-objects subcommand.
#[derive(clap::Args, Debug)]
struct MaxObjectsArgs {
    /// Directory holding <scan_id>_pred_boxes.npy files.
    #[arg(long, env = "SCANPREP_BOXES_DIR")]
    boxes_dir: PathBuf,

    /// Split file listing the scans to examine.
    #[arg(long, env = "SCANPREP_VAL_SPLIT", default_value = DEFAULT_VAL_SPLIT)]
    val_split: PathBuf,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl From<PrepareArgs> for PrepareConfig {
    fn from(args: PrepareArgs) -> Self {
        let source = if args.specific_scans {
            ScanSource::SplitFiles {
                train: args.train_split,
                val: args.val_split,
            }
        } else {
            ScanSource::Directory(args.top_scan_dir.clone())
        };

        Self {
            top_scan_dir: args.top_scan_dir,
            top_save_dir: args.top_save_dir,
            n_processes: args.n_processes,
            only_zero_view: args.process_only_zero_view,
            verbose: args.verbose,
            apply_alignment: args.apply_global_alignment,
            source,
            hardcoded_boxes_dir: args.hardcode_boxes,
            registry_paths: RegistryPaths {
                idx_to_semantic_class: args.idx_to_semantic_class,
                instance_to_semantic_class: args.instance_to_semantic_class,
                axis_alignment: args.axis_alignment,
            },
            on_scan_error: args.on_scan_error,
        }
    }
}

/// Run the scanprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ScanprepError> {
    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));

    match cli.command {
        Some(Commands::Prepare(args)) => run_prepare(args),
        Some(Commands::MaxObjects(args)) => run_max_objects(args),
        None => {
            println!("scanprep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Dataset preparation for 3D visual grounding.");
            println!();
            println!("Run 'scanprep --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the prepare subcommand.
fn run_prepare(args: PrepareArgs) -> Result<(), ScanprepError> {
    init_logging(args.verbose);

    let config = PrepareConfig::from(args);
    log::info!("{:#?}", config);

    let summary = prepare::prepare(&config)?;
    println!(
        "Wrote {} scan(s) to {}",
        summary.outcome.records.len(),
        summary.artifact.display()
    );
    if !summary.outcome.is_complete() {
        eprint!("{}", summary.outcome);
    }
    Ok(())
}

/// Execute the max-objects subcommand.
fn run_max_objects(args: MaxObjectsArgs) -> Result<(), ScanprepError> {
    init_logging(false);

    let report = stats::max_object_count_for_split(&args.val_split, &args.boxes_dir)?;

    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(ScanprepError::Report)?;
            println!("{}", json);
        }
        OutputFormat::Text => print!("{}", report),
    }
    Ok(())
}

/// Installs the `env_logger` backend; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

/// Parses the boolean spellings accepted by the legacy scripts.
fn parse_bool_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        other => Err(format!("boolean value expected, got '{}'", other)),
    }
}

/// Rewrites `-top-scan-dir`-style flags to their `--` form.
fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let is_legacy = arg.to_str().is_some_and(|s| {
                LEGACY_FLAGS.iter().any(|flag| {
                    s == *flag
                        || s.strip_prefix(flag)
                            .is_some_and(|rest| rest.starts_with('='))
                })
            });
            if is_legacy {
                let mut fixed = OsString::from("-");
                fixed.push(&arg);
                fixed
            } else {
                arg
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_legacy_flags_are_rewritten() {
        let fixed = normalize_legacy_flags(os_args(&[
            "scanprep",
            "prepare",
            "-top-scan-dir",
            "/scans",
            "-top-save-dir=/out",
            "--verbose",
            "false",
        ]));
        assert_eq!(
            fixed,
            os_args(&[
                "scanprep",
                "prepare",
                "--top-scan-dir",
                "/scans",
                "--top-save-dir=/out",
                "--verbose",
                "false",
            ])
        );
    }

    #[test]
    fn test_parse_bool_flag() {
        assert_eq!(parse_bool_flag("True"), Ok(true));
        assert_eq!(parse_bool_flag("y"), Ok(true));
        assert_eq!(parse_bool_flag("0"), Ok(false));
        assert_eq!(parse_bool_flag("NO"), Ok(false));
        assert!(parse_bool_flag("maybe").is_err());
    }

    #[test]
    fn test_prepare_defaults() {
        let cli = Cli::try_parse_from(normalize_legacy_flags(os_args(&[
            "scanprep",
            "prepare",
            "-top-scan-dir",
            "/scans",
            "-top-save-dir",
            "/out",
        ])))
        .expect("parse");

        let Some(Commands::Prepare(args)) = cli.command else {
            panic!("expected prepare subcommand");
        };
        let config = PrepareConfig::from(args);

        assert_eq!(config.n_processes, -1);
        assert!(config.only_zero_view);
        assert!(config.verbose);
        assert!(config.apply_alignment);
        assert!(config.hardcoded_boxes_dir.is_none());
        assert_eq!(config.on_scan_error, FailurePolicy::Abort);
        assert!(matches!(config.source, ScanSource::Directory(ref p) if p == &PathBuf::from("/scans")));
    }

    #[test]
    fn test_specific_scans_uses_split_files() {
        let cli = Cli::try_parse_from(os_args(&[
            "scanprep",
            "prepare",
            "--top-scan-dir",
            "/scans",
            "--top-save-dir",
            "/out",
            "--specific-scans",
            "--train-split",
            "train.txt",
            "--val-split",
            "val.txt",
            "--n-processes",
            "4",
            "--apply-global-alignment",
            "false",
            "--on-scan-error",
            "skip",
        ]))
        .expect("parse");

        let Some(Commands::Prepare(args)) = cli.command else {
            panic!("expected prepare subcommand");
        };
        let config = PrepareConfig::from(args);

        assert_eq!(config.n_processes, 4);
        assert!(!config.apply_alignment);
        assert_eq!(config.on_scan_error, FailurePolicy::Skip);
        match config.source {
            ScanSource::SplitFiles { train, val } => {
                assert_eq!(train, PathBuf::from("train.txt"));
                assert_eq!(val, PathBuf::from("val.txt"));
            }
            other => panic!("unexpected source: {other:?}"),
        }
    }
}
