use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use b3clf::classifier::{Algorithm, Resampling, ThresholdPolicy};
use b3clf::geometry::ForceFieldKind;
use b3clf::io::Separator;

#[derive(Parser)]
#[command(
    name = "b3clf",
    about = "Blood-brain barrier permeability classification",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalOptions,
}

#[derive(Subcommand)]
pub enum Command {
    /// Predict BBB permeability for a molecule or feature file
    #[command(visible_alias = "p")]
    Predict(PredictArgs),

    /// Generate optimized 3D geometries (SMILES/SDF → SDF)
    #[command(visible_alias = "g")]
    Geometry(GeometryArgs),

    /// Compute descriptors for an SD file (SDF → CSV)
    #[command(visible_alias = "d")]
    Descriptors(DescriptorArgs),
}

/// Options accepted by every command.
#[derive(Args)]
pub struct GlobalOptions {
    /// Settings file (defaults to ./b3clf.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Suppress banner, progress and summary tables
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Molecule input and text-list layout.
#[derive(Args)]
pub struct InputOptions {
    /// Molecule file (.smi, .csv, .txt, .sdf)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Field separator of text lists: '\s+', tab, comma or one character
    #[arg(long = "sep", value_name = "SEP", default_value = r"\s+")]
    pub separator: Separator,

    /// Zero-based SMILES column of text lists
    #[arg(long, value_name = "N")]
    pub smiles_col: Option<usize>,

    /// Zero-based name column of text lists (default: last column)
    #[arg(long, value_name = "N")]
    pub name_col: Option<usize>,
}

/// Conformer generation options.
#[derive(Args)]
#[command(next_help_heading = "Geometry Options")]
pub struct GeometryOptions {
    /// Force field for minimization (MMFF94s or uff)
    #[arg(long, value_name = "FF")]
    pub force_field: Option<ForceFieldKind>,

    /// Iteration budget of the primary minimization
    #[arg(long = "max-iters", value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Embedding seed
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Optimization backend
    #[arg(long, value_name = "TOOL")]
    pub tool: Option<String>,
}

/// External descriptor tool options.
#[derive(Args)]
#[command(next_help_heading = "Descriptor Options")]
pub struct DescriptorToolOptions {
    /// Java executable used to run PaDEL-Descriptor
    #[arg(long, value_name = "PATH")]
    pub java: Option<PathBuf>,

    /// PaDEL-Descriptor jar
    #[arg(long, value_name = "JAR")]
    pub padel_jar: Option<PathBuf>,

    /// PaDEL worker threads (-1 for all cores)
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    pub threads: Option<i32>,

    /// Replace PaDEL with a command template using {input} and {output}
    #[arg(long, value_name = "TEMPLATE")]
    pub descriptor_command: Option<String>,

    /// Deadline for the whole descriptor run (seconds)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// PaDEL time limit per molecule (seconds)
    #[arg(long = "max-runtime-per-mol", value_name = "SECS")]
    pub max_runtime_per_molecule: Option<f64>,
}

#[derive(Args)]
pub struct PredictArgs {
    #[command(flatten)]
    pub input: InputOptions,

    /// Result table (.csv or .tsv)
    #[arg(short, long, value_name = "FILE", default_value = "B3clf_output.csv")]
    pub output: PathBuf,

    /// Treat the input as a pre-computed descriptor table with an ID column
    #[arg(long)]
    pub features: bool,

    /// Classifier: dtree, knn, logreg or xgb
    #[arg(long = "clf", value_name = "ALG", default_value = "xgb")]
    pub algorithm: Algorithm,

    /// Resampling strategy the classifier was trained with
    #[arg(long = "sampling", value_name = "METHOD", default_value = "classic_ADASYN")]
    pub resampling: Resampling,

    /// Threshold policy: none, J or F
    #[arg(long, value_name = "POLICY", default_value = "none")]
    pub threshold: ThresholdPolicy,

    /// Directory holding classifier, scaler and threshold artifacts
    #[arg(long, value_name = "DIR")]
    pub artifacts: Option<PathBuf>,

    /// Keep the optimized geometry SDF
    #[arg(long)]
    pub keep_sdf: bool,

    /// Keep the computed descriptor CSV
    #[arg(long)]
    pub keep_features: bool,

    /// List every input molecule with a status column
    #[arg(long)]
    pub with_status: bool,

    /// Print predictions to stdout
    #[arg(long)]
    pub print: bool,

    #[command(flatten)]
    pub geometry: GeometryOptions,

    #[command(flatten)]
    pub descriptors: DescriptorToolOptions,
}

#[derive(Args)]
pub struct GeometryArgs {
    #[command(flatten)]
    pub input: InputOptions,

    /// Output SD file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub geometry: GeometryOptions,
}

#[derive(Args)]
pub struct DescriptorArgs {
    /// Optimized SD file
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Descriptor table (.csv or .tsv)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub descriptors: DescriptorToolOptions,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn predict_defaults() {
        let cli = Cli::try_parse_from(["b3clf", "predict", "-i", "mols.smi"]).unwrap();
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.algorithm, Algorithm::GradientBoosting);
        assert_eq!(args.resampling, Resampling::ClassicAdasyn);
        assert_eq!(args.threshold, ThresholdPolicy::None);
        assert_eq!(args.output, PathBuf::from("B3clf_output.csv"));
        assert_eq!(args.input.separator, Separator::Whitespace);
    }

    #[test]
    fn unsupported_algorithm_is_a_usage_error() {
        assert!(Cli::try_parse_from(["b3clf", "predict", "-i", "m.smi", "--clf", "svm"]).is_err());
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["b3clf", "geometry", "-i", "a.smi", "-o", "a.sdf", "-vv", "-q"])
            .unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert!(cli.global.quiet);
    }
}
