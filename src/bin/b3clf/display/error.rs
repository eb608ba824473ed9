use std::io::{self, Write};

use anyhow::Error;

use b3clf::{classifier, config, descriptors, features, geometry, io as b3io};

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
    }

    let hints = HintCollector::collect(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

#[derive(Default)]
struct HintCollector {
    hints: Vec<String>,
}

impl HintCollector {
    /// Hints for the innermost typed error found along the chain.
    fn collect(err: &Error) -> Vec<String> {
        let mut collector = Self::default();
        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<classifier::Error>() {
                collector.classifier(e);
            } else if let Some(e) = cause.downcast_ref::<descriptors::Error>() {
                collector.descriptors(e);
            } else if let Some(e) = cause.downcast_ref::<geometry::Error>() {
                collector.geometry(e);
            } else if let Some(e) = cause.downcast_ref::<features::Error>() {
                collector.features(e);
            } else if let Some(e) = cause.downcast_ref::<b3io::Error>() {
                collector.io(e);
            } else if let Some(e) = cause.downcast_ref::<config::Error>() {
                collector.config(e);
            } else if let Some(e) = cause.downcast_ref::<std::io::Error>() {
                collector.std_io(e);
            }
        }
        collector.hints.dedup();
        collector.hints
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn classifier(&mut self, err: &classifier::Error) {
        use classifier::Error as E;

        match err {
            E::UnsupportedAlgorithm(_) => {
                self.add("Supported classifiers: dtree, knn, logreg, xgb");
            }
            E::UnsupportedResampling(_) => {
                self.add("Supported strategies: common, classic_RandUndersampling, classic_SMOTE, borderline_SMOTE, kmeans_SMOTE, classic_ADASYN");
            }
            E::UnsupportedPolicy(_) => self.add("Threshold policies: none, J, F"),
            E::ArtifactRead { .. } => {
                self.add("Model artifacts are looked up in --artifacts, [artifacts] dir, $B3CLF_ARTIFACTS, then ./artifacts");
                self.add("Expected files: b3clf_{clf}_{sampling}.json and b3db_scaler.json");
            }
            E::ArtifactParse { .. } | E::InvalidArtifact(_) => {
                self.add("The artifact is not a valid exported model; re-export it");
            }
            E::MissingFeatures(_) => {
                self.add("The descriptor table lacks inputs the classifier was trained on");
                self.add("Compute descriptors with both 2D and 3D descriptor sets enabled");
            }
            E::MissingThreshold { .. } => {
                self.add("b3clf_thresholds.json has no entry for this classifier");
                self.add("Use --threshold none for the default cutoff");
            }
            E::InvalidThreshold(_) => self.add("Cutoffs in b3clf_thresholds.json must lie in [0, 1]"),
            E::IndexMismatch { .. } | E::RowCountMismatch { .. } => {
                self.add("Feature and info rows diverged; this is a bug, please report it");
            }
            E::Features(_) => {}
        }
    }

    fn descriptors(&mut self, err: &descriptors::Error) {
        use descriptors::Error as E;

        match err {
            E::Launch { .. } => {
                self.add("The descriptor tool could not be started");
                self.add("Check that Java is installed or pass --java");
            }
            E::ToolFailed { stderr, .. } => {
                if stderr.to_lowercase().contains("jarfile") {
                    self.add("PaDEL-Descriptor jar not found; pass --padel-jar or set [descriptors] jar");
                } else {
                    self.add("The descriptor tool reported an error; see its output above");
                }
            }
            E::ToolTimedOut { .. } => {
                self.add("Raise --timeout or set --max-runtime-per-mol to skip slow molecules");
            }
            E::MissingOutput { .. } => self.add("The tool exited cleanly but wrote no table"),
            E::RowCountMismatch { .. } => {
                self.add("The tool must emit one row per SD record in record order");
                self.add("PaDEL needs -retainorder for this");
            }
            E::InvalidTemplate { .. } => {
                self.add("A command template needs {input} and {output}, e.g. 'mytool {input} -o {output}'");
            }
            E::Io(_) | E::Features(_) => {}
        }
    }

    fn geometry(&mut self, err: &geometry::Error) {
        use geometry::Error as E;

        match err {
            E::UnsupportedTool(_) => self.add("Only the built-in optimizer is available: --tool builtin"),
            E::MissingParameter { .. } => self.add("Try --force-field uff, which covers more elements"),
            E::Output { .. } => self.add("Check that the output directory exists and is writable"),
            _ => {}
        }
    }

    fn features(&mut self, err: &features::Error) {
        use features::Error as E;

        match err {
            E::MissingIndexColumn(_) => {
                self.add("Feature tables need an 'ID' column naming each molecule");
            }
            E::NonNumeric { column, .. } => {
                self.add(format!("Column '{column}' must be numeric; info columns are compound_name, SMILES, cid, category, inchi, Energy"));
            }
            E::UnknownColumn(_) | E::ScalerShape(_) => {
                self.add("The scaler does not match the descriptor selection; check the artifact directory");
            }
            _ => {}
        }
    }

    fn io(&mut self, err: &b3io::Error) {
        use b3io::Error as E;

        match err {
            E::UnsupportedFormat { .. } => {
                self.add("Molecule inputs: .smi, .csv, .txt, .sdf; tables: .csv, .tsv");
                self.add("Spreadsheets (.xlsx) are not supported; export them as CSV");
            }
            E::ColumnOutOfRange { .. } => {
                self.add("Check --sep, --smiles-col and --name-col against the input layout");
            }
            E::Smiles { .. } => self.add("Fix or remove the malformed SMILES"),
            E::Parse { .. } => self.add("Inspect the file around the reported line"),
            _ => {}
        }
    }

    fn config(&mut self, err: &config::Error) {
        match err {
            config::Error::Parse { .. } => {
                self.add("Settings sections: [artifacts], [descriptors], [geometry]");
            }
            config::Error::Invalid { key, .. } => self.add(format!("Fix '{key}' in the settings file")),
            config::Error::Read { .. } => {}
        }
    }

    fn std_io(&mut self, err: &std::io::Error) {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => self.add("Check that the path is correct and the file exists"),
            ErrorKind::PermissionDenied => self.add("Check file permissions with `ls -la`"),
            ErrorKind::WriteZero | ErrorKind::StorageFull => self.add("Check available disk space"),
            _ => {}
        }
    }
}
