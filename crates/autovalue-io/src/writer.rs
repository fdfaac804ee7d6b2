//! JSON result writer for training and valuation outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::ExperimentName;
use crate::IoError;

/// Writes result artifacts to pretty-printed JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_training.json` and
/// `{experiment}_valuation.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

/// Envelope tagging every artifact with its experiment name.
#[derive(Serialize)]
struct Artifact<'a, T: Serialize> {
    experiment: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write a training report to `{experiment}_training.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] if `report` does not encode as a JSON
    /// object, or [`IoError::WriteFile`] if the file cannot be written.
    pub fn write_training<T: Serialize>(&self, report: &T) -> Result<PathBuf, IoError> {
        self.write_artifact("training", report)
    }

    /// Write a valuation report to `{experiment}_valuation.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] if `report` does not encode as a JSON
    /// object, or [`IoError::WriteFile`] if the file cannot be written.
    pub fn write_valuation<T: Serialize>(&self, report: &T) -> Result<PathBuf, IoError> {
        self.write_artifact("valuation", report)
    }

    #[instrument(skip(self, body))]
    fn write_artifact<T: Serialize>(&self, kind: &str, body: &T) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()));

        let artifact = Artifact {
            experiment: self.experiment.as_str(),
            body,
        };
        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "{kind} result written");
        Ok(path)
    }
}
