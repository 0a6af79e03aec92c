use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gmq_core::errors::{ErrorInfo, GmqError};
use gmq_core::hash::stable_hash_string;
use gmq_core::serde::{from_yaml_slice, to_yaml_string};
use gmq_core::DEFAULT_REFERENCE;
use gmq_decomp::DecomposeOpts;
use gmq_fit::FitSpec;
use gmq_predict::{LatticeOpts, MassWindow, NearestOpts, OutputScale, StateSpace};
use gmq_quant::DiagnosticsOpts;

/// Name of the fit created when a plan lists none.
pub const DEFAULT_FIT: &str = "linear";

fn default_reference() -> String {
    DEFAULT_REFERENCE.to_string()
}

fn default_fits() -> BTreeMap<String, FitSpec> {
    BTreeMap::from([(DEFAULT_FIT.to_string(), FitSpec::default())])
}

fn default_fit_name() -> String {
    DEFAULT_FIT.to_string()
}

fn default_prediction() -> Option<PredictionSpec> {
    Some(PredictionSpec::default())
}

/// Which fit drives the predictor and how its states are enumerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSpec {
    /// Name of the fit in [`AnalysisPlan::fits`].
    #[serde(default = "default_fit_name")]
    pub fit: String,
    /// Output scale; taken from the fit target when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<OutputScale>,
    /// States to enumerate.
    #[serde(default)]
    pub states: StateSpace,
    /// Mass filter.
    #[serde(default)]
    pub window: MassWindow,
    /// Nearest-state search bounds.
    #[serde(default)]
    pub nearest: NearestOpts,
}

impl Default for PredictionSpec {
    fn default() -> Self {
        Self {
            fit: default_fit_name(),
            scale: None,
            states: StateSpace::default(),
            window: MassWindow::default(),
            nearest: NearestOpts::default(),
        }
    }
}

/// Every knob of one analysis run. Missing sections take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPlan {
    /// Name of the reference record.
    #[serde(default = "default_reference")]
    pub reference: String,
    /// Record source (SQLite, JSON or YAML); the built-in dataset when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<PathBuf>,
    /// Quantization statistics.
    #[serde(default)]
    pub diagnostics: DiagnosticsOpts,
    /// Basis decomposition options.
    #[serde(default)]
    pub decomposition: DecomposeOpts,
    /// Named fits.
    #[serde(default = "default_fits")]
    pub fits: BTreeMap<String, FitSpec>,
    /// Prediction stage; `null` disables it.
    #[serde(default = "default_prediction")]
    pub prediction: Option<PredictionSpec>,
    /// Lattice enumeration; off unless given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lattice: Option<LatticeOpts>,
    /// Directory holding the plan on disk.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for AnalysisPlan {
    fn default() -> Self {
        Self {
            reference: default_reference(),
            records: None,
            diagnostics: DiagnosticsOpts::default(),
            decomposition: DecomposeOpts::default(),
            fits: default_fits(),
            prediction: default_prediction(),
            lattice: None,
            base_dir: PathBuf::new(),
        }
    }
}

impl AnalysisPlan {
    /// SHA-256 of the canonical JSON form of the plan.
    pub fn plan_hash(&self) -> Result<String, GmqError> {
        stable_hash_string(self)
    }

    /// Canonical YAML form.
    pub fn to_yaml_string(&self) -> Result<String, GmqError> {
        to_yaml_string(self)
    }

    /// Record source resolved against the plan directory.
    pub fn records_path(&self) -> Option<PathBuf> {
        self.records.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.base_dir.join(path)
            }
        })
    }
}

/// Loads a plan from YAML.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<AnalysisPlan, GmqError> {
    let plan_path = path.as_ref();
    let bytes = fs::read(plan_path).map_err(|err| {
        GmqError::Config(
            ErrorInfo::new("plan_read", err.to_string())
                .with_context("path", plan_path.display().to_string()),
        )
    })?;
    let mut plan: AnalysisPlan = from_yaml_slice(&bytes)?;
    plan.base_dir = plan_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok(plan)
}
