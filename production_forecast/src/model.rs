//! Regression model contract and a linear implementation

use crate::error::{ForecastError, Result};
use crate::features::FeatureMatrix;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A pretrained regression model, opaque apart from its input schema
pub trait RegressionModel: Debug {
    /// Ordered feature names the model was trained on
    fn feature_schema(&self) -> &[String];

    /// One raw prediction per matrix row
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>>;
}

impl<M: RegressionModel + ?Sized> RegressionModel for &M {
    fn feature_schema(&self) -> &[String] {
        (**self).feature_schema()
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        (**self).predict(features)
    }
}

impl<M: RegressionModel + ?Sized> RegressionModel for Box<M> {
    fn feature_schema(&self) -> &[String] {
        (**self).feature_schema()
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        (**self).predict(features)
    }
}

/// Linear model on the log1p scale, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Input schema, in order
    pub feature_names: Vec<String>,
    /// One weight per feature
    pub coefficients: Vec<f64>,
    /// Constant term
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    /// Create a new linear model
    pub fn new(feature_names: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        let model = Self {
            feature_names,
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load a model artifact from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let model: LinearModel = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.feature_names.len() != self.coefficients.len() {
            return Err(ForecastError::ModelError(format!(
                "Model has {} feature names but {} coefficients",
                self.feature_names.len(),
                self.coefficients.len()
            )));
        }
        if self.coefficients.iter().any(|c| !c.is_finite()) || !self.intercept.is_finite() {
            return Err(ForecastError::ModelError(
                "Model weights must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl RegressionModel for LinearModel {
    fn feature_schema(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        if features.columns() != self.feature_names.as_slice() {
            return Err(ForecastError::ModelError(
                "Feature matrix columns do not match the model schema".to_string(),
            ));
        }

        Ok(features
            .rows()
            .iter()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(self.coefficients.iter())
                        .map(|(x, w)| x * w)
                        .sum::<f64>()
            })
            .collect())
    }
}
