//! Multinomial / binary logistic regression evaluated from exported coefficients.

use serde::Deserialize;

use crate::error::ModelError;

/// Linear decision function plus softmax (or sigmoid for binary models).
///
/// `coef` is `n_classes x n_features`; a binary model exports a single row and its
/// positive class is the second entry of the class list.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawLogistic")]
pub struct LogisticModel {
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

#[derive(Deserialize)]
struct RawLogistic {
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl TryFrom<RawLogistic> for LogisticModel {
    type Error = ModelError;

    fn try_from(raw: RawLogistic) -> Result<Self, Self::Error> {
        LogisticModel::new(raw.coef, raw.intercept)
    }
}

impl LogisticModel {
    pub fn new(coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> Result<Self, ModelError> {
        let width = coef
            .first()
            .map(|row| row.len())
            .ok_or_else(|| ModelError::Shape("coef has no rows".into()))?;
        if width == 0 {
            return Err(ModelError::Shape("coef rows are empty".into()));
        }
        if coef.iter().any(|row| row.len() != width) {
            return Err(ModelError::Shape("coef rows differ in length".into()));
        }
        if intercept.len() != coef.len() {
            return Err(ModelError::Shape(format!(
                "{} intercepts for {} coef rows",
                intercept.len(),
                coef.len()
            )));
        }
        Ok(Self { coef, intercept })
    }

    pub fn n_features(&self) -> usize {
        self.coef[0].len()
    }

    pub fn n_classes(&self) -> usize {
        if self.coef.len() == 1 {
            2
        } else {
            self.coef.len()
        }
    }

    pub fn decision_function(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        if x.len() != self.n_features() {
            return Err(ModelError::Dimension {
                expected: self.n_features(),
                got: x.len(),
            });
        }
        Ok(self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
            .collect())
    }

    /// Index of the predicted class (first maximum on ties).
    pub fn predict_index(&self, x: &[f64]) -> Result<usize, ModelError> {
        let scores = self.decision_function(x)?;
        if scores.len() == 1 {
            return Ok(usize::from(scores[0] > 0.0));
        }
        Ok(argmax(&scores))
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        let scores = self.decision_function(x)?;
        if scores.len() == 1 {
            let p = 1.0 / (1.0 + (-scores[0]).exp());
            return Ok(vec![1.0 - p, p]);
        }
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        Ok(exps.into_iter().map(|e| e / total).collect())
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
