use std::collections::HashMap;

use serde::Deserialize;

use crate::frame::Frame;
use crate::ml::{PredictError, Predictor};

/// A pre-trained linear classifier plus its input preprocessing, exactly as
/// serialized by the training side. One scorer per class; probabilities come
/// from a softmax over the class scores.
///
/// Numeric columns are standardized with the stored mean and scale. Every
/// other column is categorical: a value `v` in column `c` activates the
/// indicator weight keyed `"c=v"`. Unseen categories simply contribute
/// nothing, mirroring a zeroed one-hot row.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    classes: Vec<String>,
    columns: Vec<String>,
    #[serde(default)]
    numeric: HashMap<String, NumericScale>,
    scorers: Vec<ClassScorer>,
}

#[derive(Debug, Clone, Deserialize)]
struct NumericScale {
    mean: f32,
    scale: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct ClassScorer {
    bias: f32,
    weights: HashMap<String, f32>,
}

impl ModelArtifact {
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("model has no classes".to_string());
        }
        if self.columns.is_empty() {
            return Err("model has no input columns".to_string());
        }
        if self.scorers.len() != self.classes.len() {
            return Err(format!(
                "model has {} scorers for {} classes",
                self.scorers.len(),
                self.classes.len()
            ));
        }
        if self.scorers.iter().all(|scorer| scorer.weights.is_empty()) {
            return Err("model has no weights".to_string());
        }
        Ok(())
    }

    /// Map each model column to its position in the incoming frame. The
    /// frame may carry extra columns; they are ignored. A missing column is
    /// the model-call failure the caller reports to the user.
    fn column_index(&self, frame: &Frame) -> Result<Vec<usize>, PredictError> {
        self.columns
            .iter()
            .map(|column| {
                frame
                    .column_position(column)
                    .ok_or_else(|| PredictError::MissingColumn(column.clone()))
            })
            .collect()
    }

    fn score_row(
        &self,
        row: &[String],
        index: &[usize],
        row_number: usize,
    ) -> Result<Vec<f32>, PredictError> {
        let mut scores: Vec<f32> = self.scorers.iter().map(|scorer| scorer.bias).collect();

        for (column, &at) in self.columns.iter().zip(index) {
            let value = row[at].trim();
            if let Some(stats) = self.numeric.get(column) {
                let parsed: f32 = value.parse().map_err(|_| PredictError::InvalidValue {
                    row: row_number,
                    column: column.clone(),
                    value: value.to_string(),
                })?;
                let denom = if stats.scale > 0.0 { stats.scale } else { 1.0 };
                let x = (parsed - stats.mean) / denom;
                for (score, scorer) in scores.iter_mut().zip(&self.scorers) {
                    if let Some(weight) = scorer.weights.get(column) {
                        *score += weight * x;
                    }
                }
            } else {
                let key = format!("{}={}", column, value);
                for (score, scorer) in scores.iter_mut().zip(&self.scorers) {
                    if let Some(weight) = scorer.weights.get(&key) {
                        *score += weight;
                    }
                }
            }
        }

        Ok(scores)
    }
}

impl Predictor for ModelArtifact {
    fn predict(&self, frame: &Frame) -> Result<Vec<String>, PredictError> {
        let index = self.column_index(frame)?;
        let mut labels = Vec::with_capacity(frame.row_count());
        for (row_number, row) in frame.rows().iter().enumerate() {
            let scores = self.score_row(row, &index, row_number + 1)?;
            labels.push(self.classes[argmax(&scores)].clone());
        }
        Ok(labels)
    }

    fn predict_proba(&self, frame: &Frame) -> Result<Vec<Vec<f32>>, PredictError> {
        let index = self.column_index(frame)?;
        let mut probabilities = Vec::with_capacity(frame.row_count());
        for (row_number, row) in frame.rows().iter().enumerate() {
            let scores = self.score_row(row, &index, row_number + 1)?;
            probabilities.push(softmax(&scores));
        }
        Ok(probabilities)
    }
}

fn argmax(scores: &[f32]) -> usize {
    let mut best = 0;
    for (index, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = index;
        }
    }
    best
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|score| (score - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.iter().map(|value| value / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_artifact() -> ModelArtifact {
        serde_json::from_value(serde_json::json!({
            "classes": ["<=50K", ">50K"],
            "columns": ["age", "gender"],
            "numeric": { "age": { "mean": 40.0, "scale": 10.0 } },
            "scorers": [
                { "bias": 0.2, "weights": { "age": -1.0, "gender=Female": 0.3 } },
                { "bias": -0.2, "weights": { "age": 1.0, "gender=Male": 0.3 } }
            ]
        }))
        .unwrap()
    }

    fn frame(rows: &[&[&str]]) -> Frame {
        Frame::from_parts(
            vec!["age".to_string(), "gender".to_string()],
            rows.iter()
                .map(|row| row.iter().map(|value| value.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn validate_accepts_well_formed_artifact() {
        assert!(test_artifact().validate().is_ok());
    }

    #[test]
    fn validate_rejects_scorer_class_mismatch() {
        let artifact: ModelArtifact = serde_json::from_value(serde_json::json!({
            "classes": ["a", "b"],
            "columns": ["x"],
            "scorers": [{ "bias": 0.0, "weights": { "x": 1.0 } }]
        }))
        .unwrap();
        assert!(artifact.validate().unwrap_err().contains("2 classes"));
    }

    #[test]
    fn predicts_the_higher_scoring_class() {
        let model = test_artifact();
        let labels = model.predict(&frame(&[&["60", "Male"], &["20", "Female"]])).unwrap();
        assert_eq!(labels, vec![">50K".to_string(), "<=50K".to_string()]);
    }

    #[test]
    fn probabilities_sum_to_one_and_rank_like_labels() {
        let model = test_artifact();
        let probas = model
            .predict_proba(&frame(&[&["60", "Male"]]))
            .unwrap();
        assert_eq!(probas.len(), 1);
        let total: f32 = probas[0].iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(probas[0][1] > probas[0][0]);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let model = test_artifact();
        let input = Frame::from_parts(
            vec!["age".to_string()],
            vec![vec!["40".to_string()]],
        );
        assert_eq!(
            model.predict(&input).unwrap_err(),
            PredictError::MissingColumn("gender".to_string())
        );
    }

    #[test]
    fn non_numeric_value_is_reported_with_position() {
        let model = test_artifact();
        let err = model
            .predict(&frame(&[&["40", "Male"], &["abc", "Male"]]))
            .unwrap_err();
        assert_eq!(
            err,
            PredictError::InvalidValue {
                row: 2,
                column: "age".to_string(),
                value: "abc".to_string(),
            }
        );
    }

    #[test]
    fn unseen_category_contributes_nothing() {
        let model = test_artifact();
        let probas = model
            .predict_proba(&frame(&[&["40", "Nonbinary"]]))
            .unwrap();
        // age standardizes to zero, so only the biases remain.
        assert!(probas[0][0] > probas[0][1]);
    }

    #[test]
    fn extra_input_columns_are_ignored() {
        let model = test_artifact();
        let input = Frame::from_parts(
            vec!["extra".to_string(), "age".to_string(), "gender".to_string()],
            vec![vec!["x".to_string(), "60".to_string(), "Male".to_string()]],
        );
        assert_eq!(model.predict(&input).unwrap(), vec![">50K".to_string()]);
    }
}
