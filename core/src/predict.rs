use serde::Serialize;

use crate::frame::{Frame, FrameError};
use crate::ml::{PredictError, Predictor};
use crate::types::FeatureRecord;

pub const PREDICTED_COLUMN: &str = "PredictedClass";
pub const DOWNLOAD_FILE_NAME: &str = "predicted_output.csv";

/// Everything that can go wrong between a trigger and its reported result.
/// All variants are recoverable; the message carries the underlying error
/// text for the user.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("{0}")]
    Upload(#[from] FrameError),
    #[error("{0}")]
    Model(#[from] PredictError),
    #[error("uploaded table has no data rows")]
    EmptyTable,
    #[error("model returned {labels} predictions for {rows} rows")]
    RowCountMismatch { rows: usize, labels: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct SinglePrediction {
    pub label: String,
    pub confidence: f32,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub columns: Vec<String>,
    pub row_count: usize,
    pub preview: Vec<Vec<String>>,
    pub csv: Vec<u8>,
}

/// Run one record through the model: label prediction and class
/// probabilities over identical single-row input. Confidence is the maximum
/// per-class probability as a percentage.
pub fn single_prediction(
    model: &dyn Predictor,
    record: &FeatureRecord,
) -> Result<SinglePrediction, PredictionError> {
    let frame = record.to_frame();

    let labels = model.predict(&frame)?;
    let probabilities = model.predict_proba(&frame)?;

    let label = labels
        .into_iter()
        .next()
        .ok_or(PredictionError::RowCountMismatch { rows: 1, labels: 0 })?;
    let proba = probabilities
        .into_iter()
        .next()
        .ok_or(PredictionError::RowCountMismatch { rows: 1, labels: 0 })?;

    let confidence = proba.iter().cloned().fold(0.0_f32, f32::max) * 100.0;
    let message = format!(
        "Prediction: {} (Confidence: {}%)",
        label,
        format_confidence(confidence)
    );

    Ok(SinglePrediction {
        label,
        confidence,
        message,
    })
}

/// Run an uploaded CSV through the model in one call, append the
/// `PredictedClass` column positionally, and encode the augmented table for
/// download. On any failure no partial output is produced.
pub fn batch_prediction(
    model: &dyn Predictor,
    bytes: &[u8],
    preview_rows: usize,
) -> Result<BatchOutcome, PredictionError> {
    let mut frame = Frame::from_csv(bytes)?;
    if frame.row_count() == 0 {
        return Err(PredictionError::EmptyTable);
    }

    let labels = model.predict(&frame)?;
    if labels.len() != frame.row_count() {
        return Err(PredictionError::RowCountMismatch {
            rows: frame.row_count(),
            labels: labels.len(),
        });
    }

    frame.push_column(PREDICTED_COLUMN, labels)?;

    Ok(BatchOutcome {
        columns: frame.columns().to_vec(),
        row_count: frame.row_count(),
        preview: frame.head(preview_rows),
        csv: frame.to_csv(),
    })
}

/// Two decimal places, the way the confidence is shown to the user.
pub fn format_confidence(value: f32) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in for the loaded artifact.
    struct StubModel {
        labels: Vec<&'static str>,
        proba: Vec<f32>,
        fail: bool,
    }

    impl StubModel {
        fn returning(labels: Vec<&'static str>, proba: Vec<f32>) -> Self {
            StubModel {
                labels,
                proba,
                fail: false,
            }
        }

        fn failing() -> Self {
            StubModel {
                labels: Vec::new(),
                proba: Vec::new(),
                fail: true,
            }
        }
    }

    impl Predictor for StubModel {
        fn predict(&self, frame: &Frame) -> Result<Vec<String>, PredictError> {
            if self.fail {
                return Err(PredictError::MissingColumn("age".to_string()));
            }
            Ok((0..frame.row_count())
                .map(|row| self.labels[row % self.labels.len()].to_string())
                .collect())
        }

        fn predict_proba(&self, frame: &Frame) -> Result<Vec<Vec<f32>>, PredictError> {
            if self.fail {
                return Err(PredictError::MissingColumn("age".to_string()));
            }
            Ok(vec![self.proba.clone(); frame.row_count()])
        }
    }

    #[test]
    fn single_prediction_reports_label_and_max_probability() {
        let model = StubModel::returning(vec![">50K"], vec![0.1234, 0.8766]);
        let outcome = single_prediction(&model, &FeatureRecord::default()).unwrap();

        assert_eq!(outcome.label, ">50K");
        assert!((outcome.confidence - 87.66).abs() < 1e-3);
        assert_eq!(outcome.message, "Prediction: >50K (Confidence: 87.66%)");
    }

    #[test]
    fn single_prediction_failure_is_returned_not_panicked() {
        let model = StubModel::failing();
        let err = single_prediction(&model, &FeatureRecord::default()).unwrap_err();
        assert_eq!(err.to_string(), "input is missing column \"age\"");
    }

    #[test]
    fn batch_appends_predictions_in_row_order() {
        let model = StubModel::returning(vec![">50K", "<=50K", ">50K"], vec![0.5, 0.5]);
        let csv = b"age,gender\n25,Male\n52,Female\n33,Male\n";
        let outcome = batch_prediction(&model, csv, 5).unwrap();

        assert_eq!(outcome.row_count, 3);
        assert_eq!(outcome.columns, vec!["age", "gender", "PredictedClass"]);

        let decoded = Frame::from_csv(&outcome.csv).unwrap();
        assert_eq!(decoded.row_count(), 3);
        assert_eq!(decoded.rows()[0], vec!["25", "Male", ">50K"]);
        assert_eq!(decoded.rows()[1], vec!["52", "Female", "<=50K"]);
        assert_eq!(decoded.rows()[2], vec!["33", "Male", ">50K"]);
    }

    #[test]
    fn batch_preview_is_capped() {
        let model = StubModel::returning(vec!["x"], vec![1.0]);
        let csv = b"a\n1\n2\n3\n4\n";
        let outcome = batch_prediction(&model, csv, 2).unwrap();
        assert_eq!(outcome.preview.len(), 2);
        assert_eq!(outcome.row_count, 4);
    }

    #[test]
    fn batch_failure_produces_no_output() {
        let model = StubModel::failing();
        let err = batch_prediction(&model, b"age,gender\n25,Male\n", 5).unwrap_err();
        assert!(matches!(err, PredictionError::Model(_)));
    }

    #[test]
    fn batch_rejects_header_only_upload() {
        let model = StubModel::returning(vec!["x"], vec![1.0]);
        let err = batch_prediction(&model, b"age,gender\n", 5).unwrap_err();
        assert!(matches!(err, PredictionError::EmptyTable));
    }

    #[test]
    fn batch_guards_against_row_count_mismatch() {
        struct ShortModel;
        impl Predictor for ShortModel {
            fn predict(&self, _frame: &Frame) -> Result<Vec<String>, PredictError> {
                Ok(vec!["only-one".to_string()])
            }
            fn predict_proba(&self, _frame: &Frame) -> Result<Vec<Vec<f32>>, PredictError> {
                Ok(vec![vec![1.0]])
            }
        }

        let err = batch_prediction(&ShortModel, b"a\n1\n2\n", 5).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::RowCountMismatch { rows: 2, labels: 1 }
        ));
    }

    #[test]
    fn confidence_renders_two_decimals() {
        assert_eq!(format_confidence(87.66), "87.66");
        assert_eq!(format_confidence(100.0), "100.00");
        assert_eq!(format_confidence(0.5), "0.50");
    }
}
