//! Plain-text reports of predictions: an ASCII rendering of a digit next to
//! one bar per class probability.

use crate::error::{NnError, Result};
use crate::math::matrix::{argmax, Matrix};
use crate::network::metadata::ModelMetadata;

/// Darkest to brightest.
const SHADES: &[u8] = b" .:-=+*#%@";
const BAR_WIDTH: usize = 40;

/// One row of an output probability batch, paired with its true label.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub index: usize,
    pub label: Option<u8>,
    pub probabilities: Vec<f64>,
    pub predicted: usize,
    pub confidence: f64,
}

impl Prediction {
    pub fn is_correct(&self) -> Option<bool> {
        self.label.map(|l| l as usize == self.predicted)
    }
}

/// Pairs every row of `probabilities` with the label at the same position.
/// `labels` may be empty when the truth is unknown.
pub fn predictions(probabilities: &Matrix, labels: &[u8]) -> Result<Vec<Prediction>> {
    if !labels.is_empty() && labels.len() != probabilities.rows {
        return Err(NnError::shape("predictions", probabilities.rows, labels.len()));
    }
    Ok(probabilities
        .data
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let predicted = argmax(row);
            Prediction {
                index,
                label: labels.get(index).copied(),
                probabilities: row.clone(),
                predicted,
                confidence: row.get(predicted).copied().unwrap_or(0.0),
            }
        })
        .collect())
}

/// Renders a single-channel image of the given width as ASCII shades,
/// scaling between the image's own minimum and maximum.
pub fn render_digit(pixels: &[f64], width: usize) -> Result<String> {
    if width == 0 || pixels.len() % width != 0 {
        return Err(NnError::shape("render_digit", format!("a multiple of {}", width), pixels.len()));
    }
    let (lo, hi) = pixels
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    let span = if hi > lo { hi - lo } else { 1.0 };

    let mut out = String::with_capacity(pixels.len() * 2 + pixels.len() / width);
    for row in pixels.chunks(width) {
        for &x in row {
            let level = (((x - lo) / span) * (SHADES.len() - 1) as f64).round() as usize;
            let c = SHADES[level.min(SHADES.len() - 1)] as char;
            // Two columns per pixel keeps the aspect ratio close to square.
            out.push(c);
            out.push(c);
        }
        out.push('\n');
    }
    Ok(out)
}

/// Digit art followed by one bar per class.
pub fn classify_report(pixels: &[f64], width: usize, prediction: &Prediction, metadata: Option<&ModelMetadata>) -> Result<String> {
    let mut out = render_digit(pixels, width)?;
    let label_of = |class: usize| metadata.map(|m| m.label(class)).unwrap_or_else(|| class.to_string());

    for (class, &p) in prediction.probabilities.iter().enumerate() {
        let filled = if p.is_finite() { (p.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize } else { 0 };
        let marker = if class == prediction.predicted { '<' } else { ' ' };
        out.push_str(&format!(
            "{:>3} |{:<width$}| {:6.4} {}\n",
            label_of(class),
            "#".repeat(filled),
            p,
            marker,
            width = BAR_WIDTH
        ));
    }

    let truth = prediction.label.map(|l| label_of(l as usize)).unwrap_or_else(|| "?".to_owned());
    out.push_str(&format!(
        "predicted {} ({:.2}%), label {}\n",
        label_of(prediction.predicted),
        prediction.confidence * 100.0,
        truth
    ));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predictions_pick_argmax_and_pair_labels() {
        let p = Matrix::from_data(vec![vec![0.1, 0.7, 0.2], vec![0.5, 0.2, 0.3]]);
        let preds = predictions(&p, &[1, 2]).unwrap();
        assert_eq!(preds[0].predicted, 1);
        assert_eq!(preds[0].is_correct(), Some(true));
        assert_eq!(preds[1].predicted, 0);
        assert_eq!(preds[1].is_correct(), Some(false));
        assert!((preds[0].confidence - 0.7).abs() < 1e-12);

        assert!(predictions(&p, &[1]).is_err());
        assert_eq!(predictions(&p, &[]).unwrap()[0].label, None);
    }

    #[test]
    fn render_digit_uses_extremes() {
        let art = render_digit(&[0.0, 1.0, 1.0, 0.0], 2).unwrap();
        assert_eq!(art, "  @@\n@@  \n");
        assert!(render_digit(&[0.0; 5], 2).is_err());
    }

    #[test]
    fn report_marks_prediction() {
        let p = Matrix::from_data(vec![vec![0.0, 0.0, 1.0]]);
        let pred = predictions(&p, &[2]).unwrap().remove(0);
        let report = classify_report(&[0.5; 4], 2, &pred, None).unwrap();
        let bars: Vec<&str> = report.lines().filter(|l| l.contains('|')).collect();
        assert_eq!(bars.len(), 3);
        assert!(bars[2].ends_with('<'));
        assert!(bars[2].contains(&"#".repeat(BAR_WIDTH)));
        assert!(report.contains("predicted 2 (100.00%), label 2"));
    }
}
