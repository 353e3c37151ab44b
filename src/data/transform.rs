use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};

/// Per-pixel preprocessing step applied when a sample is read.
///
/// Deserializing goes through `Transform::normalize`, so a stored
/// `Normalize` with a zero std is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransformRepr")]
pub enum Transform {
    /// `u8` intensity to `[0, 1]`.
    ToTensor,
    /// `(x - mean) / std`.
    Normalize { mean: f64, std: f64 },
}

#[derive(Deserialize)]
enum TransformRepr {
    ToTensor,
    Normalize { mean: f64, std: f64 },
}

impl TryFrom<TransformRepr> for Transform {
    type Error = NnError;

    fn try_from(repr: TransformRepr) -> Result<Transform> {
        match repr {
            TransformRepr::ToTensor => Ok(Transform::ToTensor),
            TransformRepr::Normalize { mean, std } => Transform::normalize(mean, std),
        }
    }
}

impl Transform {
    pub fn normalize(mean: f64, std: f64) -> Result<Transform> {
        if std == 0.0 || !std.is_finite() || !mean.is_finite() {
            return Err(NnError::InvalidConfig(format!(
                "Normalize needs a finite mean and a finite non-zero std, got mean={} std={}",
                mean, std
            )));
        }
        Ok(Transform::Normalize { mean, std })
    }

    pub fn apply(&self, x: f64) -> f64 {
        match *self {
            Transform::ToTensor => x / 255.0,
            Transform::Normalize { mean, std } => (x - mean) / std,
        }
    }
}

/// An ordered list of transforms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Compose(pub Vec<Transform>);

impl Compose {
    /// `ToTensor` only: pixels in `[0, 1]`.
    pub fn to_tensor() -> Compose {
        Compose(vec![Transform::ToTensor])
    }

    /// `ToTensor` then `Normalize(0.5, 0.5)`: pixels in `[-1, 1]`.
    pub fn mnist() -> Compose {
        Compose(vec![Transform::ToTensor, Transform::Normalize { mean: 0.5, std: 0.5 }])
    }

    pub fn apply(&self, pixel: u8) -> f64 {
        self.0.iter().fold(pixel as f64, |x, t| t.apply(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnist_transform_maps_to_unit_interval_around_zero() {
        let t = Compose::mnist();
        assert_eq!(t.apply(0), -1.0);
        assert_eq!(t.apply(255), 1.0);
        assert!(t.apply(128).abs() < 0.01);
        assert_eq!(Compose::to_tensor().apply(255), 1.0);
    }

    #[test]
    fn empty_compose_is_raw_intensity() {
        assert_eq!(Compose::default().apply(200), 200.0);
    }

    #[test]
    fn zero_std_is_rejected() {
        assert!(Transform::normalize(0.5, 0.0).is_err());
        assert!(Transform::normalize(0.1307, 0.3081).is_ok());
    }

    #[test]
    fn deserializing_validates_normalize() {
        let bad = serde_json::from_str::<Transform>(r#"{"Normalize":{"mean":0.5,"std":0.0}}"#);
        assert!(bad.is_err());

        let compose: Compose = serde_json::from_str(r#"["ToTensor",{"Normalize":{"mean":0.5,"std":0.5}}]"#).unwrap();
        assert_eq!(compose, Compose::mnist());
        assert!(serde_json::from_str::<Compose>(r#"["ToTensor",{"Normalize":{"mean":0.0,"std":0.0}}]"#).is_err());
    }
}
