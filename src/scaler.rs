// Column standardisation fitted on the training partition and replayed at inference.
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PredictorError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Population mean and standard deviation per column. A constant column
    /// gets scale 1.0 so it maps to zero instead of NaN.
    pub fn fit(x: ArrayView2<f64>) -> Result<Self> {
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PredictorError::EmptyDataset("cannot fit scaler on zero rows".into()))?;
        let std = x.std_axis(Axis(0), 0.0);
        let scale = std
            .iter()
            .map(|&s| if s > f64::EPSILON { s } else { 1.0 })
            .collect();
        Ok(Self {
            mean: mean.to_vec(),
            scale,
        })
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let mut out = x.to_owned();
        for mut row in out.rows_mut() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (*v - self.mean[j]) / self.scale[j];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn fit_uses_population_statistics() {
        let x = array![[1.0, 5.0], [3.0, 5.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();
        assert_eq!(scaler.mean, vec![2.0, 5.0]);
        assert_abs_diff_eq!(scaler.scale[0], 1.0, epsilon = 1e-12);
        // constant column
        assert_eq!(scaler.scale[1], 1.0);
    }

    #[test]
    fn transform_matches_transform_row() {
        let train = array![[0.0, 10.0], [4.0, 30.0], [2.0, 20.0]];
        let scaler = StandardScaler::fit(train.view()).unwrap();

        let test = array![[1.0, 25.0], [-3.0, 0.0]];
        let scaled = scaler.transform(test.view());
        for (i, row) in test.rows().into_iter().enumerate() {
            let expect = scaler.transform_row(row.as_slice().unwrap());
            for (j, e) in expect.iter().enumerate() {
                assert_abs_diff_eq!(scaled[(i, j)], *e, epsilon = 1e-12);
            }
        }
        assert_abs_diff_eq!(scaled[(0, 0)], -1.0 / (8.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn empty_input_is_rejected() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            StandardScaler::fit(x.view()),
            Err(PredictorError::EmptyDataset(_))
        ));
    }
}
