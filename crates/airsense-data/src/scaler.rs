//! Per-column standardization fitted once on training data.

use tracing::debug;

use crate::DataError;

/// Centers each column on its training mean and divides by its population
/// standard deviation. Columns with zero variance use a scale of 1.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit the per-column statistics on a row-major feature matrix.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::EmptyScalerInput`] | `features` is empty |
    /// | [`DataError::ScalerFeatureMismatch`] | rows have inconsistent widths |
    /// | [`DataError::NonFiniteFeature`] | any value is NaN or infinite |
    pub fn fit(features: &[Vec<f64>]) -> Result<Self, DataError> {
        let Some(first) = features.first() else {
            return Err(DataError::EmptyScalerInput);
        };
        let width = first.len();
        check_rows(features, width)?;

        let n = features.len() as f64;
        let mut mean = vec![0.0f64; width];
        for row in features {
            for (m, &v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0f64; width];
        for row in features {
            for ((acc, &v), &m) in var.iter_mut().zip(row).zip(&mean) {
                *acc += (v - m) * (v - m);
            }
        }
        let scale: Vec<f64> = var
            .into_iter()
            .map(|acc| {
                let std = (acc / n).sqrt();
                if std > 0.0 { std } else { 1.0 }
            })
            .collect();

        debug!(n_samples = features.len(), n_features = width, "scaler fitted");

        Ok(Self { mean, scale })
    }

    /// Standardize every row.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::ScalerFeatureMismatch`] | a row's width differs from the fitted width |
    /// | [`DataError::NonFiniteFeature`] | any value is NaN or infinite |
    pub fn transform(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, DataError> {
        check_rows(features, self.n_features())?;
        Ok(features.iter().map(|row| self.apply(row)).collect())
    }

    /// Standardize a single row.
    ///
    /// # Errors
    ///
    /// Same as [`StandardScaler::transform`].
    pub fn transform_one(&self, sample: &[f64]) -> Result<Vec<f64>, DataError> {
        check_row(0, sample, self.n_features())?;
        Ok(self.apply(sample))
    }

    /// Return the fitted column means.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Return the fitted column scales.
    #[must_use]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Return the number of columns the scaler was fitted on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn apply(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&v, (&m, &s))| (v - m) / s)
            .collect()
    }
}

fn check_rows(features: &[Vec<f64>], width: usize) -> Result<(), DataError> {
    features
        .iter()
        .enumerate()
        .try_for_each(|(sample_index, row)| check_row(sample_index, row, width))
}

fn check_row(sample_index: usize, row: &[f64], width: usize) -> Result<(), DataError> {
    if row.len() != width {
        return Err(DataError::ScalerFeatureMismatch {
            expected: width,
            got: row.len(),
            sample_index,
        });
    }
    match row.iter().position(|v| !v.is_finite()) {
        Some(feature_index) => Err(DataError::NonFiniteFeature {
            sample_index,
            feature_index,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::StandardScaler;
    use crate::DataError;

    #[test]
    fn training_columns_become_standard() {
        let features = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![4.0, 40.0],
        ];
        let scaler = StandardScaler::fit(&features).unwrap();
        let scaled = scaler.transform(&features).unwrap();

        for col in 0..2 {
            let values: Vec<f64> = scaled.iter().map(|r| r[col]).collect();
            let mean = values.iter().sum::<f64>() / 4.0;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_column_uses_unit_scale() {
        let features = vec![vec![5.0, 1.0], vec![5.0, 3.0]];
        let scaler = StandardScaler::fit(&features).unwrap();
        assert_eq!(scaler.scale()[0], 1.0);
        assert_eq!(scaler.transform_one(&[7.0, 2.0]).unwrap(), vec![2.0, 0.0]);
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(StandardScaler::fit(&[]), Err(DataError::EmptyScalerInput)));
    }

    #[test]
    fn wrong_width_rejected() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let err = scaler.transform_one(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            DataError::ScalerFeatureMismatch { expected: 2, got: 1, .. }
        ));
    }

    #[test]
    fn non_finite_rejected() {
        let err = StandardScaler::fit(&[vec![1.0], vec![f64::INFINITY]]).unwrap_err();
        assert!(matches!(
            err,
            DataError::NonFiniteFeature { sample_index: 1, feature_index: 0 }
        ));
    }
}
