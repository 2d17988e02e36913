//! Held-out evaluation of the quality tree, broken down by tier.

use std::collections::BTreeMap;

use airsense_data::QualityTier;

use crate::ModelError;

/// How the quality tree did on one true tier.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TierRow {
    /// The true tier this row covers.
    pub tier: QualityTier,
    /// Held-out readings whose true tier is `tier`.
    pub support: usize,
    /// Of those, how many were predicted as `tier`.
    pub hits: usize,
    /// Readings of any true tier predicted as `tier`.
    pub predicted: usize,
    /// `hits / support`, 0 without support.
    pub recall: f64,
    /// `hits / predicted`, 0 when `tier` was never predicted.
    pub precision: f64,
    /// Where the readings of this tier ended up, by predicted tier.
    pub predicted_as: BTreeMap<QualityTier, usize>,
}

/// Accuracy of the quality tree plus one [`TierRow`] per tier.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TierEvaluation {
    /// Share of readings whose predicted tier matched.
    pub accuracy: f64,
    /// Rows in [`QualityTier::ALL`] order.
    pub tiers: Vec<TierRow>,
}

impl TierEvaluation {
    /// Compare true tiers against predicted class indices.
    ///
    /// An empty input yields accuracy 0 and all-zero rows.
    ///
    /// # Errors
    ///
    /// - [`ModelError::EvaluationLengthMismatch`] when the slices differ in length.
    /// - [`ModelError::Data`] when a prediction is not a tier index.
    pub fn from_predictions(truth: &[QualityTier], predicted: &[usize]) -> Result<Self, ModelError> {
        if truth.len() != predicted.len() {
            return Err(ModelError::EvaluationLengthMismatch {
                expected: truth.len(),
                got: predicted.len(),
            });
        }

        let mut pairs: BTreeMap<(QualityTier, QualityTier), usize> = BTreeMap::new();
        for (&actual, &class) in truth.iter().zip(predicted) {
            *pairs.entry((actual, QualityTier::from_index(class)?)).or_default() += 1;
        }

        let count = |filter: &dyn Fn(QualityTier, QualityTier) -> bool| -> usize {
            pairs
                .iter()
                .filter(|&(&(a, p), _)| filter(a, p))
                .map(|(_, &n)| n)
                .sum()
        };
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

        let tiers = QualityTier::ALL
            .iter()
            .map(|&tier| {
                let support = count(&|a, _| a == tier);
                let hits = count(&|a, p| a == tier && p == tier);
                let predicted = count(&|_, p| p == tier);
                TierRow {
                    tier,
                    support,
                    hits,
                    predicted,
                    recall: ratio(hits, support),
                    precision: ratio(hits, predicted),
                    predicted_as: QualityTier::ALL
                        .iter()
                        .map(|&p| (p, pairs.get(&(tier, p)).copied().unwrap_or(0)))
                        .collect(),
                }
            })
            .collect();

        let correct = count(&|a, p| a == p);
        Ok(Self {
            accuracy: ratio(correct, truth.len()),
            tiers,
        })
    }

    /// Return the row for `tier`.
    #[must_use]
    pub fn row(&self, tier: QualityTier) -> &TierRow {
        &self.tiers[tier.index()]
    }
}
