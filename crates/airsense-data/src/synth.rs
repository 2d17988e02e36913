//! Synthetic labelled readings drawn from a fixed table of sampling rules.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::domain::{QualityTier, SensorFlags, SensorReading, TrainingData};

/// How one sensor value is drawn.
#[derive(Debug, Clone, Copy)]
enum Draw {
    /// Integer in `[low, high)`.
    Int(i64, i64),
    /// Float in `[low, high)`.
    Float(f64, f64),
    /// Float from one of two bands, chosen by a fair coin.
    EitherBand((f64, f64), (f64, f64)),
}

impl Draw {
    fn sample(self, rng: &mut ChaCha8Rng) -> f64 {
        match self {
            Draw::Int(low, high) => rng.gen_range(low..high) as f64,
            Draw::Float(low, high) => rng.gen_range(low..high),
            Draw::EitherBand(a, b) => {
                let (low, high) = if rng.gen_bool(0.5) { a } else { b };
                rng.gen_range(low..high)
            }
        }
    }
}

/// A block of `count` samples sharing one sampling recipe and one labelling.
#[derive(Debug, Clone, Copy)]
struct Rule {
    count: usize,
    co2: Draw,
    co: Draw,
    pm25: Draw,
    temperature: Draw,
    humidity: Draw,
    tier: QualityTier,
    flags: [bool; 5],
}

// Comfortable bands.
const CO2_OK: Draw = Draw::Int(400, 800);
const CO_OK: Draw = Draw::Float(0.0, 5.0);
const PM25_OK: Draw = Draw::Int(0, 25);
const TEMP_OK: Draw = Draw::Float(25.0, 30.0);
const HUM_OK: Draw = Draw::Float(70.0, 85.0);

// Slightly out of band.
const CO2_MID: Draw = Draw::Int(800, 1000);
const CO_MID: Draw = Draw::Float(5.0, 9.0);
const PM25_MID: Draw = Draw::Int(25, 35);
const TEMP_MID: Draw = Draw::Float(30.0, 34.0);
const HUM_MID: Draw = Draw::EitherBand((65.0, 70.0), (85.0, 92.0));

// Clearly out of band.
const CO2_HIGH: Draw = Draw::Int(1000, 2500);
const CO_HIGH: Draw = Draw::Float(9.0, 50.0);
const PM25_BASE: Draw = Draw::Int(0, 30);
const PM25_HIGH: Draw = Draw::Int(35, 100);
const TEMP_HIGH: Draw = Draw::Float(34.0, 40.0);
const HUM_BAD: Draw = Draw::EitherBand((40.0, 65.0), (92.0, 100.0));

const NO_FLAGS: [bool; 5] = [false; 5];

const fn moderate(count: usize, co2: Draw, co: Draw, pm25: Draw, temperature: Draw, humidity: Draw) -> Rule {
    Rule {
        count,
        co2,
        co,
        pm25,
        temperature,
        humidity,
        tier: QualityTier::Moderate,
        flags: NO_FLAGS,
    }
}

const fn poor(count: usize, co2: Draw, co: Draw, pm25: Draw, temperature: Draw, humidity: Draw, flags: [bool; 5]) -> Rule {
    Rule {
        count,
        co2,
        co,
        pm25,
        temperature,
        humidity,
        tier: QualityTier::Poor,
        flags,
    }
}

const RULES: [Rule; 25] = [
    // Good: everything comfortable.
    Rule {
        count: 500,
        co2: Draw::Int(350, 800),
        co: CO_OK,
        pm25: PM25_OK,
        temperature: TEMP_OK,
        humidity: HUM_OK,
        tier: QualityTier::Good,
        flags: NO_FLAGS,
    },
    // Moderate: hovering around the Good/Moderate boundary.
    moderate(
        200,
        Draw::Int(750, 850),
        Draw::Float(4.0, 6.0),
        Draw::Int(20, 30),
        Draw::Float(29.0, 31.0),
        Draw::Float(68.0, 87.0),
    ),
    // Moderate: one sensor slightly out of band.
    moderate(150, CO2_MID, CO_OK, PM25_OK, TEMP_OK, HUM_OK),
    moderate(150, CO2_OK, CO_MID, PM25_OK, TEMP_OK, HUM_OK),
    moderate(150, CO2_OK, CO_OK, PM25_MID, TEMP_OK, HUM_OK),
    moderate(150, CO2_OK, CO_OK, PM25_OK, TEMP_MID, HUM_OK),
    moderate(150, CO2_OK, CO_OK, PM25_OK, TEMP_OK, HUM_MID),
    // Moderate: two sensors slightly out of band.
    moderate(50, CO2_MID, CO_MID, PM25_OK, TEMP_OK, HUM_OK),
    moderate(50, CO2_MID, CO_OK, PM25_MID, TEMP_OK, HUM_OK),
    moderate(50, CO2_MID, CO_OK, PM25_OK, TEMP_MID, HUM_OK),
    moderate(50, CO2_OK, CO_MID, PM25_MID, TEMP_OK, HUM_OK),
    moderate(50, CO2_OK, CO_OK, PM25_MID, TEMP_MID, HUM_OK),
    // Poor: one sensor clearly out of band.
    poor(150, CO2_HIGH, CO_OK, PM25_BASE, TEMP_OK, HUM_OK, [true, false, false, false, false]),
    poor(150, CO2_OK, CO_HIGH, PM25_BASE, TEMP_OK, HUM_OK, [false, true, false, false, false]),
    poor(150, CO2_OK, CO_OK, PM25_HIGH, TEMP_OK, HUM_OK, [false, false, true, false, false]),
    poor(150, CO2_OK, CO_OK, PM25_BASE, TEMP_HIGH, HUM_OK, [false, false, false, true, false]),
    poor(150, CO2_OK, CO_OK, PM25_BASE, TEMP_OK, HUM_BAD, [false, false, false, false, true]),
    // Poor: two sensors.
    poor(100, CO2_HIGH, CO_HIGH, PM25_BASE, TEMP_OK, HUM_OK, [true, true, false, false, false]),
    poor(100, CO2_HIGH, CO_OK, PM25_HIGH, TEMP_OK, HUM_OK, [true, false, true, false, false]),
    poor(100, CO2_HIGH, CO_OK, PM25_BASE, TEMP_HIGH, HUM_OK, [true, false, false, true, false]),
    poor(100, CO2_OK, CO_HIGH, PM25_HIGH, TEMP_OK, HUM_OK, [false, true, true, false, false]),
    poor(100, CO2_OK, CO_OK, PM25_HIGH, TEMP_HIGH, HUM_OK, [false, false, true, true, false]),
    // Poor: three sensors.
    poor(100, CO2_HIGH, CO_HIGH, PM25_HIGH, TEMP_OK, HUM_OK, [true, true, true, false, false]),
    poor(100, CO2_HIGH, CO_HIGH, PM25_BASE, TEMP_HIGH, HUM_OK, [true, true, false, true, false]),
    // Poor: everything bad at once.
    poor(
        200,
        Draw::Int(1500, 3000),
        Draw::Float(15.0, 50.0),
        Draw::Int(75, 200),
        Draw::Float(36.0, 40.0),
        Draw::Float(40.0, 65.0),
        [true, true, true, true, false],
    ),
];

/// Total number of samples [`generate_training_data`] produces.
pub const SYNTHETIC_SAMPLES: usize = 3350;

/// Generate the labelled synthetic training set.
///
/// Samples are emitted rule by rule in table order; the same seed always
/// yields the same data.
#[instrument]
pub fn generate_training_data(seed: u64) -> TrainingData {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = TrainingData::new();

    for rule in &RULES {
        for _ in 0..rule.count {
            let reading = SensorReading::new(
                rule.co2.sample(&mut rng),
                rule.co.sample(&mut rng),
                rule.pm25.sample(&mut rng),
                rule.temperature.sample(&mut rng),
                rule.humidity.sample(&mut rng),
            );
            data.push(reading, rule.tier, SensorFlags::from_mask(rule.flags));
        }
    }

    debug!(n_samples = data.len(), n_rules = RULES.len(), "synthetic data generated");
    data
}

#[cfg(test)]
mod tests {
    use super::{SYNTHETIC_SAMPLES, generate_training_data};
    use crate::domain::{QualityTier, Sensor};

    #[test]
    fn produces_expected_row_count() {
        let data = generate_training_data(42);
        assert_eq!(data.len(), SYNTHETIC_SAMPLES);
        assert_eq!(data.tiers().len(), SYNTHETIC_SAMPLES);
        assert_eq!(data.flags().len(), SYNTHETIC_SAMPLES);
    }

    #[test]
    fn tier_counts_match_rules() {
        let data = generate_training_data(42);
        let count = |tier| data.tiers().iter().filter(|&&t| t == tier).count();
        assert_eq!(count(QualityTier::Good), 500);
        assert_eq!(count(QualityTier::Moderate), 1200);
        assert_eq!(count(QualityTier::Poor), 1650);
    }

    #[test]
    fn flags_only_on_poor_rows() {
        let data = generate_training_data(42);
        for (tier, flags) in data.tiers().iter().zip(data.flags()) {
            if *tier != QualityTier::Poor {
                assert!(flags.is_empty());
            } else {
                assert!(!flags.is_empty());
            }
        }
    }

    #[test]
    fn flagged_sensors_are_out_of_band() {
        let data = generate_training_data(7);
        for (reading, flags) in data.readings().iter().zip(data.flags()) {
            if flags.is_set(Sensor::Co2) {
                assert!(reading.co2 >= 1000.0);
            }
            if flags.is_set(Sensor::Co) {
                assert!(reading.co >= 9.0);
            }
            if flags.is_set(Sensor::Pm25) {
                assert!(reading.pm25 >= 35.0);
            }
            if flags.is_set(Sensor::Temperature) {
                assert!(reading.temperature >= 34.0);
            }
            if flags.is_set(Sensor::Humidity) {
                assert!(reading.humidity < 65.0 || reading.humidity >= 92.0);
            }
        }
    }

    #[test]
    fn integer_sensors_draw_integers() {
        let data = generate_training_data(42);
        for reading in data.readings() {
            assert_eq!(reading.co2.fract(), 0.0);
            assert_eq!(reading.pm25.fract(), 0.0);
        }
    }

    #[test]
    fn same_seed_same_data() {
        assert_eq!(generate_training_data(5), generate_training_data(5));
        assert_ne!(generate_training_data(5), generate_training_data(6));
    }
}
