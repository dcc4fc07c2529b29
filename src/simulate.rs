//! Simulated production data.
//!
//! When no current dataset is available, a stand-in is derived from the
//! baseline by perturbing its numeric cells with seeded Gaussian noise.
//! The same seed always yields the same table.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    error::{Error, Result},
    table::{Cell, Table},
};

/// Default noise for a simulated current dataset.
pub const DEFAULT_CURRENT_NOISE_STD: f64 = 0.01;
/// Default seed for a simulated current dataset.
pub const DEFAULT_CURRENT_SEED: u64 = 456;
/// Default seed for baseline noise.
pub const DEFAULT_BASELINE_SEED: u64 = 123;

/// Gaussian noise settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseConfig {
    /// Standard deviation of the additive noise. Zero or less disables it.
    pub std_dev: f64,
    /// Random seed.
    pub seed: u64,
}

impl NoiseConfig {
    /// Create noise settings.
    pub fn new(std_dev: f64, seed: u64) -> Self {
        Self { std_dev, seed }
    }

    /// Returns true if applying this config changes nothing.
    pub fn is_noop(&self) -> bool {
        self.std_dev <= 0.0
    }

    /// Check that the standard deviation is finite.
    ///
    /// # Errors
    ///
    /// Returns an invalid-config error for NaN or infinite `std_dev`.
    pub fn validate(&self) -> Result<()> {
        if !self.std_dev.is_finite() {
            return Err(Error::invalid_config(format!(
                "noise standard deviation must be finite, got {}",
                self.std_dev
            )));
        }
        Ok(())
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENT_NOISE_STD, DEFAULT_CURRENT_SEED)
    }
}

/// Return a copy of `table` with N(0, std_dev²) noise added to every numeric
/// cell outside the `exclude` columns. Null and text cells are untouched.
///
/// # Errors
///
/// Returns an invalid-config error if `noise` fails validation.
pub fn add_gaussian_noise(table: &Table, noise: NoiseConfig, exclude: &[String]) -> Result<Table> {
    noise.validate()?;
    let mut noisy = table.clone();
    if noise.is_noop() {
        return Ok(noisy);
    }

    let mut rng = StdRng::seed_from_u64(noise.seed);
    for column in noisy.columns_mut() {
        if exclude.iter().any(|e| e == column.name()) {
            continue;
        }
        for cell in column.cells_mut() {
            if let Cell::Number(v) = *cell {
                *cell = Cell::number(v + noise.std_dev * standard_normal(&mut rng));
            }
        }
    }

    tracing::debug!(
        std_dev = noise.std_dev,
        seed = noise.seed,
        rows = noisy.num_rows(),
        "applied gaussian noise"
    );
    Ok(noisy)
}

/// One standard normal draw (Box-Muller).
fn standard_normal(rng: &mut impl Rng) -> f64 {
    // 1 - [0, 1) keeps u1 away from zero
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn sample() -> Table {
        Table::new(vec![
            Column::from_f64("x", &(0..1000).map(f64::from).collect::<Vec<_>>()),
            Column::new(
                "mixed",
                (0..1000)
                    .map(|i| match i % 3 {
                        0 => Cell::Null,
                        1 => Cell::text("a"),
                        _ => Cell::Number(1.0),
                    })
                    .collect(),
            ),
            Column::from_f64("label", &vec![1.0; 1000]),
        ])
        .unwrap()
    }

    #[test]
    fn test_same_seed_same_output() {
        let table = sample();
        let a = add_gaussian_noise(&table, NoiseConfig::new(0.5, 7), &[]).unwrap();
        let b = add_gaussian_noise(&table, NoiseConfig::new(0.5, 7), &[]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, table);
    }

    #[test]
    fn test_different_seed_different_output() {
        let table = sample();
        let a = add_gaussian_noise(&table, NoiseConfig::new(0.5, 1), &[]).unwrap();
        let b = add_gaussian_noise(&table, NoiseConfig::new(0.5, 2), &[]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_std_is_identity() {
        let table = sample();
        let same = add_gaussian_noise(&table, NoiseConfig::new(0.0, 1), &[]).unwrap();
        assert_eq!(same, table);
        assert!(NoiseConfig::new(-1.0, 1).is_noop());
    }

    #[test]
    fn test_only_numbers_outside_exclusions_change() {
        let table = sample();
        let noisy =
            add_gaussian_noise(&table, NoiseConfig::new(0.1, 3), &["label".to_string()]).unwrap();

        assert_eq!(noisy.column("label"), table.column("label"));
        let before = table.column("mixed").unwrap().cells();
        let after = noisy.column("mixed").unwrap().cells();
        for (b, a) in before.iter().zip(after) {
            match b {
                Cell::Number(_) => assert!(matches!(a, Cell::Number(_))),
                other => assert_eq!(a, other),
            }
        }
    }

    #[test]
    fn test_noise_has_expected_spread() {
        let table = sample();
        let noisy = add_gaussian_noise(&table, NoiseConfig::new(2.0, 42), &[]).unwrap();
        let diffs: Vec<f64> = table
            .column("x")
            .unwrap()
            .cells()
            .iter()
            .zip(noisy.column("x").unwrap().cells())
            .filter_map(|(b, a)| Some(a.as_number()? - b.as_number()?))
            .collect();

        let n = diffs.len() as f64;
        let mean = diffs.iter().sum::<f64>() / n;
        let std = (diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert!(mean.abs() < 0.3, "mean = {mean}");
        assert!((std - 2.0).abs() < 0.3, "std = {std}");
    }

    #[test]
    fn test_non_finite_std_rejected() {
        let result = add_gaussian_noise(&sample(), NoiseConfig::new(f64::NAN, 1), &[]);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_defaults() {
        let noise = NoiseConfig::default();
        assert_eq!(noise.std_dev, 0.01);
        assert_eq!(noise.seed, 456);
    }
}
