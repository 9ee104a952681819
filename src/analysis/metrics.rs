/// Goodness-of-fit statistics for modeled vs. observed discharge.
///
/// Every metric works at full precision. Rounding for the plot title is a
/// separate step (`MetricSet::rounded`) so callers that need the raw values
/// never see display artifacts.
///
/// Undefined results are errors: a zero-variance observed series, a zero
/// observed mean, a zero observed value under MAPE, or any metric that
/// overflows produce `EvalError::DegenerateInput` instead of NaN or infinity.

use crate::model::{AlignedPair, EvalError, MetricSet};

/// Minimum aligned points for any metric to be meaningful.
pub const MIN_POINTS: usize = 2;

/// Computes the full metric set over an aligned pair.
///
/// Fails with `InsufficientData` below `MIN_POINTS`, and with
/// `DegenerateInput` when any single metric is undefined.
pub fn compute(pair: &AlignedPair) -> Result<MetricSet, EvalError> {
    if pair.len() < MIN_POINTS {
        return Err(EvalError::InsufficientData { points: pair.len() });
    }

    let observed = pair.observed();
    let modeled = pair.modeled();

    let kge = kling_gupta(&observed, &modeled)?;

    let metrics = MetricSet {
        r2: r2_score(&observed, &modeled)?,
        rmse: rmse(&observed, &modeled),
        max_error: max_error(&observed, &modeled),
        mape_percent: mape_percent(&observed, &modeled)?,
        kge: kge.kge,
        kge_r: kge.r,
        kge_alpha: kge.alpha,
        kge_beta: kge.beta,
    };
    ensure_finite(&metrics)?;
    Ok(metrics)
}

fn ensure_finite(metrics: &MetricSet) -> Result<(), EvalError> {
    let named = [
        ("r2", metrics.r2),
        ("rmse", metrics.rmse),
        ("max_error", metrics.max_error),
        ("mape", metrics.mape_percent),
        ("kge", metrics.kge),
        ("kge_r", metrics.kge_r),
        ("kge_alpha", metrics.kge_alpha),
        ("kge_beta", metrics.kge_beta),
    ];
    match named.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, value)) => Err(EvalError::DegenerateInput(format!(
            "{} is not finite ({})",
            name, value
        ))),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Individual metrics
// ---------------------------------------------------------------------------

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// At most 1.0; negative when the model does worse than the observed mean.
pub fn r2_score(observed: &[f64], modeled: &[f64]) -> Result<f64, EvalError> {
    let mean_obs = mean(observed);
    let ss_tot: f64 = observed.iter().map(|o| (o - mean_obs).powi(2)).sum();
    if ss_tot == 0.0 {
        return Err(EvalError::DegenerateInput(
            "r2 undefined: observed series has zero variance".to_string(),
        ));
    }
    let ss_res: f64 = observed
        .iter()
        .zip(modeled)
        .map(|(o, m)| (o - m).powi(2))
        .sum();
    Ok(1.0 - ss_res / ss_tot)
}

/// Root-mean-square error.
pub fn rmse(observed: &[f64], modeled: &[f64]) -> f64 {
    let mse = observed
        .iter()
        .zip(modeled)
        .map(|(o, m)| (o - m).powi(2))
        .sum::<f64>()
        / observed.len() as f64;
    mse.sqrt()
}

/// Largest absolute paired difference.
pub fn max_error(observed: &[f64], modeled: &[f64]) -> f64 {
    observed
        .iter()
        .zip(modeled)
        .map(|(o, m)| (o - m).abs())
        .fold(0.0, f64::max)
}

/// Mean absolute percentage error, as a percentage.
///
/// Any zero observation aborts the whole computation; zero-flow points are
/// not silently dropped.
pub fn mape_percent(observed: &[f64], modeled: &[f64]) -> Result<f64, EvalError> {
    if let Some(i) = observed.iter().position(|&o| o == 0.0) {
        return Err(EvalError::DegenerateInput(format!(
            "mape undefined: observed value at index {} is zero",
            i
        )));
    }
    let ratio = observed
        .iter()
        .zip(modeled)
        .map(|(o, m)| ((o - m) / o).abs())
        .sum::<f64>()
        / observed.len() as f64;
    Ok(ratio * 100.0)
}

/// Kling-Gupta Efficiency and its three components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KgeComponents {
    pub kge: f64,
    /// Pearson correlation between modeled and observed.
    pub r: f64,
    /// Variability ratio, std(modeled) / std(observed).
    pub alpha: f64,
    /// Bias ratio, mean(modeled) / mean(observed).
    pub beta: f64,
}

/// `KGE = 1 - sqrt((r-1)^2 + (alpha-1)^2 + (beta-1)^2)`.
///
/// Standard deviations are population (divide by n).
pub fn kling_gupta(observed: &[f64], modeled: &[f64]) -> Result<KgeComponents, EvalError> {
    let mean_obs = mean(observed);
    let mean_sim = mean(modeled);
    let std_obs = population_std(observed, mean_obs);
    let std_sim = population_std(modeled, mean_sim);

    if std_obs == 0.0 {
        return Err(EvalError::DegenerateInput(
            "kge undefined: observed series has zero standard deviation".to_string(),
        ));
    }
    if mean_obs == 0.0 {
        return Err(EvalError::DegenerateInput(
            "kge undefined: observed series has zero mean".to_string(),
        ));
    }
    if std_sim == 0.0 {
        return Err(EvalError::DegenerateInput(
            "kge undefined: modeled series is constant, correlation undefined".to_string(),
        ));
    }

    let sxy: f64 = observed
        .iter()
        .zip(modeled)
        .map(|(o, m)| (o - mean_obs) * (m - mean_sim))
        .sum();
    let sxx: f64 = observed.iter().map(|o| (o - mean_obs).powi(2)).sum();
    let syy: f64 = modeled.iter().map(|m| (m - mean_sim).powi(2)).sum();

    // Square roots taken separately so large flows don't overflow the product.
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    let alpha = std_sim / std_obs;
    let beta = mean_sim / mean_obs;
    let kge = 1.0 - ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt();

    Ok(KgeComponents { kge, r, alpha, beta })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64], mean: f64) -> f64 {
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

// ---------------------------------------------------------------------------
// Display rounding
// ---------------------------------------------------------------------------

/// Metric values rounded for presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    pub r2: f64,
    pub rmse: f64,
    pub max_error: f64,
    pub mape_percent: f64,
    pub kge: f64,
    pub kge_r: f64,
    pub kge_alpha: f64,
    pub kge_beta: f64,
}

impl MetricSet {
    /// Two decimals for R² and the KGE family; whole cfs for RMSE and
    /// MaxError; whole percent for MAPE.
    pub fn rounded(&self) -> DisplayMetrics {
        DisplayMetrics {
            r2: round_to(self.r2, 2),
            rmse: round_to(self.rmse, 0),
            max_error: round_to(self.max_error, 0),
            mape_percent: round_to(self.mape_percent, 0),
            kge: round_to(self.kge, 2),
            kge_r: round_to(self.kge_r, 2),
            kge_alpha: round_to(self.kge_alpha, 2),
            kge_beta: round_to(self.kge_beta, 2),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    // Avoid "-0" in titles.
    if rounded == 0.0 { 0.0 } else { rounded }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
