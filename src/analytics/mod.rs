pub mod depth;
pub mod long_short;
pub mod volume;

pub use depth::{analyze_depth, DepthAnalysis, DepthChartData, LadderEntry, VwapData};
pub use long_short::{analyze_long_short, LongShortAnalysis, RatioTrend, Sentiment};
pub use volume::{analyze_volume, VolumeAnalysis, VolumeStrength, VolumeTrend};

/// Samples on each side of the recent-vs-prior trend comparison.
const TREND_SAMPLES: usize = 3;

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Relative change of the newest three samples against the three before
/// them. Series are newest first. `None` without six samples or when the
/// prior mean is zero.
pub(crate) fn recent_change(values: &[f64]) -> Option<f64> {
    if values.len() < TREND_SAMPLES * 2 {
        return None;
    }

    let recent = mean(&values[..TREND_SAMPLES]);
    let prior = mean(&values[TREND_SAMPLES..TREND_SAMPLES * 2]);

    if prior == 0.0 {
        return None;
    }

    Some((recent - prior) / prior)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_recent_change_needs_six_samples() {
        assert_eq!(recent_change(&[1.0, 1.0, 1.0, 1.0, 1.0]), None);
        assert_eq!(recent_change(&[2.0, 2.0, 2.0, 1.0, 1.0, 1.0]), Some(1.0));
    }

    #[test]
    fn test_recent_change_ignores_older_samples() {
        let change = recent_change(&[3.0, 3.0, 3.0, 2.0, 2.0, 2.0, 100.0]).unwrap();
        assert!((change - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_recent_change_zero_prior() {
        assert_eq!(recent_change(&[1.0, 1.0, 1.0, 0.0, 0.0, 0.0]), None);
    }
}
