use serde::Serialize;

use super::{mean, recent_change};
use crate::market::VolumeData;

const EXTREME_RATIO: f64 = 3.0;
const HIGH_RATIO: f64 = 2.0;
const LOW_RATIO: f64 = 0.5;
const TREND_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeStrength {
    Low,
    Normal,
    High,
    Extreme,
}

impl VolumeStrength {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > EXTREME_RATIO {
            VolumeStrength::Extreme
        } else if ratio > HIGH_RATIO {
            VolumeStrength::High
        } else if ratio < LOW_RATIO {
            VolumeStrength::Low
        } else {
            VolumeStrength::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeStrength::Low => "low",
            VolumeStrength::Normal => "normal",
            VolumeStrength::High => "high",
            VolumeStrength::Extreme => "extreme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl VolumeTrend {
    pub fn from_change(change: Option<f64>) -> Self {
        match change {
            Some(c) if c > TREND_THRESHOLD => VolumeTrend::Increasing,
            Some(c) if c < -TREND_THRESHOLD => VolumeTrend::Decreasing,
            _ => VolumeTrend::Stable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeTrend::Increasing => "increasing",
            VolumeTrend::Decreasing => "decreasing",
            VolumeTrend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeAnalysis {
    pub current_volume: f64,
    pub average_volume: f64,
    pub volume_ratio: f64,
    pub strength: VolumeStrength,
    pub trend: VolumeTrend,
    pub recommendation: &'static str,
}

/// Classify a newest-first volume series. Samples past `window` are
/// ignored; an empty window yields `None`.
pub fn analyze_volume(series: &[VolumeData], window: usize) -> Option<VolumeAnalysis> {
    let volumes: Vec<f64> = series
        .iter()
        .take(window)
        .map(VolumeData::volume_f64)
        .collect();

    let current_volume = *volumes.first()?;
    let average_volume = mean(&volumes);
    let volume_ratio = if average_volume > 0.0 {
        current_volume / average_volume
    } else {
        0.0
    };

    let strength = VolumeStrength::from_ratio(volume_ratio);
    let trend = VolumeTrend::from_change(recent_change(&volumes));

    Some(VolumeAnalysis {
        current_volume,
        average_volume,
        volume_ratio,
        strength,
        trend,
        recommendation: recommendation(strength, trend),
    })
}

fn recommendation(strength: VolumeStrength, trend: VolumeTrend) -> &'static str {
    use VolumeStrength::*;
    use VolumeTrend::*;

    match (strength, trend) {
        (Extreme, Increasing) => {
            "Volume surge accelerating, expect a breakout and volatile price action"
        }
        (Extreme, _) => "Extreme volume spike, watch for a reversal or breakout",
        (High, Increasing) => "Strong participation building, trend continuation likely",
        (High, Decreasing) => "Elevated but fading volume, momentum may be exhausting",
        (High, Stable) => "Above-average activity, confirm direction before entering",
        (Low, Decreasing) => "Volume drying up, avoid new positions until activity returns",
        (Low, _) => "Thin market, expect wider spreads and unreliable signals",
        (Normal, Increasing) => "Volume picking up, monitor for an emerging move",
        (Normal, Decreasing) => "Activity slowing, range-bound conditions likely",
        (Normal, Stable) => "Normal market conditions",
    }
}
