use serde::Serialize;

use super::{mean, recent_change};
use crate::market::LongShortRatioData;

const LONG_DOMINANCE: f64 = 0.65;
const SHORT_DOMINANCE: f64 = 0.35;
const TREND_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    LongDominant,
    Balanced,
    ShortDominant,
}

impl Sentiment {
    pub fn from_buy_ratio(buy_ratio: f64) -> Self {
        if buy_ratio > LONG_DOMINANCE {
            Sentiment::LongDominant
        } else if buy_ratio < SHORT_DOMINANCE {
            Sentiment::ShortDominant
        } else {
            Sentiment::Balanced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::LongDominant => "long dominant",
            Sentiment::Balanced => "balanced",
            Sentiment::ShortDominant => "short dominant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RatioTrend {
    Bullish,
    Bearish,
    Neutral,
}

impl RatioTrend {
    pub fn from_change(change: Option<f64>) -> Self {
        match change {
            Some(c) if c > TREND_THRESHOLD => RatioTrend::Bullish,
            Some(c) if c < -TREND_THRESHOLD => RatioTrend::Bearish,
            _ => RatioTrend::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatioTrend::Bullish => "bullish",
            RatioTrend::Bearish => "bearish",
            RatioTrend::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongShortAnalysis {
    pub buy_ratio: f64,
    pub sell_ratio: f64,
    /// Longs per short; 0 when the sell ratio is 0.
    pub long_short_ratio: f64,
    pub average_buy_ratio: f64,
    pub ratio_to_average: f64,
    pub sentiment: Sentiment,
    pub trend: RatioTrend,
    pub recommendation: &'static str,
}

/// Classify a newest-first long/short series on its buy ratio.
pub fn analyze_long_short(
    series: &[LongShortRatioData],
    window: usize,
) -> Option<LongShortAnalysis> {
    let windowed = &series[..series.len().min(window)];
    let latest = windowed.first()?;

    let buy_ratios: Vec<f64> = windowed
        .iter()
        .map(LongShortRatioData::buy_ratio_f64)
        .collect();

    let buy_ratio = latest.buy_ratio_f64();
    let sell_ratio = latest.sell_ratio_f64();
    let average_buy_ratio = mean(&buy_ratios);

    let long_short_ratio = if sell_ratio > 0.0 {
        buy_ratio / sell_ratio
    } else {
        0.0
    };
    let ratio_to_average = if average_buy_ratio > 0.0 {
        buy_ratio / average_buy_ratio
    } else {
        0.0
    };

    let sentiment = Sentiment::from_buy_ratio(buy_ratio);
    let trend = RatioTrend::from_change(recent_change(&buy_ratios));

    Some(LongShortAnalysis {
        buy_ratio,
        sell_ratio,
        long_short_ratio,
        average_buy_ratio,
        ratio_to_average,
        sentiment,
        trend,
        recommendation: recommendation(sentiment, trend),
    })
}

fn recommendation(sentiment: Sentiment, trend: RatioTrend) -> &'static str {
    match (sentiment, trend) {
        (Sentiment::LongDominant, RatioTrend::Bullish) => {
            "Crowded longs still growing, beware of a long squeeze"
        }
        (Sentiment::LongDominant, _) => {
            "Longs dominate positioning, contrarian short setups worth watching"
        }
        (Sentiment::ShortDominant, RatioTrend::Bearish) => {
            "Crowded shorts still growing, beware of a short squeeze"
        }
        (Sentiment::ShortDominant, _) => {
            "Shorts dominate positioning, contrarian long setups worth watching"
        }
        (Sentiment::Balanced, RatioTrend::Bullish) => "Sentiment shifting long",
        (Sentiment::Balanced, RatioTrend::Bearish) => "Sentiment shifting short",
        (Sentiment::Balanced, RatioTrend::Neutral) => {
            "Balanced positioning, no clear sentiment edge"
        }
    }
}
