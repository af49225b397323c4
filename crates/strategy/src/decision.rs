//! Strategy decision engine: maps a predicted return plus a handful of
//! technical readings to a labelled recommendation. Pure and total.

use common::{
    Allocation, FeatureVector, Recommendation, StrategyKind, StrategyRecommendation,
    TechnicalReadings, TradeAction,
};

use crate::indicators::{self, rsi};

pub const AGGRESSIVE_THRESHOLD: f64 = 0.02;
pub const MODERATE_THRESHOLD: f64 = 0.005;
pub const MAX_CONFIDENCE: f64 = 0.95;

const HIGH_VOLUME: f64 = 1.5;
const LOW_VOLUME: f64 = 0.5;
const UNUSUAL_VOLUME: f64 = 2.0;
const THIN_VOLUME: f64 = 0.3;
const UPPER_BAND: f64 = 0.8;
const LOWER_BAND: f64 = 0.2;

/// Read the decision inputs out of a feature vector. Missing entries fall back
/// to the same neutral values the feature builder would have used.
pub fn technical_readings(vector: &FeatureVector) -> TechnicalReadings {
    TechnicalReadings {
        rsi: vector.get(indicators::RSI).unwrap_or(50.0),
        volume_ratio: vector.get(indicators::VOLUME_RATIO).unwrap_or(1.0),
        macd_signal: vector.get(indicators::MACD_SIGNAL).unwrap_or(0.0),
        bb_position: vector.get(indicators::BB_POSITION).unwrap_or(0.5),
    }
}

pub fn decide(predicted_return: f64, readings: &TechnicalReadings) -> StrategyRecommendation {
    decide_with_factor(predicted_return, readings, None)
}

/// Like [`decide`], naming the model's most important feature in the
/// reasoning of the strong buy/sell buckets.
pub fn decide_with_factor(
    predicted_return: f64,
    readings: &TechnicalReadings,
    lead_factor: Option<&str>,
) -> StrategyRecommendation {
    let r = if predicted_return.is_finite() {
        predicted_return
    } else {
        0.0
    };
    let strategy = classify(r);

    let (action, allocation) = match strategy {
        StrategyKind::AggressiveBuy => (TradeAction::Buy, Allocation::High),
        StrategyKind::ModerateBuy => (TradeAction::Buy, Allocation::Moderate),
        StrategyKind::Sell => (TradeAction::Sell, Allocation::High),
        StrategyKind::ModerateSell => (TradeAction::Sell, Allocation::Moderate),
        StrategyKind::Hold => (TradeAction::Hold, Allocation::Maintain),
    };

    StrategyRecommendation {
        strategy,
        confidence: confidence(r, readings),
        predicted_return: round_to(r, 4),
        recommendation: Recommendation {
            action,
            allocation,
            percentage: percentage(strategy, r),
            reasoning: reasoning(strategy, r, readings, lead_factor),
        },
        signals: signals(readings),
    }
}

/// Bucket a return into a strategy label. Total over all finite inputs.
pub fn classify(predicted_return: f64) -> StrategyKind {
    let r = predicted_return;
    if r > AGGRESSIVE_THRESHOLD {
        StrategyKind::AggressiveBuy
    } else if r > MODERATE_THRESHOLD {
        StrategyKind::ModerateBuy
    } else if r < -AGGRESSIVE_THRESHOLD {
        StrategyKind::Sell
    } else if r < -MODERATE_THRESHOLD {
        StrategyKind::ModerateSell
    } else {
        StrategyKind::Hold
    }
}

/// Confidence in `[0, MAX_CONFIDENCE]`, rounded to three decimals.
pub fn confidence(predicted_return: f64, readings: &TechnicalReadings) -> f64 {
    let r = predicted_return;
    let mut c = (r.abs() * 20.0).min(MAX_CONFIDENCE);

    let reversal = (r > 0.0 && readings.rsi < rsi::OVERSOLD)
        || (r < 0.0 && readings.rsi > rsi::OVERBOUGHT);
    if reversal {
        c *= 1.2;
    } else if (40.0..=60.0).contains(&readings.rsi) {
        c *= 0.8;
    }

    if readings.volume_ratio > HIGH_VOLUME {
        c *= 1.1;
    } else if readings.volume_ratio < LOW_VOLUME {
        c *= 0.8;
    }

    round_to(c.clamp(0.0, MAX_CONFIDENCE), 3)
}

fn percentage(strategy: StrategyKind, r: f64) -> u32 {
    let scaled = |factor: f64| (r * factor).trunc().abs();
    let pct = match strategy {
        StrategyKind::AggressiveBuy => (70.0 + scaled(500.0)).min(80.0),
        StrategyKind::ModerateBuy => (40.0 + scaled(1000.0)).min(60.0),
        StrategyKind::Sell => (70.0 + scaled(500.0)).min(85.0),
        StrategyKind::ModerateSell => (50.0 + scaled(1000.0)).min(65.0),
        StrategyKind::Hold => 0.0,
    };
    pct as u32
}

fn reasoning(
    strategy: StrategyKind,
    r: f64,
    readings: &TechnicalReadings,
    lead_factor: Option<&str>,
) -> String {
    let pct = r * 100.0;
    let mut parts = match strategy {
        StrategyKind::AggressiveBuy | StrategyKind::ModerateBuy => {
            vec![format!("AI predicts {pct:.2}% return")]
        }
        StrategyKind::Sell | StrategyKind::ModerateSell => {
            vec![format!("AI predicts {pct:.2}% decline")]
        }
        StrategyKind::Hold => vec![format!("AI predicts {pct:.2}% (neutral)")],
    };
    parts.push(format!("RSI: {:.1}", readings.rsi));

    match strategy {
        StrategyKind::AggressiveBuy => {
            parts.push(format!("Volume ratio: {:.2}x", readings.volume_ratio));
            if let Some(name) = lead_factor {
                parts.push(format!("Top signal: {name}"));
            }
        }
        StrategyKind::ModerateBuy => parts.push("Moderate signals detected".into()),
        StrategyKind::Sell => {
            parts.push("Strong bearish signals".into());
            if let Some(name) = lead_factor {
                parts.push(format!("Top risk factor: {name}"));
            }
        }
        StrategyKind::ModerateSell => parts.push("Bearish trend signals".into()),
        StrategyKind::Hold => parts.push("Mixed signals detected".into()),
    }

    parts.join(" | ")
}

/// Human-readable technical observations, one per pair of thresholds.
pub fn signals(readings: &TechnicalReadings) -> Vec<String> {
    let mut out = Vec::new();

    if readings.rsi < rsi::OVERSOLD {
        out.push("Oversold conditions (RSI)");
    } else if readings.rsi > rsi::OVERBOUGHT {
        out.push("Overbought conditions (RSI)");
    }

    if readings.macd_signal > 0.0 {
        out.push("MACD bullish crossover");
    } else if readings.macd_signal < 0.0 {
        out.push("MACD bearish crossover");
    }

    if readings.bb_position > UPPER_BAND {
        out.push("Near upper Bollinger Band");
    } else if readings.bb_position < LOWER_BAND {
        out.push("Near lower Bollinger Band");
    }

    if readings.volume_ratio > UNUSUAL_VOLUME {
        out.push("Unusual high volume");
    } else if readings.volume_ratio < THIN_VOLUME {
        out.push("Low trading volume");
    }

    out.into_iter().map(String::from).collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(rsi: f64, volume_ratio: f64) -> TechnicalReadings {
        TechnicalReadings {
            rsi,
            volume_ratio,
            macd_signal: 0.0,
            bb_position: 0.5,
        }
    }

    #[test]
    fn strong_oversold_rally_is_aggressive_buy() {
        let rec = decide(0.03, &readings(25.0, 2.5));
        assert_eq!(rec.strategy, StrategyKind::AggressiveBuy);
        assert_eq!(rec.confidence, 0.792);
        assert_eq!(rec.recommendation.percentage, 80);
        assert_eq!(rec.recommendation.action, TradeAction::Buy);
        assert_eq!(rec.recommendation.allocation, Allocation::High);
        assert!(rec.signals.contains(&"Oversold conditions (RSI)".to_string()));
        assert!(rec.signals.contains(&"Unusual high volume".to_string()));
    }

    #[test]
    fn buckets_follow_thresholds() {
        assert_eq!(classify(0.021), StrategyKind::AggressiveBuy);
        assert_eq!(classify(0.02), StrategyKind::ModerateBuy);
        assert_eq!(classify(0.006), StrategyKind::ModerateBuy);
        assert_eq!(classify(0.005), StrategyKind::Hold);
        assert_eq!(classify(0.0), StrategyKind::Hold);
        assert_eq!(classify(-0.005), StrategyKind::Hold);
        assert_eq!(classify(-0.006), StrategyKind::ModerateSell);
        assert_eq!(classify(-0.02), StrategyKind::ModerateSell);
        assert_eq!(classify(-0.03), StrategyKind::Sell);
    }

    #[test]
    fn percentages_are_capped_per_bucket() {
        assert_eq!(decide(0.5, &readings(50.0, 1.0)).recommendation.percentage, 80);
        assert_eq!(decide(0.01, &readings(50.0, 1.0)).recommendation.percentage, 50);
        assert_eq!(decide(-0.05, &readings(50.0, 1.0)).recommendation.percentage, 85);
        assert_eq!(decide(-0.01, &readings(50.0, 1.0)).recommendation.percentage, 60);
        assert_eq!(decide(0.0, &readings(50.0, 1.0)).recommendation.percentage, 0);
    }

    #[test]
    fn neutral_rsi_and_thin_volume_dampen_confidence() {
        // 0.01 * 20 = 0.2, * 0.8 (neutral rsi) * 0.8 (thin volume)
        let rec = decide(0.01, &readings(50.0, 0.4));
        assert_eq!(rec.confidence, 0.128);
    }

    #[test]
    fn overbought_decline_is_a_reversal() {
        let rec = decide(-0.01, &readings(75.0, 1.0));
        assert_eq!(rec.strategy, StrategyKind::ModerateSell);
        assert_eq!(rec.confidence, 0.24);
        assert_eq!(rec.signals, vec!["Overbought conditions (RSI)".to_string()]);
    }

    #[test]
    fn confidence_is_capped() {
        let rec = decide(1.0, &readings(10.0, 3.0));
        assert_eq!(rec.confidence, MAX_CONFIDENCE);
    }

    #[test]
    fn non_finite_return_is_treated_as_neutral() {
        for r in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let rec = decide(r, &readings(25.0, 3.0));
            assert_eq!(rec.strategy, StrategyKind::Hold);
            assert_eq!(rec.confidence, 0.0);
            assert_eq!(rec.predicted_return, 0.0);
        }
    }

    #[test]
    fn signals_cover_macd_and_bands() {
        let r = TechnicalReadings {
            rsi: 50.0,
            volume_ratio: 0.2,
            macd_signal: -0.001,
            bb_position: 0.9,
        };
        assert_eq!(
            signals(&r),
            vec![
                "MACD bearish crossover".to_string(),
                "Near upper Bollinger Band".to_string(),
                "Low trading volume".to_string(),
            ]
        );
    }

    #[test]
    fn reasoning_is_pipe_joined() {
        let rec = decide_with_factor(0.03, &readings(25.0, 2.5), Some("momentum_5"));
        assert_eq!(
            rec.recommendation.reasoning,
            "AI predicts 3.00% return | RSI: 25.0 | Volume ratio: 2.50x | Top signal: momentum_5"
        );

        let hold = decide(0.001, &readings(55.0, 1.0));
        assert_eq!(
            hold.recommendation.reasoning,
            "AI predicts 0.10% (neutral) | RSI: 55.0 | Mixed signals detected"
        );

        let sell = decide(-0.01, &readings(55.0, 1.0));
        assert!(sell.recommendation.reasoning.ends_with("Bearish trend signals"));
    }
}
