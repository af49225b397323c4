use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fewest training examples any learned fit accepts.
pub const MIN_TRAINING_EXAMPLES: usize = 50;

/// One observation of a token: closing price and traded volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume: f64,
}

/// A single token quote as delivered by the market data supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketQuote {
    pub token_code: String,
    pub price: f64,
    pub volume: f64,
    /// Fractional 24h change reported by the supplier (0.05 = +5%).
    #[serde(default)]
    pub change_24h: f64,
    pub timestamp: DateTime<Utc>,
}

/// Market-wide aggregates over the latest price of every tracked token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub tokens_analyzed: usize,
    pub major_tokens_count: usize,
    pub market_avg_price: f64,
    /// `max / min` of the latest prices; 1.5 when it cannot be computed.
    pub price_dispersion: f64,
}

impl MarketContext {
    pub const TOKENS_ANALYZED: &'static str = "tokens_analyzed";
    pub const MAJOR_TOKENS_COUNT: &'static str = "major_tokens_count";
    pub const MARKET_AVG_PRICE: &'static str = "market_avg_price";
    pub const PRICE_DISPERSION: &'static str = "price_dispersion";

    pub const NAMES: [&'static str; 4] = [
        Self::TOKENS_ANALYZED,
        Self::MAJOR_TOKENS_COUNT,
        Self::MARKET_AVG_PRICE,
        Self::PRICE_DISPERSION,
    ];

    pub const DEFAULT_DISPERSION: f64 = 1.5;

    /// Look up an aggregate by feature name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            Self::TOKENS_ANALYZED => Some(self.tokens_analyzed as f64),
            Self::MAJOR_TOKENS_COUNT => Some(self.major_tokens_count as f64),
            Self::MARKET_AVG_PRICE => Some(self.market_avg_price),
            Self::PRICE_DISPERSION => Some(self.price_dispersion),
            _ => None,
        }
    }
}

impl Default for MarketContext {
    fn default() -> Self {
        Self {
            tokens_analyzed: 0,
            major_tokens_count: 0,
            market_avg_price: 0.0,
            price_dispersion: Self::DEFAULT_DISPERSION,
        }
    }
}

/// Strategy label chosen from the predicted return bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    AggressiveBuy,
    ModerateBuy,
    Sell,
    ModerateSell,
    Hold,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::AggressiveBuy => write!(f, "AGGRESSIVE_BUY"),
            StrategyKind::ModerateBuy => write!(f, "MODERATE_BUY"),
            StrategyKind::Sell => write!(f, "SELL"),
            StrategyKind::ModerateSell => write!(f, "MODERATE_SELL"),
            StrategyKind::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
            TradeAction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Position sizing bucket attached to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Allocation {
    High,
    Moderate,
    Maintain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: TradeAction,
    pub allocation: Allocation,
    /// Suggested share of the position, in whole percent.
    pub percentage: u32,
    pub reasoning: String,
}

/// Output of the decision engine. Built fresh per call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRecommendation {
    pub strategy: StrategyKind,
    /// Always within `[0, 0.95]`.
    pub confidence: f64,
    pub predicted_return: f64,
    pub recommendation: Recommendation,
    pub signals: Vec<String>,
}

/// A feature and its share of the model's global importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}

/// The raw indicator readings the decision engine looked at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalReadings {
    pub rsi: f64,
    pub volume_ratio: f64,
    pub macd_signal: f64,
    pub bb_position: f64,
}

/// Full per-token answer handed back to the driving layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub token: String,
    #[serde(flatten)]
    pub recommendation: StrategyRecommendation,
    pub key_factors: Vec<FeatureImportance>,
    pub technical: TechnicalReadings,
    pub backend: String,
    pub model_features: usize,
}
