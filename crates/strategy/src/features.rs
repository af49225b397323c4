use tracing::debug;

use common::{
    Error, FeatureDefault, FeatureSchema, FeatureSpec, FeatureVector, MarketContext, Result,
};

use crate::indicators::{self, IndicatorSet};

/// Features the decision engine reads from every vector.
pub const DECISION_FEATURES: [&str; 4] = [
    indicators::RSI,
    indicators::VOLUME_RATIO,
    indicators::MACD_SIGNAL,
    indicators::BB_POSITION,
];

/// The standard schema: every indicator with its documented default, then the
/// market-wide aggregates.
pub fn standard_schema() -> FeatureSchema {
    use crate::indicators::*;
    use common::FeatureDefault::{Constant, CurrentPrice};

    let mut specs = vec![
        FeatureSpec::new(SMA_7, CurrentPrice),
        FeatureSpec::new(SMA_14, CurrentPrice),
        FeatureSpec::new(SMA_21, CurrentPrice),
        FeatureSpec::new(SMA_50, CurrentPrice),
        FeatureSpec::new(EMA_12, CurrentPrice),
        FeatureSpec::new(EMA_26, CurrentPrice),
        FeatureSpec::new(MACD, Constant(0.0)),
        FeatureSpec::new(MACD_SIGNAL, Constant(0.0)),
        FeatureSpec::new(MACD_HISTOGRAM, Constant(0.0)),
        FeatureSpec::new(RSI, Constant(50.0)),
        FeatureSpec::new(BB_POSITION, Constant(0.5)),
        FeatureSpec::new(BB_WIDTH, Constant(0.0)),
        FeatureSpec::new(VOLUME_RATIO, Constant(1.0)),
        FeatureSpec::new(MOMENTUM_5, Constant(0.0)),
        FeatureSpec::new(MOMENTUM_10, Constant(0.0)),
        FeatureSpec::new(MOMENTUM_20, Constant(0.0)),
        FeatureSpec::new(ATR, Constant(0.0)),
        FeatureSpec::new(VOLATILITY_20, Constant(0.0)),
        FeatureSpec::new(SUPPORT_DISTANCE, Constant(0.05)),
        FeatureSpec::new(RESISTANCE_DISTANCE, Constant(0.05)),
        FeatureSpec::new(HIGHER_HIGHS, Constant(2.0)),
        FeatureSpec::new(LOWER_LOWS, Constant(2.0)),
    ];
    specs.extend(
        MarketContext::NAMES
            .iter()
            .map(|name| FeatureSpec::new(*name, Constant(0.0))),
    );

    // The list above is static and duplicate-free.
    match FeatureSchema::new(specs) {
        Ok(schema) => schema,
        Err(e) => unreachable!("standard feature schema is invalid: {e}"),
    }
}

/// Turns indicator readings plus market aggregates into a fixed-order vector.
///
/// The schema is validated once, at construction: every feature must name an
/// indicator or a market aggregate, and the decision inputs must be present.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    schema: FeatureSchema,
}

impl FeatureBuilder {
    pub fn new(schema: FeatureSchema) -> Result<Self> {
        for spec in schema.specs() {
            let known = IndicatorSet::is_known(&spec.name)
                || MarketContext::NAMES.contains(&spec.name.as_str());
            if !known {
                return Err(Error::Config(format!(
                    "feature '{}' is neither an indicator nor a market aggregate",
                    spec.name
                )));
            }
        }
        for required in DECISION_FEATURES {
            if !schema.contains(required) {
                return Err(Error::Config(format!(
                    "feature schema is missing decision input '{required}'"
                )));
            }
        }
        Ok(Self { schema })
    }

    pub fn standard() -> Self {
        Self {
            schema: standard_schema(),
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Build a vector, substituting each spec's default for an unavailable
    /// reading. Fails only for an empty window (no current price).
    pub fn build(&self, indicators: &IndicatorSet, market: &MarketContext) -> Result<FeatureVector> {
        let current_price = indicators.current_price().ok_or_else(|| {
            Error::InvalidInput("cannot build features from an empty price window".into())
        })?;

        let mut defaulted = 0usize;
        let values: Vec<f64> = self
            .schema
            .specs()
            .iter()
            .map(|spec| {
                indicators
                    .get(&spec.name)
                    .or_else(|| market.get(&spec.name))
                    .unwrap_or_else(|| {
                        defaulted += 1;
                        spec.default.resolve(current_price)
                    })
            })
            .collect();

        debug!(features = values.len(), defaulted, "Feature vector built");
        FeatureVector::new(self.schema.names().clone(), values)
    }
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_points;

    fn market() -> MarketContext {
        MarketContext {
            tokens_analyzed: 10,
            major_tokens_count: 4,
            market_avg_price: 0.35,
            price_dispersion: 1000.0,
        }
    }

    #[test]
    fn standard_schema_has_indicators_then_market() {
        let schema = standard_schema();
        assert_eq!(schema.len(), 26);
        assert_eq!(schema.names()[0], "sma_7");
        assert_eq!(schema.names()[25], "price_dispersion");
    }

    #[test]
    fn short_window_falls_back_to_documented_defaults() {
        let builder = FeatureBuilder::standard();
        let set = IndicatorSet::compute(&test_points(&[0.12, 0.13]));
        let v = builder.build(&set, &market()).unwrap();

        assert_eq!(v.len(), 26);
        assert_eq!(v.get("rsi"), Some(50.0));
        assert_eq!(v.get("bb_position"), Some(0.5));
        assert_eq!(v.get("volume_ratio"), Some(1.0));
        assert_eq!(v.get("macd"), Some(0.0));
        assert_eq!(v.get("momentum_5"), Some(0.0));
        assert_eq!(v.get("sma_50"), Some(0.13));
        assert_eq!(v.get("ema_26"), Some(0.13));
        assert_eq!(v.get("support_distance"), Some(0.05));
        assert_eq!(v.get("higher_highs"), Some(2.0));
        assert_eq!(v.get("tokens_analyzed"), Some(10.0));
        assert_eq!(v.get("price_dispersion"), Some(1000.0));
    }

    #[test]
    fn available_readings_are_used_verbatim() {
        let builder = FeatureBuilder::standard();
        let set = IndicatorSet::compute(&test_points(&[1.25; 7]));
        let v = builder.build(&set, &market()).unwrap();
        assert_eq!(v.get("sma_7"), Some(1.25));
    }

    #[test]
    fn empty_window_is_rejected() {
        let builder = FeatureBuilder::standard();
        let set = IndicatorSet::compute(&[]);
        assert!(matches!(
            builder.build(&set, &market()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_feature_is_a_config_error() {
        let schema = FeatureSchema::new(vec![
            FeatureSpec::new("rsi", FeatureDefault::Constant(50.0)),
            FeatureSpec::new("stochastic_k", FeatureDefault::Constant(50.0)),
        ])
        .unwrap();
        assert!(matches!(FeatureBuilder::new(schema), Err(Error::Config(_))));
    }

    #[test]
    fn schema_without_decision_inputs_is_rejected() {
        let schema = FeatureSchema::new(vec![FeatureSpec::new(
            "sma_7",
            FeatureDefault::CurrentPrice,
        )])
        .unwrap();
        assert!(FeatureBuilder::new(schema).is_err());
    }

    #[test]
    fn vectors_from_the_same_builder_share_a_schema() {
        let builder = FeatureBuilder::standard();
        let a = builder
            .build(&IndicatorSet::compute(&test_points(&[1.0; 3])), &market())
            .unwrap();
        let b = builder
            .build(&IndicatorSet::compute(&test_points(&[2.0; 30])), &market())
            .unwrap();
        assert!(a.same_schema(b.names()));
    }
}
