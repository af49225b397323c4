use common::{MarketContext, PricePoint, Result};
use model::TrainingExample;
use strategy::{FeatureBuilder, IndicatorSet};

/// Examples a series of `len` points yields: one per index `t` with at least
/// `min_history` points up to it and a point after it.
pub fn derivable_examples(len: usize, min_history: usize) -> usize {
    len.saturating_sub(min_history.max(1))
}

/// Walk one token series and pair the features of every eligible prefix
/// `[..=t]` with the realized return `price[t+1] / price[t] - 1`.
pub fn examples_from_series(
    builder: &FeatureBuilder,
    series: &[PricePoint],
    market: &MarketContext,
    min_history: usize,
) -> Result<Vec<TrainingExample>> {
    let min_history = min_history.max(1);
    if series.len() <= min_history {
        return Ok(Vec::new());
    }

    let mut examples = Vec::with_capacity(derivable_examples(series.len(), min_history));
    for t in (min_history - 1)..(series.len() - 1) {
        let indicators = IndicatorSet::compute(&series[..=t]);
        let features = builder.build(&indicators, market)?;
        let target = series[t + 1].price / series[t].price - 1.0;
        examples.push(TrainingExample { features, target });
    }
    Ok(examples)
}
