//! Averages the latest intrinsic values of several methodologies.

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use intrinsic_math::stats::{mean_defined, safe_ratio};

use crate::publisher::{ValuationPublisher, ValuationSummary};

/// One methodology's contribution to the average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    /// Methodology name.
    pub methodology: String,
    /// Its latest intrinsic value per share, if any.
    pub intrinsic_value_per_share: Option<f64>,
}

/// Combined view over every subscribed methodology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateValue {
    /// Per-methodology values, in subscription order.
    pub contributions: Vec<Contribution>,
    /// Mean of the defined values.
    pub average: Option<f64>,
    /// Market price reported by the first methodology with a value.
    pub current_price: Option<f64>,
    /// Premium of the average to the price, in percent.
    pub premium_pct: Option<f64>,
}

struct Source {
    methodology: String,
    receiver: watch::Receiver<Option<ValuationSummary>>,
}

/// Subscribes to several methodologies and averages their latest values.
#[derive(Default)]
pub struct IntrinsicValueAggregator {
    sources: Vec<Source>,
}

impl IntrinsicValueAggregator {
    /// Creates an aggregator with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source by receiver.
    pub fn add_source(
        &mut self,
        methodology: impl Into<String>,
        receiver: watch::Receiver<Option<ValuationSummary>>,
    ) {
        self.sources.push(Source {
            methodology: methodology.into(),
            receiver,
        });
    }

    /// Subscribes to a publisher.
    pub fn subscribe_to(&mut self, publisher: &ValuationPublisher) {
        self.add_source(publisher.methodology(), publisher.subscribe());
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether there are no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Whether any source published since the last snapshot.
    ///
    /// A source whose publisher is gone counts as unchanged.
    pub fn has_changed(&self) -> bool {
        self.sources
            .iter()
            .any(|s| s.receiver.has_changed().unwrap_or(false))
    }

    /// Reads every source's latest value and marks them seen.
    pub fn snapshot(&mut self) -> AggregateValue {
        let mut current_price = None;
        let contributions: Vec<Contribution> = self
            .sources
            .iter_mut()
            .map(|source| {
                let latest = source.receiver.borrow_and_update();
                let value = latest.as_ref().map(|s| s.intrinsic_value_per_share);
                if current_price.is_none() {
                    current_price = latest.as_ref().map(|s| s.current_price);
                }
                Contribution {
                    methodology: source.methodology.clone(),
                    intrinsic_value_per_share: value,
                }
            })
            .collect();

        let average = mean_defined(contributions.iter().map(|c| c.intrinsic_value_per_share));
        let premium_pct = match (average, current_price) {
            (Some(avg), Some(price)) => safe_ratio(avg, price).map(|r| (r - 1.0) * 100.0),
            _ => None,
        };
        debug!(sources = contributions.len(), ?average, "aggregate refreshed");

        AggregateValue {
            contributions,
            average,
            current_price,
            premium_pct,
        }
    }

    /// Snapshot if any source changed, else `None`.
    pub fn refresh(&mut self) -> Option<AggregateValue> {
        if self.has_changed() {
            Some(self.snapshot())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn summary(methodology: &str, value: f64) -> ValuationSummary {
        ValuationSummary {
            methodology: methodology.to_string(),
            symbol: "AGG".to_string(),
            enterprise_value: 0.0,
            equity_value: 0.0,
            intrinsic_value_per_share: value,
            current_price: 20.0,
            premium_pct: None,
        }
    }

    #[test]
    fn test_average_of_defined_values() {
        let dcf = ValuationPublisher::new("DCF");
        let multiples = ValuationPublisher::new("Multiples");
        let ddm = ValuationPublisher::new("DDM");

        let mut aggregator = IntrinsicValueAggregator::new();
        aggregator.subscribe_to(&dcf);
        aggregator.subscribe_to(&multiples);
        aggregator.subscribe_to(&ddm);
        assert_eq!(aggregator.len(), 3);
        assert!(aggregator.refresh().is_none());

        dcf.publish(Some(summary("DCF", 24.0)));
        multiples.publish(Some(summary("Multiples", 18.0)));

        let aggregate = aggregator.refresh().unwrap();
        assert_relative_eq!(aggregate.average.unwrap(), 21.0);
        assert_eq!(aggregate.current_price, Some(20.0));
        assert_relative_eq!(aggregate.premium_pct.unwrap(), 5.0, epsilon = 1e-9);
        assert_eq!(aggregate.contributions[2].intrinsic_value_per_share, None);
        assert!(aggregator.refresh().is_none());
    }

    #[test]
    fn test_most_recent_value_wins() {
        let dcf = ValuationPublisher::new("DCF");
        let mut aggregator = IntrinsicValueAggregator::new();
        aggregator.subscribe_to(&dcf);

        dcf.publish(Some(summary("DCF", 10.0)));
        dcf.publish(Some(summary("DCF", 30.0)));
        assert_eq!(aggregator.snapshot().average, Some(30.0));
    }

    #[test]
    fn test_empty_aggregate() {
        let mut aggregator = IntrinsicValueAggregator::new();
        assert!(aggregator.is_empty());
        let aggregate = aggregator.snapshot();
        assert!(aggregate.average.is_none());
        assert!(aggregate.premium_pct.is_none());
    }
}
