//! Latest-value publication of per-share valuations.
//!
//! Each methodology owns a [`ValuationPublisher`]. Consumers hold watch
//! receivers and only ever see the most recent value.

use serde::Serialize;
use tokio::sync::watch;

use intrinsic_valuation::dcf::DcfValuation;

/// Headline numbers of one methodology's valuation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationSummary {
    /// Methodology name, e.g. `"DCF"`.
    pub methodology: String,
    /// Ticker.
    pub symbol: String,
    /// Enterprise value.
    pub enterprise_value: f64,
    /// Equity value.
    pub equity_value: f64,
    /// Intrinsic value per share.
    pub intrinsic_value_per_share: f64,
    /// Market price at valuation time.
    pub current_price: f64,
    /// Premium (positive) or discount (negative) to price, in percent.
    pub premium_pct: Option<f64>,
}

impl ValuationSummary {
    /// Summarizes a DCF valuation.
    pub fn from_dcf(
        methodology: impl Into<String>,
        symbol: impl Into<String>,
        valuation: &DcfValuation,
    ) -> Self {
        Self {
            methodology: methodology.into(),
            symbol: symbol.into(),
            enterprise_value: valuation.bridge.enterprise_value,
            equity_value: valuation.bridge.equity_value,
            intrinsic_value_per_share: valuation.intrinsic_value_per_share(),
            current_price: valuation.bridge.current_price,
            premium_pct: valuation.premium_pct(),
        }
    }
}

/// Publishes one methodology's latest [`ValuationSummary`].
#[derive(Debug)]
pub struct ValuationPublisher {
    methodology: String,
    sender: watch::Sender<Option<ValuationSummary>>,
}

impl ValuationPublisher {
    /// Creates a publisher with no value yet.
    pub fn new(methodology: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            methodology: methodology.into(),
            sender,
        }
    }

    /// Methodology name.
    pub fn methodology(&self) -> &str {
        &self.methodology
    }

    /// Replaces the published value. Returns whether it changed.
    ///
    /// Receivers are notified only when it did.
    pub fn publish(&self, summary: Option<ValuationSummary>) -> bool {
        publish_if_changed(&self.sender, summary)
    }

    /// Creates a new receiver; its first read sees the current value.
    pub fn subscribe(&self) -> watch::Receiver<Option<ValuationSummary>> {
        self.sender.subscribe()
    }

    /// Current value.
    pub fn latest(&self) -> Option<ValuationSummary> {
        self.sender.borrow().clone()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Stores `value` and notifies receivers if it differs from the current one.
pub(crate) fn publish_if_changed<T: PartialEq>(sender: &watch::Sender<T>, value: T) -> bool {
    sender.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(value: f64) -> ValuationSummary {
        ValuationSummary {
            methodology: "DCF".to_string(),
            symbol: "TEST".to_string(),
            enterprise_value: 1000.0,
            equity_value: 900.0,
            intrinsic_value_per_share: value,
            current_price: 10.0,
            premium_pct: Some((value / 10.0 - 1.0) * 100.0),
        }
    }

    #[test]
    fn test_notifies_only_on_change() {
        let publisher = ValuationPublisher::new("DCF");
        let mut rx = publisher.subscribe();
        assert!(!rx.has_changed().unwrap());

        assert!(publisher.publish(Some(summary(12.0))));
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|s| s.intrinsic_value_per_share),
            Some(12.0)
        );

        assert!(!publisher.publish(Some(summary(12.0))));
        assert!(!rx.has_changed().unwrap());

        assert!(publisher.publish(None));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
    }

    #[test]
    fn test_latest_value_wins() {
        let publisher = ValuationPublisher::new("DCF");
        let rx = publisher.subscribe();
        publisher.publish(Some(summary(11.0)));
        publisher.publish(Some(summary(13.0)));
        assert_eq!(
            rx.borrow().as_ref().map(|s| s.intrinsic_value_per_share),
            Some(13.0)
        );
        assert_eq!(publisher.receiver_count(), 1);
    }

    #[test]
    fn test_summary_json_fields() {
        let json = serde_json::to_value(summary(12.5)).unwrap();
        assert_eq!(json["methodology"], "DCF");
        assert_eq!(json["symbol"], "TEST");
        assert_eq!(json["intrinsic_value_per_share"], 12.5);
        assert_eq!(json["premium_pct"], 25.0);

        let without_price = ValuationSummary {
            premium_pct: None,
            ..summary(12.5)
        };
        let json = serde_json::to_value(without_price).unwrap();
        assert!(json["premium_pct"].is_null());
    }
}
