//! Push-on-change valuation.
//!
//! [`ReactiveValuation`] owns the current inputs. Every [`InputChange`] bumps
//! the revision, recomputes the whole pipeline, and publishes each output
//! through its own watch channel. Receivers are woken only for outputs whose
//! value actually changed.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use intrinsic_valuation::capital::CostOfCapitalBreakdown;
use intrinsic_valuation::dcf::DcfValuation;
use intrinsic_valuation::growth::GrowthEstimate;
use intrinsic_valuation::sustainable::SustainableGrowth;
use intrinsic_valuation::ValuationResult;

use crate::error::{EngineError, EngineResult};
use crate::pipeline::{compute, InputChange, Stage, ValuationInputs, ValuationOutputs};
use crate::publisher::{publish_if_changed, ValuationPublisher, ValuationSummary};

/// Methodology name under which the DCF summary is published.
pub const DCF_METHODOLOGY: &str = "DCF";

/// Which outputs changed in one revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Revision that produced these changes.
    pub revision: u64,
    /// Growth estimate changed.
    pub growth: bool,
    /// Cost of capital changed.
    pub capital: bool,
    /// DCF changed.
    pub dcf: bool,
    /// Sustainable growth changed.
    pub sustainable: bool,
}

impl ChangeSet {
    /// Whether anything changed.
    pub fn any(&self) -> bool {
        self.growth || self.capital || self.dcf || self.sustainable
    }

    /// The stages that changed.
    pub fn stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.contains(*stage))
            .collect()
    }

    /// Whether `stage` changed.
    pub fn contains(&self, stage: Stage) -> bool {
        match stage {
            Stage::Growth => self.growth,
            Stage::Capital => self.capital,
            Stage::Dcf => self.dcf,
            Stage::Sustainable => self.sustainable,
        }
    }
}

/// Reactive valuation of one company.
pub struct ReactiveValuation {
    inputs: ValuationInputs,
    revision: u64,
    growth: watch::Sender<Option<GrowthEstimate>>,
    capital: watch::Sender<Option<ValuationResult<CostOfCapitalBreakdown>>>,
    dcf: watch::Sender<Option<ValuationResult<DcfValuation>>>,
    sustainable: watch::Sender<Option<ValuationResult<SustainableGrowth>>>,
    summary: ValuationPublisher,
}

impl ReactiveValuation {
    /// Creates the valuation and computes revision 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial inputs cannot be valued at all; nothing
    /// is constructed in that case.
    pub fn new(inputs: ValuationInputs) -> EngineResult<Self> {
        let outputs = compute(&inputs)?;
        let mut valuation = Self {
            inputs,
            revision: 0,
            growth: watch::channel(None).0,
            capital: watch::channel(None).0,
            dcf: watch::channel(None).0,
            sustainable: watch::channel(None).0,
            summary: ValuationPublisher::new(DCF_METHODOLOGY),
        };
        valuation.publish(Some(outputs));
        Ok(valuation)
    }

    /// Current inputs.
    pub fn inputs(&self) -> &ValuationInputs {
        &self.inputs
    }

    /// Number of accepted input revisions since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies one input change and republishes.
    ///
    /// Invalid assumptions are rejected and leave the inputs untouched.
    /// Removing every statement is accepted: all outputs are cleared and the
    /// error is returned so the caller can surface it.
    pub fn update(&mut self, change: InputChange) -> EngineResult<ChangeSet> {
        let label = change.label();
        let mut next = self.inputs.clone();
        change.apply(&mut next);
        self.commit(label, next)
    }

    /// Applies several changes as one revision.
    pub fn update_all(
        &mut self,
        changes: impl IntoIterator<Item = InputChange>,
    ) -> EngineResult<ChangeSet> {
        let mut next = self.inputs.clone();
        for change in changes {
            change.apply(&mut next);
        }
        self.commit("batch", next)
    }

    fn commit(&mut self, label: &'static str, next: ValuationInputs) -> EngineResult<ChangeSet> {
        let result = match compute(&next) {
            Err(EngineError::Config(e)) => {
                warn!(input = label, error = %e, "input change rejected");
                return Err(EngineError::Config(e));
            }
            other => other,
        };

        self.inputs = next;
        self.revision += 1;

        match result {
            Ok(outputs) => {
                let changes = self.publish(Some(outputs));
                info!(
                    revision = self.revision,
                    input = label,
                    changed = ?changes.stages(),
                    "valuation revised"
                );
                Ok(changes)
            }
            Err(e) => {
                self.publish(None);
                warn!(revision = self.revision, input = label, error = %e, "outputs cleared");
                Err(e)
            }
        }
    }

    fn publish(&mut self, outputs: Option<ValuationOutputs>) -> ChangeSet {
        let (growth, capital, dcf, sustainable) = match outputs {
            Some(o) => (Some(o.growth), Some(o.capital), Some(o.dcf), Some(o.sustainable)),
            None => (None, None, None, None),
        };

        let summary = dcf.as_ref().and_then(|d| d.as_ref().ok()).map(|valuation| {
            ValuationSummary::from_dcf(DCF_METHODOLOGY, &self.inputs.company.symbol, valuation)
        });

        let changes = ChangeSet {
            revision: self.revision,
            growth: publish_if_changed(&self.growth, growth),
            capital: publish_if_changed(&self.capital, capital),
            dcf: publish_if_changed(&self.dcf, dcf),
            sustainable: publish_if_changed(&self.sustainable, sustainable),
        };
        if self.summary.publish(summary) {
            debug!(revision = self.revision, "dcf summary published");
        }
        changes
    }

    /// Latest outputs, if the current inputs could be valued.
    pub fn outputs(&self) -> Option<ValuationOutputs> {
        Some(ValuationOutputs {
            growth: self.growth.borrow().clone()?,
            capital: self.capital.borrow().clone()?,
            dcf: self.dcf.borrow().clone()?,
            sustainable: self.sustainable.borrow().clone()?,
        })
    }

    /// Receiver for the growth estimate.
    pub fn subscribe_growth(&self) -> watch::Receiver<Option<GrowthEstimate>> {
        self.growth.subscribe()
    }

    /// Receiver for the cost of capital.
    pub fn subscribe_capital(
        &self,
    ) -> watch::Receiver<Option<ValuationResult<CostOfCapitalBreakdown>>> {
        self.capital.subscribe()
    }

    /// Receiver for the DCF.
    pub fn subscribe_dcf(&self) -> watch::Receiver<Option<ValuationResult<DcfValuation>>> {
        self.dcf.subscribe()
    }

    /// Receiver for sustainable growth.
    pub fn subscribe_sustainable(
        &self,
    ) -> watch::Receiver<Option<ValuationResult<SustainableGrowth>>> {
        self.sustainable.subscribe()
    }

    /// Publisher of the DCF headline numbers, for aggregating consumers.
    pub fn summary_publisher(&self) -> &ValuationPublisher {
        &self.summary
    }
}
