//! Strategy resolution: which targets to try, in which order

use super::selection::pick_weighted;
use super::sticky::{SessionKey, StickySessionStore};
use super::strategy::{Strategy, StrategyMode};
use crate::core::target::Target;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// One target to try, with its position in the strategy
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub index: usize,
    pub target: &'a Target,
}

/// Ordered candidates for one request
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub candidates: Vec<Candidate<'a>>,
    /// The list came from a live sticky binding
    pub pinned: bool,
}

/// Resolves strategies into candidate lists, consulting sticky bindings
#[derive(Debug, Clone, Default)]
pub struct StrategyResolver {
    sticky: Arc<StickySessionStore>,
}

impl StrategyResolver {
    pub fn new(sticky: Arc<StickySessionStore>) -> Self {
        Self { sticky }
    }

    pub fn sticky_store(&self) -> &Arc<StickySessionStore> {
        &self.sticky
    }

    pub fn resolve<'a>(&self, strategy: &'a Strategy, session: Option<&SessionKey>) -> Resolution<'a> {
        self.resolve_with(strategy, session, &mut rand::thread_rng())
    }

    /// Resolve with an explicit RNG.
    ///
    /// A live sticky binding yields that target alone. Otherwise the mode's
    /// order is used and, for sticky strategies, the first candidate is
    /// recorded against the session.
    pub fn resolve_with<'a, R: Rng>(
        &self,
        strategy: &'a Strategy,
        session: Option<&SessionKey>,
        rng: &mut R,
    ) -> Resolution<'a> {
        let targets = strategy.targets();
        let sticky = strategy.sticky_session().zip(session);

        if let Some((_, key)) = sticky {
            if let Some(index) = self.sticky.get(key).filter(|i| *i < targets.len()) {
                debug!(session = %key, target = index, "sticky binding hit");
                return Resolution {
                    candidates: vec![Candidate {
                        index,
                        target: &targets[index],
                    }],
                    pinned: true,
                };
            }
        }

        let order = candidate_order(strategy, rng.gen_range(0.0..1.0));
        let candidates: Vec<Candidate<'a>> = order
            .into_iter()
            .map(|index| Candidate {
                index,
                target: &targets[index],
            })
            .collect();

        if let (Some((settings, key)), Some(first)) = (sticky, candidates.first()) {
            self.sticky.bind(key.clone(), first.index, settings.ttl());
        }

        Resolution {
            candidates,
            pinned: false,
        }
    }

    /// Point the session at the target that actually served it.
    pub fn rebind(&self, strategy: &Strategy, session: &SessionKey, target_index: usize) {
        if let Some(settings) = strategy.sticky_session() {
            self.sticky.bind(session.clone(), target_index, settings.ttl());
        }
    }

    pub fn release(&self, session: &SessionKey) {
        self.sticky.release(session);
    }
}

/// Candidate indices for one uniform draw `r` in `[0, 1)`.
pub fn candidate_order(strategy: &Strategy, r: f64) -> Vec<usize> {
    match strategy.mode() {
        StrategyMode::Single(_) => vec![0],
        StrategyMode::Fallback(targets) => (0..targets.len()).collect(),
        StrategyMode::LoadBalance(weighted) => {
            let primary = pick_weighted(weighted.normalized_weights(), r).unwrap_or(0);
            weighted.order_after(primary)
        }
    }
}
