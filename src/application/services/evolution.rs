//! Evolution stage policy
//!
//! Composes the strict chain resolver with the defaults the ingestion applies
//! when chain data is missing or does not mention the species. Each outcome
//! carries its `EvolutionSource`, so "not found in chain" and "no chain data"
//! stay distinguishable downstream.

use std::rc::Rc;

use tracing::{debug, error, info, warn};

use crate::domain::{resolve, DomainError, EvolutionNodeRef, EvolutionSource, StageInfo};

/// Stage assumed for a species whose chain data is unavailable.
pub const NO_CHAIN_DEFAULT: StageInfo = StageInfo {
    stage: 1,
    is_fully_evolved: true,
};

/// Evolution fields for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolutionOutcome {
    pub stage: Option<u32>,
    pub is_fully_evolved: Option<bool>,
    pub source: EvolutionSource,
}

impl EvolutionOutcome {
    fn known(info: StageInfo, source: EvolutionSource) -> Self {
        Self {
            stage: Some(info.stage),
            is_fully_evolved: Some(info.is_fully_evolved),
            source,
        }
    }

    fn unknown(source: EvolutionSource) -> Self {
        Self {
            stage: None,
            is_fully_evolved: None,
            source,
        }
    }
}

/// What the caller could obtain for a species before classification.
#[derive(Debug, Clone)]
pub enum ChainData {
    /// Evolution chain document decoded
    Present(EvolutionNodeRef),
    /// Species data present, chain missing or unfetchable
    Missing,
    /// Species data itself unavailable
    NoSpecies,
}

/// Applies the fallback rules around `resolve`.
#[derive(Debug, Clone, Copy)]
pub struct EvolutionPolicy {
    no_chain_default: StageInfo,
}

impl Default for EvolutionPolicy {
    fn default() -> Self {
        Self::new(NO_CHAIN_DEFAULT)
    }
}

impl EvolutionPolicy {
    pub fn new(no_chain_default: StageInfo) -> Self {
        Self { no_chain_default }
    }

    /// Classify `species_name` against the available chain data.
    ///
    /// Never fails. A malformed chain is logged and reported as
    /// `MalformedChain`, an invalid target as `NotInChain`.
    pub fn classify(&self, species_name: &str, chain: &ChainData) -> EvolutionOutcome {
        match chain {
            ChainData::Present(root) => self.classify_in_chain(species_name, root),
            ChainData::Missing => {
                info!(
                    "no evolution chain data for {}; assuming stage {}, fully evolved: {}",
                    species_name, self.no_chain_default.stage, self.no_chain_default.is_fully_evolved
                );
                EvolutionOutcome::known(self.no_chain_default, EvolutionSource::AssumedNoChain)
            }
            ChainData::NoSpecies => EvolutionOutcome::unknown(EvolutionSource::Unavailable),
        }
    }

    fn classify_in_chain(&self, species_name: &str, root: &EvolutionNodeRef) -> EvolutionOutcome {
        let root_name = root.borrow().species_name.clone();

        match resolve(root, species_name) {
            Ok(Some(info)) => {
                debug!(
                    "{}: stage {} (fully evolved: {})",
                    species_name, info.stage, info.is_fully_evolved
                );
                EvolutionOutcome::known(info, EvolutionSource::Resolved)
            }
            Ok(None) => {
                if root_name == species_name {
                    let info = StageInfo {
                        stage: 1,
                        is_fully_evolved: root.borrow().children.is_empty(),
                    };
                    return EvolutionOutcome::known(info, EvolutionSource::RootFallback);
                }
                warn!(
                    "could not find {} in its evolution chain starting with {}",
                    species_name, root_name
                );
                EvolutionOutcome::unknown(EvolutionSource::NotInChain)
            }
            Err(e @ DomainError::MalformedChain { .. }) => {
                error!("{} (species {}, chain root {})", e, species_name, root_name);
                EvolutionOutcome::unknown(EvolutionSource::MalformedChain)
            }
            Err(e) => {
                warn!("{} (chain root {})", e, root_name);
                EvolutionOutcome::unknown(EvolutionSource::NotInChain)
            }
        }
    }
}

impl ChainData {
    pub fn from_root(root: &EvolutionNodeRef) -> Self {
        Self::Present(Rc::clone(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EvolutionNode;

    #[test]
    fn given_custom_default_when_chain_missing_then_uses_it() {
        let policy = EvolutionPolicy::new(StageInfo {
            stage: 1,
            is_fully_evolved: false,
        });
        let outcome = policy.classify("mew", &ChainData::Missing);
        assert_eq!(outcome.stage, Some(1));
        assert_eq!(outcome.is_fully_evolved, Some(false));
        assert_eq!(outcome.source, EvolutionSource::AssumedNoChain);
    }

    #[test]
    fn given_empty_name_when_classifying_then_not_in_chain() {
        let root = EvolutionNode::leaf("mew");
        let outcome = EvolutionPolicy::default().classify("", &ChainData::from_root(&root));
        assert_eq!(outcome.source, EvolutionSource::NotInChain);
        assert_eq!(outcome.stage, None);
    }
}
