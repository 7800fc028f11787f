//! Domain entities: the per-species record and its field rules

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Core numeric attributes of a species. Any of them may be missing upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: Option<u16>,
    pub attack: Option<u16>,
    pub defense: Option<u16>,
    pub special_attack: Option<u16>,
    pub special_defense: Option<u16>,
    pub speed: Option<u16>,
}

impl BaseStats {
    /// Base Stat Total, only when all six stats are known.
    pub fn total(&self) -> Option<u16> {
        [
            self.hp,
            self.attack,
            self.defense,
            self.special_attack,
            self.special_defense,
            self.speed,
        ]
        .into_iter()
        .try_fold(0u16, |acc, stat| stat.map(|s| acc.saturating_add(s)))
    }
}

/// How a record's stage and evolution status were obtained.
///
/// Lets consumers tell a resolved "stage 1" from an assumed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionSource {
    /// Found by the chain resolver
    Resolved,
    /// Not found by the resolver, but the chain root carries the name
    RootFallback,
    /// Chain data present, species absent from it
    NotInChain,
    /// Chain data structurally invalid (cycle or shared node)
    MalformedChain,
    /// No chain data: stage 1, fully evolved assumed
    AssumedNoChain,
    /// No species data at all
    Unavailable,
}

impl EvolutionSource {
    /// True when stage/is_fully_evolved come from actual chain data.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Resolved | Self::RootFallback)
    }
}

/// A table row keyed by its upstream id.
pub trait Record: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> u32;

    fn name(&self) -> &str;
}

/// One row of the `pokemon` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonRecord {
    pub id: u32,
    pub name: String,
    pub generation: Option<u8>,
    pub type1: Option<String>,
    /// None for single-type species
    pub type2: Option<String>,
    pub stats: BaseStats,
    pub bst: Option<u16>,
    pub stage: Option<u32>,
    pub is_fully_evolved: Option<bool>,
    pub evolution_source: EvolutionSource,
    pub dex_entry: String,
}

impl Record for PokemonRecord {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl PokemonRecord {
    /// Names of critical fields that are missing (name, type1, hp, bst).
    pub fn missing_critical_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.type1.is_none() {
            missing.push("type1");
        }
        if self.stats.hp.is_none() {
            missing.push("hp");
        }
        if self.bst.is_none() {
            missing.push("bst");
        }
        missing
    }
}

pub const NO_ENGLISH_DEX_ENTRY: &str = "No English dex entry found.";
pub const NO_DEX_ENTRY_DATA: &str = "No dex entry data available.";

const ROMAN_NUMERALS: [&str; 10] = ["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x"];

/// Parse a generation resource name such as `generation-iv` into its number.
///
/// Only the numerals i through x are recognized.
pub fn parse_generation(name: &str) -> Result<u8, DomainError> {
    let invalid = || DomainError::InvalidGeneration(name.to_string());

    let numeral = name.split('-').nth(1).ok_or_else(invalid)?.to_lowercase();
    ROMAN_NUMERALS
        .iter()
        .position(|r| *r == numeral)
        .map(|idx| idx as u8 + 1)
        .ok_or_else(invalid)
}

/// Flavor texts carry hard line breaks and form feeds from the game text boxes.
pub fn clean_flavor_text(text: &str) -> String {
    text.replace(['\n', '\x0c'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("generation-i", 1)]
    #[case("generation-iv", 4)]
    #[case("generation-IX", 9)]
    #[case("generation-x", 10)]
    fn given_generation_name_when_parsing_then_returns_number(
        #[case] name: &str,
        #[case] expected: u8,
    ) {
        assert_eq!(parse_generation(name), Ok(expected));
    }

    #[rstest]
    #[case("generation")]
    #[case("generation-xi")]
    #[case("generation-")]
    #[case("")]
    fn given_unexpected_generation_name_when_parsing_then_errors(#[case] name: &str) {
        assert_eq!(
            parse_generation(name),
            Err(DomainError::InvalidGeneration(name.to_string()))
        );
    }

    #[test]
    fn given_all_stats_when_total_then_sums() {
        let stats = BaseStats {
            hp: Some(45),
            attack: Some(49),
            defense: Some(49),
            special_attack: Some(65),
            special_defense: Some(65),
            speed: Some(45),
        };
        assert_eq!(stats.total(), Some(318));
    }

    #[test]
    fn given_missing_stat_when_total_then_none() {
        let stats = BaseStats {
            hp: Some(45),
            speed: None,
            ..BaseStats::default()
        };
        assert_eq!(stats.total(), None);
    }

    #[test]
    fn given_flavor_text_with_breaks_when_cleaning_then_uses_spaces() {
        let raw = "A strange seed was\nplanted on its\x0cback at birth. ";
        assert_eq!(
            clean_flavor_text(raw),
            "A strange seed was planted on its back at birth."
        );
    }

    #[test]
    fn given_source_when_is_known_then_only_chain_backed() {
        assert!(EvolutionSource::Resolved.is_known());
        assert!(EvolutionSource::RootFallback.is_known());
        assert!(!EvolutionSource::AssumedNoChain.is_known());
        assert!(!EvolutionSource::NotInChain.is_known());
        assert!(!EvolutionSource::Unavailable.is_known());
        assert!(!EvolutionSource::MalformedChain.is_known());
    }

    #[test]
    fn given_malformed_chain_source_when_serializing_then_snake_case() {
        let json = serde_json::to_string(&EvolutionSource::MalformedChain).unwrap();
        assert_eq!(json, "\"malformed_chain\"");
    }
}
