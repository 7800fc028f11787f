//! PokeAPI document shapes
//!
//! Upstream JSON is decoded into these types at the boundary; everything past
//! this module works with typed data. Unknown fields are ignored and missing
//! collections decode as empty.

use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{EvolutionNode, EvolutionNodeRef};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl fmt::Display for NamedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiResource {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatEntry {
    pub base_stat: u16,
    pub stat: NamedResource,
}

/// `GET pokemon/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PokemonDocument {
    pub id: u32,
    pub name: String,
    pub species: Option<NamedResource>,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
}

impl PokemonDocument {
    pub fn base_stat(&self, name: &str) -> Option<u16> {
        self.stats
            .iter()
            .find(|s| s.stat.name == name)
            .map(|s| s.base_stat)
    }

    /// Type name at list position `index` (0 = primary).
    pub fn type_name(&self, index: usize) -> Option<String> {
        self.types.get(index).map(|t| t.kind.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: Option<NamedResource>,
}

impl FlavorTextEntry {
    pub fn language_name(&self) -> &str {
        self.language
            .as_ref()
            .map(|l| l.name.as_str())
            .unwrap_or("unknown")
    }
}

/// `GET pokemon-species/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpeciesDocument {
    pub name: String,
    pub generation: Option<NamedResource>,
    pub evolution_chain: Option<ApiResource>,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
}

/// One node of an upstream evolution chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

impl ChainLink {
    /// Convert into the domain node shape, keeping child order.
    pub fn to_node(&self) -> EvolutionNodeRef {
        let root = EvolutionNode::leaf(self.species.name.clone());
        let mut stack: Vec<(&ChainLink, EvolutionNodeRef)> = vec![(self, Rc::clone(&root))];

        while let Some((link, node)) = stack.pop() {
            for child_link in &link.evolves_to {
                let child = EvolutionNode::leaf(child_link.species.name.clone());
                EvolutionNode::add_child(&node, Rc::clone(&child));
                stack.push((child_link, child));
            }
        }

        root
    }
}

/// `GET evolution-chain/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EvolutionChainDocument {
    #[serde(default)]
    pub id: u32,
    pub chain: ChainLink,
}

/// `GET {kind}/?limit=N`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EffectEntry {
    #[serde(default)]
    pub effect: String,
    #[serde(default)]
    pub short_effect: String,
    pub language: Option<NamedResource>,
}

impl EffectEntry {
    /// Short effect when present, else the long text.
    pub fn text(&self) -> Option<&str> {
        [self.short_effect.as_str(), self.effect.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|t| !t.is_empty())
    }

    fn is_english(&self) -> bool {
        self.language.as_ref().is_some_and(|l| l.name == "en")
    }
}

/// `GET move/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoveDocument {
    pub id: u32,
    pub name: String,
    pub accuracy: Option<u8>,
    pub pp: Option<u8>,
    #[serde(default)]
    pub priority: i8,
    pub power: Option<u16>,
    pub damage_class: Option<NamedResource>,
    #[serde(rename = "type")]
    pub move_type: Option<NamedResource>,
    pub effect_chance: Option<u8>,
    pub target: Option<NamedResource>,
    #[serde(default)]
    pub effect_entries: Vec<EffectEntry>,
    #[serde(default)]
    pub learned_by_pokemon: Vec<NamedResource>,
}

impl MoveDocument {
    /// English effect text, else the first entry in any language.
    pub fn effect_text(&self) -> Option<&str> {
        self.effect_entries
            .iter()
            .find(|e| e.is_english())
            .and_then(EffectEntry::text)
            .or_else(|| self.effect_entries.first().and_then(EffectEntry::text))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DamageRelations {
    pub no_damage_from: Vec<NamedResource>,
    pub half_damage_from: Vec<NamedResource>,
    pub double_damage_from: Vec<NamedResource>,
    pub no_damage_to: Vec<NamedResource>,
    pub half_damage_to: Vec<NamedResource>,
    pub double_damage_to: Vec<NamedResource>,
}

/// `GET type/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeDocument {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub damage_relations: DamageRelations,
}

/// Resource names in upstream order.
pub fn names_of(resources: &[NamedResource]) -> Vec<String> {
    resources.iter().map(|r| r.name.clone()).collect()
}

/// Decode a fetched document body.
pub fn parse_document<T: DeserializeOwned>(url: &str, body: &str) -> ApplicationResult<T> {
    serde_json::from_str(body).map_err(|e| ApplicationError::Decode {
        url: url.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evolution::entries;

    const BULBASAUR_CHAIN: &str = r#"{
        "id": 1,
        "baby_trigger_item": null,
        "chain": {
            "is_baby": false,
            "species": {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon-species/1/"},
            "evolution_details": [],
            "evolves_to": [{
                "species": {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon-species/2/"},
                "evolves_to": [{
                    "species": {"name": "venusaur", "url": "https://pokeapi.co/api/v2/pokemon-species/3/"},
                    "evolves_to": []
                }]
            }]
        }
    }"#;

    #[test]
    fn given_chain_json_when_parsing_then_converts_to_nodes() {
        let doc: EvolutionChainDocument = parse_document("chain/1", BULBASAUR_CHAIN).unwrap();
        let root = doc.chain.to_node();
        let listed: Vec<_> = entries(&root)
            .unwrap()
            .into_iter()
            .map(|e| (e.species_name, e.info.stage, e.info.is_fully_evolved))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("bulbasaur".to_string(), 1, false),
                ("ivysaur".to_string(), 2, false),
                ("venusaur".to_string(), 3, true),
            ]
        );
    }

    #[test]
    fn given_link_without_evolves_to_when_parsing_then_leaf() {
        let link: ChainLink =
            parse_document("x", r#"{"species": {"name": "tauros"}}"#).unwrap();
        let root = link.to_node();
        assert!(root.borrow().children.is_empty());
    }

    #[test]
    fn given_invalid_json_when_parsing_then_decode_error_names_url() {
        let err = parse_document::<PokemonDocument>("pokemon/1", "{not json").unwrap_err();
        assert!(matches!(&err, ApplicationError::Decode { url, .. } if url == "pokemon/1"));
        assert!(err.to_string().contains("pokemon/1"));
    }

    #[test]
    fn given_pokemon_json_when_reading_stats_then_looks_up_by_name() {
        let doc: PokemonDocument = parse_document(
            "pokemon/25",
            r#"{"id": 25, "name": "pikachu",
                "types": [{"slot": 1, "type": {"name": "electric", "url": ""}}],
                "stats": [{"base_stat": 35, "effort": 0, "stat": {"name": "hp", "url": ""}},
                          {"base_stat": 90, "effort": 2, "stat": {"name": "speed", "url": ""}}]}"#,
        )
        .unwrap();
        assert_eq!(doc.base_stat("hp"), Some(35));
        assert_eq!(doc.base_stat("speed"), Some(90));
        assert_eq!(doc.base_stat("attack"), None);
        assert_eq!(doc.type_name(0).as_deref(), Some("electric"));
        assert_eq!(doc.type_name(1), None);
        assert!(doc.species.is_none());
    }

    #[test]
    fn given_type_json_without_relations_when_parsing_then_empty_relations() {
        let doc: TypeDocument =
            parse_document("type/10001", r#"{"id": 10001, "name": "unknown"}"#).unwrap();
        assert_eq!(doc.damage_relations, DamageRelations::default());
    }

    fn effect(short: &str, long: &str, lang: &str) -> EffectEntry {
        EffectEntry {
            effect: long.into(),
            short_effect: short.into(),
            language: Some(NamedResource {
                name: lang.into(),
                url: String::new(),
            }),
        }
    }

    fn move_doc(effect_entries: Vec<EffectEntry>) -> MoveDocument {
        parse_document::<MoveDocument>("move/1", r#"{"id": 1, "name": "pound"}"#)
            .map(|doc| MoveDocument {
                effect_entries,
                ..doc
            })
            .unwrap()
    }

    #[test]
    fn given_english_entry_when_reading_effect_then_short_effect_preferred() {
        let doc = move_doc(vec![
            effect("Fügt Schaden zu.", "", "de"),
            effect("Inflicts regular damage.", "Inflicts regular damage with no additional effect.", "en"),
        ]);
        assert_eq!(doc.effect_text(), Some("Inflicts regular damage."));
    }

    #[test]
    fn given_english_entry_without_short_effect_when_reading_effect_then_long_text() {
        let doc = move_doc(vec![effect("", "Inflicts regular damage.", "en")]);
        assert_eq!(doc.effect_text(), Some("Inflicts regular damage."));
    }

    #[test]
    fn given_only_foreign_entries_when_reading_effect_then_first_entry() {
        let doc = move_doc(vec![effect("Fügt Schaden zu.", "", "de"), effect("Inflige", "", "fr")]);
        assert_eq!(doc.effect_text(), Some("Fügt Schaden zu."));
    }

    #[test]
    fn given_no_entries_when_reading_effect_then_none() {
        assert_eq!(move_doc(vec![]).effect_text(), None);
    }
}
