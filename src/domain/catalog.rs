//! Move and type catalog rows

use serde::{Deserialize, Serialize};

use crate::domain::entities::Record;

pub const NO_EFFECT_DESCRIPTION: &str = "No effect description available.";

/// One row of the `move` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub id: u32,
    pub name: String,
    /// None for moves that never miss
    pub accuracy: Option<u8>,
    pub pp: Option<u8>,
    pub priority: i8,
    /// None for status moves
    pub power: Option<u16>,
    pub damage_class: Option<String>,
    #[serde(rename = "type")]
    pub move_type: Option<String>,
    pub effect: String,
    pub effect_chance: Option<u8>,
    pub target: Option<String>,
    pub learned_by_pokemon: Vec<String>,
}

impl Record for MoveRecord {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One row of the `type` table: damage relations as type names.
///
/// `weak_to` lists attacking types that deal double damage to this type,
/// `double_to` the defending types this type deals double damage to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub id: u32,
    pub name: String,
    pub no_damage_from: Vec<String>,
    pub weak_to: Vec<String>,
    pub resist_from: Vec<String>,
    pub no_damage_to: Vec<String>,
    pub double_to: Vec<String>,
    pub half_to: Vec<String>,
}

impl TypeRecord {
    /// Damage multiplier of an attack of this type against `defender`.
    pub fn multiplier_against(&self, defender: &str) -> f32 {
        let has = |list: &[String]| list.iter().any(|t| t == defender);
        if has(&self.no_damage_to) {
            0.0
        } else if has(&self.double_to) {
            2.0
        } else if has(&self.half_to) {
            0.5
        } else {
            1.0
        }
    }
}

impl Record for TypeRecord {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
