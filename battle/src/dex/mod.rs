//! Generation-keyed static data lookup
//!
//! One immutable [`Dex`] per generation, built lazily and cached for the
//! process lifetime. The engine takes its dex from [`DexStore::for_gen`]
//! when the |gen| message arrives; nothing here is battle-state.

mod moves;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::types::Type;

pub use moves::all_moves;

/// Damage category of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Physical,
    Special,
    Status,
}

/// Targeting kind of a move, as the request payload names them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    /// One adjacent target of the user's choice
    Normal,
    /// The user itself
    User,
    AdjacentAlly,
    AdjacentAllyOrSelf,
    AdjacentFoe,
    /// Every adjacent Pokemon, allies included (Earthquake)
    AllAdjacent,
    /// Every adjacent foe (Rock Slide)
    AllAdjacentFoes,
    /// The user's side of the field (Reflect)
    AllySide,
    /// The user's whole team (Heal Bell)
    AllyTeam,
    /// The opposing side of the field (Spikes)
    FoeSide,
    /// The whole field (Rain Dance)
    All,
    /// Any single Pokemon, adjacency ignored (Flying Press in triples)
    Any,
    /// A random foe (Outrage)
    RandomNormal,
    /// Target fixed by mechanics (Counter)
    Scripted,
}

impl MoveTarget {
    /// Parse a request-payload target string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(MoveTarget::Normal),
            "self" => Some(MoveTarget::User),
            "adjacentAlly" => Some(MoveTarget::AdjacentAlly),
            "adjacentAllyOrSelf" => Some(MoveTarget::AdjacentAllyOrSelf),
            "adjacentFoe" => Some(MoveTarget::AdjacentFoe),
            "allAdjacent" => Some(MoveTarget::AllAdjacent),
            "allAdjacentFoes" => Some(MoveTarget::AllAdjacentFoes),
            "allySide" => Some(MoveTarget::AllySide),
            "allyTeam" => Some(MoveTarget::AllyTeam),
            "foeSide" => Some(MoveTarget::FoeSide),
            "all" => Some(MoveTarget::All),
            "any" => Some(MoveTarget::Any),
            "randomNormal" => Some(MoveTarget::RandomNormal),
            "scripted" => Some(MoveTarget::Scripted),
            _ => None,
        }
    }

    /// Whether a choice must name an explicit target slot, given the number
    /// of active slots per side. Nothing needs a target in singles.
    pub fn needs_target(&self, slots_per_side: usize) -> bool {
        slots_per_side > 1
            && matches!(
                self,
                MoveTarget::Normal
                    | MoveTarget::Any
                    | MoveTarget::AdjacentFoe
                    | MoveTarget::AdjacentAlly
                    | MoveTarget::AdjacentAllyOrSelf
            )
    }

    /// Whether foe slots are legal explicit targets
    pub fn can_target_foe(&self) -> bool {
        matches!(
            self,
            MoveTarget::Normal | MoveTarget::Any | MoveTarget::AdjacentFoe
        )
    }

    /// Whether ally slots are legal explicit targets
    pub fn can_target_ally(&self) -> bool {
        matches!(
            self,
            MoveTarget::Any
                | MoveTarget::AdjacentAlly
                | MoveTarget::AdjacentAllyOrSelf
                | MoveTarget::Normal
        )
    }
}

/// Static, generation-scoped data for one move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveData {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub power: u16,
    /// None for moves that never miss
    pub accuracy: Option<u8>,
    pub pp: u8,
    pub priority: i8,
    pub target: MoveTarget,
}

/// Immutable per-generation lookup tables
#[derive(Debug)]
pub struct Dex {
    r#gen: u8,
    chart: [[f32; Type::COUNT]; Type::COUNT],
    moves: HashMap<&'static str, &'static MoveData>,
}

impl Dex {
    fn build(r#gen: u8) -> Self {
        let moves = all_moves().iter().map(|m| (m.id, m)).collect();
        Self {
            r#gen,
            chart: build_chart(r#gen),
            moves,
        }
    }

    pub fn generation(&self) -> u8 {
        self.r#gen
    }

    /// Effectiveness multiplier of an attacking type against one defender type
    pub fn effectiveness(&self, attacker: Type, defender: Type) -> f32 {
        self.chart[attacker as usize][defender as usize]
    }

    /// Effectiveness against a (1 or 2 entry) defender type list
    pub fn effectiveness_against(&self, attacker: Type, defenders: &[Type]) -> f32 {
        defenders
            .iter()
            .map(|t| self.effectiveness(attacker, *t))
            .product()
    }

    /// All types super effective against the defender
    pub fn weaknesses(&self, defenders: &[Type]) -> Vec<Type> {
        Type::all()
            .iter()
            .copied()
            .filter(|t| self.effectiveness_against(*t, defenders) > 1.0)
            .collect()
    }

    /// All types the defender resists (0 < effectiveness < 1)
    pub fn resistances(&self, defenders: &[Type]) -> Vec<Type> {
        Type::all()
            .iter()
            .copied()
            .filter(|t| {
                let eff = self.effectiveness_against(*t, defenders);
                eff > 0.0 && eff < 1.0
            })
            .collect()
    }

    /// All types the defender is immune to
    pub fn immunities(&self, defenders: &[Type]) -> Vec<Type> {
        Type::all()
            .iter()
            .copied()
            .filter(|t| self.effectiveness_against(*t, defenders) == 0.0)
            .collect()
    }

    /// Look up static move data by normalized id
    pub fn move_data(&self, id: &str) -> Option<&MoveData> {
        self.moves.get(id).copied()
    }

    // === Mechanic availability by generation ===

    pub fn allows_mega(&self) -> bool {
        matches!(self.r#gen, 6 | 7)
    }

    pub fn allows_zmove(&self) -> bool {
        self.r#gen == 7
    }

    pub fn allows_dynamax(&self) -> bool {
        self.r#gen == 8
    }

    pub fn allows_tera(&self) -> bool {
        self.r#gen == 9
    }
}

/// Process-wide cache of per-generation dexes
pub struct DexStore;

impl DexStore {
    /// Get the (shared, immutable) dex for a generation. Built on first use.
    pub fn for_gen(r#gen: u8) -> Arc<Dex> {
        static CACHE: OnceLock<Mutex<HashMap<u8, Arc<Dex>>>> = OnceLock::new();

        let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
        let mut guard = cache.lock().unwrap_or_else(|poison| poison.into_inner());
        guard
            .entry(r#gen.clamp(1, 9))
            .or_insert_with(|| Arc::new(Dex::build(r#gen.clamp(1, 9))))
            .clone()
    }
}

fn build_chart(r#gen: u8) -> [[f32; Type::COUNT]; Type::COUNT] {
    use Type::*;

    const SUPER: &[(Type, Type)] = &[
        (Fire, Grass),
        (Fire, Ice),
        (Fire, Bug),
        (Fire, Steel),
        (Water, Fire),
        (Water, Ground),
        (Water, Rock),
        (Electric, Water),
        (Electric, Flying),
        (Grass, Water),
        (Grass, Ground),
        (Grass, Rock),
        (Ice, Grass),
        (Ice, Ground),
        (Ice, Flying),
        (Ice, Dragon),
        (Fighting, Normal),
        (Fighting, Ice),
        (Fighting, Rock),
        (Fighting, Dark),
        (Fighting, Steel),
        (Poison, Grass),
        (Poison, Fairy),
        (Ground, Fire),
        (Ground, Electric),
        (Ground, Poison),
        (Ground, Rock),
        (Ground, Steel),
        (Flying, Grass),
        (Flying, Fighting),
        (Flying, Bug),
        (Psychic, Fighting),
        (Psychic, Poison),
        (Bug, Grass),
        (Bug, Psychic),
        (Bug, Dark),
        (Rock, Fire),
        (Rock, Ice),
        (Rock, Flying),
        (Rock, Bug),
        (Ghost, Psychic),
        (Ghost, Ghost),
        (Dragon, Dragon),
        (Dark, Psychic),
        (Dark, Ghost),
        (Steel, Ice),
        (Steel, Rock),
        (Steel, Fairy),
        (Fairy, Fighting),
        (Fairy, Dragon),
        (Fairy, Dark),
    ];

    const RESIST: &[(Type, Type)] = &[
        (Normal, Rock),
        (Normal, Steel),
        (Fire, Fire),
        (Fire, Water),
        (Fire, Rock),
        (Fire, Dragon),
        (Water, Water),
        (Water, Grass),
        (Water, Dragon),
        (Electric, Electric),
        (Electric, Grass),
        (Electric, Dragon),
        (Grass, Fire),
        (Grass, Grass),
        (Grass, Poison),
        (Grass, Flying),
        (Grass, Bug),
        (Grass, Dragon),
        (Grass, Steel),
        (Ice, Fire),
        (Ice, Water),
        (Ice, Ice),
        (Ice, Steel),
        (Fighting, Poison),
        (Fighting, Flying),
        (Fighting, Psychic),
        (Fighting, Bug),
        (Fighting, Fairy),
        (Poison, Poison),
        (Poison, Ground),
        (Poison, Rock),
        (Poison, Ghost),
        (Ground, Grass),
        (Ground, Bug),
        (Flying, Electric),
        (Flying, Rock),
        (Flying, Steel),
        (Psychic, Psychic),
        (Psychic, Steel),
        (Bug, Fire),
        (Bug, Fighting),
        (Bug, Poison),
        (Bug, Flying),
        (Bug, Ghost),
        (Bug, Steel),
        (Bug, Fairy),
        (Rock, Fighting),
        (Rock, Ground),
        (Rock, Steel),
        (Ghost, Dark),
        (Dragon, Steel),
        (Dark, Fighting),
        (Dark, Dark),
        (Dark, Fairy),
        (Steel, Fire),
        (Steel, Water),
        (Steel, Electric),
        (Steel, Steel),
        (Fairy, Fire),
        (Fairy, Poison),
        (Fairy, Steel),
    ];

    const IMMUNE: &[(Type, Type)] = &[
        (Normal, Ghost),
        (Electric, Ground),
        (Fighting, Ghost),
        (Poison, Steel),
        (Ground, Flying),
        (Psychic, Dark),
        (Ghost, Normal),
        (Dragon, Fairy),
    ];

    let mut chart = [[1.0f32; Type::COUNT]; Type::COUNT];
    for &(atk, def) in SUPER {
        chart[atk as usize][def as usize] = 2.0;
    }
    for &(atk, def) in RESIST {
        chart[atk as usize][def as usize] = 0.5;
    }
    for &(atk, def) in IMMUNE {
        chart[atk as usize][def as usize] = 0.0;
    }

    if r#gen <= 5 {
        // Fairy did not exist yet
        neutralize(&mut chart, Fairy);
        // Steel still resisted Ghost and Dark
        chart[Ghost as usize][Steel as usize] = 0.5;
        chart[Dark as usize][Steel as usize] = 0.5;
    }

    if r#gen == 1 {
        neutralize(&mut chart, Dark);
        neutralize(&mut chart, Steel);
        chart[Bug as usize][Poison as usize] = 2.0;
        chart[Poison as usize][Bug as usize] = 2.0;
        chart[Ice as usize][Fire as usize] = 1.0;
        chart[Ghost as usize][Psychic as usize] = 0.0;
    }

    chart
}

/// Zero out a type's interactions for generations where it doesn't exist
fn neutralize(chart: &mut [[f32; Type::COUNT]; Type::COUNT], t: Type) {
    for i in 0..Type::COUNT {
        chart[t as usize][i] = 1.0;
        chart[i][t as usize] = 1.0;
    }
}
