//! Stat stages and related types

use zoroark_protocol::Stat;

/// Stat stages (-6 to +6)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatStages {
    pub atk: i8,
    pub def: i8,
    pub spa: i8,
    pub spd: i8,
    pub spe: i8,
    pub accuracy: i8,
    pub evasion: i8,
}

impl StatStages {
    /// Create new stat stages (all at 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Get stage for a stat
    pub fn get(&self, stat: Stat) -> i8 {
        match stat {
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spa => self.spa,
            Stat::Spd => self.spd,
            Stat::Spe => self.spe,
            Stat::Accuracy => self.accuracy,
            Stat::Evasion => self.evasion,
        }
    }

    /// Set stage for a stat (clamped to -6..+6)
    pub fn set(&mut self, stat: Stat, value: i8) {
        let clamped = value.clamp(-6, 6);
        match stat {
            Stat::Atk => self.atk = clamped,
            Stat::Def => self.def = clamped,
            Stat::Spa => self.spa = clamped,
            Stat::Spd => self.spd = clamped,
            Stat::Spe => self.spe = clamped,
            Stat::Accuracy => self.accuracy = clamped,
            Stat::Evasion => self.evasion = clamped,
        }
    }

    /// Apply a boost to a stat, returns actual change applied
    pub fn boost(&mut self, stat: Stat, amount: i8) -> i8 {
        let current = self.get(stat);
        let new_value = (current + amount).clamp(-6, 6);
        self.set(stat, new_value);
        new_value - current
    }

    /// Apply an unboost (negative boost) to a stat, returns actual change applied
    pub fn unboost(&mut self, stat: Stat, amount: i8) -> i8 {
        self.boost(stat, -amount)
    }

    /// Reset all stages to 0
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Reset only positive stages to 0 (Spectral Thief steal step)
    pub fn clear_positive(&mut self) {
        for stat in Self::ALL {
            if self.get(stat) > 0 {
                self.set(stat, 0);
            }
        }
    }

    /// Reset only negative stages to 0 (White Herb)
    pub fn clear_negative(&mut self) {
        for stat in Self::ALL {
            if self.get(stat) < 0 {
                self.set(stat, 0);
            }
        }
    }

    /// Invert all stages (Topsy-Turvy)
    pub fn invert(&mut self) {
        for stat in Self::ALL {
            self.set(stat, -self.get(stat));
        }
    }

    /// Copy boosts from another StatStages (Psych Up)
    pub fn copy_from(&mut self, other: &StatStages) {
        *self = other.clone();
    }

    /// Check if all stats are at 0
    pub fn is_clear(&self) -> bool {
        Self::ALL.iter().all(|&s| self.get(s) == 0)
    }

    const ALL: [Stat; 7] = [
        Stat::Atk,
        Stat::Def,
        Stat::Spa,
        Stat::Spd,
        Stat::Spe,
        Stat::Accuracy,
        Stat::Evasion,
    ];

    /// Get the multiplier for a stat stage (for atk/def/spa/spd/spe)
    /// +1 = 1.5x, +2 = 2x, ..., +6 = 4x
    /// -1 = 0.67x, -2 = 0.5x, ..., -6 = 0.25x
    pub fn multiplier(stage: i8) -> f32 {
        let stage = stage.clamp(-6, 6);
        if stage >= 0 {
            (2 + stage as i32) as f32 / 2.0
        } else {
            2.0 / (2 - stage as i32) as f32
        }
    }

    /// Get the multiplier for accuracy/evasion stages (different formula)
    pub fn accuracy_multiplier(stage: i8) -> f32 {
        let stage = stage.clamp(-6, 6);
        if stage >= 0 {
            (3 + stage as i32) as f32 / 3.0
        } else {
            3.0 / (3 - stage as i32) as f32
        }
    }
}
