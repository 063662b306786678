//! Abstract actions and the legal-choice sets derived from requests
//!
//! An [`Action`] is the unit the agent layer works with; it encodes to the
//! `/choose` directive the server expects and decodes back from one. The
//! exhaustive legal sets are computed by [`ChoiceSet::resolve`] in
//! [`legal`], never guessed: an action outside the set would stall or
//! desync the session.

mod encode;
mod legal;

use zoroark_protocol::ClientCommand;

use crate::types::to_id;

pub use encode::Strictness;

/// Once-per-battle battle mechanics that modify a move action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gimmick {
    Mega,
    ZMove,
    Dynamax,
    Terastallize,
}

impl Gimmick {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gimmick::Mega => "mega",
            Gimmick::ZMove => "zmove",
            Gimmick::Dynamax => "dynamax",
            Gimmick::Terastallize => "terastallize",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mega" => Some(Gimmick::Mega),
            "zmove" => Some(Gimmick::ZMove),
            "dynamax" | "max" => Some(Gimmick::Dynamax),
            "terastallize" | "terastal" | "tera" => Some(Gimmick::Terastallize),
            _ => None,
        }
    }
}

/// Explicit target slot for multi-slot formats.
///
/// Slot indices are 0-based; the wire encoding is signed and 1-based
/// (foes positive, own side negative), matching the server's choice syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSlot {
    Foe(u8),
    Ally(u8),
}

impl TargetSlot {
    pub fn to_directive(&self) -> String {
        match self {
            TargetSlot::Foe(slot) => format!("+{}", slot + 1),
            TargetSlot::Ally(slot) => format!("-{}", slot + 1),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if let Some(rest) = s.strip_prefix('-') {
            let n: u8 = rest.parse().ok()?;
            (n >= 1).then(|| TargetSlot::Ally(n - 1))
        } else {
            let n: u8 = s.strip_prefix('+').unwrap_or(s).parse().ok()?;
            (n >= 1).then(|| TargetSlot::Foe(n - 1))
        }
    }
}

/// One submittable decision for one slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Use a move, optionally with a gimmick and/or an explicit target
    Move {
        /// 1-based move slot as the request listed it
        slot: u8,
        /// Normalized move id
        id: String,
        gimmick: Option<Gimmick>,
        target: Option<TargetSlot>,
    },

    /// Switch to a bench (or, when reviving, fainted) team member
    Switch {
        /// 1-based team slot as the request listed it
        slot: u8,
        species: String,
    },

    /// Reserved no-op: let the server pick (used for wait states)
    Default,

    /// Reserved no-op for a slot with nothing to decide (multi-slot formats)
    Pass,

    /// Concede the battle; legal from any non-finished state
    Forfeit,
}

impl Action {
    /// Render the `/choose` directive body.
    ///
    /// Recharge is a locked pseudo-move the server only accepts as slot 1,
    /// so it always encodes positionally regardless of its nominal index.
    pub fn to_directive(&self) -> String {
        match self {
            Action::Move {
                id,
                gimmick,
                target,
                ..
            } => {
                let mut directive = if id == "recharge" {
                    "move 1".to_string()
                } else {
                    format!("move {}", id)
                };
                if let Some(g) = gimmick {
                    directive.push(' ');
                    directive.push_str(g.as_str());
                }
                if let Some(t) = target {
                    directive.push(' ');
                    directive.push_str(&t.to_directive());
                }
                directive
            }
            Action::Switch { species, .. } => format!("switch {}", to_id(species)),
            Action::Default => "default".to_string(),
            Action::Pass => "pass".to_string(),
            Action::Forfeit => "forfeit".to_string(),
        }
    }

    /// Build the outbound client command for this action
    pub fn to_command(&self, rqid: Option<u64>) -> ClientCommand {
        match self {
            Action::Forfeit => ClientCommand::Forfeit,
            other => ClientCommand::Choose {
                directive: other.to_directive(),
                rqid,
            },
        }
    }

    /// Whether this action consumes a once-per-battle gimmick
    pub fn gimmick(&self) -> Option<Gimmick> {
        match self {
            Action::Move { gimmick, .. } => *gimmick,
            _ => None,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Action::Move { .. })
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, Action::Switch { .. })
    }
}

/// Three-state switch legality signal.
///
/// The true trapping condition is not always knowable client-side (hidden
/// abilities, Shed Shell); the server reports `maybeTrapped` for exactly
/// that case, and the signal is preserved rather than collapsed to a bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trapping {
    #[default]
    Free,
    Maybe,
    Trapped,
}

impl Trapping {
    /// Whether switch actions stay in the legal set. `Maybe` keeps them —
    /// submitting is legal and the server re-requests if it was trapped.
    pub fn allows_switch(&self) -> bool {
        !matches!(self, Trapping::Trapped)
    }
}

/// Legal actions for one active slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotChoices {
    pub actions: Vec<Action>,
    pub force_switch: bool,
    pub trapping: Trapping,
    pub can_mega: bool,
    pub can_zmove: bool,
    pub can_dynamax: bool,
    pub can_terastallize: bool,
}

impl SlotChoices {
    fn passive(action: Action) -> Self {
        Self {
            actions: vec![action],
            force_switch: false,
            trapping: Trapping::Free,
            can_mega: false,
            can_zmove: false,
            can_dynamax: false,
            can_terastallize: false,
        }
    }
}

/// The exhaustive legal action sets derived from one request
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceSet {
    /// Room identifier, carried for error context
    pub room: String,

    /// Turn the request arrived on
    pub turn: u32,

    /// Request id to echo back with the choice
    pub rqid: Option<u64>,

    /// Server is waiting on the opponent; only a default no-op is legal
    pub wait: bool,

    /// Team-preview decision (ordering, not move/switch)
    pub team_preview: bool,

    /// Max team size to bring in team preview formats
    pub max_team_size: Option<u8>,

    /// Per-active-slot legal actions
    pub slots: Vec<SlotChoices>,
}

impl ChoiceSet {
    /// Legal single-slot orders (the slot 0 view, which is the whole battle
    /// in singles). Wait states collapse to the single default no-op.
    pub fn valid_orders(&self) -> Vec<Action> {
        if self.wait || self.slots.is_empty() {
            return vec![Action::Default];
        }
        self.slots[0].actions.clone()
    }

    /// Legal joint orders across all slots (doubles and beyond).
    ///
    /// Excludes combinations where two slots both spend a once-per-battle
    /// gimmick, and where two slots switch into the same team member.
    pub fn joint_orders(&self) -> Vec<Vec<Action>> {
        self.joint_orders_with(false)
    }

    /// Joint orders; `allow_multi_gimmick` lifts the one-gimmick-per-turn
    /// exclusion for formats that permit it per-slot.
    pub fn joint_orders_with(&self, allow_multi_gimmick: bool) -> Vec<Vec<Action>> {
        if self.wait || self.slots.is_empty() {
            return vec![vec![Action::Default]];
        }

        let mut joints: Vec<Vec<Action>> = vec![vec![]];
        for slot in &self.slots {
            let mut next = Vec::with_capacity(joints.len() * slot.actions.len().max(1));
            for prefix in &joints {
                for action in &slot.actions {
                    if !allow_multi_gimmick
                        && action.gimmick().is_some()
                        && prefix.iter().any(|a| a.gimmick().is_some())
                    {
                        continue;
                    }
                    if let Action::Switch { slot: target, .. } = action
                        && prefix
                            .iter()
                            .any(|a| matches!(a, Action::Switch { slot, .. } if slot == target))
                    {
                        continue;
                    }
                    let mut joint = prefix.clone();
                    joint.push(action.clone());
                    next.push(joint);
                }
            }
            joints = next;
        }
        joints
    }

    /// Move actions legal for slot 0 (gimmick-less base variants)
    pub fn available_moves(&self) -> Vec<&Action> {
        self.slots
            .first()
            .map(|s| {
                s.actions
                    .iter()
                    .filter(|a| matches!(a, Action::Move { gimmick: None, .. }))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Switch actions legal for slot 0
    pub fn available_switches(&self) -> Vec<&Action> {
        self.slots
            .first()
            .map(|s| s.actions.iter().filter(|a| a.is_switch()).collect())
            .unwrap_or_default()
    }

    /// Whether any slot is force-switching
    pub fn force_switch(&self) -> bool {
        self.slots.iter().any(|s| s.force_switch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gimmick_round_trip() {
        for g in [
            Gimmick::Mega,
            Gimmick::ZMove,
            Gimmick::Dynamax,
            Gimmick::Terastallize,
        ] {
            assert_eq!(Gimmick::parse(g.as_str()), Some(g));
        }
        assert_eq!(Gimmick::parse("max"), Some(Gimmick::Dynamax));
        assert_eq!(Gimmick::parse("nope"), None);
    }

    #[test]
    fn test_target_slot_round_trip() {
        assert_eq!(TargetSlot::Foe(0).to_directive(), "+1");
        assert_eq!(TargetSlot::Ally(1).to_directive(), "-2");
        assert_eq!(TargetSlot::parse("+2"), Some(TargetSlot::Foe(1)));
        assert_eq!(TargetSlot::parse("2"), Some(TargetSlot::Foe(1)));
        assert_eq!(TargetSlot::parse("-1"), Some(TargetSlot::Ally(0)));
        assert_eq!(TargetSlot::parse("0"), None);
        assert_eq!(TargetSlot::parse("x"), None);
    }

    #[test]
    fn test_move_directive() {
        let action = Action::Move {
            slot: 2,
            id: "thunderbolt".to_string(),
            gimmick: None,
            target: None,
        };
        assert_eq!(action.to_directive(), "move thunderbolt");

        let action = Action::Move {
            slot: 1,
            id: "earthquake".to_string(),
            gimmick: Some(Gimmick::Terastallize),
            target: Some(TargetSlot::Foe(1)),
        };
        assert_eq!(action.to_directive(), "move earthquake terastallize +2");
    }

    #[test]
    fn test_recharge_encodes_to_slot_one() {
        let action = Action::Move {
            slot: 3,
            id: "recharge".to_string(),
            gimmick: None,
            target: None,
        };
        assert_eq!(action.to_directive(), "move 1");
    }

    #[test]
    fn test_switch_directive_uses_species() {
        let action = Action::Switch {
            slot: 4,
            species: "Iron Valiant".to_string(),
        };
        assert_eq!(action.to_directive(), "switch ironvaliant");
    }

    #[test]
    fn test_forfeit_command() {
        assert_eq!(
            Action::Forfeit.to_command(Some(1)),
            zoroark_protocol::ClientCommand::Forfeit
        );
        assert_eq!(
            Action::Default.to_command(Some(9)),
            zoroark_protocol::ClientCommand::Choose {
                directive: "default".to_string(),
                rqid: Some(9),
            }
        );
    }

    #[test]
    fn test_trapping_allows_switch() {
        assert!(Trapping::Free.allows_switch());
        assert!(Trapping::Maybe.allows_switch());
        assert!(!Trapping::Trapped.allows_switch());
    }
}
