//! Legal-choice computation from a server request
//!
//! The request's legality flags are authoritative; this module expands them
//! into the exhaustive candidate action set: {switches if not trapped} ∪
//! {moves × applicable gimmicks × legal targets}, with force-switch and wait
//! states collapsing the set as the server dictates.

use zoroark_protocol::{ActiveSlot, BattleRequest};

use super::{Action, ChoiceSet, Gimmick, SlotChoices, TargetSlot, Trapping};
use crate::dex::{Dex, MoveTarget};
use crate::error::TrackError;
use crate::tracking::TrackedBattle;

impl ChoiceSet {
    /// Compute the legal action sets for a request against the current
    /// battle mirror. Deterministic: identical inputs produce identical sets.
    pub fn resolve(battle: &TrackedBattle, request: &BattleRequest) -> Result<Self, TrackError> {
        let room = battle.room_label();
        let turn = battle.turn;

        let mut set = ChoiceSet {
            room: room.clone(),
            turn,
            rqid: request.rqid,
            wait: request.wait,
            team_preview: request.team_preview,
            max_team_size: request.max_team_size,
            slots: Vec::new(),
        };

        if request.wait || request.team_preview {
            return Ok(set);
        }

        let switches: Vec<Action> = request
            .available_switches()
            .into_iter()
            .map(|(idx, p)| Action::Switch {
                slot: (idx + 1) as u8,
                species: p.species().to_string(),
            })
            .collect();

        let slots_per_side = battle.active_slots_per_side();
        let used = battle
            .me()
            .map(|s| (s.used_mega, s.used_zmove, s.used_dynamax, s.used_tera))
            .unwrap_or_default();

        let slot_count = request
            .force_switch
            .as_ref()
            .map(|fs| fs.len())
            .or_else(|| request.active.as_ref().map(|a| a.len()))
            .unwrap_or(1);

        for slot_index in 0..slot_count {
            let slot = if let Some(fs) = &request.force_switch {
                if fs.get(slot_index).copied().unwrap_or(false) {
                    let actions = if switches.is_empty() {
                        // Nothing to switch to; the server accepts a default
                        tracing::warn!(room = %room, turn, "force switch with empty bench");
                        vec![Action::Default]
                    } else {
                        switches.clone()
                    };
                    SlotChoices {
                        actions,
                        force_switch: true,
                        trapping: Trapping::Free,
                        can_mega: false,
                        can_zmove: false,
                        can_dynamax: false,
                        can_terastallize: false,
                    }
                } else {
                    SlotChoices::passive(Action::Pass)
                }
            } else if let Some(active) = request
                .active
                .as_ref()
                .and_then(|actives| actives.get(slot_index))
            {
                build_slot(
                    active,
                    &switches,
                    slot_index,
                    slots_per_side,
                    battle.dex(),
                    used,
                )
            } else {
                SlotChoices::passive(Action::Default)
            };

            if slot.actions.is_empty() && !battle.ended {
                return Err(TrackError::EmptyChoiceSet { room, turn });
            }
            set.slots.push(slot);
        }

        Ok(set)
    }
}

/// Expand one active slot's request entry into its legal actions
fn build_slot(
    active: &ActiveSlot,
    switches: &[Action],
    slot_index: usize,
    slots_per_side: usize,
    dex: &Dex,
    (used_mega, used_zmove, used_dynamax, used_tera): (bool, bool, bool, bool),
) -> SlotChoices {
    let trapping = if active.trapped {
        Trapping::Trapped
    } else if active.maybe_trapped {
        Trapping::Maybe
    } else {
        Trapping::Free
    };

    let can_mega = (active.can_mega_evo || active.can_ultra_burst) && !used_mega;
    let can_zmove = !used_zmove
        && active
            .can_z_move
            .as_ref()
            .map(|opts| opts.iter().any(|o| o.is_some()))
            .unwrap_or(false);
    let can_dynamax = active.can_dynamax && !used_dynamax;
    let can_terastallize = active.can_terastallize.is_some() && !used_tera;

    let mut actions = Vec::new();

    for (move_slot, mv) in active.usable_moves() {
        let target_kind = mv
            .target
            .as_deref()
            .and_then(MoveTarget::parse)
            .or_else(|| dex.move_data(&mv.id).map(|d| d.target))
            .unwrap_or(MoveTarget::Normal);

        let targets = enumerate_targets(target_kind, slot_index, slots_per_side);

        let z_available = active
            .can_z_move
            .as_ref()
            .and_then(|opts| opts.get(move_slot - 1))
            .map(|o| o.is_some())
            .unwrap_or(false);

        for target in &targets {
            let base = Action::Move {
                slot: move_slot as u8,
                id: mv.id.clone(),
                gimmick: None,
                target: *target,
            };

            if can_mega {
                actions.push(with_gimmick(&base, Gimmick::Mega));
            }
            if can_zmove && z_available {
                actions.push(with_gimmick(&base, Gimmick::ZMove));
            }
            if can_dynamax {
                actions.push(with_gimmick(&base, Gimmick::Dynamax));
            }
            if can_terastallize {
                actions.push(with_gimmick(&base, Gimmick::Terastallize));
            }
            actions.push(base);
        }
    }

    if trapping.allows_switch() {
        actions.extend_from_slice(switches);
    }

    SlotChoices {
        actions,
        force_switch: false,
        trapping,
        can_mega,
        can_zmove,
        can_dynamax,
        can_terastallize,
    }
}

fn with_gimmick(base: &Action, gimmick: Gimmick) -> Action {
    let Action::Move {
        slot, id, target, ..
    } = base
    else {
        return base.clone();
    };
    Action::Move {
        slot: *slot,
        id: id.clone(),
        gimmick: Some(gimmick),
        target: *target,
    }
}

/// Enumerate the explicit target slots a move may name, or `[None]` when no
/// explicit target is needed (singles, spread moves, self/side/field moves).
fn enumerate_targets(
    kind: MoveTarget,
    slot_index: usize,
    slots_per_side: usize,
) -> Vec<Option<TargetSlot>> {
    if !kind.needs_target(slots_per_side) {
        return vec![None];
    }

    let mut targets = Vec::new();
    if kind.can_target_foe() {
        for foe in 0..slots_per_side {
            targets.push(Some(TargetSlot::Foe(foe as u8)));
        }
    }
    if kind.can_target_ally() {
        for ally in 0..slots_per_side {
            if ally != slot_index {
                targets.push(Some(TargetSlot::Ally(ally as u8)));
            }
        }
        if kind == MoveTarget::AdjacentAllyOrSelf {
            targets.push(Some(TargetSlot::Ally(slot_index as u8)));
        }
    }

    if targets.is_empty() {
        vec![None]
    } else {
        targets
    }
}
