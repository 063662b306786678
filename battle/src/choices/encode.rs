//! Directive decoding back into abstract actions
//!
//! Encoding lives on [`Action::to_directive`]; this module handles the
//! inverse, validated against the current legal set. Strict mode rejects
//! anything outside the set; permissive mode substitutes a uniformly random
//! legal action instead, for callers that train against invalid-action
//! penalties rather than hard failures.

use rand::seq::SliceRandom;

use super::{Action, ChoiceSet, Gimmick, TargetSlot};
use crate::error::TrackError;
use crate::types::to_id;

/// How to treat a directive that is not in the legal set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Reject with [`TrackError::IllegalChoice`]
    #[default]
    Strict,
    /// Substitute a uniformly random legal action
    Permissive,
}

impl ChoiceSet {
    /// Decode a wire directive ("/choose move thunderbolt", "switch 3", ...)
    /// into the matching legal [`Action`].
    pub fn decode(&self, wire: &str, strictness: Strictness) -> Result<Action, TrackError> {
        let directive = wire
            .trim()
            .strip_prefix("/choose ")
            .or_else(|| wire.trim().strip_prefix("choose "))
            .unwrap_or(wire.trim());

        if let Some(action) = self.match_directive(directive) {
            return Ok(action);
        }

        match strictness {
            Strictness::Strict => Err(TrackError::IllegalChoice {
                room: self.room.clone(),
                turn: self.turn,
                directive: directive.to_string(),
            }),
            Strictness::Permissive => {
                let orders = self.valid_orders();
                orders
                    .choose(&mut rand::thread_rng())
                    .cloned()
                    .ok_or_else(|| TrackError::EmptyChoiceSet {
                        room: self.room.clone(),
                        turn: self.turn,
                    })
            }
        }
    }

    fn match_directive(&self, directive: &str) -> Option<Action> {
        let mut tokens = directive.split_whitespace();
        let kind = tokens.next()?;

        match kind {
            // Reserved actions are always decodable
            "forfeit" => Some(Action::Forfeit),
            "default" => Some(Action::Default),
            "pass" => Some(Action::Pass),

            "move" => {
                let which = tokens.next()?;
                let mut gimmick = None;
                let mut target = None;
                for token in tokens {
                    if let Some(g) = Gimmick::parse(token) {
                        gimmick = Some(g);
                    } else if let Some(t) = TargetSlot::parse(token) {
                        target = Some(t);
                    } else {
                        return None;
                    }
                }

                let by_slot: Option<u8> = which.parse().ok();
                let by_id = to_id(which);

                self.find_action(|a| match a {
                    Action::Move {
                        slot,
                        id,
                        gimmick: g,
                        target: t,
                    } => {
                        let name_match = by_slot.map(|n| n == *slot).unwrap_or(false)
                            || *id == by_id
                            || (id == "recharge" && by_slot == Some(1));
                        name_match && *g == gimmick && *t == target
                    }
                    _ => false,
                })
            }

            "switch" => {
                let which = tokens.next()?;
                let by_slot: Option<u8> = which.parse().ok();
                let by_id = to_id(which);

                self.find_action(|a| match a {
                    Action::Switch { slot, species } => {
                        by_slot.map(|n| n == *slot).unwrap_or(false) || to_id(species) == by_id
                    }
                    _ => false,
                })
            }

            _ => None,
        }
    }

    fn find_action(&self, predicate: impl Fn(&Action) -> bool) -> Option<Action> {
        if self.wait && predicate(&Action::Default) {
            return Some(Action::Default);
        }
        self.slots
            .iter()
            .flat_map(|s| s.actions.iter())
            .find(|a| predicate(a))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choices::{SlotChoices, Trapping};

    fn test_set(actions: Vec<Action>) -> ChoiceSet {
        ChoiceSet {
            room: "battle-gen9ou-42".to_string(),
            turn: 7,
            rqid: Some(3),
            wait: false,
            team_preview: false,
            max_team_size: None,
            slots: vec![SlotChoices {
                actions,
                force_switch: false,
                trapping: Trapping::Free,
                can_mega: false,
                can_zmove: false,
                can_dynamax: false,
                can_terastallize: false,
            }],
        }
    }

    fn sample_actions() -> Vec<Action> {
        vec![
            Action::Move {
                slot: 1,
                id: "thunderbolt".to_string(),
                gimmick: None,
                target: None,
            },
            Action::Move {
                slot: 1,
                id: "thunderbolt".to_string(),
                gimmick: Some(Gimmick::Terastallize),
                target: None,
            },
            Action::Move {
                slot: 2,
                id: "voltswitch".to_string(),
                gimmick: None,
                target: None,
            },
            Action::Switch {
                slot: 3,
                species: "Gliscor".to_string(),
            },
        ]
    }

    #[test]
    fn test_round_trip_every_legal_action() {
        let set = test_set(sample_actions());
        for action in set.valid_orders() {
            let decoded = set
                .decode(&action.to_directive(), Strictness::Strict)
                .unwrap();
            assert_eq!(decoded, action);
        }
    }

    #[test]
    fn test_decode_with_choose_prefix() {
        let set = test_set(sample_actions());
        let decoded = set
            .decode("/choose move thunderbolt terastallize", Strictness::Strict)
            .unwrap();
        assert_eq!(decoded.gimmick(), Some(Gimmick::Terastallize));
    }

    #[test]
    fn test_decode_by_slot_number() {
        let set = test_set(sample_actions());
        let decoded = set.decode("move 2", Strictness::Strict).unwrap();
        assert_eq!(
            decoded,
            Action::Move {
                slot: 2,
                id: "voltswitch".to_string(),
                gimmick: None,
                target: None,
            }
        );

        let decoded = set.decode("switch 3", Strictness::Strict).unwrap();
        assert!(decoded.is_switch());
    }

    #[test]
    fn test_decode_switch_by_species() {
        let set = test_set(sample_actions());
        let decoded = set.decode("switch gliscor", Strictness::Strict).unwrap();
        assert_eq!(
            decoded,
            Action::Switch {
                slot: 3,
                species: "Gliscor".to_string(),
            }
        );
    }

    #[test]
    fn test_strict_rejects_illegal() {
        let set = test_set(sample_actions());
        let err = set
            .decode("move earthquake", Strictness::Strict)
            .unwrap_err();
        match err {
            TrackError::IllegalChoice {
                room,
                turn,
                directive,
            } => {
                assert_eq!(room, "battle-gen9ou-42");
                assert_eq!(turn, 7);
                assert_eq!(directive, "move earthquake");
            }
            other => panic!("expected IllegalChoice, got {other:?}"),
        }
    }

    #[test]
    fn test_permissive_substitutes_legal_action() {
        let set = test_set(sample_actions());
        let action = set
            .decode("move earthquake", Strictness::Permissive)
            .unwrap();
        assert!(set.valid_orders().contains(&action));
    }

    #[test]
    fn test_forfeit_always_decodes() {
        let set = test_set(sample_actions());
        assert_eq!(
            set.decode("forfeit", Strictness::Strict).unwrap(),
            Action::Forfeit
        );
    }

    #[test]
    fn test_recharge_positional_decode() {
        let set = test_set(vec![Action::Move {
            slot: 1,
            id: "recharge".to_string(),
            gimmick: None,
            target: None,
        }]);

        let action = &set.valid_orders()[0];
        assert_eq!(action.to_directive(), "move 1");
        assert_eq!(
            set.decode("move 1", Strictness::Strict).unwrap(),
            *action
        );
    }

    #[test]
    fn test_doubles_target_round_trip() {
        let set = test_set(vec![
            Action::Move {
                slot: 1,
                id: "thunderbolt".to_string(),
                gimmick: None,
                target: Some(TargetSlot::Foe(1)),
            },
            Action::Move {
                slot: 1,
                id: "thunderbolt".to_string(),
                gimmick: None,
                target: Some(TargetSlot::Ally(0)),
            },
        ]);

        for action in set.valid_orders() {
            let decoded = set
                .decode(&action.to_directive(), Strictness::Strict)
                .unwrap();
            assert_eq!(decoded, action);
        }
    }
}
