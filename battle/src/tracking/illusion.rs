//! Illusion identity reattribution
//!
//! A |replace| message reveals that the combatant at a slot was never who
//! the protocol said it was: every event since its switch-in referenced the
//! disguise's name and landed on the wrong record. This is the one place
//! where normal identity invariants are allowed to bend — a known protocol
//! wart, handled as an explicit corrective swap rather than a general
//! pattern. Failures here are suppressed in favor of "unknown" state, never
//! raised: the server knows the truth and later lines will re-anchor us.

use zoroark_protocol::{HpStatus, PokemonDetails, PokemonRef};

use crate::types::{PokemonState, Type};

use super::battle::{TrackedBattle, position_to_slot};

impl TrackedBattle {
    /// Handle |replace|: re-attribute the slot's accumulated combat state to
    /// the real combatant and stand the impostor's record back down.
    ///
    /// HP changes that accrued under the disguise cannot be un-merged (the
    /// protocol never re-states the impostor's true HP), so the impostor
    /// keeps its last known values; boosts and volatiles belong to whoever
    /// is actually standing in the slot and move over.
    pub(crate) fn handle_replace(
        &mut self,
        pokemon: &PokemonRef,
        details: &PokemonDetails,
        hp_status: Option<&HpStatus>,
    ) {
        let slot = pokemon.position.map(position_to_slot).unwrap_or(0);
        let side = self.get_or_create_side(pokemon.player, "");

        // A replace proves this team runs Illusion
        side.illusion_suspect = true;

        let impostor_idx = side.active_indices.get(slot).copied().flatten();

        let real_idx = match side.find_pokemon(&pokemon.name).or_else(|| {
            side.pokemon
                .iter()
                .position(|p| !p.revealed && p.species == details.species)
        }) {
            Some(idx) => idx,
            None => {
                side.pokemon
                    .push(PokemonState::from_details_with_name(details, &pokemon.name));
                side.pokemon.len() - 1
            }
        };

        if let Some(imp_idx) = impostor_idx
            && imp_idx != real_idx
        {
            // Combat state accumulated under the disguise moves to the real
            // record; the impostor's own history (HP, status, revealed
            // moves from earlier appearances) stays where it was.
            let boosts = std::mem::take(&mut side.pokemon[imp_idx].boosts);
            let volatiles = std::mem::take(&mut side.pokemon[imp_idx].volatiles);

            let impostor = &mut side.pokemon[imp_idx];
            impostor.active = false;

            let real = &mut side.pokemon[real_idx];
            real.boosts = boosts;
            real.volatiles = volatiles;
        }

        let real = &mut side.pokemon[real_idx];
        real.species = details.species.clone();
        real.base_species = details.species.clone();
        real.identity.level = details.level.unwrap_or(real.identity.level);
        real.identity.gender = details.gender;
        real.identity.shiny = details.shiny;
        if pokemon.name != details.species {
            real.identity.nickname = Some(pokemon.name.clone());
        }
        if let Some(ref tera_str) = details.tera_type {
            real.tera_type = Type::from_protocol(tera_str);
        }
        if let Some(hp) = hp_status {
            real.apply_hp_status(hp);
        }
        real.active = true;
        real.revealed = true;

        if slot < side.active_indices.len() {
            side.active_indices[slot] = Some(real_idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tracking::TrackedBattle;
    use crate::types::Volatile;
    use zoroark_protocol::Stat;

    fn feed(battle: &mut TrackedBattle, lines: &[&str]) {
        for line in lines {
            battle.process_line(line).unwrap();
        }
    }

    #[test]
    fn test_replace_moves_combat_state_to_real_identity() {
        let mut battle = TrackedBattle::with_room("battle-gen9ou-1");
        feed(
            &mut battle,
            &[
                "|switch|p2a: Hydreigon|Hydreigon, M|100/100",
                "|-boost|p2a: Hydreigon|spa|2",
                "|-start|p2a: Hydreigon|confusion",
                "|-damage|p2a: Hydreigon|55/100",
                // The "Hydreigon" was a Zoroark all along
                "|replace|p2a: Zoroark|Zoroark, M|55/100",
            ],
        );

        let side = battle.get_side(zoroark_protocol::Player::P2).unwrap();
        let zoroark = &side.pokemon[side.find_pokemon("Zoroark").unwrap()];

        assert!(zoroark.active);
        assert_eq!(zoroark.hp_current, 55);
        assert_eq!(zoroark.boosts.get(Stat::Spa), 2);
        assert!(zoroark.has_volatile(&Volatile::Confusion));
        assert!(side.illusion_suspect);

        // The impostor's record stood down without keeping the combat state
        let hydreigon = &side.pokemon[side.find_pokemon("Hydreigon").unwrap()];
        assert!(!hydreigon.active);
        assert!(hydreigon.boosts.is_clear());
        assert!(!hydreigon.has_volatile(&Volatile::Confusion));
    }

    #[test]
    fn test_replace_without_prior_switch_is_tolerated() {
        let mut battle = TrackedBattle::with_room("battle-gen9ou-2");
        // No switch ever seen for this slot; must not error
        feed(&mut battle, &["|replace|p1a: Zoroark|Zoroark, F|100/100"]);

        let side = battle.get_side(zoroark_protocol::Player::P1).unwrap();
        assert!(side.find_pokemon("Zoroark").is_some());
    }

    #[test]
    fn test_unknown_name_during_illusion_window_degrades() {
        let mut battle = TrackedBattle::with_room("battle-gen9ou-3");
        feed(
            &mut battle,
            &[
                "|teamsize|p2|1",
                "|poke|p2|Zoroark, M|item",
                // Team is "full" but Illusion is suspected, so an unknown
                // name becomes a placeholder instead of a desync
                "|-damage|p2a: Mystery|80/100",
            ],
        );

        let side = battle.get_side(zoroark_protocol::Player::P2).unwrap();
        assert!(side.illusion_suspect);
        assert!(side.find_pokemon("Mystery").is_some());
    }
}
