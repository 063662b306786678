//! Update logic: protocol lines and messages into battle state
//!
//! One handler per message tag, dispatched from a single match. Ordering is
//! part of protocol correctness: lines must be applied in strict arrival
//! order, one battle per aggregate.

use zoroark_protocol::{
    BattleRequest, PokemonDetails, PokemonRef, ServerMessage, parse_server_message,
};

use crate::choices::ChoiceSet;
use crate::error::TrackError;
use crate::types::{PokemonState, SideCondition, Status, Type, Volatile, to_id};

use super::battle::{TrackedBattle, position_to_slot};
use super::observation::Observation;

impl TrackedBattle {
    /// Ingest one raw protocol line in arrival order.
    ///
    /// Malformed lines and unknown tags are logged and dropped; a
    /// [`TrackError::Desync`] means this battle's mirror can no longer be
    /// trusted and the caller must abort it.
    pub fn process_line(&mut self, raw: &str) -> Result<(), TrackError> {
        let line = raw.trim();
        if line.is_empty() {
            return Ok(());
        }

        // Room routing prefix (">battle-gen9ou-123")
        if let Some(room) = line.strip_prefix('>') {
            self.room_id = Some(room.to_string());
            return Ok(());
        }

        let msg = match parse_server_message(line) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::warn!(room = %self.room_label(), line, error = %err, "dropping malformed line");
                return Ok(());
            }
        };

        if self.ended {
            // Only final-state bookkeeping once finished
            return Ok(());
        }

        self.pending_events.push(line.to_string());
        self.update_with_raw(&msg, line)
    }

    /// Update battle state from an already-parsed server message
    pub fn update(&mut self, msg: &ServerMessage) -> Result<(), TrackError> {
        self.update_with_raw(msg, "")
    }

    fn update_with_raw(&mut self, msg: &ServerMessage, raw: &str) -> Result<(), TrackError> {
        match msg {
            // === Battle Initialization ===
            ServerMessage::BattlePlayer {
                player, username, ..
            } => {
                let side = self.get_or_create_side(*player, username);
                if side.username.is_empty() {
                    side.username = username.clone();
                }
            }

            ServerMessage::TeamSize { player, size } => {
                self.get_or_create_side(*player, "").team_size = Some(*size);
            }

            ServerMessage::GameType(game_type) => {
                self.set_game_type(*game_type);
            }

            ServerMessage::Gen(generation) => {
                self.set_generation(*generation);
            }

            ServerMessage::Tier(tier) => {
                self.tier = tier.clone();
            }

            ServerMessage::Rated(_) => {
                self.rated = true;
            }

            ServerMessage::Rule(rule) => {
                self.rules.push(rule.clone());
            }

            ServerMessage::Poke {
                player,
                details,
                has_item: _,
            } => {
                self.handle_preview(*player, details);
            }

            // === Turn flow ===
            ServerMessage::Turn(turn) => {
                // The marker line itself opens the new turn's buffer
                let marker = self.pending_events.pop();
                self.commit_observation();
                if let Some(marker) = marker {
                    self.pending_events.push(marker);
                }
                self.begin_turn(*turn);
            }

            ServerMessage::Request(value) => match BattleRequest::parse(value) {
                Some(request) => self.apply_request(request)?,
                None => {
                    tracing::warn!(room = %self.room_label(), "undecodable request payload, ignoring");
                }
            },

            // === Major Actions ===
            ServerMessage::Switch {
                pokemon,
                details,
                hp_status,
            }
            | ServerMessage::Drag {
                pokemon,
                details,
                hp_status,
            } => {
                self.handle_switch(pokemon, details, hp_status.as_ref(), raw)?;
            }

            ServerMessage::Replace {
                pokemon,
                details,
                hp_status,
            } => {
                self.handle_replace(pokemon, details, hp_status.as_ref());
            }

            ServerMessage::Faint(pokemon) => {
                self.find_or_create_pokemon(pokemon, raw)?.set_fainted();
                if let Some(side) = self.get_side_mut(pokemon.player)
                    && let Some(slot) = pokemon.position.map(position_to_slot)
                    && slot < side.active_indices.len()
                {
                    side.active_indices[slot] = None;
                }
            }

            ServerMessage::Move {
                pokemon, move_name, ..
            } => {
                let poke = self.find_or_create_pokemon(pokemon, raw)?;
                poke.moved_this_turn = true;
                if poke.must_recharge {
                    poke.must_recharge = false;
                    poke.remove_volatile(&Volatile::Recharging);
                }
                // Struggle is not part of any move set
                if to_id(move_name) != "struggle" {
                    poke.note_move_used(move_name);
                }
            }

            ServerMessage::Cant {
                pokemon, reason, ..
            } => {
                let poke = self.find_or_create_pokemon(pokemon, raw)?;
                poke.moved_this_turn = true;
                if reason == "recharge" {
                    poke.must_recharge = false;
                    poke.remove_volatile(&Volatile::Recharging);
                }
            }

            ServerMessage::Swap { pokemon, position } => {
                if let Some(side) = self.get_side_mut(pokemon.player)
                    && let Some(idx) = side.find_pokemon(&pokemon.name)
                    && let Some(current) = side.find_active_slot(idx)
                {
                    let dest = *position as usize;
                    if dest < side.active_indices.len() {
                        side.active_indices.swap(current, dest);
                    }
                }
            }

            // === HP Changes ===
            ServerMessage::Damage {
                pokemon,
                hp_status,
                from,
                of,
            }
            | ServerMessage::Heal {
                pokemon,
                hp_status,
                from,
                of,
            } => {
                if let Some(hp) = hp_status {
                    self.find_or_create_pokemon(pokemon, raw)?.apply_hp_status(hp);
                }
                self.apply_attribution(from.as_deref(), of.as_ref(), pokemon, raw)?;
            }

            ServerMessage::SetHp { pokemon, hp_status } => {
                if let Some(hp) = hp_status {
                    self.find_or_create_pokemon(pokemon, raw)?.apply_hp_status(hp);
                }
            }

            // === Status ===
            ServerMessage::Status { pokemon, status } => {
                self.find_or_create_pokemon(pokemon, raw)?.status = Status::from_protocol(status);
            }

            ServerMessage::CureStatus { pokemon, .. } => {
                self.find_or_create_pokemon(pokemon, raw)?.status = None;
            }

            ServerMessage::CureTeam(pokemon) => {
                if let Some(side) = self.get_side_mut(pokemon.player) {
                    for poke in &mut side.pokemon {
                        poke.status = None;
                    }
                }
            }

            // === Boosts ===
            ServerMessage::Boost {
                pokemon,
                stat,
                amount,
            } => {
                self.find_or_create_pokemon(pokemon, raw)?
                    .boosts
                    .boost(*stat, *amount);
            }

            ServerMessage::Unboost {
                pokemon,
                stat,
                amount,
            } => {
                self.find_or_create_pokemon(pokemon, raw)?
                    .boosts
                    .unboost(*stat, *amount);
            }

            ServerMessage::SetBoost {
                pokemon,
                stat,
                amount,
            } => {
                self.find_or_create_pokemon(pokemon, raw)?
                    .boosts
                    .set(*stat, *amount);
            }

            ServerMessage::ClearBoost(pokemon) => {
                self.find_or_create_pokemon(pokemon, raw)?.boosts.clear();
            }

            ServerMessage::ClearAllBoost => {
                for side in self.sides_mut() {
                    let active: Vec<usize> =
                        side.active_indices.iter().filter_map(|i| *i).collect();
                    for idx in active {
                        if let Some(poke) = side.pokemon.get_mut(idx) {
                            poke.boosts.clear();
                        }
                    }
                }
            }

            ServerMessage::InvertBoost(pokemon) => {
                self.find_or_create_pokemon(pokemon, raw)?.boosts.invert();
            }

            ServerMessage::ClearPositiveBoost { target, .. } => {
                self.find_or_create_pokemon(target, raw)?
                    .boosts
                    .clear_positive();
            }

            ServerMessage::ClearNegativeBoost(pokemon) => {
                self.find_or_create_pokemon(pokemon, raw)?
                    .boosts
                    .clear_negative();
            }

            ServerMessage::CopyBoost { source, target } => {
                let boosts = self.find_or_create_pokemon(source, raw)?.boosts.clone();
                self.find_or_create_pokemon(target, raw)?
                    .boosts
                    .copy_from(&boosts);
            }

            ServerMessage::SwapBoost {
                source,
                target,
                stats,
            } => {
                let src_boosts = self.find_or_create_pokemon(source, raw)?.boosts.clone();
                let tgt_boosts = self.find_or_create_pokemon(target, raw)?.boosts.clone();

                let src = self.find_or_create_pokemon(source, raw)?;
                for stat in stats {
                    src.boosts.set(*stat, tgt_boosts.get(*stat));
                }
                let tgt = self.find_or_create_pokemon(target, raw)?;
                for stat in stats {
                    tgt.boosts.set(*stat, src_boosts.get(*stat));
                }
            }

            // === Volatiles ===
            ServerMessage::VolatileStart {
                pokemon,
                effect,
                detail,
            } => {
                self.handle_volatile_start(pokemon, effect, detail.as_deref(), raw)?;
            }

            ServerMessage::VolatileEnd { pokemon, effect } => {
                let poke = self.find_or_create_pokemon(pokemon, raw)?;
                if to_id(effect.strip_prefix("move: ").unwrap_or(effect)) == "dynamax" {
                    poke.end_dynamax();
                } else {
                    let volatile = Volatile::from_protocol(effect);
                    poke.remove_volatile(&volatile);
                }
            }

            ServerMessage::SingleTurn { pokemon, move_name }
            | ServerMessage::SingleMove { pokemon, move_name } => {
                let volatile = Volatile::from_protocol(move_name);
                self.find_or_create_pokemon(pokemon, raw)?
                    .add_volatile(volatile, 1);
            }

            ServerMessage::Prepare { attacker, .. } => {
                self.find_or_create_pokemon(attacker, raw)?
                    .add_volatile(Volatile::Charging, 1);
            }

            ServerMessage::MustRecharge(pokemon) => {
                let poke = self.find_or_create_pokemon(pokemon, raw)?;
                poke.must_recharge = true;
                poke.add_volatile(Volatile::Recharging, 1);
            }

            // === Field Conditions ===
            ServerMessage::Weather { weather, upkeep } => {
                if *upkeep {
                    self.field.weather_upkeep();
                } else {
                    self.field
                        .set_weather(crate::types::Weather::from_protocol(weather));
                }
            }

            ServerMessage::FieldStart(condition) => {
                self.field.apply_field_start(condition);
            }

            ServerMessage::FieldEnd(condition) => {
                self.field.apply_field_end(condition);
            }

            // === Side Conditions ===
            ServerMessage::SideStart { side, condition } => {
                if let Some(side_state) = self.get_side_mut(side.player)
                    && let Some(cond) = SideCondition::from_protocol(condition)
                {
                    side_state.add_condition(cond);
                }
            }

            ServerMessage::SideEnd { side, condition } => {
                if let Some(side_state) = self.get_side_mut(side.player)
                    && let Some(cond) = SideCondition::from_protocol(condition)
                {
                    side_state.remove_condition(cond);
                }
            }

            ServerMessage::SwapSideConditions => {
                // Court Change swaps P1 and P2 side conditions
                use zoroark_protocol::Player;
                let p1 = self.get_side(Player::P1).map(|s| s.conditions.clone());
                let p2 = self.get_side(Player::P2).map(|s| s.conditions.clone());

                if let (Some(c1), Some(c2)) = (p1, p2) {
                    if let Some(s1) = self.get_side_mut(Player::P1) {
                        s1.conditions = c2;
                    }
                    if let Some(s2) = self.get_side_mut(Player::P2) {
                        s2.conditions = c1;
                    }
                }
            }

            // === Items and Abilities ===
            ServerMessage::Item { pokemon, item, .. } => {
                self.find_or_create_pokemon(pokemon, raw)?.record_item(item);
            }

            ServerMessage::EndItem { pokemon, item, .. } => {
                let poke = self.find_or_create_pokemon(pokemon, raw)?;
                if poke.item.is_none() {
                    poke.record_item(item);
                }
                poke.consume_item();
            }

            ServerMessage::Ability {
                pokemon, ability, ..
            } => {
                self.find_or_create_pokemon(pokemon, raw)?
                    .record_ability(ability);
            }

            ServerMessage::EndAbility(pokemon) => {
                // Ability suppressed (Gastro Acid, etc.)
                self.find_or_create_pokemon(pokemon, raw)?
                    .add_volatile(Volatile::GastroAcid, 1);
            }

            // === Transformations and gimmicks ===
            ServerMessage::Transform { pokemon, species } => {
                self.find_or_create_pokemon(pokemon, raw)?
                    .start_transform(species);
            }

            ServerMessage::Mega { pokemon, .. } => {
                if let Some(side) = self.get_side_mut(pokemon.player) {
                    side.used_mega = true;
                }
                self.find_or_create_pokemon(pokemon, raw)?.mega_evolved = true;
            }

            ServerMessage::Burst { pokemon, .. } => {
                // Ultra Burst shares the mega slot
                if let Some(side) = self.get_side_mut(pokemon.player) {
                    side.used_mega = true;
                }
            }

            ServerMessage::ZPower(pokemon) => {
                if let Some(side) = self.get_side_mut(pokemon.player) {
                    side.used_zmove = true;
                }
            }

            ServerMessage::Terastallize { pokemon, tera_type } => {
                if let Some(side) = self.get_side_mut(pokemon.player) {
                    side.used_tera = true;
                }
                if let Some(tera) = Type::from_protocol(tera_type) {
                    self.find_or_create_pokemon(pokemon, raw)?.terastallize(tera);
                }
            }

            ServerMessage::DetailsChange {
                pokemon,
                details,
                hp_status,
            } => {
                let poke = self.find_or_create_pokemon(pokemon, raw)?;
                poke.change_details(details);
                if let Some(hp) = hp_status {
                    poke.apply_hp_status(hp);
                }
            }

            ServerMessage::FormeChange {
                pokemon,
                species,
                hp_status,
            } => {
                let poke = self.find_or_create_pokemon(pokemon, raw)?;
                poke.change_forme(species);
                if let Some(hp) = hp_status {
                    poke.apply_hp_status(hp);
                }
            }

            // === Battle End ===
            ServerMessage::Win(winner) => {
                self.winner = Some(winner.clone());
                self.ended = true;
                self.commit_observation();
            }

            ServerMessage::Tie => {
                self.tie = true;
                self.ended = true;
                self.commit_observation();
            }

            // === Degrade path for protocol drift ===
            ServerMessage::Unknown { tag, .. } => {
                tracing::warn!(room = %self.room_label(), tag = %tag, "unrecognized message tag, ignoring");
            }

            // === Informational messages that don't affect tracked state ===
            ServerMessage::Crit(_)
            | ServerMessage::SuperEffective(_)
            | ServerMessage::Resisted(_)
            | ServerMessage::Immune(_)
            | ServerMessage::Miss { .. }
            | ServerMessage::Fail { .. }
            | ServerMessage::Block { .. }
            | ServerMessage::NoTarget(_)
            | ServerMessage::Activate { .. }
            | ServerMessage::Hint(_)
            | ServerMessage::Center
            | ServerMessage::Message(_)
            | ServerMessage::Combine
            | ServerMessage::Waiting { .. }
            | ServerMessage::Nothing
            | ServerMessage::HitCount { .. }
            | ServerMessage::Upkeep
            | ServerMessage::Inactive(_)
            | ServerMessage::InactiveOff(_)
            | ServerMessage::BattleStart
            | ServerMessage::ClearPoke
            | ServerMessage::TeamPreview(_)
            | ServerMessage::Primal(_) => {}

            // Non-battle messages
            _ => {}
        }

        Ok(())
    }

    /// Apply the server's private request: sync our side from its
    /// authoritative snapshot, then derive the legal choice sets.
    pub fn apply_request(&mut self, request: BattleRequest) -> Result<(), TrackError> {
        if let Some(side_info) = request.side.as_ref()
            && let Some(player) = side_info.player()
        {
            self.set_perspective(player);
            let room = self.room_label();
            let turn = self.turn;
            let side = self.get_or_create_side(player, &side_info.name);
            if side.username.is_empty() {
                side.username = side_info.name.clone();
            }
            if side.team_size.is_none() && !side_info.pokemon.is_empty() {
                side.team_size = Some(side_info.pokemon.len() as u8);
            }

            let mut tera_used = false;
            for req_poke in &side_info.pokemon {
                let name = req_poke.name();
                let details = PokemonDetails::parse(&req_poke.details);

                let idx = match side.find_pokemon(name) {
                    Some(idx) => idx,
                    None => {
                        if side.is_full() && !side.illusion_suspect {
                            return Err(TrackError::Desync {
                                room,
                                turn,
                                line: req_poke.ident.clone(),
                            });
                        }
                        side.pokemon
                            .push(PokemonState::from_details_with_name(&details, name));
                        side.pokemon.len() - 1
                    }
                };

                let poke = &mut side.pokemon[idx];
                poke.species = details.species.clone();
                if !poke.active {
                    // Benched mons are in their base forme
                    poke.base_species = details.species.clone();
                }
                poke.identity.level = details.level.unwrap_or(100);
                poke.identity.gender = details.gender;
                poke.identity.shiny = details.shiny;
                if name != details.species {
                    poke.identity.nickname = Some(name.to_string());
                }

                for mv in &req_poke.moves {
                    poke.sync_move(mv);
                }

                if !req_poke.base_ability.is_empty() {
                    poke.base_ability = Some(req_poke.base_ability.clone());
                }
                if !req_poke.ability.is_empty() {
                    poke.ability = Some(req_poke.ability.clone());
                } else if poke.ability.is_none() {
                    poke.ability = poke.base_ability.clone();
                }

                if req_poke.item.is_empty() {
                    poke.item_consumed = poke.item.is_some();
                } else {
                    poke.record_item(&req_poke.item);
                }

                poke.active = req_poke.active;
                poke.stats = Some(req_poke.stats.clone());

                if let Some((current, max)) = req_poke.hp() {
                    poke.hp_current = current;
                    poke.hp_max = Some(max);
                }

                match req_poke.status() {
                    Some("fnt") => poke.set_fainted(),
                    Some(status) => {
                        poke.status = Status::from_protocol(status);
                        poke.fainted = false;
                    }
                    None => {
                        poke.status = None;
                        poke.fainted = req_poke.is_fainted();
                    }
                }

                if let Some(ref tera_str) = req_poke.teratype {
                    poke.tera_type = Type::from_protocol(tera_str);
                }
                if let Some(ref tera) = req_poke.terastallized
                    && let Some(t) = Type::from_protocol(tera)
                {
                    poke.terastallize(t);
                    tera_used = true;
                }
            }
            if tera_used {
                side.used_tera = true;
            }
        }

        let choices = ChoiceSet::resolve(self, &request)?;
        self.choices = Some(choices);
        self.last_request = Some(request);
        Ok(())
    }

    // === Shared handler plumbing ===

    /// Resolve a positional reference against its side, creating the record
    /// on first sight. An unknown name on a fully-revealed team is a desync,
    /// unless an Illusion may be in play (then it degrades to a placeholder).
    fn find_or_create_pokemon(
        &mut self,
        pokemon: &PokemonRef,
        raw: &str,
    ) -> Result<&mut PokemonState, TrackError> {
        let room = self.room_label();
        let turn = self.turn;
        let side = self.get_or_create_side(pokemon.player, "");

        let idx = match side.find_pokemon(&pokemon.name) {
            Some(idx) => idx,
            None => {
                if side.is_full() {
                    if !side.illusion_suspect {
                        return Err(TrackError::Desync {
                            room,
                            turn,
                            line: raw.to_string(),
                        });
                    }
                    tracing::warn!(
                        room = %room,
                        name = %pokemon.name,
                        "unknown combatant while Illusion may be in play, tracking as placeholder"
                    );
                }
                let mut poke = PokemonState::new(&pokemon.name, 100);
                poke.revealed = true;
                side.pokemon.push(poke);
                side.pokemon.len() - 1
            }
        };

        Ok(&mut side.pokemon[idx])
    }

    /// Handle a switch (or drag) message
    fn handle_switch(
        &mut self,
        pokemon: &PokemonRef,
        details: &PokemonDetails,
        hp_status: Option<&zoroark_protocol::HpStatus>,
        raw: &str,
    ) -> Result<(), TrackError> {
        let slot = pokemon.position.map(position_to_slot).unwrap_or(0);
        let room = self.room_label();
        let turn = self.turn;
        let side = self.get_or_create_side(pokemon.player, "");

        if is_illusion_species(&details.species) {
            side.illusion_suspect = true;
        }

        // Match by displayed name first, then by species for a mon known
        // only from team preview (its nickname wasn't known yet)
        let idx = match side.find_pokemon(&pokemon.name).or_else(|| {
            side.pokemon
                .iter()
                .position(|p| !p.revealed && p.species == details.species)
        }) {
            Some(idx) => idx,
            None => {
                if side.is_full() && !side.illusion_suspect {
                    return Err(TrackError::Desync {
                        room,
                        turn,
                        line: raw.to_string(),
                    });
                }
                side.pokemon
                    .push(PokemonState::from_details_with_name(details, &pokemon.name));
                side.pokemon.len() - 1
            }
        };

        let poke = &mut side.pokemon[idx];
        poke.species = details.species.clone();
        poke.base_species = details.species.clone();
        poke.identity.level = details.level.unwrap_or(100);
        poke.identity.gender = details.gender;
        poke.identity.shiny = details.shiny;
        if pokemon.name != details.species {
            poke.identity.nickname = Some(pokemon.name.clone());
        }
        if let Some(ref tera_str) = details.tera_type {
            poke.tera_type = Type::from_protocol(tera_str);
        }
        if let Some(hp) = hp_status {
            poke.apply_hp_status(hp);
        }

        side.set_active(slot, Some(idx));
        Ok(())
    }

    /// Record a team-preview entry
    fn handle_preview(&mut self, player: zoroark_protocol::Player, details: &PokemonDetails) {
        let side = self.get_or_create_side(player, "");

        // Unknown formes are masked in preview ("Urshifu-*")
        let species = details.species.trim_end_matches("-*").to_string();
        if is_illusion_species(&species) {
            side.illusion_suspect = true;
        }

        if side.find_pokemon(&species).is_none() {
            let mut poke = PokemonState::from_details(details);
            poke.species = species.clone();
            poke.base_species = species;
            side.pokemon.push(poke);
        }
    }

    /// Handle a |-start| effect
    fn handle_volatile_start(
        &mut self,
        pokemon: &PokemonRef,
        effect: &str,
        detail: Option<&str>,
        raw: &str,
    ) -> Result<(), TrackError> {
        let turn = self.turn;
        let effect_id = to_id(effect.strip_prefix("move: ").unwrap_or(effect));

        match effect_id.as_str() {
            "dynamax" | "gigantamax" => {
                if let Some(side) = self.get_side_mut(pokemon.player) {
                    side.used_dynamax = true;
                }
                self.find_or_create_pokemon(pokemon, raw)?.start_dynamax(turn);
            }
            "typechange" | "typeadd" => {
                let poke = self.find_or_create_pokemon(pokemon, raw)?;
                if let Some(list) = detail {
                    let types = Type::parse_list(list);
                    if effect_id == "typeadd" {
                        for t in types {
                            poke.add_type(t);
                        }
                    } else if !types.is_empty() {
                        poke.set_types(types);
                    }
                }
                poke.add_volatile(Volatile::TypeChange, 1);
            }
            _ => {
                let volatile = Volatile::from_protocol(effect);
                let count = Volatile::initial_count(effect);
                self.find_or_create_pokemon(pokemon, raw)?
                    .add_volatile(volatile, count);
            }
        }
        Ok(())
    }

    /// Reveal items/abilities from `[from]`/`[of]` attribution tags
    fn apply_attribution(
        &mut self,
        from: Option<&str>,
        of: Option<&PokemonRef>,
        fallback: &PokemonRef,
        raw: &str,
    ) -> Result<(), TrackError> {
        let Some(from) = from else {
            return Ok(());
        };
        let target = of.unwrap_or(fallback);

        if let Some(item) = from.strip_prefix("item: ") {
            self.find_or_create_pokemon(target, raw)?.record_item(item);
        } else if let Some(ability) = from.strip_prefix("ability: ") {
            self.find_or_create_pokemon(target, raw)?
                .record_ability(ability);
        }
        Ok(())
    }

    /// Commit the pending event buffer as this turn's snapshot
    fn commit_observation(&mut self) {
        let events = std::mem::take(&mut self.pending_events);
        let observation = Observation {
            turn: self.turn,
            field: self.field.clone(),
            sides: self.sides.iter().flatten().cloned().collect(),
            events,
        };
        tracing::debug!(room = %self.room_label(), turn = self.turn, "turn committed");
        self.observations.push(observation);
    }

    /// Reset per-turn ephemera and advance the turn counter
    fn begin_turn(&mut self, next_turn: u32) {
        let committed = self.turn;
        for side in self.sides_mut() {
            for poke in &mut side.pokemon {
                if poke.active {
                    poke.clear_turn_flags();
                    poke.tick_dynamax(committed);
                }
            }
        }
        self.field.tick_turn();
        self.turn = next_turn;
    }
}

fn is_illusion_species(species: &str) -> bool {
    species.starts_with("Zorua") || species.starts_with("Zoroark")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SideCondition, Weather};
    use zoroark_protocol::Player;

    fn feed(battle: &mut TrackedBattle, lines: &[&str]) {
        for line in lines {
            battle.process_line(line).unwrap();
        }
    }

    fn active(battle: &TrackedBattle, player: Player) -> &PokemonState {
        battle
            .get_side(player)
            .unwrap()
            .active_pokemon()
            .expect("no active pokemon")
    }

    #[test]
    fn test_switch_creates_side_and_combatant() {
        let mut battle = TrackedBattle::new();
        feed(&mut battle, &["|switch|p1a: Sparky|Pikachu, L50, M|100/100"]);

        let side = battle.get_side(Player::P1).unwrap();
        assert_eq!(side.pokemon.len(), 1);
        let poke = side.active_pokemon().unwrap();
        assert_eq!(poke.species, "Pikachu");
        assert_eq!(poke.name(), "Sparky");
        assert_eq!(poke.identity.level, 50);
        assert!(poke.active);
        assert!(poke.revealed);
    }

    #[test]
    fn test_switch_replaces_previous_active() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Pikachu|Pikachu|100/100",
                "|-boost|p1a: Pikachu|spe|2",
                "|switch|p1a: Snorlax|Snorlax|100/100",
            ],
        );

        let side = battle.get_side(Player::P1).unwrap();
        assert_eq!(side.pokemon.len(), 2);
        assert_eq!(side.active_pokemon().unwrap().species, "Snorlax");

        // The outgoing mon's combat state reset
        let pikachu = &side.pokemon[side.find_pokemon("Pikachu").unwrap()];
        assert!(!pikachu.active);
        assert!(pikachu.boosts.is_clear());
    }

    #[test]
    fn test_preview_record_merges_on_switch() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|poke|p2|Garchomp, F|item",
                // Nickname only becomes visible at switch-in
                "|switch|p2a: Chompy|Garchomp, F|100/100",
            ],
        );

        let side = battle.get_side(Player::P2).unwrap();
        assert_eq!(side.pokemon.len(), 1);
        assert_eq!(side.pokemon[0].name(), "Chompy");
    }

    #[test]
    fn test_damage_and_heal_track_hp() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Blissey|Blissey, F|651/651",
                "|-damage|p1a: Blissey|300/651",
                "|-heal|p1a: Blissey|450/651",
            ],
        );

        let poke = active(&battle, Player::P1);
        assert_eq!(poke.hp_current, 450);
        assert_eq!(poke.hp_max, Some(651));
    }

    #[test]
    fn test_damage_attribution_reveals_item() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p2a: Gliscor|Gliscor, M|100/100",
                "|-damage|p2a: Gliscor|90/100|[from] item: Life Orb|[of] p2a: Gliscor",
            ],
        );

        let poke = active(&battle, Player::P2);
        assert_eq!(poke.item.as_deref(), Some("Life Orb"));
    }

    #[test]
    fn test_status_set_and_cure() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Pikachu|Pikachu|100/100",
                "|-status|p1a: Pikachu|par",
            ],
        );
        assert_eq!(active(&battle, Player::P1).status, Some(Status::Paralysis));

        feed(&mut battle, &["|-curestatus|p1a: Pikachu|par"]);
        assert!(active(&battle, Player::P1).status.is_none());
    }

    #[test]
    fn test_boost_events_stay_clamped() {
        let mut battle = TrackedBattle::new();
        feed(&mut battle, &["|switch|p1a: Pikachu|Pikachu|100/100"]);
        for _ in 0..5 {
            feed(&mut battle, &["|-boost|p1a: Pikachu|atk|2"]);
        }
        assert_eq!(active(&battle, Player::P1).boosts.atk, 6);

        feed(&mut battle, &["|-unboost|p1a: Pikachu|atk|12"]);
        assert_eq!(active(&battle, Player::P1).boosts.atk, -6);

        feed(&mut battle, &["|-clearnegativeboost|p1a: Pikachu"]);
        assert_eq!(active(&battle, Player::P1).boosts.atk, 0);
    }

    #[test]
    fn test_weather_set_and_upkeep() {
        let mut battle = TrackedBattle::new();
        feed(&mut battle, &["|-weather|RainDance"]);
        assert_eq!(battle.field.weather, Some(Weather::Rain));
        assert_eq!(battle.field.weather_turns, Some(5));

        feed(&mut battle, &["|-weather|RainDance|[upkeep]"]);
        assert_eq!(battle.field.weather, Some(Weather::Rain));
        assert_eq!(battle.field.weather_turns, Some(4));

        feed(&mut battle, &["|-weather|none"]);
        assert!(battle.field.weather.is_none());
    }

    #[test]
    fn test_safeguard_side_condition_lifecycle() {
        // Side-start then side-end transitions {} -> {SAFEGUARD} -> {}
        let mut battle = TrackedBattle::new();
        feed(&mut battle, &["|player|p1|Alice|1|"]);

        feed(&mut battle, &["|-sidestart|p1: Alice|Safeguard"]);
        let side = battle.get_side(Player::P1).unwrap();
        assert!(side.has_condition(SideCondition::Safeguard));

        feed(&mut battle, &["|-sideend|p1: Alice|Safeguard"]);
        let side = battle.get_side(Player::P1).unwrap();
        assert!(!side.has_condition(SideCondition::Safeguard));
        assert!(side.conditions.is_empty());
    }

    #[test]
    fn test_spikes_cap_at_three_layers() {
        // A fourth application of Spikes is a no-op at the cap
        let mut battle = TrackedBattle::new();
        feed(&mut battle, &["|player|p2|Bob|1|"]);

        for _ in 0..4 {
            feed(&mut battle, &["|-sidestart|p2: Bob|Spikes"]);
        }

        let side = battle.get_side(Player::P2).unwrap();
        assert_eq!(side.condition_layers(SideCondition::Spikes), 3);
    }

    #[test]
    fn test_dynamax_lifecycle() {
        // Dynamax: HP doubles, countdown starts at 3 across the first
        // boundary, reversion restores HP, and the mechanic is spent for
        // the rest of the battle.
        let mut battle = TrackedBattle::new();
        battle.set_perspective(Player::P1);
        feed(
            &mut battle,
            &[
                "|gen|8",
                "|switch|p1a: Hydreigon|Hydreigon, M|300/300",
                "|-start|p1a: Hydreigon|Dynamax",
                "|turn|1",
            ],
        );

        assert!(!battle.can_dynamax());
        let poke = active(&battle, Player::P1);
        assert!(poke.dynamaxed);
        assert_eq!(poke.hp_max, Some(600));
        assert_eq!(poke.hp_current, 600);
        assert_eq!(poke.dynamax_turns, Some(3));

        feed(&mut battle, &["|-end|p1a: Hydreigon|Dynamax"]);
        let poke = active(&battle, Player::P1);
        assert!(!poke.dynamaxed);
        assert_eq!(poke.hp_max, Some(300));
        assert_eq!(poke.hp_current, 300);
        assert!(!battle.can_dynamax());
    }

    #[test]
    fn test_terastallize_marks_side_and_types() {
        let mut battle = TrackedBattle::new();
        battle.set_perspective(Player::P1);
        feed(
            &mut battle,
            &[
                "|gen|9",
                "|switch|p1a: Garganacl|Garganacl, M|100/100",
                "|-terastallize|p1a: Garganacl|Water",
            ],
        );

        let poke = active(&battle, Player::P1);
        assert!(poke.terastallized);
        assert_eq!(poke.current_types, vec![Type::Water]);
        assert!(!battle.can_terastallize());
    }

    #[test]
    fn test_turn_boundary_commits_observation() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Pikachu|Pikachu|100/100",
                "|-singleturn|p1a: Pikachu|Protect",
                "|turn|1",
            ],
        );

        // Snapshot committed for the pre-battle segment (turn 0)
        assert_eq!(battle.observations().len(), 1);
        let obs = battle.latest_observation().unwrap();
        assert_eq!(obs.turn, 0);
        assert_eq!(obs.events.len(), 2);
        assert!(obs.events[0].starts_with("|switch|"));

        // The marker line opened the new buffer; single-turn volatiles reset
        assert_eq!(battle.turn, 1);
        assert!(!active(&battle, Player::P1).has_volatile(&Volatile::Protect));
        assert_eq!(battle.pending_events, vec!["|turn|1".to_string()]);
    }

    #[test]
    fn test_observations_are_snapshots_not_views() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Pikachu|Pikachu|100/100",
                "|turn|1",
                "|-damage|p1a: Pikachu|40/100",
                "|turn|2",
            ],
        );

        let first = &battle.observations()[0];
        let pikachu = first.side(Player::P1).unwrap().active_pokemon().unwrap();
        assert_eq!(pikachu.hp_current, 100);

        let second = &battle.observations()[1];
        let pikachu = second.side(Player::P1).unwrap().active_pokemon().unwrap();
        assert_eq!(pikachu.hp_current, 40);
    }

    #[test]
    fn test_win_commits_final_state_and_freezes() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|player|p1|Alice|1|",
                "|switch|p1a: Pikachu|Pikachu|100/100",
                "|win|Alice",
            ],
        );

        assert!(battle.ended);
        assert_eq!(battle.winner.as_deref(), Some("Alice"));
        assert!(battle.valid_orders().is_empty());
        let final_obs = battle.latest_observation().unwrap();
        assert!(final_obs.events.iter().any(|l| l.starts_with("|win|")));

        // No further mutation once finished
        battle.process_line("|-damage|p1a: Pikachu|1/100").unwrap();
        assert_eq!(active(&battle, Player::P1).hp_current, 100);
    }

    #[test]
    fn test_unknown_tag_is_ignored_not_fatal() {
        let mut battle = TrackedBattle::new();
        battle
            .process_line("|-somefutureeffect|p1a: Pikachu|whatever")
            .unwrap();
        battle.process_line("|").unwrap();
        battle.process_line("malformed no pipes").unwrap();
    }

    #[test]
    fn test_desync_on_unknown_name_with_full_team() {
        let mut battle = TrackedBattle::with_room("battle-gen9ou-9");
        feed(
            &mut battle,
            &["|teamsize|p1|1", "|switch|p1a: Pikachu|Pikachu|100/100"],
        );

        let err = battle
            .process_line("|-damage|p1a: Impostor|50/100")
            .unwrap_err();
        match err {
            TrackError::Desync { room, turn, line } => {
                assert_eq!(room, "battle-gen9ou-9");
                assert_eq!(turn, 0);
                assert!(line.contains("Impostor"));
            }
            other => panic!("expected Desync, got {other:?}"),
        }
    }

    #[test]
    fn test_room_prefix_binds_room_id() {
        let mut battle = TrackedBattle::new();
        feed(&mut battle, &[">battle-gen9randombattle-4242", "|turn|1"]);
        assert_eq!(battle.room_label(), "battle-gen9randombattle-4242");
    }

    #[test]
    fn test_request_line_computes_choices() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Rotom|Rotom-Wash|100/100",
                r#"|request|{"rqid":5,"active":[{"moves":[{"move":"Hydro Pump","id":"hydropump","pp":8,"maxpp":8,"target":"normal","disabled":false}]}],"side":{"name":"Alice","id":"p1","pokemon":[{"ident":"p1: Rotom","details":"Rotom-Wash","condition":"304/304","active":true,"stats":{"atk":157,"def":286,"spa":246,"spd":250,"spe":188},"moves":["hydropump"],"baseAbility":"levitate","ability":"levitate","item":"leftovers"}]}}"#,
            ],
        );

        assert_eq!(battle.rqid(), Some(5));
        let orders = battle.valid_orders();
        assert_eq!(orders.len(), 1);
        assert!(orders[0].is_move());

        // The request is authoritative for our own side
        let me = battle.me().unwrap();
        let rotom = &me.pokemon[0];
        assert_eq!(rotom.hp_max, Some(304));
        assert_eq!(rotom.base_ability.as_deref(), Some("levitate"));
        assert_eq!(rotom.item.as_deref(), Some("leftovers"));
        assert!(rotom.stats.is_some());
    }

    #[test]
    fn test_replaying_observation_events_reproduces_orders() {
        // Determinism: feeding a committed turn's raw lines to a fresh
        // battle yields identical derived legal-action sets.
        let lines = [
            "|gen|9",
            "|switch|p1a: Rotom|Rotom-Wash|100/100",
            r#"|request|{"rqid":5,"active":[{"moves":[{"move":"Hydro Pump","id":"hydropump","pp":8,"maxpp":8,"target":"normal","disabled":false},{"move":"Volt Switch","id":"voltswitch","pp":32,"maxpp":32,"target":"normal","disabled":false}]}],"side":{"name":"Alice","id":"p1","pokemon":[{"ident":"p1: Rotom","details":"Rotom-Wash","condition":"304/304","active":true,"moves":["hydropump","voltswitch"],"baseAbility":"levitate","ability":"levitate","item":""},{"ident":"p1: Gliscor","details":"Gliscor, M","condition":"352/352","moves":["earthquake"],"baseAbility":"poisonheal","ability":"poisonheal","item":"toxicorb"}]}}"#,
            "|turn|1",
        ];

        let mut original = TrackedBattle::new();
        feed(&mut original, &lines);

        let mut replayed = TrackedBattle::new();
        for obs in original.observations() {
            for line in &obs.events {
                replayed.process_line(line).unwrap();
            }
        }
        for line in &original.pending_events {
            replayed.process_line(line).unwrap();
        }

        assert_eq!(original.valid_orders(), replayed.valid_orders());
        assert!(!original.valid_orders().is_empty());
    }

    #[test]
    fn test_transform_tracked_via_volatile() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Ditto|Ditto|100/100",
                "|-transform|p1a: Ditto|Garchomp",
            ],
        );

        let poke = active(&battle, Player::P1);
        assert_eq!(poke.species, "Garchomp");
        assert_eq!(poke.transformed.as_deref(), Some("Garchomp"));
        assert!(poke.has_volatile(&Volatile::Transformed));
    }

    #[test]
    fn test_forme_change_reverts_on_switch() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Aegislash|Aegislash, M|100/100",
                "|-formechange|p1a: Aegislash|Aegislash-Blade|100/100",
            ],
        );
        assert_eq!(active(&battle, Player::P1).species, "Aegislash-Blade");

        feed(&mut battle, &["|switch|p1a: Pikachu|Pikachu|100/100"]);
        let side = battle.get_side(Player::P1).unwrap();
        let aegislash = &side.pokemon[side.find_pokemon("Aegislash").unwrap()];
        assert_eq!(aegislash.species, "Aegislash");
    }

    #[test]
    fn test_details_change_persists_through_switch() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Charizard|Charizard, M|100/100",
                "|-mega|p1a: Charizard|Charizardite X",
                "|detailschange|p1a: Charizard|Charizard-Mega-X, M|100/100",
                "|switch|p1a: Pikachu|Pikachu|100/100",
            ],
        );

        let side = battle.get_side(Player::P1).unwrap();
        assert!(side.used_mega);
        let zard = &side.pokemon[side.find_pokemon("Charizard").unwrap()];
        assert_eq!(zard.species, "Charizard-Mega-X");
        assert!(zard.mega_evolved);
    }

    #[test]
    fn test_faint_clears_slot() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Pikachu|Pikachu|100/100",
                "|faint|p1a: Pikachu",
            ],
        );

        let side = battle.get_side(Player::P1).unwrap();
        assert!(side.active_pokemon().is_none());
        let pikachu = &side.pokemon[0];
        assert!(pikachu.fainted);
        assert_eq!(pikachu.hp_current, 0);
        assert!(pikachu.status.is_none());
    }

    #[test]
    fn test_move_reveal_and_recharge_flow() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p2a: Snorlax|Snorlax, M|100/100",
                "|move|p2a: Snorlax|Hyper Beam|p1a: Pikachu",
                "|-mustrecharge|p2a: Snorlax",
            ],
        );

        let poke = active(&battle, Player::P2);
        assert!(poke.must_recharge);
        assert_eq!(poke.moves.len(), 1);
        assert_eq!(poke.moves[0].id, "hyperbeam");
        assert_eq!(poke.moves[0].times_used, 1);

        feed(&mut battle, &["|cant|p2a: Snorlax|recharge"]);
        assert!(!active(&battle, Player::P2).must_recharge);
    }

    #[test]
    fn test_struggle_is_not_recorded() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p2a: Snorlax|Snorlax, M|100/100",
                "|move|p2a: Snorlax|Struggle|p1a: Pikachu",
            ],
        );
        assert!(active(&battle, Player::P2).moves.is_empty());
    }

    #[test]
    fn test_perish_count_tracked() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Pikachu|Pikachu|100/100",
                "|-start|p1a: Pikachu|perish3",
            ],
        );
        assert_eq!(
            active(&battle, Player::P1).volatile_count(&Volatile::PerishSong),
            3
        );

        feed(&mut battle, &["|-start|p1a: Pikachu|perish2"]);
        assert_eq!(
            active(&battle, Player::P1).volatile_count(&Volatile::PerishSong),
            2
        );
    }

    #[test]
    fn test_typechange_updates_types() {
        let mut battle = TrackedBattle::new();
        feed(
            &mut battle,
            &[
                "|switch|p1a: Greninja|Greninja, M|100/100",
                "|-start|p1a: Greninja|typechange|Fire/Flying",
            ],
        );

        let poke = active(&battle, Player::P1);
        assert_eq!(poke.current_types, vec![Type::Fire, Type::Flying]);
        assert!(poke.has_volatile(&Volatile::TypeChange));
    }
}
