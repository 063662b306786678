//! Minor battle action message parsers
//!
//! Secondary effects in battle: damage, stat changes, status, field and side
//! conditions, reveals. The official client renders these in smaller font.

use super::ServerMessage;
use super::ident::{
    PokemonRef, Side, Stat, parse_from_tag, parse_hp_status, parse_of_tag, parse_pokemon,
};
use anyhow::Result;

fn text(parts: &[&str], index: usize) -> String {
    parts.get(index).unwrap_or(&"").to_string()
}

fn stat_and_amount(parts: &[&str]) -> Result<(Stat, i8)> {
    let stat = parts
        .get(3)
        .and_then(|s| Stat::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing stat"))?;
    let amount = parts
        .get(4)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing amount"))?;
    Ok((stat, amount))
}

fn side_at(parts: &[&str], index: usize) -> Result<Side> {
    parts
        .get(index)
        .and_then(|s| Side::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing side"))
}

/// Parse |-fail|POKEMON|ACTION
pub fn parse_fail(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Fail {
        pokemon: parse_pokemon(parts, 2)?,
        action: parts.get(3).map(|s| s.to_string()),
    })
}

/// Parse |-block|POKEMON|EFFECT|MOVE|ATTACKER
pub fn parse_block(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Block {
        pokemon: parse_pokemon(parts, 2)?,
        effect: text(parts, 3),
        move_name: parts.get(4).map(|s| s.to_string()),
        attacker: parts.get(5).and_then(|s| PokemonRef::parse(s)),
    })
}

/// Parse |-notarget|POKEMON
pub fn parse_notarget(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::NoTarget(
        parts.get(2).and_then(|s| PokemonRef::parse(s)),
    ))
}

/// Parse |-miss|SOURCE|TARGET
pub fn parse_miss(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Miss {
        source: parse_pokemon(parts, 2)?,
        target: parts.get(3).and_then(|s| PokemonRef::parse(s)),
    })
}

/// Parse |-damage|POKEMON|HP STATUS with optional [from]/[of] attribution
pub fn parse_damage(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Damage {
        pokemon: parse_pokemon(parts, 2)?,
        hp_status: parse_hp_status(parts, 3),
        from: parse_from_tag(parts),
        of: parse_of_tag(parts),
    })
}

/// Parse |-heal|POKEMON|HP STATUS with optional [from]/[of] attribution
pub fn parse_heal(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Heal {
        pokemon: parse_pokemon(parts, 2)?,
        hp_status: parse_hp_status(parts, 3),
        from: parse_from_tag(parts),
        of: parse_of_tag(parts),
    })
}

/// Parse |-sethp|POKEMON|HP
pub fn parse_sethp(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::SetHp {
        pokemon: parse_pokemon(parts, 2)?,
        hp_status: parse_hp_status(parts, 3),
    })
}

/// Parse |-status|POKEMON|STATUS
pub fn parse_status(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Status {
        pokemon: parse_pokemon(parts, 2)?,
        status: text(parts, 3),
    })
}

/// Parse |-curestatus|POKEMON|STATUS
pub fn parse_curestatus(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::CureStatus {
        pokemon: parse_pokemon(parts, 2)?,
        status: text(parts, 3),
    })
}

/// Parse |-cureteam|POKEMON
pub fn parse_cureteam(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::CureTeam(parse_pokemon(parts, 2)?))
}

/// Parse |-boost|POKEMON|STAT|AMOUNT
pub fn parse_boost(parts: &[&str]) -> Result<ServerMessage> {
    let pokemon = parse_pokemon(parts, 2)?;
    let (stat, amount) = stat_and_amount(parts)?;
    Ok(ServerMessage::Boost {
        pokemon,
        stat,
        amount,
    })
}

/// Parse |-unboost|POKEMON|STAT|AMOUNT
pub fn parse_unboost(parts: &[&str]) -> Result<ServerMessage> {
    let pokemon = parse_pokemon(parts, 2)?;
    let (stat, amount) = stat_and_amount(parts)?;
    Ok(ServerMessage::Unboost {
        pokemon,
        stat,
        amount,
    })
}

/// Parse |-setboost|POKEMON|STAT|AMOUNT
pub fn parse_setboost(parts: &[&str]) -> Result<ServerMessage> {
    let pokemon = parse_pokemon(parts, 2)?;
    let (stat, amount) = stat_and_amount(parts)?;
    Ok(ServerMessage::SetBoost {
        pokemon,
        stat,
        amount,
    })
}

/// Parse |-swapboost|SOURCE|TARGET|STATS
pub fn parse_swapboost(parts: &[&str]) -> Result<ServerMessage> {
    let source = parse_pokemon(parts, 2)?;
    let target = parse_pokemon(parts, 3)?;
    let stats: Vec<Stat> = parts
        .get(4)
        .map(|s| s.split(',').filter_map(|s| Stat::parse(s.trim())).collect())
        .unwrap_or_default();

    Ok(ServerMessage::SwapBoost {
        source,
        target,
        stats,
    })
}

/// Parse |-invertboost|POKEMON
pub fn parse_invertboost(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::InvertBoost(parse_pokemon(parts, 2)?))
}

/// Parse |-clearboost|POKEMON
pub fn parse_clearboost(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::ClearBoost(parse_pokemon(parts, 2)?))
}

/// Parse |-clearallboost
pub fn parse_clearallboost(_parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::ClearAllBoost)
}

/// Parse |-clearpositiveboost|TARGET|POKEMON|EFFECT
pub fn parse_clearpositiveboost(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::ClearPositiveBoost {
        target: parse_pokemon(parts, 2)?,
        source: parse_pokemon(parts, 3)?,
        effect: text(parts, 4),
    })
}

/// Parse |-clearnegativeboost|POKEMON
pub fn parse_clearnegativeboost(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::ClearNegativeBoost(parse_pokemon(parts, 2)?))
}

/// Parse |-copyboost|SOURCE|TARGET
pub fn parse_copyboost(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::CopyBoost {
        source: parse_pokemon(parts, 2)?,
        target: parse_pokemon(parts, 3)?,
    })
}

/// Parse |-weather|WEATHER with optional [upkeep]
pub fn parse_weather(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Weather {
        weather: parts.get(2).unwrap_or(&"none").to_string(),
        upkeep: parts.iter().any(|p| *p == "[upkeep]"),
    })
}

/// Parse |-fieldstart|CONDITION
pub fn parse_fieldstart(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::FieldStart(text(parts, 2)))
}

/// Parse |-fieldend|CONDITION
pub fn parse_fieldend(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::FieldEnd(text(parts, 2)))
}

/// Parse |-sidestart|SIDE|CONDITION
pub fn parse_sidestart(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::SideStart {
        side: side_at(parts, 2)?,
        condition: text(parts, 3),
    })
}

/// Parse |-sideend|SIDE|CONDITION
pub fn parse_sideend(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::SideEnd {
        side: side_at(parts, 2)?,
        condition: text(parts, 3),
    })
}

/// Parse |-swapsideconditions
pub fn parse_swapsideconditions(_parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::SwapSideConditions)
}

/// Parse |-start|POKEMON|EFFECT with optional payload (|-start|P|typechange|Fire/Flying)
pub fn parse_start(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::VolatileStart {
        pokemon: parse_pokemon(parts, 2)?,
        effect: text(parts, 3),
        detail: parts
            .get(4)
            .filter(|s| !s.starts_with('['))
            .map(|s| s.to_string()),
    })
}

/// Parse |-end|POKEMON|EFFECT
pub fn parse_end(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::VolatileEnd {
        pokemon: parse_pokemon(parts, 2)?,
        effect: text(parts, 3),
    })
}

/// Parse |-crit|POKEMON
pub fn parse_crit(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Crit(parse_pokemon(parts, 2)?))
}

/// Parse |-supereffective|POKEMON
pub fn parse_supereffective(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::SuperEffective(parse_pokemon(parts, 2)?))
}

/// Parse |-resisted|POKEMON
pub fn parse_resisted(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Resisted(parse_pokemon(parts, 2)?))
}

/// Parse |-immune|POKEMON
pub fn parse_immune(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Immune(parse_pokemon(parts, 2)?))
}

/// Parse |-item|POKEMON|ITEM with optional [from]EFFECT
pub fn parse_item(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Item {
        pokemon: parse_pokemon(parts, 2)?,
        item: text(parts, 3),
        from: parse_from_tag(parts),
    })
}

/// Parse |-enditem|POKEMON|ITEM with optional [from]EFFECT or [eat]
pub fn parse_enditem(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::EndItem {
        pokemon: parse_pokemon(parts, 2)?,
        item: text(parts, 3),
        from: parse_from_tag(parts),
        eat: parts.iter().any(|p| *p == "[eat]"),
    })
}

/// Parse |-ability|POKEMON|ABILITY with optional [from]EFFECT
pub fn parse_ability(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Ability {
        pokemon: parse_pokemon(parts, 2)?,
        ability: text(parts, 3),
        from: parse_from_tag(parts),
    })
}

/// Parse |-endability|POKEMON
pub fn parse_endability(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::EndAbility(parse_pokemon(parts, 2)?))
}

/// Parse |-transform|POKEMON|SPECIES
pub fn parse_transform(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Transform {
        pokemon: parse_pokemon(parts, 2)?,
        species: text(parts, 3),
    })
}

/// Parse |-mega|POKEMON|MEGASTONE
pub fn parse_mega(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Mega {
        pokemon: parse_pokemon(parts, 2)?,
        megastone: text(parts, 3),
    })
}

/// Parse |-primal|POKEMON
pub fn parse_primal(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Primal(parse_pokemon(parts, 2)?))
}

/// Parse |-burst|POKEMON|SPECIES|ITEM
pub fn parse_burst(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Burst {
        pokemon: parse_pokemon(parts, 2)?,
        species: text(parts, 3),
        item: text(parts, 4),
    })
}

/// Parse |-zpower|POKEMON
pub fn parse_zpower(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::ZPower(parse_pokemon(parts, 2)?))
}

/// Parse |-zbroken|POKEMON
pub fn parse_zbroken(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::ZBroken(parse_pokemon(parts, 2)?))
}

/// Parse |-terastallize|POKEMON|TYPE
pub fn parse_terastallize(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Terastallize {
        pokemon: parse_pokemon(parts, 2)?,
        tera_type: text(parts, 3),
    })
}

/// Parse |-activate|EFFECT (with optional Pokemon and other fields)
pub fn parse_activate(parts: &[&str]) -> Result<ServerMessage> {
    // First field might be a Pokemon or an effect
    let pokemon = parts.get(2).and_then(|s| PokemonRef::parse(s));
    let effect = if pokemon.is_some() {
        text(parts, 3)
    } else {
        text(parts, 2)
    };

    Ok(ServerMessage::Activate { pokemon, effect })
}

/// Parse |-hint|MESSAGE
pub fn parse_hint(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Hint(text(parts, 2)))
}

/// Parse |-center
pub fn parse_center(_parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Center)
}

/// Parse |-message|MESSAGE
pub fn parse_message(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Message(text(parts, 2)))
}

/// Parse |-combine
pub fn parse_combine(_parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Combine)
}

/// Parse |-waiting|SOURCE|TARGET
pub fn parse_waiting(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Waiting {
        source: parse_pokemon(parts, 2)?,
        target: parse_pokemon(parts, 3)?,
    })
}

/// Parse |-prepare|ATTACKER|MOVE or |-prepare|ATTACKER|MOVE|DEFENDER
pub fn parse_prepare(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Prepare {
        attacker: parse_pokemon(parts, 2)?,
        move_name: text(parts, 3),
        defender: parts.get(4).and_then(|s| PokemonRef::parse(s)),
    })
}

/// Parse |-mustrecharge|POKEMON
pub fn parse_mustrecharge(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::MustRecharge(parse_pokemon(parts, 2)?))
}

/// Parse |-nothing
pub fn parse_nothing(_parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Nothing)
}

/// Parse |-hitcount|POKEMON|NUM
pub fn parse_hitcount(parts: &[&str]) -> Result<ServerMessage> {
    let pokemon = parse_pokemon(parts, 2)?;
    let count = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing hit count"))?;

    Ok(ServerMessage::HitCount { pokemon, count })
}

/// Parse |-singlemove|POKEMON|MOVE
pub fn parse_singlemove(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::SingleMove {
        pokemon: parse_pokemon(parts, 2)?,
        move_name: text(parts, 3),
    })
}

/// Parse |-singleturn|POKEMON|MOVE
pub fn parse_singleturn(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::SingleTurn {
        pokemon: parse_pokemon(parts, 2)?,
        move_name: text(parts, 3),
    })
}
