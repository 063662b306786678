//! Built-in static move table
//!
//! A working subset of the movedex covering the moves the tracker needs to
//! reason about targeting and priority. Unknown moves fall back to
//! single-target defaults at the call site.

use super::{Category, MoveData, MoveTarget};

macro_rules! move_entry {
    ($id:literal, $name:literal, $cat:ident, $power:literal, $acc:expr, $pp:literal, $prio:literal, $target:ident) => {
        MoveData {
            id: $id,
            name: $name,
            category: Category::$cat,
            power: $power,
            accuracy: $acc,
            pp: $pp,
            priority: $prio,
            target: MoveTarget::$target,
        }
    };
}

static MOVES: &[MoveData] = &[
    move_entry!("tackle", "Tackle", Physical, 40, Some(100), 35, 0, Normal),
    move_entry!("quickattack", "Quick Attack", Physical, 40, Some(100), 30, 1, Normal),
    move_entry!("extremespeed", "Extreme Speed", Physical, 80, Some(100), 5, 2, Normal),
    move_entry!("fakeout", "Fake Out", Physical, 40, Some(100), 10, 3, Normal),
    move_entry!("suckerpunch", "Sucker Punch", Physical, 70, Some(100), 5, 1, Normal),
    move_entry!("aquajet", "Aqua Jet", Physical, 40, Some(100), 20, 1, Normal),
    move_entry!("earthquake", "Earthquake", Physical, 100, Some(100), 10, 0, AllAdjacent),
    move_entry!("surf", "Surf", Special, 90, Some(100), 15, 0, AllAdjacent),
    move_entry!("rockslide", "Rock Slide", Physical, 75, Some(90), 10, 0, AllAdjacentFoes),
    move_entry!("heatwave", "Heat Wave", Special, 95, Some(90), 10, 0, AllAdjacentFoes),
    move_entry!("dazzlinggleam", "Dazzling Gleam", Special, 80, Some(100), 10, 0, AllAdjacentFoes),
    move_entry!("muddywater", "Muddy Water", Special, 90, Some(85), 10, 0, AllAdjacentFoes),
    move_entry!("thunderbolt", "Thunderbolt", Special, 90, Some(100), 15, 0, Normal),
    move_entry!("thunder", "Thunder", Special, 110, Some(70), 10, 0, Normal),
    move_entry!("icebeam", "Ice Beam", Special, 90, Some(100), 10, 0, Normal),
    move_entry!("flamethrower", "Flamethrower", Special, 90, Some(100), 15, 0, Normal),
    move_entry!("fireblast", "Fire Blast", Special, 110, Some(85), 5, 0, Normal),
    move_entry!("hydropump", "Hydro Pump", Special, 110, Some(80), 5, 0, Normal),
    move_entry!("shadowball", "Shadow Ball", Special, 80, Some(100), 15, 0, Normal),
    move_entry!("dracometeor", "Draco Meteor", Special, 130, Some(90), 5, 0, Normal),
    move_entry!("dragonclaw", "Dragon Claw", Physical, 80, Some(100), 15, 0, Normal),
    move_entry!("outrage", "Outrage", Physical, 120, Some(100), 10, 0, RandomNormal),
    move_entry!("closecombat", "Close Combat", Physical, 120, Some(100), 5, 0, Normal),
    move_entry!("bodypress", "Body Press", Physical, 80, Some(100), 10, 0, Normal),
    move_entry!("knockoff", "Knock Off", Physical, 65, Some(100), 20, 0, Normal),
    move_entry!("uturn", "U-turn", Physical, 70, Some(100), 20, 0, Normal),
    move_entry!("voltswitch", "Volt Switch", Special, 70, Some(100), 20, 0, Normal),
    move_entry!("hyperbeam", "Hyper Beam", Special, 150, Some(90), 5, 0, Normal),
    move_entry!("gigaimpact", "Giga Impact", Physical, 150, Some(90), 5, 0, Normal),
    move_entry!("darkpulse", "Dark Pulse", Special, 80, Some(100), 15, 0, Any),
    move_entry!("flyingpress", "Flying Press", Physical, 100, Some(95), 10, 0, Any),
    move_entry!("swift", "Swift", Special, 60, None, 20, 0, AllAdjacentFoes),
    move_entry!("aerialace", "Aerial Ace", Physical, 60, None, 20, 0, Any),
    // Status moves
    move_entry!("protect", "Protect", Status, 0, None, 10, 4, User),
    move_entry!("detect", "Detect", Status, 0, None, 5, 4, User),
    move_entry!("endure", "Endure", Status, 0, None, 10, 4, User),
    move_entry!("swordsdance", "Swords Dance", Status, 0, None, 20, 0, User),
    move_entry!("dragondance", "Dragon Dance", Status, 0, None, 20, 0, User),
    move_entry!("calmmind", "Calm Mind", Status, 0, None, 20, 0, User),
    move_entry!("nastyplot", "Nasty Plot", Status, 0, None, 20, 0, User),
    move_entry!("recover", "Recover", Status, 0, None, 5, 0, User),
    move_entry!("roost", "Roost", Status, 0, None, 5, 0, User),
    move_entry!("substitute", "Substitute", Status, 0, None, 10, 0, User),
    move_entry!("spore", "Spore", Status, 0, Some(100), 15, 0, Normal),
    move_entry!("thunderwave", "Thunder Wave", Status, 0, Some(90), 20, 0, Normal),
    move_entry!("willowisp", "Will-O-Wisp", Status, 0, Some(85), 15, 0, Normal),
    move_entry!("toxic", "Toxic", Status, 0, Some(90), 10, 0, Normal),
    move_entry!("leechseed", "Leech Seed", Status, 0, Some(90), 10, 0, Normal),
    move_entry!("taunt", "Taunt", Status, 0, Some(100), 20, 0, Normal),
    move_entry!("encore", "Encore", Status, 0, Some(100), 5, 0, Normal),
    move_entry!("disable", "Disable", Status, 0, Some(100), 20, 0, Normal),
    move_entry!("followme", "Follow Me", Status, 0, None, 20, 2, User),
    move_entry!("helpinghand", "Helping Hand", Status, 0, None, 20, 5, AdjacentAlly),
    move_entry!("healpulse", "Heal Pulse", Status, 0, None, 10, 0, Any),
    move_entry!("pollenpuff", "Pollen Puff", Special, 90, Some(100), 15, 0, Normal),
    move_entry!("reflect", "Reflect", Status, 0, None, 20, 0, AllySide),
    move_entry!("lightscreen", "Light Screen", Status, 0, None, 30, 0, AllySide),
    move_entry!("auroraveil", "Aurora Veil", Status, 0, None, 20, 0, AllySide),
    move_entry!("safeguard", "Safeguard", Status, 0, None, 25, 0, AllySide),
    move_entry!("tailwind", "Tailwind", Status, 0, None, 15, 0, AllySide),
    move_entry!("healbell", "Heal Bell", Status, 0, None, 5, 0, AllyTeam),
    move_entry!("spikes", "Spikes", Status, 0, None, 20, 0, FoeSide),
    move_entry!("toxicspikes", "Toxic Spikes", Status, 0, None, 20, 0, FoeSide),
    move_entry!("stealthrock", "Stealth Rock", Status, 0, None, 20, 0, FoeSide),
    move_entry!("stickyweb", "Sticky Web", Status, 0, None, 20, 0, FoeSide),
    move_entry!("defog", "Defog", Status, 0, None, 15, 0, Normal),
    move_entry!("rapidspin", "Rapid Spin", Physical, 50, Some(100), 40, 0, Normal),
    move_entry!("raindance", "Rain Dance", Status, 0, None, 5, 0, All),
    move_entry!("sunnyday", "Sunny Day", Status, 0, None, 5, 0, All),
    move_entry!("trickroom", "Trick Room", Status, 0, None, 5, -7, All),
    move_entry!("counter", "Counter", Physical, 0, Some(100), 20, -5, Scripted),
    move_entry!("transform", "Transform", Status, 0, None, 10, 0, Normal),
    move_entry!("perishsong", "Perish Song", Status, 0, None, 5, 0, All),
    move_entry!("struggle", "Struggle", Physical, 50, None, 1, 0, RandomNormal),
    move_entry!("recharge", "Recharge", Status, 0, None, 1, 0, User),
];

/// The full built-in table
pub fn all_moves() -> &'static [MoveData] {
    MOVES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_normalized_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for m in all_moves() {
            assert!(
                m.id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
                "bad id {}",
                m.id
            );
            assert!(seen.insert(m.id), "duplicate id {}", m.id);
        }
    }

    #[test]
    fn test_status_moves_have_no_power() {
        for m in all_moves() {
            if m.category == Category::Status {
                assert_eq!(m.power, 0, "{} is Status with power", m.id);
            }
        }
    }
}
