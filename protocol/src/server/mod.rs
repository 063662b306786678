//! Server message parsing
//!
//! One parser function per message tag, routed from [`parse_server_message`].
//! Tags the engine does not recognize become [`ServerMessage::Unknown`] so a
//! protocol running ahead of this client degrades to "ignore and log" at the
//! tracking layer instead of failing the whole stream.

mod battle_init;
mod battle_major;
mod battle_minor;
mod battle_progress;
mod ident;
pub mod request;

use anyhow::Result;

pub use ident::{
    GameType, HpStatus, Player, PokemonDetails, PokemonRef, Side, Stat, parse_details,
    parse_from_tag, parse_hp_status, parse_of_tag, parse_pokemon,
};

/// A single parsed server message
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    // === Login handshake ===
    Challstr(String),

    // === Battle initialization ===
    BattlePlayer {
        player: Player,
        username: String,
        avatar: String,
        rating: Option<u32>,
    },
    TeamSize {
        player: Player,
        size: u8,
    },
    GameType(GameType),
    Gen(u8),
    Tier(String),
    Rated(Option<String>),
    Rule(String),
    ClearPoke,
    Poke {
        player: Player,
        details: PokemonDetails,
        has_item: bool,
    },
    TeamPreview(Option<u8>),
    BattleStart,

    // === Battle progress ===
    Request(serde_json::Value),
    Inactive(String),
    InactiveOff(String),
    Upkeep,
    Turn(u32),
    Win(String),
    Tie,

    // === Major actions ===
    Move {
        pokemon: PokemonRef,
        move_name: String,
        target: Option<PokemonRef>,
        miss: bool,
        still: bool,
        anim: Option<String>,
    },
    Switch {
        pokemon: PokemonRef,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Drag {
        pokemon: PokemonRef,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    DetailsChange {
        pokemon: PokemonRef,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    FormeChange {
        pokemon: PokemonRef,
        species: String,
        hp_status: Option<HpStatus>,
    },
    Replace {
        pokemon: PokemonRef,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Swap {
        pokemon: PokemonRef,
        position: u8,
    },
    Cant {
        pokemon: PokemonRef,
        reason: String,
        move_name: Option<String>,
    },
    Faint(PokemonRef),

    // === Minor actions ===
    Fail {
        pokemon: PokemonRef,
        action: Option<String>,
    },
    Block {
        pokemon: PokemonRef,
        effect: String,
        move_name: Option<String>,
        attacker: Option<PokemonRef>,
    },
    NoTarget(Option<PokemonRef>),
    Miss {
        source: PokemonRef,
        target: Option<PokemonRef>,
    },
    Damage {
        pokemon: PokemonRef,
        hp_status: Option<HpStatus>,
        from: Option<String>,
        of: Option<PokemonRef>,
    },
    Heal {
        pokemon: PokemonRef,
        hp_status: Option<HpStatus>,
        from: Option<String>,
        of: Option<PokemonRef>,
    },
    SetHp {
        pokemon: PokemonRef,
        hp_status: Option<HpStatus>,
    },
    Status {
        pokemon: PokemonRef,
        status: String,
    },
    CureStatus {
        pokemon: PokemonRef,
        status: String,
    },
    CureTeam(PokemonRef),
    Boost {
        pokemon: PokemonRef,
        stat: Stat,
        amount: i8,
    },
    Unboost {
        pokemon: PokemonRef,
        stat: Stat,
        amount: i8,
    },
    SetBoost {
        pokemon: PokemonRef,
        stat: Stat,
        amount: i8,
    },
    SwapBoost {
        source: PokemonRef,
        target: PokemonRef,
        stats: Vec<Stat>,
    },
    InvertBoost(PokemonRef),
    ClearBoost(PokemonRef),
    ClearAllBoost,
    ClearPositiveBoost {
        target: PokemonRef,
        source: PokemonRef,
        effect: String,
    },
    ClearNegativeBoost(PokemonRef),
    CopyBoost {
        source: PokemonRef,
        target: PokemonRef,
    },
    Weather {
        weather: String,
        upkeep: bool,
    },
    FieldStart(String),
    FieldEnd(String),
    SideStart {
        side: Side,
        condition: String,
    },
    SideEnd {
        side: Side,
        condition: String,
    },
    SwapSideConditions,
    VolatileStart {
        pokemon: PokemonRef,
        effect: String,
        /// Trailing payload some effects carry (e.g. the new type list for
        /// typechange)
        detail: Option<String>,
    },
    VolatileEnd {
        pokemon: PokemonRef,
        effect: String,
    },
    Crit(PokemonRef),
    SuperEffective(PokemonRef),
    Resisted(PokemonRef),
    Immune(PokemonRef),
    Item {
        pokemon: PokemonRef,
        item: String,
        from: Option<String>,
    },
    EndItem {
        pokemon: PokemonRef,
        item: String,
        from: Option<String>,
        eat: bool,
    },
    Ability {
        pokemon: PokemonRef,
        ability: String,
        from: Option<String>,
    },
    EndAbility(PokemonRef),
    Transform {
        pokemon: PokemonRef,
        species: String,
    },
    Mega {
        pokemon: PokemonRef,
        megastone: String,
    },
    Primal(PokemonRef),
    Burst {
        pokemon: PokemonRef,
        species: String,
        item: String,
    },
    ZPower(PokemonRef),
    ZBroken(PokemonRef),
    Terastallize {
        pokemon: PokemonRef,
        tera_type: String,
    },
    Activate {
        pokemon: Option<PokemonRef>,
        effect: String,
    },
    Hint(String),
    Center,
    Message(String),
    Combine,
    Waiting {
        source: PokemonRef,
        target: PokemonRef,
    },
    Prepare {
        attacker: PokemonRef,
        move_name: String,
        defender: Option<PokemonRef>,
    },
    MustRecharge(PokemonRef),
    Nothing,
    HitCount {
        pokemon: PokemonRef,
        count: u8,
    },
    SingleMove {
        pokemon: PokemonRef,
        move_name: String,
    },
    SingleTurn {
        pokemon: PokemonRef,
        move_name: String,
    },

    // === Fallbacks ===
    Error(String),
    /// A tag this client does not know about
    Unknown {
        tag: String,
        raw: String,
    },
    /// Non-message line (chat, timestamps, plain text)
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerFrame {
    pub room_id: Option<String>,
    pub messages: Vec<ServerMessage>,
}

/// Parse a complete WebSocket frame into structured messages
pub fn parse_server_frame(frame: &str) -> Result<ServerFrame> {
    let mut lines = frame.lines();
    let mut room_id = None;

    // Check if first line is >ROOMID
    if let Some(first_line) = lines.clone().next() {
        if let Some(room) = first_line.strip_prefix('>') {
            room_id = Some(room.to_string());
            lines.next();
        }
    }

    // Parse remaining lines as messages
    let messages: Vec<ServerMessage> = lines
        .filter(|line| !line.trim().is_empty())
        .map(parse_server_message)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(ServerFrame { room_id, messages })
}

/// Parse a single line from the server into a ServerMessage
pub fn parse_server_message(line: &str) -> Result<ServerMessage> {
    let line = line.trim();

    if line.is_empty() {
        return Ok(ServerMessage::Raw(String::new()));
    }

    if !line.starts_with('|') {
        return Ok(ServerMessage::Raw(line.to_string()));
    }

    let parts: Vec<&str> = line.split('|').collect();

    if parts.len() < 2 {
        return Ok(ServerMessage::Raw(line.to_string()));
    }

    match parts[1] {
        "challstr" => parse_challstr(&parts),

        // Initialization
        "player" => battle_init::parse_player(&parts),
        "teamsize" => battle_init::parse_teamsize(&parts),
        "gametype" => battle_init::parse_gametype(&parts),
        "gen" => battle_init::parse_gen(&parts),
        "tier" => battle_init::parse_tier(&parts),
        "rated" => battle_init::parse_rated(&parts),
        "rule" => battle_init::parse_rule(&parts),
        "clearpoke" => battle_init::parse_clearpoke(&parts),
        "poke" => battle_init::parse_poke(&parts),
        "teampreview" => battle_init::parse_teampreview(&parts),
        "start" => battle_init::parse_start(&parts),

        // Progress
        "request" => battle_progress::parse_request(&parts),
        "inactive" => battle_progress::parse_inactive(&parts),
        "inactiveoff" => battle_progress::parse_inactiveoff(&parts),
        "upkeep" => battle_progress::parse_upkeep(&parts),
        "turn" => battle_progress::parse_turn(&parts),
        "win" => battle_progress::parse_win(&parts),
        "tie" => battle_progress::parse_tie(&parts),

        // Major actions
        "move" => battle_major::parse_move(&parts),
        "switch" => battle_major::parse_switch(&parts),
        "drag" => battle_major::parse_drag(&parts),
        "detailschange" => battle_major::parse_detailschange(&parts),
        "-formechange" => battle_major::parse_formechange(&parts),
        "replace" => battle_major::parse_replace(&parts),
        "swap" => battle_major::parse_swap(&parts),
        "cant" => battle_major::parse_cant(&parts),
        "faint" => battle_major::parse_faint(&parts),

        // Minor actions
        "-fail" => battle_minor::parse_fail(&parts),
        "-block" => battle_minor::parse_block(&parts),
        "-notarget" => battle_minor::parse_notarget(&parts),
        "-miss" => battle_minor::parse_miss(&parts),
        "-damage" => battle_minor::parse_damage(&parts),
        "-heal" => battle_minor::parse_heal(&parts),
        "-sethp" => battle_minor::parse_sethp(&parts),
        "-status" => battle_minor::parse_status(&parts),
        "-curestatus" => battle_minor::parse_curestatus(&parts),
        "-cureteam" => battle_minor::parse_cureteam(&parts),
        "-boost" => battle_minor::parse_boost(&parts),
        "-unboost" => battle_minor::parse_unboost(&parts),
        "-setboost" => battle_minor::parse_setboost(&parts),
        "-swapboost" => battle_minor::parse_swapboost(&parts),
        "-invertboost" => battle_minor::parse_invertboost(&parts),
        "-clearboost" => battle_minor::parse_clearboost(&parts),
        "-clearallboost" => battle_minor::parse_clearallboost(&parts),
        "-clearpositiveboost" => battle_minor::parse_clearpositiveboost(&parts),
        "-clearnegativeboost" => battle_minor::parse_clearnegativeboost(&parts),
        "-copyboost" => battle_minor::parse_copyboost(&parts),
        "-weather" => battle_minor::parse_weather(&parts),
        "-fieldstart" => battle_minor::parse_fieldstart(&parts),
        "-fieldend" => battle_minor::parse_fieldend(&parts),
        "-sidestart" => battle_minor::parse_sidestart(&parts),
        "-sideend" => battle_minor::parse_sideend(&parts),
        "-swapsideconditions" => battle_minor::parse_swapsideconditions(&parts),
        "-start" => battle_minor::parse_start(&parts),
        "-end" => battle_minor::parse_end(&parts),
        "-crit" => battle_minor::parse_crit(&parts),
        "-supereffective" => battle_minor::parse_supereffective(&parts),
        "-resisted" => battle_minor::parse_resisted(&parts),
        "-immune" => battle_minor::parse_immune(&parts),
        "-item" => battle_minor::parse_item(&parts),
        "-enditem" => battle_minor::parse_enditem(&parts),
        "-ability" => battle_minor::parse_ability(&parts),
        "-endability" => battle_minor::parse_endability(&parts),
        "-transform" => battle_minor::parse_transform(&parts),
        "-mega" => battle_minor::parse_mega(&parts),
        "-primal" => battle_minor::parse_primal(&parts),
        "-burst" => battle_minor::parse_burst(&parts),
        "-zpower" => battle_minor::parse_zpower(&parts),
        "-zbroken" => battle_minor::parse_zbroken(&parts),
        "-terastallize" => battle_minor::parse_terastallize(&parts),
        "-activate" => battle_minor::parse_activate(&parts),
        "-hint" => battle_minor::parse_hint(&parts),
        "-center" => battle_minor::parse_center(&parts),
        "-message" => battle_minor::parse_message(&parts),
        "-combine" => battle_minor::parse_combine(&parts),
        "-waiting" => battle_minor::parse_waiting(&parts),
        "-prepare" => battle_minor::parse_prepare(&parts),
        "-mustrecharge" => battle_minor::parse_mustrecharge(&parts),
        "-nothing" => battle_minor::parse_nothing(&parts),
        "-hitcount" => battle_minor::parse_hitcount(&parts),
        "-singlemove" => battle_minor::parse_singlemove(&parts),
        "-singleturn" => battle_minor::parse_singleturn(&parts),

        "error" => Ok(ServerMessage::Error(parts[2..].join("|"))),

        // Chat/log lines the tracker does not act on
        "" | "t:" | "c" | "c:" | "j" | "J" | "l" | "L" | "html" | "uhtml" | "raw" | "debug"
        | "init" | "title" | "join" | "leave" | "deinit" => {
            Ok(ServerMessage::Raw(line.to_string()))
        }

        tag => Ok(ServerMessage::Unknown {
            tag: tag.to_string(),
            raw: line.to_string(),
        }),
    }
}

fn parse_challstr(parts: &[&str]) -> Result<ServerMessage> {
    // |challstr|CHALLSTR
    // CHALLSTR can contain | characters, so join everything after parts[1]
    if parts.len() < 3 {
        return Err(crate::ParseError::MissingField("challstr value".to_string()).into());
    }

    let challstr = parts[2..].join("|");
    if challstr.is_empty() {
        return Err(crate::ParseError::InvalidFormat("challstr cannot be empty".to_string()).into());
    }

    Ok(ServerMessage::Challstr(challstr))
}
