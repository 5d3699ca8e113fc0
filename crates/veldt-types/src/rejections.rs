//! Rejection reason strings, part of the external contract.
//!
//! Client test suites match these strings verbatim, so they live here as
//! constants rather than as an enum with a `Display` impl that could drift.

/// The acting entity does not exist.
pub const AGENT_NOT_FOUND: &str = "Agent not found";
/// The acting entity is dead.
pub const AGENT_IS_DEAD: &str = "Agent is dead";
/// The actor's cooldown has not elapsed.
pub const ON_COOLDOWN: &str = "On cooldown";
/// A move destination falls outside the world.
pub const DESTINATION_OUT_OF_BOUNDS: &str = "Destination out of bounds";
/// A gather target does not exist.
pub const RESOURCE_NOT_FOUND: &str = "Resource not found";
/// A gather target exists but is not available.
pub const RESOURCE_UNAVAILABLE: &str = "Resource unavailable";
/// The target is beyond the relevant interaction range.
pub const TOO_FAR: &str = "Too far";
/// A named target (attack, trade, feed, climb, inspect) does not exist.
pub const TARGET_NOT_FOUND: &str = "Target not found";
/// Self-targeted attack.
pub const CANNOT_ATTACK_SELF: &str = "Cannot attack yourself";
/// Self-targeted trade.
pub const CANNOT_TRADE_SELF: &str = "Cannot trade with yourself";
/// Merchants never attack.
pub const MERCHANTS_CANNOT_ATTACK: &str = "Merchants cannot attack";
/// Monsters never gather.
pub const MONSTERS_CANNOT_GATHER: &str = "Monsters cannot gather";
/// Fighters only mine gold veins.
pub const FIGHTERS_ONLY_MINE_GOLD: &str = "Fighters can only mine gold";
/// Merchants gather everything but gold veins.
pub const MERCHANTS_CANNOT_MINE_GOLD: &str = "Merchants cannot mine gold";
/// Fighter-on-fighter attacks are forbidden.
pub const FIGHTERS_CANNOT_ATTACK_FIGHTERS: &str = "Fighters cannot attack other fighters";
/// Fighter-on-merchant attacks are forbidden.
pub const FIGHTERS_CANNOT_ATTACK_MERCHANTS: &str = "Fighters cannot attack merchants";
/// Crafting is merchant-only.
pub const ONLY_MERCHANTS_CRAFT: &str = "Only merchants can craft";
/// Planting is merchant-only.
pub const ONLY_MERCHANTS_PLANT: &str = "Only merchants can plant";
/// Watering is merchant-only.
pub const ONLY_MERCHANTS_WATER: &str = "Only merchants can water";
/// Climbing is merchant-only.
pub const ONLY_MERCHANTS_CLIMB: &str = "Only merchants can climb behemoths";
/// Climb target is awake.
pub const BEHEMOTH_NOT_UNCONSCIOUS: &str = "Behemoth is not unconscious";
/// Empty chat content.
pub const MESSAGE_EMPTY: &str = "Message cannot be empty";
/// Whisper target missing.
pub const WHISPER_TARGET_NOT_FOUND: &str = "Whisper target not found";
/// Plant without the named seed in inventory.
pub const NO_SEED_IN_INVENTORY: &str = "No seed in inventory";
/// Feed without the named item in inventory.
pub const NO_FOOD_IN_INVENTORY: &str = "No food item in inventory";
/// Water at a position with no sapling.
pub const NO_SAPLING_AT_POSITION: &str = "No sapling at position";
/// Trade offer exceeds the proposer's holdings.
pub const INSUFFICIENT_TRADE_OFFER: &str = "Insufficient items for trade offer";
/// Alliance name collision.
pub const ALLIANCE_NAME_TAKEN: &str = "Alliance name already taken";
/// Join target alliance does not exist.
pub const ALLIANCE_NOT_FOUND: &str = "Alliance not found";
/// Form/join while already a member somewhere.
pub const ALREADY_IN_ALLIANCE: &str = "Already in an alliance";
/// Leave without a membership.
pub const NOT_IN_ALLIANCE: &str = "Not in an alliance";
