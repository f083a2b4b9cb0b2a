// Search
pub const DEFAULT_SEARCH_DEPTH: u32 = 3;
pub const SIM_NPC_ATTACK_DAMAGE: i32 = 10;
pub const SIM_NPC_DEFEND_HEAL: i32 = 5;
pub const SIM_NPC_FLEE_HEAL: i32 = 2;
pub const SIM_PLAYER_REPLY_DAMAGE: i32 = 20;

// Evaluator
pub const EVAL_LOSS_SCORE: f64 = -1000.0;
pub const EVAL_WIN_SCORE: f64 = 1000.0;
pub const EVAL_SURVIVAL_THRESHOLD: f64 = 0.3;
pub const EVAL_SURVIVAL_WEIGHT: f64 = 30.0;
pub const EVAL_SURVIVAL_ADVANTAGE_WEIGHT: f64 = 10.0;
pub const EVAL_ADVANTAGE_WEIGHT: f64 = 20.0;
pub const EVAL_POSITION_SCORE: f64 = 10.0;
pub const QUEST_TARGET_IMPORTANCE: f64 = 1.5;

// Combat modifiers
pub const STRENGTH_MODIFIER_CAP: i32 = 5;
pub const MIN_DAMAGE: i32 = 1;
pub const DEFEND_DAMAGE_DIVISOR: i32 = 2;
pub const LOW_HEALTH_FRACTION: f64 = 0.3;

// Dice resolution
pub const ATTACK_DIE: u32 = 20;
pub const ATTACK_HIT_THRESHOLD: i32 = 10;
pub const PLAYER_DAMAGE_DIE: u32 = 6;
pub const NPC_DAMAGE_DIE: u32 = 4;
pub const FLEE_DIE: u32 = 20;
pub const FLEE_SUCCESS_ABOVE: i32 = 15;
pub const MERCHANT_POTION_HEAL: i32 = 20;

// Quest policy
pub const MERCHANT_PRIORITY_HEALTH_FRACTION: f64 = 0.5;
pub const REPEAT_DAMPING_DIVISOR: u32 = 3;
pub const DEFAULT_GENERATION_TIMEOUT_MS: u64 = 20_000;

// Difficulty director
pub const DIRECTOR_INTERVAL_TURNS: u32 = 3;
pub const DIRECTOR_STRONG_PLAYER_FRACTION: f64 = 0.7;
pub const DIRECTOR_WEAK_PLAYER_FRACTION: f64 = 0.3;
pub const SECOND_WIND_THRESHOLD: f64 = 0.3;
pub const SECOND_WIND_HEAL_PERCENT: i32 = 30;
pub const HELPER_SPAWN_CHANCE: f64 = 0.3;

// Reinforcement: (name, hp, strength)
pub const REINFORCEMENT_NPC: (&str, i32, i32) = ("Troll", 70, 12);
// Helper: (name, hp, strength)
pub const HELPER_NPC: (&str, i32, i32) = ("Wandering Merchant", 30, 3);

// Starting encounter
pub const PLAYER_START_HP: i32 = 100;
pub const PLAYER_START_STRENGTH: i32 = 10;
