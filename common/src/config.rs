use crate::time::TimestampSeconds;

// ===== TASK REWARD RULES =====

// Every plan splits its daily earning over this many tasks
pub const DEFAULT_TASKS_PER_DAY: u32 = 5;
// Paid per task when no override is set and the plan is missing
// or has a zero daily earning
pub const FALLBACK_TASK_REWARD: u64 = 30;

// ===== EARNING WINDOW =====

pub const SECONDS_PER_DAY: TimestampSeconds = 24 * 60 * 60;
// Used when the user has no resolvable plan
pub const DEFAULT_MAX_EARNING_DAYS: u32 = 30;
pub const DEFAULT_EXTENDED_EARNING_DAYS: u32 = 60;

// ===== TASK COMMISSION CASCADE =====

// Absolute ceiling of the sponsor walk, it is also the only cycle guard
pub const MAX_COMMISSION_LEVELS: u8 = 5;
// Basis points (100 = 1%) applied to the task reward, index 0 = level 1
pub const TASK_COMMISSION_RATES_BPS: [u16; MAX_COMMISSION_LEVELS as usize] =
    [1000, 500, 300, 200, 100];
// 10000 basis points = 100%
pub const BPS_DENOMINATOR: u64 = 10_000;

// ===== CONTENT ENGAGEMENT =====

// Interactions required when a task asks for user interaction
pub const MIN_USER_INTERACTIONS: u32 = 3;

// ===== TASK CATALOG =====

// Synthesized templates live above this id so they never clash
// with templates created by the admin catalog
pub const DEFAULT_TASK_ID_BASE: u64 = 1 << 48;
