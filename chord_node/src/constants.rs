pub const DEFAULT_KEY_SIZE: u32 = 8;
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ADDR: &str = "127.0.0.1";

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_STABILIZE_INTERVAL_MS: u64 = 250;
pub const DEFAULT_FIX_FINGER_INTERVAL_MS: u64 = 50;
pub const DEFAULT_CHECK_PREDECESSOR_INTERVAL_MS: u64 = 150;

pub const DEFAULT_SUCCESSOR_LIST_SIZE: usize = 2;
pub const DEFAULT_LOGGING: bool = true;

/// Ceiling on `KeySize`: SHA-1 only has 160 bits to give.
pub const MAX_KEY_SIZE: u32 = 160;
