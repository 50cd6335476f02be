use clap::Parser;

use crate::constants::{
    DEFAULT_ADDR, DEFAULT_CHECK_PREDECESSOR_INTERVAL_MS, DEFAULT_FIX_FINGER_INTERVAL_MS,
    DEFAULT_KEY_SIZE, DEFAULT_LOGGING, DEFAULT_PORT, DEFAULT_STABILIZE_INTERVAL_MS,
    DEFAULT_SUCCESSOR_LIST_SIZE, DEFAULT_TIMEOUT_MS, MAX_KEY_SIZE,
};
use crate::error::{ChordError, ChordResult};

/// Node configuration: identifier width, bind address, RPC timeout,
/// the three periodic-task intervals, the successor list size, and
/// the debug-logging toggle.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Identifier width in bits. Must be a multiple of 8.
    #[arg(long, default_value_t = DEFAULT_KEY_SIZE)]
    pub key_size: u32,

    /// Bind address.
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Bind port.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address of an existing ring member to join through.
    #[arg(short, long)]
    pub join: Option<String>,

    /// Address of a monitor to push periodic state reports to.
    #[arg(short, long)]
    pub monitor: Option<String>,

    /// Per-RPC timeout, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Interval between stabilize ticks, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_STABILIZE_INTERVAL_MS)]
    pub stabilize_interval_ms: u64,

    /// Interval between fix-finger ticks, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_FIX_FINGER_INTERVAL_MS)]
    pub fix_finger_interval_ms: u64,

    /// Interval between check-predecessor ticks, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_CHECK_PREDECESSOR_INTERVAL_MS)]
    pub check_predecessor_interval_ms: u64,

    /// Number of entries kept in the successor list.
    #[arg(long, default_value_t = DEFAULT_SUCCESSOR_LIST_SIZE)]
    pub successor_list_size: usize,

    /// Enable the periodic debug-state dump.
    #[arg(long, default_value_t = DEFAULT_LOGGING)]
    pub logging: bool,
}

impl Config {
    pub fn validate(&self) -> ChordResult<()> {
        if self.key_size == 0 || self.key_size % 8 != 0 {
            return Err(ChordError::Config(format!(
                "key_size must be a positive multiple of 8, got {}",
                self.key_size
            )));
        }
        if self.key_size > MAX_KEY_SIZE {
            return Err(ChordError::Config(format!(
                "key_size {} exceeds the {}-bit (SHA-1) ceiling",
                self.key_size, MAX_KEY_SIZE
            )));
        }
        if self.successor_list_size == 0 {
            return Err(ChordError::Config(
                "successor_list_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr_str(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}
