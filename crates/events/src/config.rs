use std::time::Duration;

/// Producer-side dispatch configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Timeout for a single delivery attempt (default: 10 s).
    pub timeout: Duration,
    /// Change bus buffer size (default: `1024`).
    pub bus_capacity: usize,
}

impl DispatchConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `DISPATCH_TIMEOUT_SECS` | `10`    |
    /// | `CHANGE_BUS_CAPACITY`   | `1024`  |
    pub fn from_env() -> Self {
        let timeout_secs: u64 = std::env::var("DISPATCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("DISPATCH_TIMEOUT_SECS must be a valid u64");

        let bus_capacity: usize = std::env::var("CHANGE_BUS_CAPACITY")
            .unwrap_or_else(|_| "1024".into())
            .parse()
            .expect("CHANGE_BUS_CAPACITY must be a valid usize");

        Self {
            timeout: Duration::from_secs(timeout_secs),
            bus_capacity,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            bus_capacity: 1024,
        }
    }
}
