// Module constants (no magic values)

/// Executable used by process modules unless overridden
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Flag placed before the module name on the launch command line
pub const MODULE_FLAG: &str = "-m";

/// Remote path answering connectivity probes
pub const TEST_CONNECTION_PATH: &str = "test_connection";

/// Query parameter carrying the probe start timestamp (ns)
pub const PING_START_PARAM: &str = "ping_start";

/// Query parameter asking the remote side to notify on probe
pub const NOTIFY_PARAM: &str = "notify";
