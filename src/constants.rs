/// Source identifier constants to ensure consistency across the codebase.
/// Registry configuration keys are canonicalized to these uppercase tokens.

pub const ANR_SOURCE: &str = "ANR";
pub const CORDIS_SOURCE: &str = "CORDIS";

pub const SERVICE_NAME: &str = "fundlink";

// Configuration defaults, used when a [[sources]] entry omits the field
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_MAX_PAGES: u32 = 5;
pub const DEFAULT_PAGE_SIZE: u32 = 50;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_DEADLINE_SECONDS: u64 = 30;
