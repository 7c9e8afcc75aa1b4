// -
// HTTP surface

/// Header carrying the debug session id on trace uploads
pub(crate) const DEBUG_SESSION_HEADER: &str = "x-debug-session-id";

/// Cache validator header listing the signal ids a client already holds
pub(crate) const IF_NONE_MATCH_HEADER: &str = "if-none-match";

/// Blob creation API path, appended to the configured blob server base URL
pub(crate) const BLOB_STORE_URI: &str = "/blobs";

/// Separator between the components of a debug session id
pub(crate) const SESSION_ID_SEPARATOR: &str = "__";
pub(crate) const SESSION_ID_COMPONENTS: usize = 5;

/// Largest accepted `long_poll.max_block_secs`
pub(crate) const MAX_BLOCK_SECS_LIMIT: u64 = 24 * 60 * 60;

/// Deadline used when `now + block` overflows the clock, roughly 30 years
pub(crate) const FAR_FUTURE_SECS: u64 = 86_400 * 365 * 30;

/// Redirects followed on blob creation before giving up
pub(crate) const MAX_BLOB_REDIRECTS: usize = 10;

// -
// Sled

/// Sled cache per opened snapshot version
pub(crate) const SIGNAL_DB_CACHE_CAPACITY: u64 = 10 * 1024 * 1024; //10MB
