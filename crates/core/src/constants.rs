//! Constants used throughout the matcher core crate.
//!
//! Section headers, default settings and environment variable names live here so the
//! binaries and the library agree on them.

/// Phrase (lower case) that opens the inclusion section of an eligibility statement.
pub const INCLUSION_HEADER: &str = "inclusion criteria";

/// Phrase (lower case) that opens the exclusion section of an eligibility statement.
pub const EXCLUSION_HEADER: &str = "exclusion criteria";

/// Default bind address for the REST API.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Environment variable holding the default eligibility threshold.
pub const THRESHOLD_ENV: &str = "CTM_DEFAULT_THRESHOLD";

/// Environment variable holding the path of a trial definition YAML file.
pub const TRIAL_FILE_ENV: &str = "CTM_TRIAL_FILE";

/// Environment variable holding the REST API bind address.
pub const REST_ADDR_ENV: &str = "CTM_REST_ADDR";
