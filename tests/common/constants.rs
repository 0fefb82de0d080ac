//! Shared constants for end-to-end tests

// ============================================================================
// Test Users
// ============================================================================

/// User whose profile is created by the tests themselves
pub const TEST_USER: &str = "testuser";

/// User that never gets a profile
pub const UNKNOWN_USER: &str = "ghost";

// ============================================================================
// Test Catalog Data
// ============================================================================

/// Artists of the hip-hop catalog, 20 tracks spread over all of them
pub const HIP_HOP_ARTISTS: [&str; 8] = [
    "Nas",
    "Rakim",
    "KRS-One",
    "Big Daddy Kane",
    "Slick Rick",
    "LL Cool J",
    "Run-DMC",
    "Public Enemy",
];

pub const HIP_HOP_TRACK_COUNT: usize = 20;

/// Artists of the jazz catalog
pub const JAZZ_ARTISTS: [&str; 4] = ["Miles Davis", "John Coltrane", "Bill Evans", "Chet Baker"];

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// HTTP request timeout for test client
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Engine deadline used by servers whose catalog never answers
pub const SHORT_DEADLINE_MS: u64 = 800;
