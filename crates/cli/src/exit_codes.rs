//! CLI Exit Code Registry
//!
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | Unmatched income or employment found (`--strict` only)   |
//! | 2    | Usage error or invalid config                            |
//! | 3    | Source files could not be read or parsed                 |
//! | 4    | Reconciliation failed (upstream error)                   |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Unmatched entries found. Like `diff(1)`, exit 1 means "not clean".
pub const EXIT_UNMATCHED: u8 = 1;

/// Usage error - bad arguments or a config that fails validation.
pub const EXIT_INVALID_CONFIG: u8 = 2;

/// A source file is missing or malformed.
pub const EXIT_SOURCE_LOAD: u8 = 3;

/// `reconcile` returned an error.
pub const EXIT_RECONCILE_FAILED: u8 = 4;
