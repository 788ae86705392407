//! Macro for implementing Display and FromStr for string-backed enums
//!
//! Severities, conflict fields, mirror modes and strategy names all travel as
//! lowercase strings (database columns, alert bodies, host payloads). This
//! macro keeps their conversions in one place.
//!
//! # Example
//!
//! ```rust
//! use clinisync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum SyncState {
//!     Linked,
//!     Detached,
//! }
//!
//! impl_domain_status_conversions!(SyncState {
//!     Linked => "linked",
//!     Detached => "detached",
//! });
//!
//! assert_eq!(SyncState::Linked.to_string(), "linked");
//! assert_eq!("DETACHED".parse::<SyncState>(), Ok(SyncState::Detached));
//! ```

/// Implements Display and FromStr traits for string-backed enums
///
/// - Display writes the canonical lowercase string
/// - FromStr parses case-insensitively and names the enum in its error
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
