//! Display / FromStr generation for string-keyed domain enums
//!
//! Metric kinds and gateway kinds travel through config files, log fields
//! and persisted rows as lowercase strings. This macro keeps both directions
//! of that mapping in one table.
//!
//! # Example
//!
//! ```rust
//! use interconnect_domain::impl_keyword_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Tier {
//!     Primary,
//!     Secondary,
//! }
//!
//! impl_keyword_conversions!(Tier {
//!     Primary => "primary",
//!     Secondary => "secondary",
//! });
//!
//! assert_eq!(Tier::Primary.to_string(), "primary");
//! assert_eq!("SECONDARY".parse::<Tier>(), Ok(Tier::Secondary));
//! ```

/// Implements `Display` and case-insensitive `FromStr` for a fieldless enum
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
#[macro_export]
macro_rules! impl_keyword_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Lowercase string form
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
