//! Macro for implementing Display and FromStr for unit-variant domain enums
//!
//! Domain enums travel through URLs, config files and logs as plain strings.
//! This macro gives each one a single canonical spelling for `Display` and a
//! case-insensitive `FromStr`, so `"carinsurance"`, `"CARINSURANCE"` and
//! `"CarInsurance"` all parse to the same variant.
//!
//! # Example
//!
//! ```rust
//! use threadpilot_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Coverage {
//!     Basic,
//!     Full,
//! }
//!
//! impl_domain_enum_conversions!(Coverage {
//!     Basic => "Basic",
//!     Full => "Full",
//! });
//!
//! assert_eq!("full".parse::<Coverage>(), Ok(Coverage::Full));
//! assert_eq!(Coverage::Basic.to_string(), "Basic");
//! ```

/// Implements Display and FromStr traits for unit-variant enums
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Canonical string for each variant
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
