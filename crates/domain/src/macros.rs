//! Macro for implementing wire-string conversions for enums
//!
//! Several protocol values (media kinds, message types) are closed sets of
//! lowercase strings on the wire. This macro provides the conversions from
//! one mapping table, with case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use wecom_domain::impl_wire_str_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Kind {
//!     Image,
//!     Voice,
//! }
//!
//! impl_wire_str_conversions!(Kind {
//!     Image => "image",
//!     Voice => "voice",
//! });
//!
//! assert_eq!(Kind::Image.to_string(), "image");
//! assert_eq!(Kind::Voice.as_str(), "voice");
//! assert_eq!("VOICE".parse::<Kind>().unwrap(), Kind::Voice);
//! ```

/// Implements `as_str`, Display and FromStr for wire-string enums
///
/// This macro generates:
/// - `as_str`: the wire string of the variant
/// - Display trait: writes `as_str`
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// Paths are fully qualified so the macro works next to a crate-local
/// `Result` alias.
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase wire
///   strings
#[macro_export]
macro_rules! impl_wire_str_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Wire string of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(::std::format!(
                        "Invalid {}: {}",
                        ::std::stringify!($enum_name),
                        s
                    )),
                }
            }
        }
    };
}
