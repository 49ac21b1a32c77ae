//! Secret redaction for wallet keys and other sensitive values.
//!
//! [`Redacted`] never prints or serializes its contents; `Debug`, `Display`
//! and `Serialize` all emit `"<redacted>"`. Code that needs the secret calls
//! [`Redacted::expose`] at the point of use.

use std::fmt::{self, Debug, Display};

/// Wrapper that hides its inner value from logs and structured output.
///
/// ```ignore
/// use ntt_bridge_rs::redact::Redacted;
///
/// let key = Redacted("0xac09...".to_string());
/// tracing::info!(key = %key, "Loaded wallet key");
/// // Logs: key = <redacted>
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Redacted<T>(pub T);

impl<T> Redacted<T> {
    /// Borrow the secret
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> serde::Serialize for Redacted<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        "<redacted>".serialize(serializer)
    }
}
