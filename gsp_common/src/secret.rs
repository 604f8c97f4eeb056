//! Redacting wrapper for credentials.
use std::{
    fmt,
    fmt::{Debug, Display},
};

/// A value that must never leak into logs, such as a gateway API key or a customer password.
///
/// Both formatting impls print `****`; reading the inner value takes an explicit
/// [`Secret::reveal`] call, which keeps accidental `{:?}` dumps of config and request structs
/// harmless.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Hands back the wrapped value. Call sites of this method are the audit surface for where
    /// the secret actually travels.
    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T: Clone + Default> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[cfg(test)]
mod test {
    use super::Secret;

    #[test]
    fn secrets_never_format() {
        let key: Secret<String> = "sk-live-123".to_string().into();
        assert_eq!(format!("{key}"), "****");
        assert_eq!(format!("{key:?}"), "****");
        assert_eq!(key.reveal(), "sk-live-123");
    }
}
