//! Shorthands for creating and returning [`crate::error::VaultError`]s.

/// Creates a [`crate::error::VaultError`] from a kind, a static description and optionally
/// a dynamic detail and a source error.
#[macro_export]
macro_rules! vault_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::VaultError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        $crate::error::VaultError::from(($kind, $desc)).with_source($source)
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::VaultError::from(($kind, $desc, $detail.to_string()))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        $crate::error::VaultError::from(($kind, $desc, $detail.to_string())).with_source($source)
    };
}

/// Returns early with a [`crate::error::VaultError`], accepting the same arguments as
/// [`vault_error!`].
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return ::core::result::Result::Err($crate::vault_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::vault_error!($kind, $desc, source: $source))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return ::core::result::Result::Err($crate::vault_error!($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::vault_error!(
            $kind,
            $desc,
            $detail,
            source: $source
        ))
    };
}
