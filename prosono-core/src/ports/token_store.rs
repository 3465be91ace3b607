//! Token storage port

/// Durable storage for the session token pair
///
/// A plain key/value holder with no business logic: absent values read back
/// as `None` and operations never fail from the caller's perspective (the
/// in-memory pair is authoritative for the life of the process; persistence
/// is best-effort). In a multi-process environment the store is externally
/// shared and last-writer-wins.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    fn set_access_token(&self, token: &str);

    fn set_refresh_token(&self, token: &str);

    /// Store a freshly issued pair in one write, so a new access token is
    /// never persisted alongside a stale refresh token. When `refresh` is
    /// `None` the stored refresh token is left in place (rotation is optional
    /// per refresh response).
    fn set_token_pair(&self, access: &str, refresh: Option<&str>);

    /// Remove both tokens
    fn clear(&self);

    fn has_access_token(&self) -> bool {
        self.access_token().is_some()
    }
}
