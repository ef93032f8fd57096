pub mod device;
pub mod models;

/// Header carrying the shared secret, both towards the device and on the
/// controlled gateway routes.
pub const AUTH_HEADER: &str = "X-Auth-Token";
