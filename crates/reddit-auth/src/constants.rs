//! Reddit OAuth endpoints and protocol constants

/// Token endpoint for every grant (code exchange, refresh, app-only)
pub const TOKEN_ENDPOINT: &str = "https://www.reddit.com/api/v1/access_token";

/// Authorization endpoint for the interactive consent page
pub const AUTHORIZE_ENDPOINT: &str = "https://www.reddit.com/api/v1/authorize";

/// Compact (mobile) variant of the consent page
pub const AUTHORIZE_COMPACT_ENDPOINT: &str = "https://www.reddit.com/api/v1/authorize.compact";

/// Base URL for authenticated resource calls
pub const API_ENDPOINT: &str = "https://oauth.reddit.com";

/// Grant type used for app-only tokens when the client has no secret
pub const INSTALLED_CLIENT_GRANT: &str = "https://oauth.reddit.com/grants/installed_client";

/// Device id sent with the installed-client grant.
///
/// Reddit accepts this literal to mean "do not track this device", so we never
/// send a per-install identifier.
pub const DEVICE_ID: &str = "DO_NOT_TRACK_THIS_DEVICE";

/// Value Reddit puts in `refresh_token` when the grant cannot be refreshed
pub const NO_REFRESH_TOKEN_SENTINEL: &str = "NO_TEXT";

/// `error` value for an expired or already used authorization code
pub const INVALID_GRANT: &str = "invalid_grant";
