//! Route classification and access decisions.
//!
//! Pure functions of (path, session); the axum layer in `middleware`
//! turns a `GateDecision` into a response. Prefix checks use
//! `starts_with`, so unknown sub-paths inherit the stricter class.

use http::StatusCode;

use super::CurrentUser;

/// Access class of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// `/api/auth*`: session endpoints themselves.
    ProviderInternal,
    /// `/api/seed*` while seeding is enabled.
    Seed,
    /// `/api/admin*` (and `/api/seed*` when seeding is disabled).
    AdminApi,
    /// Any other `/api/` path.
    Api,
    /// `/login` and `/signup`.
    PublicOnly,
    /// `/admin*` pages.
    Admin,
    /// `/dashboard*`, `/profile*`, `/settings*`.
    Protected,
    Public,
}

const PROTECTED_PREFIXES: [&str; 3] = ["/dashboard", "/profile", "/settings"];
const PUBLIC_ONLY_PATHS: [&str; 2] = ["/login", "/signup"];

/// Classify a request path.
pub fn classify(path: &str, allow_seed: bool) -> RouteClass {
    if path.starts_with("/api/") {
        if path.starts_with("/api/auth") {
            RouteClass::ProviderInternal
        } else if path.starts_with("/api/seed") {
            if allow_seed {
                RouteClass::Seed
            } else {
                RouteClass::AdminApi
            }
        } else if path.starts_with("/api/admin") {
            RouteClass::AdminApi
        } else {
            RouteClass::Api
        }
    } else if PUBLIC_ONLY_PATHS.contains(&path) {
        RouteClass::PublicOnly
    } else if path.starts_with("/admin") {
        RouteClass::Admin
    } else if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteClass::Protected
    } else {
        RouteClass::Public
    }
}

/// What to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Send the browser to this location.
    Redirect(String),
    /// JSON error with this status and message.
    Reject { status: StatusCode, message: &'static str },
}

/// Message for API requests without a session.
pub const AUTH_REQUIRED: &str = "Authentication required";
/// Message for admin API requests from non-admins.
pub const ADMIN_REQUIRED: &str = "Admin access required";

/// `/login?redirectTo=<path>`.
pub fn login_redirect(path: &str) -> String {
    let query = serde_urlencoded::to_string([("redirectTo", path)]).unwrap_or_default();
    format!("/login?{}", query)
}

/// Decide access for `class` given the request's user.
pub fn decide(class: RouteClass, user: Option<&CurrentUser>, path: &str) -> GateDecision {
    match (class, user) {
        (RouteClass::ProviderInternal | RouteClass::Seed | RouteClass::Public, _) => {
            GateDecision::Allow
        }
        (RouteClass::AdminApi | RouteClass::Api, None) => GateDecision::Reject {
            status: StatusCode::UNAUTHORIZED,
            message: AUTH_REQUIRED,
        },
        (RouteClass::AdminApi, Some(u)) if !u.is_admin() => GateDecision::Reject {
            status: StatusCode::FORBIDDEN,
            message: ADMIN_REQUIRED,
        },
        (RouteClass::AdminApi | RouteClass::Api, Some(_)) => GateDecision::Allow,
        (RouteClass::PublicOnly, Some(_)) => GateDecision::Redirect("/dashboard".to_string()),
        (RouteClass::PublicOnly, None) => GateDecision::Allow,
        (RouteClass::Admin | RouteClass::Protected, None) => {
            GateDecision::Redirect(login_redirect(path))
        }
        (RouteClass::Admin, Some(u)) if !u.is_admin() => {
            GateDecision::Redirect("/dashboard".to_string())
        }
        (RouteClass::Admin | RouteClass::Protected, Some(_)) => GateDecision::Allow,
    }
}

/// Keep post-login redirects on this site: only absolute paths, never
/// protocol-relative URLs. Browsers read `/\host` as `//host`, so a
/// backslash in second position is refused too, as is any control
/// character.
pub fn safe_redirect_target(target: Option<&str>) -> String {
    match target {
        Some(t) if is_local_path(t) => t.to_string(),
        _ => "/dashboard".to_string(),
    }
}

fn is_local_path(target: &str) -> bool {
    let mut chars = target.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/' | '\\'))
        && !target.chars().any(char::is_control)
}
