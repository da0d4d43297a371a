use plume_client::SessionStatus;
use plume_client::session::{LOGIN_PATH, login_redirect};

pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Compose,
    Posts,
    Post(String),
    Accounts,
    NotFound(String),
}

impl Route {
    /// Resolve a path (query string ignored).
    pub fn parse(path: &str) -> Route {
        let path = path.split('?').next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] | ["dashboard"] => Route::Dashboard,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["posts"] => Route::Posts,
            ["posts", "new"] | ["compose"] => Route::Compose,
            ["posts", id] => Route::Post(id.to_string()),
            ["accounts"] => Route::Accounts,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => LOGIN_PATH.into(),
            Route::Register => "/register".into(),
            Route::Dashboard => DASHBOARD_PATH.into(),
            Route::Compose => "/posts/new".into(),
            Route::Posts => "/posts".into(),
            Route::Post(id) => format!("/posts/{}", id),
            Route::Accounts => "/accounts".into(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Login and registration pages.
    pub fn is_auth_page(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    pub fn is_protected(&self) -> bool {
        !self.is_auth_page() && !matches!(self, Route::NotFound(_))
    }
}

/// What a page mount should do given the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session restore still running: show a spinner, nothing else.
    Loading,
    /// Navigate away without rendering.
    Redirect(String),
    Render,
}

pub fn guard(route: &Route, status: SessionStatus) -> GuardOutcome {
    match status {
        SessionStatus::Restoring => GuardOutcome::Loading,
        SessionStatus::Anonymous if route.is_protected() => GuardOutcome::Redirect(login_redirect(&route.path())),
        SessionStatus::Authenticated if route.is_auth_page() => GuardOutcome::Redirect(DASHBOARD_PATH.into()),
        _ => GuardOutcome::Render,
    }
}

/// Where to go after logging in from `login_url`: the `redirect` parameter if
/// it names a local page, the dashboard otherwise.
pub fn post_login_target(login_url: &str) -> String {
    let target = login_url
        .split_once('?')
        .and_then(|(_, query)| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(k, _)| k == "redirect")
                .map(|(_, v)| v.into_owned())
        })
        .filter(|t| t.starts_with('/') && !t.starts_with("//"));

    match target {
        Some(t) if !Route::parse(&t).is_auth_page() => t,
        _ => DASHBOARD_PATH.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paths() {
        assert_eq!(Route::parse("/"), Route::Dashboard);
        assert_eq!(Route::parse("/posts/new"), Route::Compose);
        assert_eq!(Route::parse("/posts/p-1?tab=stats"), Route::Post("p-1".into()));
        assert_eq!(Route::parse("/login?redirect=%2Fposts"), Route::Login);
        assert_eq!(Route::parse("/nope/nope"), Route::NotFound("/nope/nope".into()));
    }

    #[test]
    fn pending_restore_renders_nothing_protected() {
        for route in [Route::Dashboard, Route::Compose, Route::Login] {
            assert_eq!(guard(&route, SessionStatus::Restoring), GuardOutcome::Loading);
        }
    }

    #[test]
    fn anonymous_users_go_to_login_with_return_path() {
        assert_eq!(
            guard(&Route::Compose, SessionStatus::Anonymous),
            GuardOutcome::Redirect("/login?redirect=%2Fposts%2Fnew".into())
        );
        assert_eq!(guard(&Route::Login, SessionStatus::Anonymous), GuardOutcome::Render);
        assert_eq!(
            guard(&Route::NotFound("/x".into()), SessionStatus::Anonymous),
            GuardOutcome::Render
        );
    }

    #[test]
    fn authenticated_users_skip_auth_pages() {
        assert_eq!(
            guard(&Route::Register, SessionStatus::Authenticated),
            GuardOutcome::Redirect(DASHBOARD_PATH.into())
        );
        assert_eq!(guard(&Route::Accounts, SessionStatus::Authenticated), GuardOutcome::Render);
    }

    #[test]
    fn post_login_target_is_local_only() {
        assert_eq!(post_login_target("/login?redirect=%2Fposts%2Fnew"), "/posts/new");
        assert_eq!(post_login_target("/login"), DASHBOARD_PATH);
        assert_eq!(post_login_target("/login?redirect=https%3A%2F%2Fevil.test"), DASHBOARD_PATH);
        assert_eq!(post_login_target("/login?redirect=%2F%2Fevil.test"), DASHBOARD_PATH);
        assert_eq!(post_login_target("/login?redirect=%2Flogin"), DASHBOARD_PATH);
    }
}
