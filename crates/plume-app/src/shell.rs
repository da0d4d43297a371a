//! Navigation chrome: header, sidebar and breadcrumbs. Presentation only.

use std::fmt::Write;

use plume_types::models::Session;

use crate::router::Route;

pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

pub const SIDEBAR: &[NavItem] = &[
    NavItem { label: "Dashboard", path: "/dashboard" },
    NavItem { label: "Compose", path: "/posts/new" },
    NavItem { label: "Posts", path: "/posts" },
    NavItem { label: "Accounts", path: "/accounts" },
];

pub fn breadcrumbs(route: &Route) -> Vec<&str> {
    match route {
        Route::Dashboard => vec!["Home"],
        Route::Compose => vec!["Home", "Posts", "New post"],
        Route::Posts => vec!["Home", "Posts"],
        Route::Post(id) => vec!["Home", "Posts", id.as_str()],
        Route::Accounts => vec!["Home", "Accounts"],
        Route::Login => vec!["Log in"],
        Route::Register => vec!["Create account"],
        Route::NotFound(_) => vec!["Not found"],
    }
}

fn sidebar_active(route: &Route, item: &NavItem) -> bool {
    match route {
        Route::Post(_) => item.path == "/posts",
        other => other.path() == item.path,
    }
}

/// Header, sidebar and breadcrumbs above a page body.
pub fn frame(session: &Session, route: &Route) -> String {
    let mut out = String::new();
    let tenant = &session.tenant;
    let plan = tenant.plan.as_deref().map(|p| format!(" ({})", p)).unwrap_or_default();

    let _ = writeln!(
        out,
        "Plume · {}{} · {} <{}>",
        tenant.name,
        plan,
        session.user.display_name(),
        session.user.email
    );
    let nav: Vec<String> = SIDEBAR
        .iter()
        .map(|item| {
            if sidebar_active(route, item) {
                format!("[{}]", item.label)
            } else {
                item.label.to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "{}", nav.join("  "));
    let _ = writeln!(out, "{}", breadcrumbs(route).join(" / "));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_types::models::{Tenant, User};

    fn session() -> Session {
        Session {
            token: "t".into(),
            user: User {
                id: "u".into(),
                email: "ada@example.com".into(),
                name: Some("Ada".into()),
                tenant_id: "t1".into(),
            },
            tenant: Tenant {
                id: "t1".into(),
                name: "Acme".into(),
                subdomain: "acme".into(),
                domain: None,
                plan: Some("pro".into()),
                is_active: true,
            },
        }
    }

    #[test]
    fn frame_marks_active_section() {
        let out = frame(&session(), &Route::Post("p-7".into()));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Plume · Acme (pro) · Ada <ada@example.com>");
        assert_eq!(lines[1], "Dashboard  Compose  [Posts]  Accounts");
        assert_eq!(lines[2], "Home / Posts / p-7");
    }
}
