//! Route table and navigation tree of the visitor-management console.

use crate::guard::{AccessGuard, GuardDecision, Location};
use crate::nav::{NavItem, NavSection};
use crate::role::{Role, RoleRequirement};
use crate::state::SessionState;

/// Who may open a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Rendered without a session (the login page).
    Public,
    /// Guarded by the access guard with the given requirement.
    Protected(RoleRequirement),
}

/// A console screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub title: &'static str,
    pub access: RouteAccess,
}

impl Route {
    fn public(path: &'static str, title: &'static str) -> Self {
        Self {
            path,
            title,
            access: RouteAccess::Public,
        }
    }

    fn protected(
        path: &'static str,
        title: &'static str,
        requirement: impl Into<RoleRequirement>,
    ) -> Self {
        Self {
            path,
            title,
            access: RouteAccess::Protected(requirement.into()),
        }
    }

    /// Decides what this route renders for `state`.
    ///
    /// Public routes always render.
    #[must_use]
    pub fn decide(
        &self,
        guard: &AccessGuard,
        state: &SessionState,
        requested: &Location,
    ) -> GuardDecision {
        match &self.access {
            RouteAccess::Public => GuardDecision::Allow,
            RouteAccess::Protected(requirement) => guard.decide(state, requirement, requested),
        }
    }
}

fn super_admin() -> RoleRequirement {
    RoleRequirement::from(Role::SUPER_ADMIN)
}

fn admins() -> RoleRequirement {
    RoleRequirement::from([Role::ADMIN, Role::SUPER_ADMIN])
}

fn front_desk() -> RoleRequirement {
    RoleRequirement::from([Role::ADMIN, Role::SUPER_ADMIN, Role::RECEPTION])
}

/// Every console screen with its access rule.
#[must_use]
pub fn routes() -> Vec<Route> {
    vec![
        Route::public("/login", "Sign in"),
        Route::protected("/dashboard", "Dashboard", RoleRequirement::any()),
        Route::protected("/profile", "My profile", RoleRequirement::any()),
        Route::protected("/companies", "Companies", super_admin()),
        Route::protected("/plants", "Plants", admins()),
        Route::protected("/departments", "Departments", admins()),
        Route::protected("/areas", "Areas", admins()),
        Route::protected("/countries", "Countries", super_admin()),
        Route::protected("/states", "States", super_admin()),
        Route::protected("/cities", "Cities", super_admin()),
        Route::protected("/users", "Users", admins()),
        Route::protected("/visitors", "Visitors", front_desk()),
        Route::protected("/appointments", "Appointments", front_desk()),
    ]
}

/// Finds the route serving `location`, ignoring its query string.
#[must_use]
pub fn route_for(location: &Location) -> Option<Route> {
    routes()
        .into_iter()
        .find(|route| route.path == location.path())
}

/// The console's sidebar navigation.
#[must_use]
pub fn navigation() -> Vec<NavSection> {
    vec![
        NavSection::new("Dashboard", RoleRequirement::any()).item(NavItem::new(
            "Dashboard",
            "/dashboard",
            RoleRequirement::any(),
        )),
        NavSection::new("Organization", admins())
            .item(NavItem::new("Companies", "/companies", super_admin()))
            .item(NavItem::new("Plants", "/plants", admins()))
            .item(NavItem::new("Departments", "/departments", admins()))
            .item(NavItem::new("Areas", "/areas", admins())),
        NavSection::new("Locations", super_admin())
            .item(NavItem::new("Countries", "/countries", super_admin()))
            .item(NavItem::new("States", "/states", super_admin()))
            .item(NavItem::new("Cities", "/cities", super_admin())),
        NavSection::new("Administration", admins())
            .item(NavItem::new("Users", "/users", admins())),
        NavSection::new("Visitor desk", front_desk())
            .item(NavItem::new("Visitors", "/visitors", front_desk()))
            .item(NavItem::new("Appointments", "/appointments", front_desk())),
    ]
}
