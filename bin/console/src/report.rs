//! Plain-text rendering of what the signed-in user can see.

use gatehouse_access::console::{self, Route};
use gatehouse_access::{AccessGuard, GuardDecision, Location, NavSection, SessionState};

/// One line per section and item of the visible navigation.
#[must_use]
pub fn navigation(sections: &[NavSection]) -> String {
    let lines: Vec<String> = sections
        .iter()
        .flat_map(|section| {
            std::iter::once(section.label.clone()).chain(
                section
                    .items
                    .iter()
                    .map(|item| format!("  {:<16} {}", item.label, item.path)),
            )
        })
        .collect();
    lines.join("\n")
}

/// Describes a guard decision in a few words.
#[must_use]
pub fn decision(decision: &GuardDecision) -> String {
    match decision {
        GuardDecision::Loading => "loading".to_string(),
        GuardDecision::RedirectToLogin { to, .. } => format!("redirect to {to}"),
        GuardDecision::AccessDenied { required } => format!("access denied (requires {required})"),
        GuardDecision::Allow => "allow".to_string(),
    }
}

/// One line per console route with the decision for `state`.
#[must_use]
pub fn routes(guard: &AccessGuard, state: &SessionState) -> String {
    console::routes()
        .iter()
        .map(|route| format!("{:<14} {}", route.path, route_decision(route, guard, state)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn route_decision(route: &Route, guard: &AccessGuard, state: &SessionState) -> String {
    match Location::parse(route.path) {
        Ok(location) => decision(&route.decide(guard, state, &location)),
        Err(e) => format!("invalid route: {e}"),
    }
}
