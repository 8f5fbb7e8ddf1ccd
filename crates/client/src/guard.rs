//! Navigation guard: decides where a client must be redirected given its
//! session phase and current route.

use serde::{Deserialize, Serialize};

use reviso_auth::AuthPhase;

/// The routes the guard knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    /// Public landing page (target of logout).
    pub landing: String,
    pub login: String,
    /// The one-time profile form.
    pub onboarding: String,
    pub dashboard_home: String,
    /// Roots of the signed-in area.
    pub protected_prefixes: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            landing: "/".to_string(),
            login: "/login".to_string(),
            onboarding: "/form".to_string(),
            dashboard_home: "/dashboard/chat".to_string(),
            protected_prefixes: vec!["/dashboard".to_string()],
        }
    }
}

impl RouteTable {
    /// Whether `route` lies under one of the protected roots.
    ///
    /// `/dashboard` and `/dashboard/quiz` are under `/dashboard`;
    /// `/dashboards` is not.
    pub fn is_protected(&self, route: &str) -> bool {
        let route = normalize_route(route);
        self.protected_prefixes.iter().any(|prefix| {
            let prefix = normalize_route(prefix);
            match route.strip_prefix(prefix) {
                Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix == "/",
                None => false,
            }
        })
    }

    fn is(&self, route: &str, target: &str) -> bool {
        normalize_route(route) == normalize_route(target)
    }
}

/// Strip query string, fragment and trailing slashes (`/` itself is kept).
pub fn normalize_route(route: &str) -> &str {
    let end = route.find(['?', '#']).unwrap_or(route.len());
    let path = route[..end].trim_end_matches('/');
    if path.is_empty() { "/" } else { path }
}

/// Which row of the decision table fired.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardRule {
    /// Signed out on a protected route.
    LoginRequired,
    /// Signed in without a profile, anywhere but the profile form.
    OnboardingRequired,
    /// Signed in with a profile, on the profile form.
    OnboardingComplete,
    /// Signed in with a profile, on the login page.
    AlreadySignedIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub to: String,
    pub rule: GuardRule,
}

/// Apply the decision table. First matching rule wins; `Loading` never redirects.
pub fn decide(phase: AuthPhase, route: &str, routes: &RouteTable) -> Option<Redirect> {
    let redirect = |to: &str, rule| Some(Redirect { to: to.to_string(), rule });

    match phase {
        AuthPhase::Loading => None,
        AuthPhase::Unauthenticated if routes.is_protected(route) => {
            redirect(&routes.login, GuardRule::LoginRequired)
        }
        AuthPhase::Unauthenticated => None,
        AuthPhase::AuthenticatedNoProfile if !routes.is(route, &routes.onboarding) => {
            redirect(&routes.onboarding, GuardRule::OnboardingRequired)
        }
        AuthPhase::AuthenticatedNoProfile => None,
        AuthPhase::AuthenticatedWithProfile if routes.is(route, &routes.onboarding) => {
            redirect(&routes.dashboard_home, GuardRule::OnboardingComplete)
        }
        AuthPhase::AuthenticatedWithProfile if routes.is(route, &routes.login) => {
            redirect(&routes.dashboard_home, GuardRule::AlreadySignedIn)
        }
        AuthPhase::AuthenticatedWithProfile => None,
    }
}

/// Stateful wrapper around [`decide`] that skips unchanged inputs.
///
/// Running the guard again with the same phase and route issues nothing, so
/// redundant triggers (a route change and a login landing together) cannot
/// produce duplicate redirects.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    routes: RouteTable,
    last: Option<(AuthPhase, String)>,
}

impl NavigationGuard {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes, last: None }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn evaluate(&mut self, phase: AuthPhase, route: &str) -> Option<Redirect> {
        if phase == AuthPhase::Loading {
            return None;
        }

        let input = (phase, normalize_route(route).to_string());
        if self.last.as_ref() == Some(&input) {
            return None;
        }
        self.last = Some(input);

        let decision = decide(phase, route, &self.routes);
        match &decision {
            Some(redirect) => {
                tracing::debug!(%phase, from = route, to = %redirect.to, rule = ?redirect.rule, "guard redirect");
            }
            None => tracing::debug!(%phase, route, "guard allows route"),
        }
        decision
    }
}
