//! Router shell: keeps the current route in step with session state.
//!
//! Before the guard runs, the router asks the session context to re-evaluate
//! the store, then applies the session events that produced. A redirect is
//! itself a navigation, so the guard runs again on the new route until it has
//! nothing to say.

use reviso_auth::AuthPhase;
use reviso_events::Subscription;

use crate::context::{SessionContext, SessionEvent, SessionEventKind};
use crate::guard::{NavigationGuard, RouteTable, normalize_route};

/// Upper bound on consecutive guard redirects for a single change.
pub const MAX_REDIRECT_HOPS: usize = 4;

#[derive(Debug)]
pub struct Router {
    guard: NavigationGuard,
    events: Subscription<SessionEvent>,
    phase: AuthPhase,
    current: String,
    history: Vec<String>,
}

impl Router {
    /// A router starting at `initial_route` that has not yet seen a session
    /// phase. It stays put until the `Loaded` event arrives.
    pub fn new(
        initial_route: &str,
        routes: RouteTable,
        events: Subscription<SessionEvent>,
    ) -> Self {
        let current = normalize_route(initial_route).to_string();
        Self {
            guard: NavigationGuard::new(routes),
            events,
            phase: AuthPhase::Loading,
            history: vec![current.clone()],
            current,
        }
    }

    /// Subscribe to `session` and start from its current phase.
    pub fn attach(session: &mut SessionContext, initial_route: &str, routes: RouteTable) -> Self {
        let mut router = Self::new(initial_route, routes, session.subscribe());
        router.phase = session.phase();
        router.settle();
        router
    }

    pub fn current_route(&self) -> &str {
        &self.current
    }

    /// The phase the last guard decision was made for.
    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    /// Every route visited, oldest first, including redirects.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn routes(&self) -> &RouteTable {
        self.guard.routes()
    }

    /// User-initiated navigation.
    pub fn navigate(&mut self, session: &mut SessionContext, route: &str) -> &str {
        self.push(route);
        self.sync(session)
    }

    /// Re-evaluate the session, apply the resulting events, then let the
    /// guard settle the route.
    pub fn sync(&mut self, session: &mut SessionContext) -> &str {
        session.refresh();
        self.apply_events();
        self.settle();
        &self.current
    }

    fn apply_events(&mut self) {
        for event in self.events.drain() {
            tracing::debug!(kind = ?event.kind, phase = %event.phase, "router observed session event");
            self.phase = event.phase;

            if event.kind == SessionEventKind::LoggedOut {
                let landing = self.guard.routes().landing.clone();
                self.push(&landing);
            }
        }
    }

    fn push(&mut self, route: &str) {
        let route = normalize_route(route).to_string();
        self.history.push(route.clone());
        self.current = route;
    }

    fn settle(&mut self) {
        for _ in 0..MAX_REDIRECT_HOPS {
            let Some(redirect) = self.guard.evaluate(self.phase, &self.current) else {
                return;
            };
            if normalize_route(&redirect.to) == self.current {
                return;
            }
            self.push(&redirect.to);
        }

        tracing::warn!(
            route = %self.current,
            phase = %self.phase,
            hops = MAX_REDIRECT_HOPS,
            "redirect limit reached"
        );
    }
}
