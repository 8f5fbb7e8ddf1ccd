use std::path::Path;
use std::sync::Arc;

use chrono::Duration;
use reviso_auth::{AuthPhase, StaticCredentials, UserProfile, session_ttl};
use reviso_client::{
    KeyValueStorage, RouteTable, Router, SessionContext, SessionStore, SqliteStorage,
};
use reviso_core::ManualClock;

const START: i64 = 1_720_000_000_000;

/// One "process": durable storage opened at `path` plus a context and router.
struct Client {
    session: SessionContext,
    router: Router,
}

impl Client {
    fn boot(path: &Path, clock: &ManualClock, route: &str) -> Self {
        let storage = SqliteStorage::open(path).expect("failed to open storage");
        let store = SessionStore::new(Arc::new(storage), "reviso");
        let mut session = SessionContext::new(
            store,
            Arc::new(clock.clone()),
            Arc::new(StaticCredentials::default()),
        );
        let mut router = Router::attach(&mut session, route, RouteTable::default());

        session.load();
        router.sync(&mut session);

        Self { session, router }
    }
}

fn profile() -> UserProfile {
    UserProfile::new("Asha Rai", "Pulchowk Campus", "Engineering", "3").unwrap()
}

#[test]
fn signed_out_visitor_is_sent_to_login() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_millis(START);

    let mut client = Client::boot(&dir.path().join("session.db"), &clock, "/dashboard/chat");

    assert_eq!(client.session.phase(), AuthPhase::Unauthenticated);
    assert_eq!(client.router.current_route(), "/login");
}

#[test]
fn full_onboarding_flow_survives_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let clock = ManualClock::at_millis(START);

    {
        let mut client = Client::boot(&db, &clock, "/login");
        assert!(!client.session.login("student", "wrong"));
        assert_eq!(client.router.sync(&mut client.session), "/login");

        assert!(client.session.login("student", "password123"));
        assert_eq!(client.router.sync(&mut client.session), "/form");
    }

    // Restart without a profile: still gated on onboarding.
    {
        let mut client = Client::boot(&db, &clock, "/dashboard/quiz");
        assert_eq!(client.session.phase(), AuthPhase::AuthenticatedNoProfile);
        assert_eq!(client.router.current_route(), "/form");

        client.session.save_profile(profile()).unwrap();
        assert_eq!(client.router.sync(&mut client.session), "/dashboard/chat");
    }

    // Restart with a profile: the dashboard is open, login and form are not.
    {
        let mut client = Client::boot(&db, &clock, "/login");
        assert!(client.session.has_completed_onboarding());
        assert_eq!(client.session.user_profile(), Some(&profile()));
        assert_eq!(client.router.current_route(), "/dashboard/chat");
        assert_eq!(client.router.navigate(&mut client.session, "/form"), "/dashboard/chat");
        assert_eq!(
            client.router.navigate(&mut client.session, "/dashboard/analytics"),
            "/dashboard/analytics"
        );
    }
}

#[test]
fn expired_session_is_cleared_on_next_start() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let clock = ManualClock::at_millis(START);

    {
        let mut client = Client::boot(&db, &clock, "/login");
        assert!(client.session.login("student", "password123"));
        client.session.save_profile(profile()).unwrap();
    }

    clock.advance(session_ttl() - Duration::milliseconds(1));
    {
        let mut client = Client::boot(&db, &clock, "/dashboard/chat");
        assert!(client.session.is_authenticated());
    }

    clock.advance(Duration::milliseconds(1));
    let mut client = Client::boot(&db, &clock, "/dashboard/chat");
    assert!(!client.session.is_authenticated());
    assert!(!client.session.has_completed_onboarding());
    assert_eq!(client.router.current_route(), "/login");
    drop(client);

    let storage = SqliteStorage::open(&db).unwrap();
    for key in ["reviso.session.user", "reviso.session.expiry", "reviso.session.profile"] {
        assert_eq!(storage.get(key).unwrap(), None, "{key} should be gone");
    }
}

#[test]
fn session_expires_while_the_client_is_running() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_millis(START);

    let mut client = Client::boot(&dir.path().join("session.db"), &clock, "/login");
    assert!(client.session.login("student", "password123"));
    client.session.save_profile(profile()).unwrap();
    assert_eq!(client.router.sync(&mut client.session), "/dashboard/chat");

    clock.advance(session_ttl() + Duration::days(1));

    assert_eq!(
        client.router.navigate(&mut client.session, "/dashboard/history"),
        "/login"
    );
    assert!(!client.session.is_authenticated());
    assert!(!client.session.has_completed_onboarding());
}

#[test]
fn logout_returns_to_landing_and_forgets_profile() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let clock = ManualClock::at_millis(START);

    let mut client = Client::boot(&db, &clock, "/login");
    client.session.login("student", "password123");
    client.session.save_profile(profile()).unwrap();
    client.router.sync(&mut client.session);
    assert_eq!(client.router.current_route(), "/dashboard/chat");

    client.session.logout();
    assert_eq!(client.router.sync(&mut client.session), "/");
    drop(client);

    let mut client = Client::boot(&db, &clock, "/");
    assert_eq!(client.session.phase(), AuthPhase::Unauthenticated);

    // The profile went with the session, so onboarding starts over.
    assert!(client.session.login("student", "password123"));
    assert_eq!(client.session.phase(), AuthPhase::AuthenticatedNoProfile);
    assert_eq!(client.router.sync(&mut client.session), "/form");
}

#[test]
fn corrupted_store_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("session.db");
    let clock = ManualClock::at_millis(START);

    {
        let storage = SqliteStorage::open(&db).unwrap();
        storage
            .set_all(&[
                ("reviso.session.user", "not json"),
                ("reviso.session.expiry", "9999999999999"),
            ])
            .unwrap();
    }

    let mut client = Client::boot(&db, &clock, "/dashboard/documents");
    assert_eq!(client.session.phase(), AuthPhase::Unauthenticated);
    assert_eq!(client.router.current_route(), "/login");
}
