//! `reviso-session` — drive the session state machine from the command line.
//!
//! State lives in the SQLite store, so a login in one invocation is still
//! there in the next one (until it expires).

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use reviso_auth::UserProfile;
use reviso_client::{ClientConfig, Router, SessionContext, SessionStore, SqliteStorage};

#[derive(Debug, Parser)]
#[command(name = "reviso-session", version, about = "Inspect and drive the Reviso session")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the session phase and where the given route resolves to.
    Status {
        #[arg(long, default_value = "/")]
        route: String,
    },
    /// Sign in with a username and password.
    Login { username: String, password: String },
    /// End the session.
    Logout,
    /// Complete onboarding.
    Profile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        institution: String,
        #[arg(long)]
        program: String,
        #[arg(long)]
        term: String,
    },
    /// Navigate to a route and print where the guard sends you.
    Visit { route: String },
}

fn main() -> anyhow::Result<ExitCode> {
    reviso_observability::init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    let path = config
        .database_path()
        .context("failed to resolve session database path")?;
    let storage = SqliteStorage::open(&path)
        .with_context(|| format!("failed to open session storage at {:?}", path))?;
    let store = SessionStore::new(Arc::new(storage), &config.namespace);
    let mut session = SessionContext::with_defaults(store);

    let start = match &cli.command {
        Command::Status { route } => route.clone(),
        Command::Login { .. } => config.routes.login.clone(),
        Command::Profile { .. } => config.routes.onboarding.clone(),
        Command::Logout | Command::Visit { .. } => config.routes.landing.clone(),
    };
    let mut router = Router::attach(&mut session, &start, config.routes.clone());

    session.load();
    router.sync(&mut session);

    match cli.command {
        Command::Status { .. } => {}
        Command::Login { username, password } => {
            if !session.login(&username, &password) {
                eprintln!("Invalid credentials. Try again");
                return Ok(ExitCode::FAILURE);
            }
            router.sync(&mut session);
        }
        Command::Logout => {
            session.logout();
            router.sync(&mut session);
        }
        Command::Profile {
            name,
            institution,
            program,
            term,
        } => {
            let profile = match UserProfile::new(name, institution, program, term) {
                Ok(profile) => profile,
                Err(err) => {
                    eprintln!("Please fill in all fields ({err})");
                    return Ok(ExitCode::FAILURE);
                }
            };
            session
                .save_profile(profile)
                .context("failed to save profile")?;
            router.sync(&mut session);
        }
        Command::Visit { route } => {
            router.navigate(&mut session, &route);
        }
    }

    print_status(&mut session, &router);
    Ok(ExitCode::SUCCESS)
}

fn print_status(session: &mut SessionContext, router: &Router) {
    println!("phase: {}", session.phase());
    if let Some(user) = session.user() {
        println!("user:  {}", user.username);
    }
    if let Some(profile) = session.user_profile() {
        println!(
            "profile: {} / {} / {} / term {}",
            profile.name, profile.institution, profile.program, profile.term
        );
    }
    println!("route: {}", router.current_route());
}
