//! Sign-In Console Entry Point
//!
//! Interactive terminal consumer of the session manager: drives the
//! four user actions (federated token, request code, verify code,
//! sign out) and renders the resulting state. Uses `anyhow` for
//! startup errors; flow-level failures come back as `auth::AuthError`
//! through the manager's error slot.

use std::env;
use std::sync::Arc;

use auth::delivery::{ConsoleOtpDelivery, EmailDeliveryConfig, HttpOtpDelivery, OtpDelivery};
use auth::provider::{NoopProviderHandle, ProviderHandle};
use auth::store::SessionStore;
use auth::{AuthConfig, AuthState, JsonFileSessionStore, SessionManager};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cli=info,auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AuthConfig::default());

    let session_dir = env::var("AUTH_SESSION_DIR").unwrap_or_else(|_| ".session".to_string());
    let store = Arc::new(JsonFileSessionStore::new(session_dir, &config.storage_key));
    tracing::info!(path = %store.path().display(), "Session slot");

    let provider = Arc::new(NoopProviderHandle);

    // Real email delivery when the provider routing ids are configured,
    // otherwise codes are printed to this terminal
    match email_config_from_env() {
        Some(email_config) => {
            tracing::info!("Verification codes will be sent by email");
            let delivery = Arc::new(HttpOtpDelivery::new(email_config));
            run(SessionManager::new(store, delivery, provider, config)).await
        }
        None => {
            tracing::info!("EMAIL_SERVICE_ID not set, codes will be printed to this terminal");
            let delivery = Arc::new(ConsoleOtpDelivery);
            run(SessionManager::new(store, delivery, provider, config)).await
        }
    }
}

/// Email routing from environment: all three ids required
fn email_config_from_env() -> Option<EmailDeliveryConfig> {
    let service_id = env::var("EMAIL_SERVICE_ID").ok()?;
    let template_id = env::var("EMAIL_TEMPLATE_ID").ok()?;
    let public_key = env::var("EMAIL_PUBLIC_KEY").ok()?;

    let mut config = EmailDeliveryConfig::new(service_id, template_id, public_key);
    if let Ok(endpoint) = env::var("EMAIL_ENDPOINT") {
        config.endpoint = endpoint;
    }
    Some(config)
}

async fn run<S, D, P>(mut manager: SessionManager<S, D, P>) -> anyhow::Result<()>
where
    S: SessionStore,
    D: OtpDelivery,
    P: ProviderHandle,
{
    manager.restore().await;
    render(&manager);

    println!(
        "commands: token <jwt> | code <email> [name] | verify <digits> | cancel | signout | status | quit"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => continue,
            "status" => {}
            "token" => {
                let _ = manager.handle_credential(rest).await;
            }
            "code" => {
                let (email, name) = rest.split_once(' ').unwrap_or((rest, "there"));
                let _ = manager.request_code(email, name.trim()).await;
            }
            "verify" => {
                let _ = manager.submit_code(rest).await;
            }
            "cancel" => manager.cancel_otp(),
            "signout" => {
                let _ = manager.sign_out().await;
            }
            "quit" | "exit" => break,
            other => {
                println!("unknown command: {other}");
                continue;
            }
        }

        render(&manager);
    }

    Ok(())
}

/// Render what a UI surface would show for the current state
fn render<S, D, P>(manager: &SessionManager<S, D, P>)
where
    S: SessionStore,
    D: OtpDelivery,
    P: ProviderHandle,
{
    if let Some(err) = manager.current_error() {
        println!("! {err}");
    }

    match manager.state() {
        AuthState::SignedIn => {
            if let Some(session) = manager.session() {
                println!("signed in as {} <{}> ({})", session.name, session.email, session.id);
            }
        }
        AuthState::AwaitingOtp => {
            if let Some(challenge) = manager.pending_challenge() {
                println!(
                    "awaiting code sent to {} (attempts: {})",
                    challenge.recipient, challenge.attempts
                );
            }
        }
        state => println!("{state}"),
    }
}
