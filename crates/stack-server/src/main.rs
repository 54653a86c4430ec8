use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use stack_api::{AppState, AppStateInner};
use stack_auth::{RecaptchaVerifier, SendGridMailer, VerificationService};
use stack_client::replies::ReplyRules;
use stack_client::transport::{Latency, MockTransport};
use stack_store::{MemoryStore, Repository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stack=debug,stack_api=debug,stack_client=debug,stack_store=debug,stack_auth=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("STACK_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let host = std::env::var("STACK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("STACK_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let latency = Latency::from_env()?;

    // Seeded workspace
    let store: Arc<dyn Repository> = Arc::new(MemoryStore::seeded());
    let replies = ReplyRules::demo(store.as_ref());
    let transport = MockTransport::new(store, latency, replies);

    let mailer = SendGridMailer::from_env();
    if !mailer.is_configured() {
        warn!("SENDGRID_API_KEY not set; sign-in codes will be returned in responses");
    }

    let state: AppState = Arc::new(AppStateInner {
        transport,
        auth: VerificationService::new(mailer, jwt_secret),
        recaptcha: RecaptchaVerifier::from_env(),
    });

    let app = stack_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Stack server listening on {} ({:?})", addr, latency);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
