use std::sync::Arc;

use axum::extract::FromRef;
use metrics_exporter_prometheus::PrometheusHandle;

mod config;
mod models;
mod repos;
mod routes;
mod schema;
mod services;

#[cfg(test)]
mod test_support;

use bullion_shared::clients::db::create_pool;
use bullion_shared::token::TokenService;

use config::{AppConfig, CredentialScheme, StoreKind};
use repos::Repositories;
use services::{
    ApprovalService, Argon2CredentialVerifier, CredentialVerifier, GeneralUserService,
    PlainCredentialVerifier, RandomProfileSynthesizer,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repos: Repositories,
    pub tokens: Arc<TokenService>,
    pub approvals: Arc<ApprovalService>,
    pub general_users: Arc<GeneralUserService>,
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    pub fn new(config: AppConfig, repos: Repositories, metrics_handle: PrometheusHandle) -> Self {
        let tokens = Arc::new(TokenService::new(config.jwt_secret.as_bytes(), config.jwt_issuer.clone()));
        let approvals = Arc::new(ApprovalService::new(
            repos.general_user_reqs.clone(),
            tokens.clone(),
            config.jwt_access_ttl,
            config.jwt_refresh_ttl,
        ));
        let credentials: Arc<dyn CredentialVerifier> = match config.credential_scheme {
            CredentialScheme::Plain => Arc::new(PlainCredentialVerifier),
            CredentialScheme::Argon2 => Arc::new(Argon2CredentialVerifier),
        };
        let general_users = Arc::new(GeneralUserService::new(
            repos.general_users.clone(),
            repos.bullion_site_infos.clone(),
            approvals.clone(),
            tokens.clone(),
            credentials,
            Arc::new(RandomProfileSynthesizer),
        ));

        Self {
            config: Arc::new(config),
            repos,
            tokens,
            approvals,
            general_users,
            metrics_handle,
        }
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bullion_shared::middleware::init_tracing("bullion-auth");

    let config = AppConfig::load()?;
    let port = config.port;
    let metrics_handle = bullion_shared::middleware::init_metrics()?;

    let repos = match config.store {
        StoreKind::Postgres => Repositories::postgres(create_pool(&config.database_url)?),
        StoreKind::Memory => {
            tracing::warn!("using in-memory store, data is lost on restart");
            Repositories::in_memory()
        }
    };

    let state = AppState::new(config, repos, metrics_handle);
    let app = routes::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "bullion-auth starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
