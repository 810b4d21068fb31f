// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{LoyaltyStore, MemoryStore, PgStore},
    services::{
        auth::AuthService,
        balance_service::BalanceService,
        customer_service::CustomerService,
        ledger_service::LedgerService,
        notification::{LogNotifier, Notifier, SmtpConfig, SmtpNotifier},
        restaurant_service::RestaurantService,
        reward_service::RewardService,
    },
};

/// Configuração carregada do ambiente (.env)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Sem DATABASE_URL a aplicação sobe com o store em memória
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    /// Limite de tempo para uma unidade transacional completa
    pub tx_timeout: Duration,
    pub smtp: Option<SmtpConfig>,
    pub cors_allow_origins: Option<String>,
}

impl AppConfig {
    /// Configuração mínima, usada por testes e ferramentas.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            jwt_secret: jwt_secret.into(),
            jwt_ttl_hours: 9,
            db_max_connections: 5,
            db_acquire_timeout: Duration::from_secs(3),
            tx_timeout: Duration::from_millis(5000),
            smtp: None,
            cors_allow_origins: None,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let mut config = Self::new(jwt_secret);

        if let Ok(addr) = env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }
        config.database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        config.jwt_ttl_hours = parse_env("JWT_TTL_HOURS", config.jwt_ttl_hours)?;
        config.db_max_connections = parse_env("DB_MAX_CONNECTIONS", config.db_max_connections)?;
        config.db_acquire_timeout =
            Duration::from_secs(parse_env("DB_ACQUIRE_TIMEOUT_SECS", 3u64)?);
        config.tx_timeout = Duration::from_millis(parse_env("TX_TIMEOUT_MS", 5000u64)?);
        config.cors_allow_origins = env::var("CORS_ALLOW_ORIGINS").ok();

        // SMTP é opcional: sem host, as notificações só vão para o log
        if let Ok(host) = env::var("SMTP_HOST") {
            config.smtp = Some(SmtpConfig {
                host,
                port: parse_env("SMTP_PORT", 465u16)?,
                user: env::var("SMTP_USER").context("SMTP_USER deve ser definido junto com SMTP_HOST")?,
                password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            });
        }

        Ok(config)
    }
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Valor inválido para {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn LoyaltyStore>,
    pub auth_service: AuthService,
    pub ledger_service: LedgerService,
    pub balance_service: BalanceService,
    pub reward_service: RewardService,
    pub customer_service: CustomerService,
    pub restaurant_service: RestaurantService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn LoyaltyStore> = match &config.database_url {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(config.db_acquire_timeout)
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgStore::new(db_pool, config.tx_timeout))
            }
            None => {
                tracing::warn!("DATABASE_URL não definida: usando o store em memória (dados não persistem).");
                Arc::new(MemoryStore::new())
            }
        };

        let notifier: Arc<dyn Notifier> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
            None => {
                tracing::warn!("SMTP não configurado: notificações serão apenas registradas no log.");
                Arc::new(LogNotifier)
            }
        };

        Ok(Self::from_parts(config, store, notifier))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn LoyaltyStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let auth_service = AuthService::new(
            store.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_hours,
            config.tx_timeout,
        );
        let ledger_service = LedgerService::new(store.clone());
        let balance_service = BalanceService::new(store.clone());
        let reward_service = RewardService::new(store.clone(), notifier, config.tx_timeout);
        let customer_service = CustomerService::new(store.clone(), config.tx_timeout);
        let restaurant_service = RestaurantService::new(store.clone(), config.tx_timeout);

        Self {
            config: Arc::new(config),
            store,
            auth_service,
            ledger_service,
            balance_service,
            reward_service,
            customer_service,
            restaurant_service,
        }
    }
}
