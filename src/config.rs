// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::i18n::I18nStore,
    db::{
        memory::MemoryDatabase, AllocationRepository, CostCenterRepository, EmployeeRepository,
        ToolRepository,
    },
    services::{allocation_service::AllocationManager, catalog_service::CatalogService},
};

// ---
// Configuração lida do ambiente (.env opcional)
// ---
#[derive(Debug, Clone)]
pub struct Config {
    /// Sem DATABASE_URL a API sobe com o backend em memória.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
}

fn var_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        Ok(Self {
            database_url,
            host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: var_or("PORT", 3000)?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(var_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub allocation_manager: AllocationManager,
    pub catalog_service: CatalogService,
    pub i18n_store: Arc<I18nStore>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let Some(database_url) = config.database_url.as_deref() else {
            tracing::warn!("DATABASE_URL não definida: usando o backend em memória (dados não persistem)");
            return Ok(Self::in_memory());
        };

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        // --- Monta o gráfico de dependências ---
        let tools = Arc::new(ToolRepository::new(db_pool.clone()));
        let cost_centers = Arc::new(CostCenterRepository::new(db_pool.clone()));
        let employees = Arc::new(EmployeeRepository::new(db_pool.clone()));
        let allocations = Arc::new(AllocationRepository::new(db_pool));

        Ok(Self {
            allocation_manager: AllocationManager::new(
                tools.clone(),
                cost_centers.clone(),
                employees.clone(),
                allocations,
            ),
            catalog_service: CatalogService::new(tools, cost_centers, employees),
            i18n_store: Arc::new(I18nStore::new()),
        })
    }

    pub fn in_memory() -> Self {
        Self::from_memory(MemoryDatabase::new())
    }

    /// Monta o estado sobre um banco em memória já existente (testes usam
    /// isso para semear e inspecionar os dados).
    pub fn from_memory(db: MemoryDatabase) -> Self {
        Self {
            allocation_manager: AllocationManager::new(
                db.tools.clone(),
                db.cost_centers.clone(),
                db.employees.clone(),
                db.allocations.clone(),
            ),
            catalog_service: CatalogService::new(db.tools, db.cost_centers, db.employees),
            i18n_store: Arc::new(I18nStore::new()),
        }
    }
}
