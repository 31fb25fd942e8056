// src/db/tool_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::{AppError, Resource},
    models::catalog::{NewTool, Tool, ToolStatus},
    services::ports::{ToolLookup, ToolRegistry},
};

// O repositório de ferramentas, responsável pela tabela 'tools'
#[derive(Clone)]
pub struct ToolRepository {
    pool: PgPool,
}

impl ToolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ToolLookup for ToolRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Tool>, AppError> {
        let tool = sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tool)
    }

    async fn find_active_by_id(&self, id: i32) -> Result<Option<Tool>, AppError> {
        let tool = sqlx::query_as::<_, Tool>("SELECT * FROM tools WHERE id = $1 AND active = TRUE")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tool)
    }

    async fn update_status(&self, id: i32, status: ToolStatus) -> Result<Tool, AppError> {
        sqlx::query_as::<_, Tool>(
            "UPDATE tools SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ResourceNotFound { resource: Resource::Tool, id })
    }
}

#[async_trait]
impl ToolRegistry for ToolRepository {
    async fn create(&self, tool: NewTool) -> Result<Tool, AppError> {
        let created = sqlx::query_as::<_, Tool>(
            r#"
            INSERT INTO tools (name, brand, category, value, status, description, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&tool.name)
        .bind(&tool.brand)
        .bind(&tool.category)
        .bind(tool.value)
        .bind(tool.status)
        .bind(&tool.description)
        .bind(tool.active)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Tool>, AppError> {
        let tools = sqlx::query_as::<_, Tool>("SELECT * FROM tools ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(tools)
    }

    async fn deactivate(&self, id: i32) -> Result<Option<Tool>, AppError> {
        let tool = sqlx::query_as::<_, Tool>(
            "UPDATE tools SET active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tool)
    }
}
