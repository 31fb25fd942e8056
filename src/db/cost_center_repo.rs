// src/db/cost_center_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::catalog::{CostCenter, NewCostCenter},
    services::ports::{CostCenterLookup, CostCenterRegistry},
};

#[derive(Clone)]
pub struct CostCenterRepository {
    pool: PgPool,
}

impl CostCenterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CostCenterLookup for CostCenterRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<CostCenter>, AppError> {
        let cost_center = sqlx::query_as::<_, CostCenter>("SELECT * FROM cost_centers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(cost_center)
    }

    async fn find_active_by_id(&self, id: i32) -> Result<Option<CostCenter>, AppError> {
        let cost_center = sqlx::query_as::<_, CostCenter>(
            "SELECT * FROM cost_centers WHERE id = $1 AND active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cost_center)
    }
}

#[async_trait]
impl CostCenterRegistry for CostCenterRepository {
    async fn create(&self, cost_center: NewCostCenter) -> Result<CostCenter, AppError> {
        let created = sqlx::query_as::<_, CostCenter>(
            r#"
            INSERT INTO cost_centers (name, value, activity, unit_type, company_id, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&cost_center.name)
        .bind(cost_center.value)
        .bind(cost_center.activity.as_deref())
        .bind(cost_center.unit_type.as_deref())
        .bind(cost_center.company_id)
        .bind(cost_center.active)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<CostCenter>, AppError> {
        let cost_centers = sqlx::query_as::<_, CostCenter>(
            "SELECT * FROM cost_centers ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(cost_centers)
    }

    async fn deactivate(&self, id: i32) -> Result<Option<CostCenter>, AppError> {
        let cost_center = sqlx::query_as::<_, CostCenter>(
            "UPDATE cost_centers SET active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cost_center)
    }
}
