// src/db/allocation_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::allocation::{Allocation, AllocationFilter, NewAllocation},
    services::ports::AllocationStore,
};

// SQLSTATE de violação da constraint EXCLUDE 'allocations_no_overlap'
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Clone)]
pub struct AllocationRepository {
    pool: PgPool,
}

impl AllocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// A constraint do banco fecha a corrida entre a checagem do serviço e o
// INSERT/UPDATE: quem chegar depois recebe o conflito aqui.
fn map_write_error(e: sqlx::Error, start: NaiveDate, end: Option<NaiveDate>) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) {
            return AppError::AllocationConflict { start, end };
        }
    }
    e.into()
}

#[async_trait]
impl AllocationStore for AllocationRepository {
    async fn insert(&self, allocation: NewAllocation) -> Result<Allocation, AppError> {
        sqlx::query_as::<_, Allocation>(
            r#"
            INSERT INTO allocations (
                tool_id, cost_center_id, employee_id, start_date, planned_end_date, notes, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(allocation.tool_id)
        .bind(allocation.cost_center_id)
        .bind(allocation.employee_id)
        .bind(allocation.start_date)
        .bind(allocation.planned_end_date)
        .bind(allocation.notes.as_deref())
        .bind(allocation.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, allocation.start_date, allocation.planned_end_date))
    }

    async fn update(&self, allocation: &Allocation) -> Result<Option<Allocation>, AppError> {
        sqlx::query_as::<_, Allocation>(
            r#"
            UPDATE allocations SET
                tool_id = $2,
                cost_center_id = $3,
                employee_id = $4,
                start_date = $5,
                planned_end_date = $6,
                actual_end_date = $7,
                notes = $8,
                active = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(allocation.id)
        .bind(allocation.tool_id)
        .bind(allocation.cost_center_id)
        .bind(allocation.employee_id)
        .bind(allocation.start_date)
        .bind(allocation.planned_end_date)
        .bind(allocation.actual_end_date)
        .bind(allocation.notes.as_deref())
        .bind(allocation.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, allocation.start_date, allocation.effective_end()))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Allocation>, AppError> {
        let allocation = sqlx::query_as::<_, Allocation>("SELECT * FROM allocations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(allocation)
    }

    async fn list(&self, filter: &AllocationFilter) -> Result<Vec<Allocation>, AppError> {
        let period_start = filter.period.and_then(|p| p.start);
        let period_end = filter.period.and_then(|p| p.end);

        // Filtros opcionais: parâmetro NULL desliga a condição.
        let allocations = sqlx::query_as::<_, Allocation>(
            r#"
            SELECT * FROM allocations
            WHERE ($1::int4 IS NULL OR tool_id = $1)
              AND ($2::int4 IS NULL OR cost_center_id = $2)
              AND ($3::int4 IS NULL OR employee_id = $3)
              AND ($4::bool IS NULL OR active = $4)
              AND ($5::date IS NULL
                   OR COALESCE(actual_end_date, planned_end_date, 'infinity'::date) >= $5)
              AND ($6::date IS NULL OR start_date <= $6)
            ORDER BY start_date DESC, id DESC
            "#,
        )
        .bind(filter.tool_id)
        .bind(filter.cost_center_id)
        .bind(filter.employee_id)
        .bind(filter.active)
        .bind(period_start)
        .bind(period_end)
        .fetch_all(&self.pool)
        .await?;
        Ok(allocations)
    }

    async fn find_active_for_pair(
        &self,
        tool_id: i32,
        employee_id: i32,
    ) -> Result<Vec<Allocation>, AppError> {
        let allocations = sqlx::query_as::<_, Allocation>(
            r#"
            SELECT * FROM allocations
            WHERE tool_id = $1 AND employee_id = $2 AND active = TRUE
            ORDER BY start_date ASC
            "#,
        )
        .bind(tool_id)
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(allocations)
    }

    async fn tool_has_other_active(
        &self,
        tool_id: i32,
        exclude_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM allocations
                WHERE tool_id = $1 AND active = TRUE AND ($2::int4 IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(tool_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
