// src/db/employee_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::catalog::{Employee, NewEmployee},
    services::ports::{EmployeeLookup, EmployeeRegistry},
};

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeLookup for EmployeeRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn find_active_by_id(&self, id: i32) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE id = $1 AND active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }
}

#[async_trait]
impl EmployeeRegistry for EmployeeRepository {
    async fn create(&self, employee: NewEmployee) -> Result<Employee, AppError> {
        let created = sqlx::query_as::<_, Employee>(
            "INSERT INTO employees (name, active) VALUES ($1, $2) RETURNING *",
        )
        .bind(&employee.name)
        .bind(employee.active)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Employee>, AppError> {
        let employees = sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    async fn deactivate(&self, id: i32) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>(
            "UPDATE employees SET active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }
}
