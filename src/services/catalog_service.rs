// src/services/catalog_service.rs

use std::sync::Arc;

use crate::{
    common::error::{AppError, Resource},
    models::catalog::{CostCenter, Employee, NewCostCenter, NewEmployee, NewTool, Tool},
    services::ports::{CostCenterRegistry, EmployeeRegistry, ToolRegistry},
};

// Cadastro mínimo das entidades referenciadas pelas alocações.
#[derive(Clone)]
pub struct CatalogService {
    tools: Arc<dyn ToolRegistry>,
    cost_centers: Arc<dyn CostCenterRegistry>,
    employees: Arc<dyn EmployeeRegistry>,
}

impl CatalogService {
    pub fn new(
        tools: Arc<dyn ToolRegistry>,
        cost_centers: Arc<dyn CostCenterRegistry>,
        employees: Arc<dyn EmployeeRegistry>,
    ) -> Self {
        Self { tools, cost_centers, employees }
    }

    // --- FERRAMENTAS ---
    pub async fn create_tool(&self, tool: NewTool) -> Result<Tool, AppError> {
        let created = self.tools.create(tool).await?;
        tracing::info!("✅ Ferramenta {} cadastrada ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn list_tools(&self) -> Result<Vec<Tool>, AppError> {
        self.tools.list().await
    }

    pub async fn get_tool(&self, id: i32) -> Result<Tool, AppError> {
        self.tools
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound { resource: Resource::Tool, id })
    }

    pub async fn deactivate_tool(&self, id: i32) -> Result<Tool, AppError> {
        self.tools
            .deactivate(id)
            .await?
            .ok_or(AppError::ResourceNotFound { resource: Resource::Tool, id })
    }

    // --- CENTROS DE CUSTO ---
    pub async fn create_cost_center(&self, cost_center: NewCostCenter) -> Result<CostCenter, AppError> {
        let created = self.cost_centers.create(cost_center).await?;
        tracing::info!("✅ Centro de custo {} cadastrado ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn list_cost_centers(&self) -> Result<Vec<CostCenter>, AppError> {
        self.cost_centers.list().await
    }

    pub async fn get_cost_center(&self, id: i32) -> Result<CostCenter, AppError> {
        self.cost_centers
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound { resource: Resource::CostCenter, id })
    }

    pub async fn deactivate_cost_center(&self, id: i32) -> Result<CostCenter, AppError> {
        self.cost_centers
            .deactivate(id)
            .await?
            .ok_or(AppError::ResourceNotFound { resource: Resource::CostCenter, id })
    }

    // --- FUNCIONÁRIOS ---
    pub async fn create_employee(&self, employee: NewEmployee) -> Result<Employee, AppError> {
        let created = self.employees.create(employee).await?;
        tracing::info!("✅ Funcionário {} cadastrado ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        self.employees.list().await
    }

    pub async fn get_employee(&self, id: i32) -> Result<Employee, AppError> {
        self.employees
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound { resource: Resource::Employee, id })
    }

    pub async fn deactivate_employee(&self, id: i32) -> Result<Employee, AppError> {
        self.employees
            .deactivate(id)
            .await?
            .ok_or(AppError::ResourceNotFound { resource: Resource::Employee, id })
    }
}
