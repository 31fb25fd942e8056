// src/services/ports.rs

// Os contratos de persistência que os serviços consomem. O Postgres
// (`db::*_repo`) e o backend em memória (`db::memory`) implementam todos.

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::{
        allocation::{Allocation, AllocationFilter, NewAllocation},
        catalog::{CostCenter, Employee, NewCostCenter, NewEmployee, NewTool, Tool, ToolStatus},
    },
};

// ---
// Leitura das referências (o que a alocação precisa)
// ---

#[async_trait]
pub trait ToolLookup: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Tool>, AppError>;

    /// Só devolve a ferramenta se ela estiver ativa.
    async fn find_active_by_id(&self, id: i32) -> Result<Option<Tool>, AppError>;

    /// Único campo da ferramenta que a alocação escreve.
    async fn update_status(&self, id: i32, status: ToolStatus) -> Result<Tool, AppError>;
}

#[async_trait]
pub trait CostCenterLookup: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<CostCenter>, AppError>;
    async fn find_active_by_id(&self, id: i32) -> Result<Option<CostCenter>, AppError>;
}

#[async_trait]
pub trait EmployeeLookup: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Employee>, AppError>;
    async fn find_active_by_id(&self, id: i32) -> Result<Option<Employee>, AppError>;
}

// ---
// Cadastro (CRUD mínimo do catálogo)
// ---

#[async_trait]
pub trait ToolRegistry: ToolLookup {
    async fn create(&self, tool: NewTool) -> Result<Tool, AppError>;
    async fn list(&self) -> Result<Vec<Tool>, AppError>;
    /// Soft delete. `None` se o ID não existe.
    async fn deactivate(&self, id: i32) -> Result<Option<Tool>, AppError>;
}

#[async_trait]
pub trait CostCenterRegistry: CostCenterLookup {
    async fn create(&self, cost_center: NewCostCenter) -> Result<CostCenter, AppError>;
    async fn list(&self) -> Result<Vec<CostCenter>, AppError>;
    async fn deactivate(&self, id: i32) -> Result<Option<CostCenter>, AppError>;
}

#[async_trait]
pub trait EmployeeRegistry: EmployeeLookup {
    async fn create(&self, employee: NewEmployee) -> Result<Employee, AppError>;
    async fn list(&self) -> Result<Vec<Employee>, AppError>;
    async fn deactivate(&self, id: i32) -> Result<Option<Employee>, AppError>;
}

// ---
// Persistência das alocações
// ---

#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Grava a alocação. Se ela estiver ativa e cruzar outra ativa do mesmo
    /// par (ferramenta, funcionário), falha com `AllocationConflict`; a
    /// checagem é atômica com a escrita.
    async fn insert(&self, allocation: NewAllocation) -> Result<Allocation, AppError>;

    /// Regrava todos os campos editáveis. Mesma garantia de conflito do insert.
    async fn update(&self, allocation: &Allocation) -> Result<Option<Allocation>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Allocation>, AppError>;

    /// Ordenado por data de início, da mais recente para a mais antiga.
    async fn list(&self, filter: &AllocationFilter) -> Result<Vec<Allocation>, AppError>;

    async fn find_active_for_pair(
        &self,
        tool_id: i32,
        employee_id: i32,
    ) -> Result<Vec<Allocation>, AppError>;

    /// Existe outra alocação ativa (fora `exclude_id`) segurando a ferramenta?
    async fn tool_has_other_active(
        &self,
        tool_id: i32,
        exclude_id: Option<i32>,
    ) -> Result<bool, AppError>;
}
