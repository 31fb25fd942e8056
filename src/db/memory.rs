// src/db/memory.rs

// Backend em memória: usado quando não há DATABASE_URL (desenvolvimento
// local) e pelos testes. Mesmo contrato dos repositórios Postgres.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    common::error::{AppError, Resource},
    models::{
        allocation::{Allocation, AllocationFilter, NewAllocation},
        catalog::{CostCenter, Employee, NewCostCenter, NewEmployee, NewTool, Tool, ToolStatus},
    },
    services::{
        allocation_rules::find_conflict,
        ports::{
            AllocationStore, CostCenterLookup, CostCenterRegistry, EmployeeLookup,
            EmployeeRegistry, ToolLookup, ToolRegistry,
        },
    },
};

// Uma "tabela" com id sequencial (como o SERIAL do Postgres)
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: BTreeMap::new(), last_id: 0 }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

/// Agrupa os quatro repositórios em memória.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    pub tools: Arc<MemoryToolRepository>,
    pub cost_centers: Arc<MemoryCostCenterRepository>,
    pub employees: Arc<MemoryEmployeeRepository>,
    pub allocations: Arc<MemoryAllocationRepository>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

// =========================================================================
//  FERRAMENTAS
// =========================================================================

#[derive(Default)]
pub struct MemoryToolRepository {
    table: RwLock<Table<Tool>>,
}

#[async_trait]
impl ToolLookup for MemoryToolRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Tool>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_active_by_id(&self, id: i32) -> Result<Option<Tool>, AppError> {
        Ok(self.table.read().await.rows.get(&id).filter(|t| t.active).cloned())
    }

    async fn update_status(&self, id: i32, status: ToolStatus) -> Result<Tool, AppError> {
        let mut table = self.table.write().await;
        let tool = table
            .rows
            .get_mut(&id)
            .ok_or(AppError::ResourceNotFound { resource: Resource::Tool, id })?;
        tool.status = status;
        tool.updated_at = Utc::now();
        Ok(tool.clone())
    }
}

#[async_trait]
impl ToolRegistry for MemoryToolRepository {
    async fn create(&self, tool: NewTool) -> Result<Tool, AppError> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let created = Tool {
            id: table.next_id(),
            name: tool.name,
            brand: tool.brand,
            category: tool.category,
            value: tool.value,
            status: tool.status,
            description: tool.description,
            active: tool.active,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Tool>, AppError> {
        let mut tools: Vec<Tool> = self.table.read().await.rows.values().cloned().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(tools)
    }

    async fn deactivate(&self, id: i32) -> Result<Option<Tool>, AppError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|tool| {
            tool.active = false;
            tool.updated_at = Utc::now();
            tool.clone()
        }))
    }
}

// =========================================================================
//  CENTROS DE CUSTO
// =========================================================================

#[derive(Default)]
pub struct MemoryCostCenterRepository {
    table: RwLock<Table<CostCenter>>,
}

#[async_trait]
impl CostCenterLookup for MemoryCostCenterRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<CostCenter>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_active_by_id(&self, id: i32) -> Result<Option<CostCenter>, AppError> {
        Ok(self.table.read().await.rows.get(&id).filter(|c| c.active).cloned())
    }
}

#[async_trait]
impl CostCenterRegistry for MemoryCostCenterRepository {
    async fn create(&self, cost_center: NewCostCenter) -> Result<CostCenter, AppError> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let created = CostCenter {
            id: table.next_id(),
            name: cost_center.name,
            value: cost_center.value,
            activity: cost_center.activity,
            unit_type: cost_center.unit_type,
            company_id: cost_center.company_id,
            active: cost_center.active,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<CostCenter>, AppError> {
        let mut cost_centers: Vec<CostCenter> = self.table.read().await.rows.values().cloned().collect();
        cost_centers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(cost_centers)
    }

    async fn deactivate(&self, id: i32) -> Result<Option<CostCenter>, AppError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|cost_center| {
            cost_center.active = false;
            cost_center.updated_at = Utc::now();
            cost_center.clone()
        }))
    }
}

// =========================================================================
//  FUNCIONÁRIOS
// =========================================================================

#[derive(Default)]
pub struct MemoryEmployeeRepository {
    table: RwLock<Table<Employee>>,
}

#[async_trait]
impl EmployeeLookup for MemoryEmployeeRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Employee>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_active_by_id(&self, id: i32) -> Result<Option<Employee>, AppError> {
        Ok(self.table.read().await.rows.get(&id).filter(|e| e.active).cloned())
    }
}

#[async_trait]
impl EmployeeRegistry for MemoryEmployeeRepository {
    async fn create(&self, employee: NewEmployee) -> Result<Employee, AppError> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let created = Employee {
            id: table.next_id(),
            name: employee.name,
            active: employee.active,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Employee>, AppError> {
        let mut employees: Vec<Employee> = self.table.read().await.rows.values().cloned().collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(employees)
    }

    async fn deactivate(&self, id: i32) -> Result<Option<Employee>, AppError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|employee| {
            employee.active = false;
            employee.updated_at = Utc::now();
            employee.clone()
        }))
    }
}

// =========================================================================
//  ALOCAÇÕES
// =========================================================================

#[derive(Default)]
pub struct MemoryAllocationRepository {
    table: RwLock<Table<Allocation>>,
}

// Mesmo papel da constraint EXCLUDE do Postgres; roda sob o lock de escrita.
fn check_pair_conflict(table: &Table<Allocation>, candidate: &Allocation) -> Result<(), AppError> {
    if !candidate.active {
        return Ok(());
    }
    let same_pair: Vec<Allocation> = table
        .rows
        .values()
        .filter(|a| a.tool_id == candidate.tool_id && a.employee_id == candidate.employee_id)
        .cloned()
        .collect();

    match find_conflict(&same_pair, candidate.start_date, candidate.effective_end(), Some(candidate.id)) {
        Some(other) => Err(AppError::AllocationConflict {
            start: other.start_date,
            end: other.effective_end(),
        }),
        None => Ok(()),
    }
}

#[async_trait]
impl AllocationStore for MemoryAllocationRepository {
    async fn insert(&self, allocation: NewAllocation) -> Result<Allocation, AppError> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let candidate = Allocation {
            id: table.last_id + 1,
            tool_id: allocation.tool_id,
            cost_center_id: allocation.cost_center_id,
            employee_id: allocation.employee_id,
            start_date: allocation.start_date,
            planned_end_date: allocation.planned_end_date,
            actual_end_date: None,
            notes: allocation.notes,
            active: allocation.active,
            created_at: now,
            updated_at: now,
        };
        check_pair_conflict(&table, &candidate)?;

        table.next_id();
        table.rows.insert(candidate.id, candidate.clone());
        Ok(candidate)
    }

    async fn update(&self, allocation: &Allocation) -> Result<Option<Allocation>, AppError> {
        let mut table = self.table.write().await;
        let Some(created_at) = table.rows.get(&allocation.id).map(|a| a.created_at) else {
            return Ok(None);
        };
        check_pair_conflict(&table, allocation)?;

        let saved = Allocation {
            created_at,
            updated_at: Utc::now(),
            ..allocation.clone()
        };
        table.rows.insert(saved.id, saved.clone());
        Ok(Some(saved))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Allocation>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self, filter: &AllocationFilter) -> Result<Vec<Allocation>, AppError> {
        let mut allocations: Vec<Allocation> = self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        allocations.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(allocations)
    }

    async fn find_active_for_pair(
        &self,
        tool_id: i32,
        employee_id: i32,
    ) -> Result<Vec<Allocation>, AppError> {
        let mut allocations: Vec<Allocation> = self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|a| a.active && a.tool_id == tool_id && a.employee_id == employee_id)
            .cloned()
            .collect();
        allocations.sort_by_key(|a| a.start_date);
        Ok(allocations)
    }

    async fn tool_has_other_active(
        &self,
        tool_id: i32,
        exclude_id: Option<i32>,
    ) -> Result<bool, AppError> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .any(|a| a.active && a.tool_id == tool_id && Some(a.id) != exclude_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_allocation(start: NaiveDate, planned: Option<NaiveDate>) -> NewAllocation {
        NewAllocation {
            tool_id: 1,
            cost_center_id: 1,
            employee_id: 1,
            start_date: start,
            planned_end_date: planned,
            notes: None,
            active: true,
        }
    }

    #[tokio::test]
    async fn insert_rejects_overlap_for_the_same_pair() {
        let repo = MemoryAllocationRepository::default();
        repo.insert(new_allocation(date(2025, 1, 1), Some(date(2025, 6, 30)))).await.unwrap();

        let err = repo
            .insert(new_allocation(date(2025, 3, 1), None))
            .await
            .unwrap_err();
        // A mensagem traz o período da alocação que já ocupa o par.
        match err {
            AppError::AllocationConflict { start, end } => {
                assert_eq!(start, date(2025, 1, 1));
                assert_eq!(end, Some(date(2025, 6, 30)));
            }
            other => panic!("esperava conflito, veio {:?}", other),
        }

        // O id não é consumido por uma tentativa rejeitada.
        let next = repo.insert(new_allocation(date(2025, 7, 1), None)).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn update_of_missing_row_returns_none() {
        let repo = MemoryAllocationRepository::default();
        let mut allocation = repo.insert(new_allocation(date(2025, 1, 1), None)).await.unwrap();
        allocation.id = 42;
        assert!(repo.update(&allocation).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_orders_by_start_date_descending() {
        let repo = MemoryAllocationRepository::default();
        let mut first = new_allocation(date(2025, 1, 1), Some(date(2025, 1, 31)));
        first.employee_id = 1;
        let mut second = new_allocation(date(2025, 3, 1), None);
        second.employee_id = 2;
        repo.insert(first).await.unwrap();
        repo.insert(second).await.unwrap();

        let listed = repo.list(&AllocationFilter::default()).await.unwrap();
        let starts: Vec<NaiveDate> = listed.iter().map(|a| a.start_date).collect();
        assert_eq!(starts, vec![date(2025, 3, 1), date(2025, 1, 1)]);
    }
}
