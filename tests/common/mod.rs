// tests/common/mod.rs

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;

use rateio::{
    db::memory::MemoryDatabase,
    models::catalog::{CostCenter, Employee, NewCostCenter, NewEmployee, NewTool, Tool, ToolStatus},
    services::{
        allocation_service::AllocationManager,
        ports::{CostCenterRegistry, EmployeeRegistry, ToolLookup, ToolRegistry},
    },
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Relógio fixo para a data de desalocação
pub fn fixed_today() -> NaiveDate {
    date(2025, 8, 15)
}

pub async fn seed_tool(db: &MemoryDatabase, name: &str) -> Tool {
    db.tools
        .create(NewTool {
            name: name.to_string(),
            brand: "Bosch".to_string(),
            category: "Elétricas".to_string(),
            value: Decimal::new(35000, 2),
            status: ToolStatus::Available,
            description: String::new(),
            active: true,
        })
        .await
        .unwrap()
}

pub async fn seed_cost_center(db: &MemoryDatabase, name: &str) -> CostCenter {
    db.cost_centers
        .create(NewCostCenter {
            name: name.to_string(),
            value: Decimal::new(150050, 2),
            activity: None,
            unit_type: None,
            company_id: 1,
            active: true,
        })
        .await
        .unwrap()
}

pub async fn seed_employee(db: &MemoryDatabase, name: &str) -> Employee {
    db.employees
        .create(NewEmployee { name: name.to_string(), active: true })
        .await
        .unwrap()
}

pub async fn tool_status(db: &MemoryDatabase, id: i32) -> ToolStatus {
    db.tools.find_by_id(id).await.unwrap().unwrap().status
}

/// Um banco com uma ferramenta, um centro de custo e um funcionário (todos id 1).
pub struct Fixture {
    pub db: MemoryDatabase,
    pub manager: AllocationManager,
    pub tool: Tool,
    pub cost_center: CostCenter,
    pub employee: Employee,
}

pub async fn fixture() -> Fixture {
    let db = MemoryDatabase::new();
    let tool = seed_tool(&db, "Furadeira").await;
    let cost_center = seed_cost_center(&db, "Obra Centro").await;
    let employee = seed_employee(&db, "João Silva").await;

    let manager = AllocationManager::new(
        db.tools.clone(),
        db.cost_centers.clone(),
        db.employees.clone(),
        db.allocations.clone(),
    )
    .with_clock(fixed_today);

    Fixture { db, manager, tool, cost_center, employee }
}
