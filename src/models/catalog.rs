// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Status da Ferramenta ---
// Mapeia o CREATE TYPE tool_status do banco
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tool_status")]
pub enum ToolStatus {
    #[default]
    #[sqlx(rename = "disponivel")]
    #[serde(rename = "disponivel")]
    Available,
    #[sqlx(rename = "alocada")]
    #[serde(rename = "alocada")]
    Allocated,
    #[sqlx(rename = "manutencao")]
    #[serde(rename = "manutencao")]
    Maintenance,
}

// --- 1. Ferramenta ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tool {
    #[schema(example = 1)]
    pub id: i32,
    #[serde(rename = "nome")]
    #[schema(example = "Martelo")]
    pub name: String,
    #[serde(rename = "marca")]
    #[schema(example = "Bosch")]
    pub brand: String,
    #[serde(rename = "categoria")]
    #[schema(example = "Ferramentas Manuais")]
    pub category: String,
    #[serde(rename = "valor")]
    #[schema(example = "99.99")]
    pub value: Decimal,
    pub status: ToolStatus,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "ativo")]
    pub active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTool {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub value: Decimal,
    pub status: ToolStatus,
    pub description: String,
    pub active: bool,
}

// --- 2. Centro de Custo ---
// A empresa fica fora deste serviço; guardamos só o ID dela.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CostCenter {
    #[schema(example = 1)]
    pub id: i32,
    #[serde(rename = "nome")]
    #[schema(example = "Financeiro")]
    pub name: String,
    #[serde(rename = "valor")]
    #[schema(example = "1500.50")]
    pub value: Decimal,
    #[serde(rename = "atividade")]
    pub activity: Option<String>,
    #[serde(rename = "tipoDeUnidade")]
    pub unit_type: Option<String>,
    #[serde(rename = "empresaId")]
    #[schema(example = 1)]
    pub company_id: i32,
    #[serde(rename = "ativo")]
    pub active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCostCenter {
    pub name: String,
    pub value: Decimal,
    pub activity: Option<String>,
    pub unit_type: Option<String>,
    pub company_id: i32,
    pub active: bool,
}

// --- 3. Funcionário ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i32,
    #[serde(rename = "nome")]
    #[schema(example = "João Silva")]
    pub name: String,
    #[serde(rename = "ativo")]
    pub active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub active: bool,
}
