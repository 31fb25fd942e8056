// src/models/allocation.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::catalog::{CostCenter, Employee, Tool};

// --- Alocação (a tabela 'allocations') ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Allocation {
    #[schema(example = 1)]
    pub id: i32,
    #[serde(rename = "ferramentaId")]
    #[schema(example = 1)]
    pub tool_id: i32,
    #[serde(rename = "centroCustoId")]
    #[schema(example = 1)]
    pub cost_center_id: i32,
    #[serde(rename = "funcionarioId")]
    #[schema(example = 1)]
    pub employee_id: i32,
    #[serde(rename = "dataInicio")]
    #[schema(example = "2025-01-01")]
    pub start_date: NaiveDate,
    #[serde(rename = "dataPrevisaoDesalocacao")]
    #[schema(example = "2025-06-30")]
    pub planned_end_date: Option<NaiveDate>,
    #[serde(rename = "dataDesalocacao")]
    pub actual_end_date: Option<NaiveDate>,
    #[serde(rename = "observacoes")]
    #[schema(example = "Alocação para projeto de migração")]
    pub notes: Option<String>,
    #[serde(rename = "ativo")]
    pub active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

// ---
// Estado da alocação: o flag `active` do banco visto como máquina de estados
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationState {
    Active,
    Closed,
}

impl AllocationState {
    pub fn from_flag(active: bool) -> Self {
        if active { AllocationState::Active } else { AllocationState::Closed }
    }

    pub fn is_active(self) -> bool {
        self == AllocationState::Active
    }

    /// Active -> Closed. `None` quando já estava encerrada.
    pub fn close(self) -> Option<AllocationState> {
        match self {
            AllocationState::Active => Some(AllocationState::Closed),
            AllocationState::Closed => None,
        }
    }

    /// Closed -> Active. `None` quando já estava ativa.
    pub fn reopen(self) -> Option<AllocationState> {
        match self {
            AllocationState::Closed => Some(AllocationState::Active),
            AllocationState::Active => None,
        }
    }
}

impl Allocation {
    pub fn state(&self) -> AllocationState {
        AllocationState::from_flag(self.active)
    }

    /// Fim efetivo: data real de devolução, senão a prevista, senão em aberto.
    pub fn effective_end(&self) -> Option<NaiveDate> {
        self.actual_end_date.or(self.planned_end_date)
    }

    /// Merge raso das alterações sobre o registro atual (sem validar nada).
    pub fn merged(&self, changes: &AllocationChanges) -> Allocation {
        let mut next = self.clone();
        if let Some(tool_id) = changes.tool_id {
            next.tool_id = tool_id;
        }
        if let Some(cost_center_id) = changes.cost_center_id {
            next.cost_center_id = cost_center_id;
        }
        if let Some(employee_id) = changes.employee_id {
            next.employee_id = employee_id;
        }
        if let Some(start_date) = changes.start_date {
            next.start_date = start_date;
        }
        if let Some(planned) = changes.planned_end_date {
            next.planned_end_date = planned;
        }
        if let Some(actual) = changes.actual_end_date {
            next.actual_end_date = actual;
        }
        if let Some(notes) = &changes.notes {
            next.notes = notes.clone();
        }
        if let Some(active) = changes.active {
            next.active = active;
        }
        next
    }
}

// --- Alocação com as referências resolvidas (GET) ---
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AllocationDetail {
    #[serde(flatten)]
    pub allocation: Allocation,
    #[serde(rename = "ferramenta")]
    pub tool: Option<Tool>,
    #[serde(rename = "centroCusto")]
    pub cost_center: Option<CostCenter>,
    #[serde(rename = "funcionario")]
    pub employee: Option<Employee>,
}

// --- Dados já validados para criar uma alocação ---
#[derive(Debug, Clone, PartialEq)]
pub struct NewAllocation {
    pub tool_id: i32,
    pub cost_center_id: i32,
    pub employee_id: i32,
    pub start_date: NaiveDate,
    pub planned_end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub active: bool,
}

// ---
// Alteração parcial (PATCH)
// ---
// `Some(None)` limpa um campo anulável; `None` não mexe nele.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationChanges {
    pub tool_id: Option<i32>,
    pub cost_center_id: Option<i32>,
    pub employee_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub planned_end_date: Option<Option<NaiveDate>>,
    pub actual_end_date: Option<Option<NaiveDate>>,
    pub notes: Option<Option<String>>,
    pub active: Option<bool>,
}

impl AllocationChanges {
    pub fn touches_dates(&self) -> bool {
        self.start_date.is_some() || self.planned_end_date.is_some() || self.actual_end_date.is_some()
    }
}

// --- Período fechado [start, end] usado nas consultas ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePeriod {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

// --- Filtro da listagem ---
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationFilter {
    pub tool_id: Option<i32>,
    pub cost_center_id: Option<i32>,
    pub employee_id: Option<i32>,
    /// `None` lista ativas e encerradas.
    pub active: Option<bool>,
    pub period: Option<DatePeriod>,
}

// Sem filtro explícito, só as ativas.
impl Default for AllocationFilter {
    fn default() -> Self {
        Self {
            tool_id: None,
            cost_center_id: None,
            employee_id: None,
            active: Some(true),
            period: None,
        }
    }
}

impl AllocationFilter {
    /// Usado pelo backend em memória; o Postgres aplica o mesmo critério em SQL.
    pub fn matches(&self, allocation: &Allocation) -> bool {
        if self.tool_id.is_some_and(|id| id != allocation.tool_id) {
            return false;
        }
        if self.cost_center_id.is_some_and(|id| id != allocation.cost_center_id) {
            return false;
        }
        if self.employee_id.is_some_and(|id| id != allocation.employee_id) {
            return false;
        }
        if self.active.is_some_and(|active| active != allocation.active) {
            return false;
        }
        if let Some(period) = self.period {
            if period.end.is_some_and(|end| allocation.start_date > end) {
                return false;
            }
            if let (Some(start), Some(end)) = (period.start, allocation.effective_end()) {
                if end < start {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Allocation {
        Allocation {
            id: 7,
            tool_id: 1,
            cost_center_id: 2,
            employee_id: 3,
            start_date: date(2025, 1, 1),
            planned_end_date: Some(date(2025, 6, 30)),
            actual_end_date: None,
            notes: Some("obra A".to_string()),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn state_transitions() {
        assert_eq!(AllocationState::Active.close(), Some(AllocationState::Closed));
        assert_eq!(AllocationState::Closed.close(), None);
        assert_eq!(AllocationState::Closed.reopen(), Some(AllocationState::Active));
        assert_eq!(AllocationState::Active.reopen(), None);
    }

    #[test]
    fn effective_end_prefers_actual_over_planned() {
        let mut allocation = sample();
        assert_eq!(allocation.effective_end(), Some(date(2025, 6, 30)));
        allocation.actual_end_date = Some(date(2025, 3, 10));
        assert_eq!(allocation.effective_end(), Some(date(2025, 3, 10)));
        allocation.actual_end_date = None;
        allocation.planned_end_date = None;
        assert_eq!(allocation.effective_end(), None);
    }

    #[test]
    fn merge_is_shallow_and_null_clears() {
        let current = sample();
        let changes = AllocationChanges {
            employee_id: Some(9),
            planned_end_date: Some(None),
            notes: Some(None),
            ..Default::default()
        };

        let next = current.merged(&changes);

        assert_eq!(next.employee_id, 9);
        assert_eq!(next.tool_id, current.tool_id);
        assert_eq!(next.planned_end_date, None);
        assert_eq!(next.notes, None);
        assert_eq!(next.start_date, current.start_date);
        assert!(changes.touches_dates());
    }

    #[test]
    fn default_filter_keeps_only_active() {
        let mut allocation = sample();
        assert!(AllocationFilter::default().matches(&allocation));
        allocation.active = false;
        assert!(!AllocationFilter::default().matches(&allocation));
    }

    #[test]
    fn period_filter_uses_interval_intersection() {
        let allocation = sample();
        let inside = AllocationFilter {
            period: Some(DatePeriod { start: Some(date(2025, 6, 1)), end: Some(date(2025, 12, 31)) }),
            ..Default::default()
        };
        let after = AllocationFilter {
            period: Some(DatePeriod { start: Some(date(2025, 7, 1)), end: None }),
            ..Default::default()
        };
        let before = AllocationFilter {
            period: Some(DatePeriod { start: None, end: Some(date(2024, 12, 31)) }),
            ..Default::default()
        };

        assert!(inside.matches(&allocation));
        assert!(!after.matches(&allocation));
        assert!(!before.matches(&allocation));
    }
}
