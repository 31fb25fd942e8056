// src/services/allocation_rules.rs

// Regras puras da alocação (sem I/O): consistência de datas e sobreposição
// de períodos.

use chrono::NaiveDate;

use crate::common::error::{AppError, DateRule};
use crate::models::allocation::Allocation;

/// Substitui o fim em aberto de um período.
pub const OPEN_END: NaiveDate = NaiveDate::MAX;

/// Teste de interseção de intervalos FECHADOS: quem termina no mesmo dia em
/// que o outro começa também conta como sobreposição.
pub fn periods_overlap(
    start1: NaiveDate,
    end1: Option<NaiveDate>,
    start2: NaiveDate,
    end2: Option<NaiveDate>,
) -> bool {
    let end1 = end1.unwrap_or(OPEN_END);
    let end2 = end2.unwrap_or(OPEN_END);
    start1 <= end2 && end1 >= start2
}

/// Valida as três datas de uma alocação.
pub fn validate_dates(
    start: NaiveDate,
    planned_end: Option<NaiveDate>,
    actual_end: Option<NaiveDate>,
) -> Result<(), AppError> {
    if let Some(planned) = planned_end {
        if planned < start {
            return Err(AppError::InvalidArgument(DateRule::PlannedEndBeforeStart));
        }
    }

    if let Some(actual) = actual_end {
        if actual < start {
            return Err(AppError::InvalidArgument(DateRule::ActualEndBeforeStart));
        }
        if planned_end.is_some_and(|planned| actual < planned) {
            return Err(AppError::InvalidArgument(DateRule::ActualEndBeforePlannedEnd));
        }
    }

    Ok(())
}

pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::InvalidArgument(DateRule::RangeStartAfterEnd));
    }
    Ok(())
}

/// Procura, entre as alocações ativas do par (ferramenta, funcionário), a
/// primeira que cruza o período pedido. `ignore_id` pula o próprio registro
/// num update.
pub fn find_conflict<'a>(
    existing: &'a [Allocation],
    start: NaiveDate,
    end: Option<NaiveDate>,
    ignore_id: Option<i32>,
) -> Option<&'a Allocation> {
    existing
        .iter()
        .filter(|other| other.active)
        .filter(|other| Some(other.id) != ignore_id)
        .find(|other| periods_overlap(start, end, other.start_date, other.effective_end()))
}
