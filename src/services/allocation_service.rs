// src/services/allocation_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::{
    common::error::{AppError, DateRule, Resource},
    models::{
        allocation::{
            Allocation, AllocationChanges, AllocationDetail, AllocationFilter, DatePeriod,
            NewAllocation,
        },
        catalog::{CostCenter, Employee, Tool, ToolStatus},
    },
    services::{
        allocation_rules::{find_conflict, validate_dates, validate_range},
        ports::{AllocationStore, CostCenterLookup, EmployeeLookup, ToolLookup},
    },
};

// Efeito colateral que uma alocação causa na ferramenta.
#[derive(Debug, Clone, Copy)]
enum ToolEffect {
    Hold(i32),
    Release { tool_id: i32, exclude_id: Option<i32> },
}

// O status anterior, para desfazer se a gravação da alocação falhar.
#[derive(Debug, Clone, Copy)]
struct ToolStatusChange {
    tool_id: i32,
    previous: ToolStatus,
    held: bool,
}

#[derive(Clone)]
pub struct AllocationManager {
    tools: Arc<dyn ToolLookup>,
    cost_centers: Arc<dyn CostCenterLookup>,
    employees: Arc<dyn EmployeeLookup>,
    store: Arc<dyn AllocationStore>,
    today: fn() -> NaiveDate,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

impl AllocationManager {
    pub fn new(
        tools: Arc<dyn ToolLookup>,
        cost_centers: Arc<dyn CostCenterLookup>,
        employees: Arc<dyn EmployeeLookup>,
        store: Arc<dyn AllocationStore>,
    ) -> Self {
        Self {
            tools,
            cost_centers,
            employees,
            store,
            today: utc_today,
        }
    }

    /// Troca o relógio (a data de "hoje" usada na desalocação).
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    // --- CREATE ---
    pub async fn create(&self, request: NewAllocation) -> Result<Allocation, AppError> {
        // 1. Referências (em paralelo)
        self.ensure_references(request.tool_id, request.cost_center_id, request.employee_id)
            .await?;

        // 2. Datas
        validate_dates(request.start_date, request.planned_end_date, None)?;

        // 3. Sobreposição (só alocações ativas disputam o período)
        if request.active {
            self.ensure_no_overlap(
                request.tool_id,
                request.employee_id,
                request.start_date,
                request.planned_end_date,
                None,
            )
            .await?;
        }

        // 4. Ferramenta -> "alocada", depois grava a alocação
        let effects = if request.active { vec![ToolEffect::Hold(request.tool_id)] } else { Vec::new() };
        let applied = self.apply_tool_effects(&effects).await?;

        match self.store.insert(request).await {
            Ok(created) => {
                tracing::info!(
                    "✅ Alocação {} criada (ferramenta {}, funcionário {})",
                    created.id,
                    created.tool_id,
                    created.employee_id
                );
                Ok(created)
            }
            Err(err) => {
                self.rollback(applied).await;
                Err(err)
            }
        }
    }

    // --- LEITURA ---
    pub async fn find_all(&self, filter: &AllocationFilter) -> Result<Vec<AllocationDetail>, AppError> {
        if let Some(DatePeriod { start: Some(start), end: Some(end) }) = filter.period {
            validate_range(start, end)?;
        }
        let allocations = self.store.list(filter).await?;
        self.resolve_all(allocations).await
    }

    pub async fn find_one(&self, id: i32) -> Result<AllocationDetail, AppError> {
        let allocation = self.load(id).await?;
        self.resolve(allocation).await
    }

    pub async fn find_by_employee(&self, employee_id: i32) -> Result<Vec<AllocationDetail>, AppError> {
        self.find_all(&AllocationFilter { employee_id: Some(employee_id), ..Default::default() })
            .await
    }

    pub async fn find_by_tool(&self, tool_id: i32) -> Result<Vec<AllocationDetail>, AppError> {
        self.find_all(&AllocationFilter { tool_id: Some(tool_id), ..Default::default() })
            .await
    }

    pub async fn find_by_cost_center(&self, cost_center_id: i32) -> Result<Vec<AllocationDetail>, AppError> {
        self.find_all(&AllocationFilter { cost_center_id: Some(cost_center_id), ..Default::default() })
            .await
    }

    /// Alocações ativas cujo período cruza [start, end].
    pub async fn find_by_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AllocationDetail>, AppError> {
        validate_range(start, end)?;
        self.find_all(&AllocationFilter {
            period: Some(DatePeriod { start: Some(start), end: Some(end) }),
            ..Default::default()
        })
        .await
    }

    // --- UPDATE ---
    pub async fn update(&self, id: i32, changes: AllocationChanges) -> Result<Allocation, AppError> {
        let current = self.load(id).await?;
        let mut next = current.merged(&changes);

        let before = current.state();
        let after = next.state();
        let reopening = before.reopen() == Some(after);
        let closing = before.close() == Some(after);

        // Reabrir apaga a devolução antiga, a menos que o PATCH traga outra.
        if reopening && changes.actual_end_date.is_none() {
            next.actual_end_date = None;
        }

        if changes.touches_dates() {
            validate_dates(next.start_date, next.planned_end_date, next.actual_end_date)?;
        }

        // Encerrar via PATCH sem data de devolução: carimba "hoje" (como no remove).
        if closing && next.actual_end_date.is_none() {
            next.actual_end_date = Some(self.closing_date(next.start_date));
        }

        let references_changed = changes.tool_id.is_some_and(|v| v != current.tool_id)
            || changes.cost_center_id.is_some_and(|v| v != current.cost_center_id)
            || changes.employee_id.is_some_and(|v| v != current.employee_id);

        if references_changed || reopening {
            self.ensure_references(next.tool_id, next.cost_center_id, next.employee_id)
                .await?;
        }

        let pair_changed = next.tool_id != current.tool_id || next.employee_id != current.employee_id;
        if after.is_active() && (pair_changed || changes.touches_dates() || reopening) {
            self.ensure_no_overlap(
                next.tool_id,
                next.employee_id,
                next.start_date,
                next.effective_end(),
                Some(id),
            )
            .await?;
        }

        // Quem segura a ferramenta antes e depois
        let tool_changed = next.tool_id != current.tool_id;
        let mut effects = Vec::new();
        if after.is_active() && (!before.is_active() || tool_changed) {
            effects.push(ToolEffect::Hold(next.tool_id));
        }
        if before.is_active() && (!after.is_active() || tool_changed) {
            effects.push(ToolEffect::Release { tool_id: current.tool_id, exclude_id: Some(id) });
        }

        self.persist(next, effects).await
    }

    // --- DELETE (soft) ---
    pub async fn remove(&self, id: i32) -> Result<(), AppError> {
        self.deallocate(id, None).await.map(|_| ())
    }

    /// Encerra a alocação: ativo = false, registra a data de devolução e
    /// libera a ferramenta se ninguém mais a estiver usando.
    pub async fn deallocate(&self, id: i32, returned_on: Option<NaiveDate>) -> Result<Allocation, AppError> {
        let current = self.load(id).await?;

        let Some(closed) = current.state().close() else {
            tracing::debug!("Alocação {} já estava encerrada", id);
            return Ok(current);
        };

        let actual_end = match returned_on {
            Some(date) if date < current.start_date => {
                return Err(AppError::InvalidArgument(DateRule::ActualEndBeforeStart));
            }
            Some(date) => date,
            None => current
                .actual_end_date
                .unwrap_or_else(|| self.closing_date(current.start_date)),
        };

        let mut next = current.clone();
        next.active = closed.is_active();
        next.actual_end_date = Some(actual_end);

        let effects = vec![ToolEffect::Release { tool_id: current.tool_id, exclude_id: Some(id) }];
        let saved = self.persist(next, effects).await?;

        tracing::info!("✅ Alocação {} encerrada em {}", id, actual_end);
        Ok(saved)
    }

    // ---
    // Auxiliares
    // ---

    async fn load(&self, id: i32) -> Result<Allocation, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound { resource: Resource::Allocation, id })
    }

    // Hoje, mas nunca antes do início (alocação cancelada antes de começar).
    fn closing_date(&self, start: NaiveDate) -> NaiveDate {
        (self.today)().max(start)
    }

    /// As três consultas são independentes, então vão juntas.
    async fn ensure_references(
        &self,
        tool_id: i32,
        cost_center_id: i32,
        employee_id: i32,
    ) -> Result<(), AppError> {
        let (tool, cost_center, employee) = tokio::try_join!(
            self.tools.find_active_by_id(tool_id),
            self.cost_centers.find_active_by_id(cost_center_id),
            self.employees.find_active_by_id(employee_id),
        )?;

        if tool.is_none() {
            return Err(AppError::ReferenceNotFound { resource: Resource::Tool, id: tool_id });
        }
        if cost_center.is_none() {
            return Err(AppError::ReferenceNotFound { resource: Resource::CostCenter, id: cost_center_id });
        }
        if employee.is_none() {
            return Err(AppError::ReferenceNotFound { resource: Resource::Employee, id: employee_id });
        }
        Ok(())
    }

    async fn ensure_no_overlap(
        &self,
        tool_id: i32,
        employee_id: i32,
        start: NaiveDate,
        end: Option<NaiveDate>,
        ignore_id: Option<i32>,
    ) -> Result<(), AppError> {
        let existing = self.store.find_active_for_pair(tool_id, employee_id).await?;

        if let Some(conflict) = find_conflict(&existing, start, end, ignore_id) {
            tracing::warn!(
                "Conflito de alocação: ferramenta {} / funcionário {} já alocados (alocação {})",
                tool_id,
                employee_id,
                conflict.id
            );
            return Err(AppError::AllocationConflict {
                start: conflict.start_date,
                end: conflict.effective_end(),
            });
        }
        Ok(())
    }

    /// Aplica os efeitos na ferramenta, grava a alocação e, se a gravação
    /// falhar, devolve as ferramentas ao status anterior.
    async fn persist(&self, next: Allocation, effects: Vec<ToolEffect>) -> Result<Allocation, AppError> {
        let id = next.id;
        let applied = self.apply_tool_effects(&effects).await?;

        match self.store.update(&next).await {
            Ok(Some(saved)) => Ok(saved),
            Ok(None) => {
                self.rollback(applied).await;
                Err(AppError::ResourceNotFound { resource: Resource::Allocation, id })
            }
            Err(err) => {
                self.rollback(applied).await;
                Err(err)
            }
        }
    }

    async fn apply_tool_effects(&self, effects: &[ToolEffect]) -> Result<Vec<ToolStatusChange>, AppError> {
        let mut applied = Vec::new();

        for effect in effects {
            match self.apply_tool_effect(*effect).await {
                Ok(Some(change)) => applied.push(change),
                Ok(None) => {}
                Err(err) => {
                    self.rollback(applied).await;
                    return Err(err);
                }
            }
        }

        Ok(applied)
    }

    async fn apply_tool_effect(&self, effect: ToolEffect) -> Result<Option<ToolStatusChange>, AppError> {
        let (tool_id, target) = match effect {
            ToolEffect::Hold(tool_id) => (tool_id, ToolStatus::Allocated),
            ToolEffect::Release { tool_id, exclude_id } => {
                // Outro funcionário ainda pode estar com a mesma ferramenta.
                if self.store.tool_has_other_active(tool_id, exclude_id).await? {
                    return Ok(None);
                }
                (tool_id, ToolStatus::Available)
            }
        };

        let tool = self
            .tools
            .find_by_id(tool_id)
            .await?
            .ok_or(AppError::ResourceNotFound { resource: Resource::Tool, id: tool_id })?;

        // Só liberamos o que estava "alocada" (manutenção continua manutenção).
        let should_write = match target {
            ToolStatus::Allocated => tool.status != ToolStatus::Allocated,
            _ => tool.status == ToolStatus::Allocated,
        };
        if !should_write {
            return Ok(None);
        }

        self.tools.update_status(tool_id, target).await?;
        Ok(Some(ToolStatusChange {
            tool_id,
            previous: tool.status,
            held: target == ToolStatus::Allocated,
        }))
    }

    async fn rollback(&self, applied: Vec<ToolStatusChange>) {
        for change in applied.into_iter().rev() {
            // Uma gravação concorrente pode ter passado a segurar a mesma
            // ferramenta entre o "alocada" e a falha: ela fica alocada.
            if change.held {
                match self.store.tool_has_other_active(change.tool_id, None).await {
                    Ok(false) => {}
                    Ok(true) => {
                        tracing::debug!(
                            "Ferramenta {} segue alocada por outra alocação ativa",
                            change.tool_id
                        );
                        continue;
                    }
                    Err(e) => {
                        tracing::error!(
                            "🔥 Falha ao verificar quem segura a ferramenta {}: {:?}",
                            change.tool_id,
                            e
                        );
                        continue;
                    }
                }
            }

            if let Err(e) = self.tools.update_status(change.tool_id, change.previous).await {
                tracing::error!(
                    "🔥 Falha ao restaurar o status da ferramenta {}: {:?}",
                    change.tool_id,
                    e
                );
            } else {
                tracing::warn!(
                    "Status da ferramenta {} restaurado para {:?}",
                    change.tool_id,
                    change.previous
                );
            }
        }
    }

    async fn resolve(&self, allocation: Allocation) -> Result<AllocationDetail, AppError> {
        let (tool, cost_center, employee) = tokio::try_join!(
            self.tools.find_by_id(allocation.tool_id),
            self.cost_centers.find_by_id(allocation.cost_center_id),
            self.employees.find_by_id(allocation.employee_id),
        )?;

        Ok(AllocationDetail { allocation, tool, cost_center, employee })
    }

    // Na listagem as mesmas referências se repetem muito; cada ID é buscado uma vez.
    async fn resolve_all(&self, allocations: Vec<Allocation>) -> Result<Vec<AllocationDetail>, AppError> {
        let mut tools: HashMap<i32, Option<Tool>> = HashMap::new();
        let mut cost_centers: HashMap<i32, Option<CostCenter>> = HashMap::new();
        let mut employees: HashMap<i32, Option<Employee>> = HashMap::new();
        let mut details = Vec::with_capacity(allocations.len());

        for allocation in allocations {
            if !tools.contains_key(&allocation.tool_id) {
                let tool = self.tools.find_by_id(allocation.tool_id).await?;
                tools.insert(allocation.tool_id, tool);
            }
            if !cost_centers.contains_key(&allocation.cost_center_id) {
                let cost_center = self.cost_centers.find_by_id(allocation.cost_center_id).await?;
                cost_centers.insert(allocation.cost_center_id, cost_center);
            }
            if !employees.contains_key(&allocation.employee_id) {
                let employee = self.employees.find_by_id(allocation.employee_id).await?;
                employees.insert(allocation.employee_id, employee);
            }

            details.push(AllocationDetail {
                tool: tools.get(&allocation.tool_id).cloned().flatten(),
                cost_center: cost_centers.get(&allocation.cost_center_id).cloned().flatten(),
                employee: employees.get(&allocation.employee_id).cloned().flatten(),
                allocation,
            });
        }

        Ok(details)
    }
}
