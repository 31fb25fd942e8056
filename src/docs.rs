// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Rateio de Ferramentas", description = "Alocação de ferramentas a funcionários e centros de custo"),
    paths(
        // --- ALOCAÇÕES ---
        handlers::allocations::create_allocation,
        handlers::allocations::list_allocations,
        handlers::allocations::get_allocation,
        handlers::allocations::update_allocation,
        handlers::allocations::delete_allocation,
        handlers::allocations::deallocate,
        handlers::allocations::list_by_employee,
        handlers::allocations::list_by_tool,
        handlers::allocations::list_by_cost_center,
        handlers::allocations::list_by_period,

        // --- CATÁLOGO ---
        handlers::catalog::create_tool,
        handlers::catalog::list_tools,
        handlers::catalog::get_tool,
        handlers::catalog::delete_tool,
        handlers::catalog::create_cost_center,
        handlers::catalog::list_cost_centers,
        handlers::catalog::get_cost_center,
        handlers::catalog::delete_cost_center,
        handlers::catalog::create_employee,
        handlers::catalog::list_employees,
        handlers::catalog::get_employee,
        handlers::catalog::delete_employee,
    ),
    components(
        schemas(
            // --- Alocações ---
            models::allocation::Allocation,
            models::allocation::AllocationDetail,
            handlers::allocations::CreateAllocationPayload,
            handlers::allocations::UpdateAllocationPayload,
            handlers::allocations::DeallocatePayload,

            // --- Catálogo ---
            models::catalog::ToolStatus,
            models::catalog::Tool,
            models::catalog::CostCenter,
            models::catalog::Employee,
            handlers::catalog::CreateToolPayload,
            handlers::catalog::CreateCostCenterPayload,
            handlers::catalog::CreateEmployeePayload,
        )
    ),
    tags(
        (name = "Alocações", description = "Alocação de ferramentas (validação de período e status)"),
        (name = "Catálogo", description = "Ferramentas, centros de custo e funcionários")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_allocation_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/api/alocacoes"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/alocacoes/{id}/desalocar"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/funcionarios/{id}"));
    }
}
