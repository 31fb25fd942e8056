// src/routes.rs

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

/// O router completo da API (sem o listener), usado pelo main e pelos testes.
pub fn app(app_state: AppState) -> Router {
    let allocation_routes = Router::new()
        .route("/"
               ,post(handlers::allocations::create_allocation)
               .get(handlers::allocations::list_allocations)
        )
        .route("/periodo", get(handlers::allocations::list_by_period))
        .route("/funcionario/{id}", get(handlers::allocations::list_by_employee))
        .route("/ferramenta/{id}", get(handlers::allocations::list_by_tool))
        .route("/centro-custo/{id}", get(handlers::allocations::list_by_cost_center))
        .route("/{id}"
               ,get(handlers::allocations::get_allocation)
               .patch(handlers::allocations::update_allocation)
               .delete(handlers::allocations::delete_allocation)
        )
        .route("/{id}/desalocar", post(handlers::allocations::deallocate));

    let tool_routes = Router::new()
        .route("/"
               ,post(handlers::catalog::create_tool)
               .get(handlers::catalog::list_tools)
        )
        .route("/{id}"
               ,get(handlers::catalog::get_tool)
               .delete(handlers::catalog::delete_tool)
        );

    let cost_center_routes = Router::new()
        .route("/"
               ,post(handlers::catalog::create_cost_center)
               .get(handlers::catalog::list_cost_centers)
        )
        .route("/{id}"
               ,get(handlers::catalog::get_cost_center)
               .delete(handlers::catalog::delete_cost_center)
        );

    let employee_routes = Router::new()
        .route("/"
               ,post(handlers::catalog::create_employee)
               .get(handlers::catalog::list_employees)
        )
        .route("/{id}"
               ,get(handlers::catalog::get_employee)
               .delete(handlers::catalog::delete_employee)
        );

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/alocacoes", allocation_routes)
        .nest("/api/ferramentas", tool_routes)
        .nest("/api/centros-custo", cost_center_routes)
        .nest("/api/funcionarios", employee_routes)
        .with_state(app_state)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
}
