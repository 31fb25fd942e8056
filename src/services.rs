pub mod allocation_rules;
pub mod allocation_service;
pub use allocation_service::AllocationManager;
pub mod catalog_service;
pub use catalog_service::CatalogService;
pub mod ports;
