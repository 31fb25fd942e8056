pub mod tool_repo;
pub use tool_repo::ToolRepository;
pub mod cost_center_repo;
pub use cost_center_repo::CostCenterRepository;
pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod allocation_repo;
pub use allocation_repo::AllocationRepository;

// Backend sem banco (dev local e testes)
pub mod memory;
pub use memory::MemoryDatabase;
