pub mod allocations;
pub mod catalog;
