pub mod allocation;
pub mod catalog;
