// src/lib.rs

// API de rateio de ferramentas: alocação de ferramentas a funcionários,
// cobrada de centros de custo.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
