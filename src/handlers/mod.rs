// src/handlers/mod.rs

pub mod assessments;
pub mod auth;
pub mod certificates;
pub mod courses;
pub mod payments;
pub mod progress;
pub mod settings;
pub mod sites;
pub mod users;
