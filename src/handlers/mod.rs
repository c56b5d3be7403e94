// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod codes;
pub mod courses;
pub mod homework;
pub mod progress;
pub mod quiz;
