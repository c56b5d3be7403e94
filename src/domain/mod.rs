// src/domain/mod.rs

pub mod access;
pub mod homework;
pub mod quiz;
