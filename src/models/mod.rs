// src/models/mod.rs

pub mod access_code;
pub mod course;
pub mod homework;
pub mod progress;
pub mod question;
pub mod student;
