// src/lib.rs

//! siteprint — crawls a website, clusters pages by structural template,
//! and produces one blueprint entry per template so expensive semantic
//! analysis runs once per distinct page structure.

pub mod dom;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
