pub mod antivirus;
pub mod config;
pub mod db;
pub mod error;
pub mod mail;
pub mod models;
pub mod queue;
pub mod service;
pub mod storage;
pub mod worker;
