pub mod cache;
pub mod db;
pub mod historydb;
pub mod responsedb;
pub mod ticketdb;
