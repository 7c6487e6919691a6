pub mod ticket_service;
