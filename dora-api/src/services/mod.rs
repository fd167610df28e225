pub mod alert_service;
pub mod alert_store;
pub mod alert_validator;
pub mod auth_service;
pub mod contact_resolver;
pub mod dispatcher;
pub mod token_service;
