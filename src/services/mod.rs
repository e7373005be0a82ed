pub mod auth_service;
pub mod bill_service;
pub mod kitchen_service;
pub mod menu_service;
pub mod reservation_service;
pub mod review_service;
pub mod table_service;
pub mod user_service;
