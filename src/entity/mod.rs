pub mod audit_logs;
pub mod bill_plates;
pub mod bills;
pub mod plate_categories;
pub mod plates;
pub mod reservations;
pub mod reviews;
pub mod table_areas;
pub mod tables;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use bill_plates::Entity as BillPlates;
pub use bills::Entity as Bills;
pub use plate_categories::Entity as PlateCategories;
pub use plates::Entity as Plates;
pub use reservations::Entity as Reservations;
pub use reviews::Entity as Reviews;
pub use table_areas::Entity as TableAreas;
pub use tables::Entity as Tables;
pub use users::Entity as Users;
