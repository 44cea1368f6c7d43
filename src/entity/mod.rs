pub mod audit_logs;
pub mod cart_items;
pub mod carts;
pub mod coupons;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod tracking_events;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use coupons::Entity as Coupons;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use tracking_events::Entity as TrackingEvents;
pub use users::Entity as Users;
