//! Storage-free rules of the order lifecycle: status machine, pricing and
//! the tracking timeline projection. Services apply these inside their
//! transactions; nothing here touches the database.

pub mod order_status;
pub mod pricing;
pub mod tracking;
