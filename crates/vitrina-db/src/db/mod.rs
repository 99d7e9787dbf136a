//! Database repositories for the data access layer.
//!
//! Each repository owns a pool handle and is responsible for one domain
//! entity. Multi-step mutations (version flips, day status recomputation)
//! run inside a single transaction so readers never observe two current
//! versions in a group or a cached status inconsistent with the committed
//! file set.

pub mod alerts;
pub mod rules;
pub mod store;
pub mod transaction;
pub mod upload_day;
pub mod upload_file;

pub use alerts::AlertRepository;
pub use rules::RuleRepository;
pub use store::StoreRepository;
pub use transaction::with_transaction;
pub use upload_day::UploadDayRepository;
pub use upload_file::{NewUploadFile, UploadFileRepository};
