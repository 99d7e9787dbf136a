//! Vitrina database layer: Postgres repositories for rules, stores, upload
//! days, upload files, and missing-upload alerts.

pub mod db;

pub use db::{
    AlertRepository, NewUploadFile, RuleRepository, StoreRepository, UploadDayRepository,
    UploadFileRepository,
};
