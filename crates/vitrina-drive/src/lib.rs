//! Google Drive client surface for Vitrina.
//!
//! Defines the [`DriveClient`] trait the upload flows program against, an
//! HTTP implementation over the Drive v3 REST API, and the deterministic
//! destination folder path builder.

pub mod http;
pub mod path;
pub mod traits;

pub use http::HttpDriveClient;
pub use path::day_folder_segments;
pub use traits::{ChunkOutcome, DriveClient, DriveError, DriveFileMeta, DriveResult};
