//! Domain models shared across Vitrina components.

pub mod day_view;
pub mod protocol;
pub mod requirement;
pub mod store;
pub mod upload_day;
pub mod upload_file;

pub use day_view::{DayViewResponse, SlotCoverage};
pub use protocol::{
    FileCommitResponse, VideoChunkRequest, VideoChunkResponse, VideoFinalizeRequest,
    VideoInitRequest, VideoInitResponse,
};
pub use requirement::{
    ReplaceRulesRequest, RequirementKind, RequirementRule, RuleScope, WeekdayRuleInput,
};
pub use store::{Cluster, Store};
pub use upload_day::{DayStatus, UploadDay};
pub use upload_file::{UploadFile, UploadFileInfo, UploadKind};
