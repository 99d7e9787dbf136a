//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use vitrina_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vitrina API",
        version = "0.1.0",
        description = "Daily store upload tracking: resumable video uploads, photo slots, requirement rules, and per-day completion status backed by a shared Google Drive tree."
    ),
    paths(
        // Uploads
        handlers::video_upload::init_video_upload,
        handlers::video_upload::relay_video_chunk,
        handlers::video_upload::finalize_video_upload,
        handlers::photo_upload::upload_photo,
        handlers::file_delete::delete_upload_file,
        // Days
        handlers::day_view::get_day_view,
        handlers::day_validation::validate_day,
        handlers::day_validation::unvalidate_day,
        // Rules
        handlers::rules::replace_upload_rules,
        // Health
        handlers::health::health,
    ),
    components(
        schemas(
            models::requirement::RequirementKind,
            models::requirement::RuleScope,
            models::requirement::WeekdayRuleInput,
            models::requirement::ReplaceRulesRequest,
            models::upload_day::DayStatus,
            models::upload_file::UploadKind,
            models::upload_file::UploadFileInfo,
            models::day_view::SlotCoverage,
            models::day_view::DayViewResponse,
            models::protocol::VideoInitRequest,
            models::protocol::VideoInitResponse,
            models::protocol::VideoChunkRequest,
            models::protocol::VideoChunkResponse,
            models::protocol::VideoFinalizeRequest,
            models::protocol::FileCommitResponse,
            handlers::rules::ReplaceRulesResponse,
            handlers::day_validation::DayValidationResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "uploads", description = "Photo and resumable video uploads"),
        (name = "days", description = "Per-store per-date completion tracking"),
        (name = "rules", description = "Weekday requirement rules"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_contains_all_core_paths() {
        let spec = get_openapi_spec();
        for path in [
            "/upload/video/init",
            "/upload/video/chunk",
            "/upload/video/finalize",
            "/upload/photo",
            "/upload/file/{id}",
            "/day-view",
            "/day/{id}/validate",
            "/day/{id}/unvalidate",
            "/upload-rules",
            "/health",
        ] {
            assert!(
                spec.paths.paths.contains_key(path),
                "missing path {} in OpenAPI spec",
                path
            );
        }
    }
}
