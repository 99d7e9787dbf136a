pub mod day_validation;
pub mod day_view;
pub mod file_delete;
pub mod health;
pub mod photo_upload;
pub mod rules;
pub mod video_upload;
