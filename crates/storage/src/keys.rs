//! Fixed names under which the three records live.

pub const PROGRESS_KEY: &str = "skilltrail_progress";
pub const NOTES_KEY: &str = "skilltrail_notes";
pub const POSITION_KEY: &str = "skilltrail_position";

pub const ALL: [&str; 3] = [PROGRESS_KEY, NOTES_KEY, POSITION_KEY];
