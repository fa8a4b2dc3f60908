// Portfolio entries and their nested projects. All writes funnel through
// `representative.rs` so the one-representative-per-resume rule is enforced
// in exactly one place.

pub mod handlers;
pub mod projects;
pub mod representative;
