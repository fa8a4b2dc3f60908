// Resume basic info plus the append-only award/education records, and the
// read side that assembles a full resume for the detail endpoint.

pub mod aggregation;
pub mod handlers;
