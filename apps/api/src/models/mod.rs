// Database row types, one file per table cluster.
// Handlers return these directly except for `UserRow`, which is mapped
// through `UserResponse` so the password hash never reaches a client.

pub mod connect;
pub mod portfolio;
pub mod resume;
pub mod user;
