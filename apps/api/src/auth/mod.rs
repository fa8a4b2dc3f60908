// Identity: password hashing, JWT issuance/verification, and account
// provisioning for both credential and OAuth sign-in paths.

pub mod credentials;
pub mod handlers;
pub mod provisioning;
pub mod token;
