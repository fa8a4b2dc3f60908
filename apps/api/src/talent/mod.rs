// Company-facing talent discovery: the search read model over student
// portfolios and the connect-request write path with its notification.

pub mod connect;
pub mod handlers;
pub mod search;
