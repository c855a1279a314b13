pub mod handlers;
pub mod indexers;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
