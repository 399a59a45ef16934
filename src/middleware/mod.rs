pub mod auth;

pub use auth::{AdminMiddleware, AuthMiddleware, AuthUser, MaybeUser, OptionalAuthMiddleware};
