pub use self::body_limit::BodyLimitMiddleware;
pub use self::error::ErrorMiddleware;
pub use self::sentry::SentryMiddleware;

mod body_limit;
mod error;
mod sentry;
