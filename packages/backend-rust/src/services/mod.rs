pub mod entries;
pub mod feedback;
pub mod privacy;
pub mod user_context;
pub mod validation;
