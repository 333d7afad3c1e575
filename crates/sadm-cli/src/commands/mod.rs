pub mod flatten;
pub mod id;
pub mod schema;
pub mod validate;
