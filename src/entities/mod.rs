pub mod prelude;

pub mod reviews;
pub mod users;
