pub use super::reviews::Entity as Reviews;
pub use super::users::Entity as Users;
