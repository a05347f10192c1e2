mod comment;
mod pagination;
mod product;
pub mod rating;
pub mod user;

pub use comment::*;
pub use pagination::*;
pub use product::*;
pub use rating::*;
pub use user::*;
