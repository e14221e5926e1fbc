mod ftype;
mod parts;
mod schema;

pub use ftype::FType;
pub use parts::FTypeParts;
pub use schema::Schema;
