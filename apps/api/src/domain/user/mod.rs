// User domain module
// Users are owned by an external subsystem; this core only reads them

pub mod value_objects;

pub use value_objects::Email;
