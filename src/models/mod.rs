pub mod record;

pub use record::{FieldValue, Record};
