mod ser;

pub use ser::ValueRef;
