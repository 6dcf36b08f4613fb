// Todo records and their storage.

pub mod model;
pub mod store;
