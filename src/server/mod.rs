// HTTP surface.

pub mod handler;
pub mod page;
