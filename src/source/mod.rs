// Remote image sources. Only HTTP exists today; tests plug in their own.

pub mod http_source;
pub mod traits;
