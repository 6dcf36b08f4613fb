// Content sniffing for the cached artifact.

pub mod image;
