pub mod extract;
pub mod filter;
pub mod quantize;
pub mod running;
pub mod splitter;
