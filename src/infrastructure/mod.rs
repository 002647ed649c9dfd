//! Infrastructure layer
//!
//! Holds the scarce resource (the browser page) and exposes capabilities only.

pub mod page_driver;

pub use page_driver::PageDriver;
