pub mod work_item;

pub use work_item::{sanitize_file_name, WorkItem};
