mod format;
mod path;

pub use format::{format_percent, format_size, format_timestamp, now_timestamp, percent};
pub use path::{join_path, segment_key, split_path};
