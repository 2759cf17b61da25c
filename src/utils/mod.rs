pub mod date;
pub mod duration;

pub use date::parse_date_expr;
pub use duration::{parse_duration, parse_time_spent};
