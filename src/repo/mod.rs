pub mod board;
pub mod pipeline;
pub mod stage;
pub mod deal;
pub mod template;
pub mod category;
pub mod field_group;

pub use board::*;
pub use pipeline::*;
pub use stage::*;
pub use deal::*;
pub use template::*;
pub use category::*;
pub use field_group::*;
