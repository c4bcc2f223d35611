pub mod responses;
pub mod search;

pub use responses::*;
pub use search::*;
