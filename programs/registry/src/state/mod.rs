pub mod delegation;
pub mod oracle;
pub mod rate_data;
pub mod settlement;

pub use delegation::*;
pub use oracle::*;
pub use rate_data::*;
pub use settlement::*;
