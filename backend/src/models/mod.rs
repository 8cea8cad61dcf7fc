pub mod enrollment;
pub mod error;
pub mod macros;
pub mod member;
pub mod offering;
pub mod period;
pub mod time_block;
pub mod workshop;

pub use enrollment::*;
pub use error::*;
pub use member::*;
pub use offering::*;
pub use period::*;
pub use time_block::*;
pub use workshop::*;
