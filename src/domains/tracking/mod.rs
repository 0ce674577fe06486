pub mod cache;
pub mod events;
pub mod fanout;
pub mod ports;
pub mod proximity;
pub mod sample;

pub use cache::*;
pub use events::*;
pub use fanout::*;
pub use ports::*;
pub use proximity::*;
pub use sample::*;
