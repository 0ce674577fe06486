pub mod dispatcher;
pub mod fleet;
pub mod ports;
pub mod trajectory;

pub use dispatcher::*;
pub use fleet::*;
pub use ports::*;
pub use trajectory::*;
