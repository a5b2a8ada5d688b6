mod bot_driver;
mod dispatcher;
mod idle;

pub use bot_driver::*;
pub use dispatcher::*;
pub use idle::*;
