mod command_relay;
mod device_client;
mod fanout;
mod poller;
mod state_cache;

pub use command_relay::*;
pub use device_client::*;
pub use fanout::*;
pub use poller::*;
pub use state_cache::*;
