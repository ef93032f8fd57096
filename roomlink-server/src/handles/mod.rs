mod control_handle;
mod health_handle;
mod reading_handle;
mod stream_handle;

pub use control_handle::*;
pub use health_handle::*;
pub use reading_handle::*;
pub use stream_handle::*;
