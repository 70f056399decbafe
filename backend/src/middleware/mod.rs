pub mod actor;
pub mod logging;
pub mod request_id;

pub use actor::*;
pub use logging::*;
pub use request_id::*;
