pub mod datapoint_handler;

pub use datapoint_handler::{DatapointHandler, DatapointHandlerState, handle_datapoint_upload};
