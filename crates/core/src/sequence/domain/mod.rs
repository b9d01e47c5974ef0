pub mod discovery_error;
pub mod frame_locator;
pub mod frame_sequence;
