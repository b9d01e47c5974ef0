pub mod constants;
pub mod error;
pub mod frame_ref;
pub mod pixel_buffer;
