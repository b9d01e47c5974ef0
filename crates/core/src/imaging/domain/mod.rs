pub mod color_plan;
pub mod color_transformer;
pub mod crop_mask;
pub mod frame_decoder;
pub mod frame_transform;
pub mod geometry;
pub mod resize_filter;
pub mod working_image;
