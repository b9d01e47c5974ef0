pub mod image_decoder;
pub mod oiiotool_color_transformer;
