pub mod codec_settings;
pub mod config_error;
pub mod global_settings;
pub mod scalar;
pub mod settings_document;
