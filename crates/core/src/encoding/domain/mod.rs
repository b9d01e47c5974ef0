pub mod encoder_command;
pub mod encoder_sink;
