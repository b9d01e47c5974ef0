pub mod process_encoder;
