pub mod glob_frame_locator;
