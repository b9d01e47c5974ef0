pub mod settings_loader;
