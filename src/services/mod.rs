pub mod chooser;
pub mod notifier;
pub mod signing;
pub mod transport;
pub mod uploader;
