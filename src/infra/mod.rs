pub mod chrome;

pub use chrome::{ChromeLauncher, ChromeSession};
