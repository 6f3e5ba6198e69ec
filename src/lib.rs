pub mod cli;
pub mod endpoint;
pub mod i18n;
pub mod logging;
pub mod login;
pub mod logout;
pub mod platform;
pub mod settings;
pub mod ui;
