pub mod dynamic_config;
pub mod user;
pub mod version;

pub use dynamic_config::DynamicConfigService;
pub use user::UserService;
pub use version::VersionService;
