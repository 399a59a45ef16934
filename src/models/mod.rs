pub mod dynamic_config;
pub mod pagination;
pub mod user;
pub mod version;

pub use dynamic_config::{ConfigType, DynamicConfig, DynamicConfigForm, DynamicConfigResponse};
pub use pagination::{Page, Pagination};
pub use user::{
    Claims, LoginRequest, LoginResponse, RefreshRequest, TokenPairResponse, TokenType,
    UpdateUserRequest, User, UserResponse,
};
pub use version::{
    AppVersion, AppVersionForm, AppVersionResponse, Platform, VersionCheck, VersionCheckRequest,
};
