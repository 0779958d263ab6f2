mod configuration;
mod resolve_config;

pub use configuration::Configuration;
pub use configuration::JavaStyle;
pub use resolve_config::config_key_map_from_json;
pub use resolve_config::resolve_config;
