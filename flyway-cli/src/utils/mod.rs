pub mod template;

pub use template::expand_env_vars;
