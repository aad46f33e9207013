//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod dirs;
pub mod export;
pub mod fixture;
pub mod runtime;
pub mod settings;

pub use dirs::{ensure_log_dir, get_cache_dir, get_log_dir};
pub use export::{export_to_path, write_rows};
pub use fixture::{JsonChangeLog, JsonPageSource};
pub use runtime::TokioExecutor;
pub use settings::{
    ensure_settings_file, get_settings_path, load_settings, load_settings_from,
    write_default_settings,
};
