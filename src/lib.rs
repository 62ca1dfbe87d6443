#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dump;
pub mod layout;
pub mod spec;

pub use config::{LayoutConfig, load_config};
pub use layout::{LayoutKind, LayoutResult, compute_layout, select_layout, usable_rect};
pub use spec::{CanvasConfig, DiagramSpec, SpecError, parse_spec};

#[cfg(feature = "cli")]
pub use cli::run;
