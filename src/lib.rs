// Funnel Editor - Core Library

pub mod autosave;
pub mod component;
pub mod drag;
pub mod editor;
pub mod event;
pub mod funnel;
pub mod history;
pub mod id_generator;
pub mod mutation;
pub mod persistence;
pub mod selection;
pub mod settings;
pub mod validation;

// Re-export main types for convenience
pub use autosave::Autosave;
pub use component::{
    create_default_component, Component, ComponentData, ComponentType, DataPatch, Style,
    StylePatch,
};
pub use drag::{DragController, DragSession, DragSource, Rectangle};
pub use editor::FunnelEditor;
pub use event::{EventType, FunnelEvent};
pub use funnel::{Funnel, Page, PageKind};
pub use history::History;
pub use mutation::{Edit, PagePatch};
pub use persistence::{
    EditorConfig, FileStore, KeyValueStore, MemoryStore, RestoreSource, Restored,
};
pub use selection::{PanelSection, PropertyEdit, Selection};
pub use settings::EditorSettings;
pub use validation::{ValidatedFunnel, ValidationIssue, ValidationResult, ValidationSeverity};

/// Install the global tracing subscriber
///
/// `RUST_LOG` directives are honoured; the default level is `info`.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
