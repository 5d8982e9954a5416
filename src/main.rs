use anyhow::{Context, Result};
use funnel_editor::component::data_patch;
use funnel_editor::{init_logging, EditorSettings, FileStore, FunnelEditor, PageKind};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    init_logging()?;

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("funnel-editor.json"));
    let settings = EditorSettings::load_from_file(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    let store = FileStore::open(&settings.storage_dir)?;
    let mut editor = FunnelEditor::open(store, &settings);
    info!(
        source = ?editor.restore_source(),
        pages = editor.funnel().page_count(),
        "session started"
    );

    // Drop a button at the end of the current page, then drag it to the top
    let end = editor.current_page().map_or(0, |page| page.len());
    editor.begin_palette_drag("button");
    editor.drag_over(end);
    editor.drop();

    if let Some(button_id) = editor.selection().component_id().map(str::to_string) {
        editor.edit_selected_data(data_patch(json!({ "text": "Start the quiz" })));
        editor.begin_canvas_drag(&button_id);
        editor.drag_over(0);
        editor.drop();
    }

    editor.add_page(PageKind::Question);
    editor.undo();
    editor.redo();

    editor.flush()?;

    if let Some(label) = editor.history().undo_label() {
        info!(next_undo = %label, "history");
    }
    info!(
        funnel = editor.funnel().name(),
        pages = editor.funnel().page_count(),
        components = editor.funnel().component_count(),
        edits = editor.events().len(),
        "session saved"
    );

    Ok(())
}
