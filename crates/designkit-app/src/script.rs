//! Scripted editing sessions.
//!
//! A script is a JSON array of [`EditorAction`]s run in order against an
//! [`Editor`], for example:
//!
//! ```json
//! [
//!   { "action": "add_shape", "shape": "circle" },
//!   { "action": "click", "x": 150, "y": 150 },
//!   { "action": "edit", "changes": { "fillColor": "#ff0000" } },
//!   { "action": "save", "title": "Poster" },
//!   { "action": "export", "path": "poster.png" }
//! ]
//! ```

use crate::editor::{Editor, EditorError};
use designkit_core::{DesignGateway, ObjectPatch, ShapeKind};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Script errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Editor(#[from] EditorError),
}

/// One step of a scripted session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditorAction {
    AddShape { shape: ShapeKind },
    AddText,
    AddImage { src: String },
    /// Press and release without moving.
    Click { x: f64, y: f64 },
    /// Press at `from`, move to `to`, release.
    Drag { from: [f64; 2], to: [f64; 2] },
    DoubleClick { x: f64, y: f64 },
    /// Finish in-place text editing with new content.
    CommitText { text: String },
    Edit { changes: ObjectPatch },
    Delete,
    BringForward,
    SendBackward,
    Undo,
    Redo,
    Save { title: String },
    Refresh,
    /// Open a listed design by id or title.
    Open { design: String },
    NewDesign,
    AddCollaborator { email: String },
    Export { path: PathBuf },
}

pub fn parse_script(json: &str) -> Result<Vec<EditorAction>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// Run actions in order.
///
/// Persistence failures are reported through the editor's notifications and
/// do not stop the script; export failures do.
pub async fn run_script<G: DesignGateway>(
    editor: &mut Editor<G>,
    actions: &[EditorAction],
) -> Result<(), ScriptError> {
    for (step, action) in actions.iter().enumerate() {
        log::debug!("Step {}: {:?}", step + 1, action);
        if let Err(e) = run_action(editor, action).await {
            match e {
                ScriptError::Editor(e) => log::warn!("Step {} failed: {}", step + 1, e),
                e => return Err(e),
            }
        }
    }
    Ok(())
}

async fn run_action<G: DesignGateway>(
    editor: &mut Editor<G>,
    action: &EditorAction,
) -> Result<(), ScriptError> {
    match action {
        EditorAction::AddShape { shape } => {
            editor.add_shape(*shape);
        }
        EditorAction::AddText => {
            editor.add_text();
        }
        EditorAction::AddImage { src } => {
            editor.add_image(src);
        }
        EditorAction::Click { x, y } => {
            let point = Point::new(*x, *y);
            editor.pointer_down(point);
            editor.pointer_up(point);
        }
        EditorAction::Drag { from, to } => {
            editor.pointer_down(Point::new(from[0], from[1]));
            editor.pointer_move(Point::new(to[0], to[1]));
            editor.pointer_up(Point::new(to[0], to[1]));
        }
        EditorAction::DoubleClick { x, y } => editor.double_click(Point::new(*x, *y)),
        EditorAction::CommitText { text } => editor.store_mut().commit_text_edit(text.clone()),
        EditorAction::Edit { changes } => editor.edit_selected(changes),
        EditorAction::Delete => editor.delete_selected(),
        EditorAction::BringForward => editor.bring_forward(),
        EditorAction::SendBackward => editor.send_backward(),
        EditorAction::Undo => editor.undo(),
        EditorAction::Redo => editor.redo(),
        EditorAction::Save { title } => {
            editor.save(title).await?;
        }
        EditorAction::Refresh => {
            editor.refresh_designs().await?;
        }
        EditorAction::Open { design } => {
            let id = editor
                .designs()
                .iter()
                .find(|d| &d.id == design || &d.title == design)
                .map(|d| d.id.clone())
                .ok_or_else(|| EditorError::UnknownDesign(design.clone()))?;
            editor.open_design(&id)?;
        }
        EditorAction::NewDesign => editor.new_design(),
        EditorAction::AddCollaborator { email } => {
            editor.add_collaborator(email).await?;
        }
        EditorAction::Export { path } => {
            let png_data = editor.export_png_bytes()?;
            std::fs::write(path, &png_data).map_err(|source| ScriptError::Io {
                path: path.clone(),
                source,
            })?;
            log::info!("Exported PNG to: {:?}", path);
        }
    }
    Ok(())
}
