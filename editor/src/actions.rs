//! Undoable session actions.
//!
//! Each action stores whatever it needs to revert itself: the removed shader,
//! the tab position it occupied, the replaced code or settings.

use shaderbox_core::undo::{CreateAction, ExecutableAction};

use crate::session::{Session, Settings, Shader};

/// Adds a shader (or replaces the one with the same name).
#[derive(Debug)]
pub struct AddShader {
    shader: Shader,
    position: Option<usize>,
    replaced: Option<Shader>,
    selected: Option<String>,
}

impl ExecutableAction<Session> for AddShader {
    type Output = ();

    fn execute(&mut self, target: &mut Session) {
        self.replaced = target.shader(&self.shader.name).cloned();
        self.selected = target.current().map(|s| s.name.clone());
        target.add_shader(self.shader.clone(), self.position);
    }

    fn undo(&mut self, target: &mut Session) {
        match self.replaced.clone() {
            Some(previous) => target.add_shader(previous, None),
            None => {
                let (_, position) = target.delete_shader(&self.shader.name);
                self.position = position;
            }
        }
        target.select(self.selected.as_deref());
    }

    fn description(&self) -> String {
        format!("Add Shader {}", self.shader.name)
    }
}

impl CreateAction<Session> for AddShader {
    type Args = (Shader, Option<usize>);

    fn create((shader, position): Self::Args) -> Self {
        Self {
            shader,
            position,
            replaced: None,
            selected: None,
        }
    }
}

/// Deletes a shader. Returns the deleted shader, `None` if there was none
/// (in which case nothing is recorded).
#[derive(Debug)]
pub struct DeleteShader {
    name: String,
    deleted: Option<Shader>,
    position: Option<usize>,
    selected: Option<String>,
}

impl ExecutableAction<Session> for DeleteShader {
    type Output = Option<Shader>;

    fn execute(&mut self, target: &mut Session) -> Option<Shader> {
        self.selected = target.current().map(|s| s.name.clone());
        let (shader, position) = target.delete_shader(&self.name);
        self.deleted = shader.clone();
        self.position = position;
        shader
    }

    fn undo(&mut self, target: &mut Session) {
        if let Some(shader) = self.deleted.clone() {
            target.add_shader(shader, self.position);
            target.select(self.selected.as_deref());
        }
    }

    fn description(&self) -> String {
        format!("Delete Shader {}", self.name)
    }

    fn is_undo_enabled(&self) -> bool {
        self.deleted.is_some()
    }
}

impl CreateAction<Session> for DeleteShader {
    type Args = String;

    fn create(name: String) -> Self {
        Self {
            name,
            deleted: None,
            position: None,
            selected: None,
        }
    }
}

/// Replaces the code of a shader. Returns the previous code.
///
/// Consecutive edits of the same shader merge into one history entry.
#[derive(Debug)]
pub struct UpdateShaderCode {
    name: String,
    code: String,
    previous: Option<String>,
}

impl ExecutableAction<Session> for UpdateShaderCode {
    type Output = Option<String>;

    fn execute(&mut self, target: &mut Session) -> Option<String> {
        let previous = target.update_code(&self.name, self.code.clone());
        // A redo after merging must not forget the code from before the
        // first edit.
        if self.previous.is_none() {
            self.previous = previous.clone();
        }
        previous
    }

    fn undo(&mut self, target: &mut Session) {
        if let Some(previous) = self.previous.clone() {
            target.update_code(&self.name, previous);
        }
    }

    fn description(&self) -> String {
        format!("Edit Shader {}", self.name)
    }

    fn is_undo_enabled(&self) -> bool {
        self.previous.is_some()
    }

    fn merge(&mut self, next: &Self) -> bool {
        if self.name != next.name {
            return false;
        }
        self.code = next.code.clone();
        true
    }
}

impl CreateAction<Session> for UpdateShaderCode {
    type Args = (String, String);

    fn create((name, code): Self::Args) -> Self {
        Self {
            name,
            code,
            previous: None,
        }
    }
}

/// Replaces the settings as a whole.
#[derive(Debug)]
pub struct UpdateSettings {
    settings: Settings,
    previous: Option<Settings>,
}

impl ExecutableAction<Session> for UpdateSettings {
    type Output = ();

    fn execute(&mut self, target: &mut Session) {
        self.previous = Some(target.replace_settings(self.settings.clone()));
    }

    fn undo(&mut self, target: &mut Session) {
        if let Some(previous) = self.previous.clone() {
            target.replace_settings(previous);
        }
    }

    fn description(&self) -> String {
        "Update Settings".into()
    }
}

impl CreateAction<Session> for UpdateSettings {
    type Args = Settings;

    fn create(settings: Settings) -> Self {
        Self {
            settings,
            previous: None,
        }
    }
}
