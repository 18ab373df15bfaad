use std::io::{self, BufRead, Write};

use shaderbox_core::undo::UndoManager;

use crate::actions::{AddShader, DeleteShader, UpdateSettings, UpdateShaderCode};
use crate::commands::{self, Command, CommandError};
use crate::config::EditorConfig;
use crate::history_panel;
use crate::session::{DEFAULT_SHADER_CODE, Session, Settings, Shader};

/// The shader editor: a session plus its undo history.
///
/// Every change to the session goes through the history so it can be
/// undone. Multi-step operations (rename, duplicate) are wrapped in
/// transactions and undo as one step.
pub struct Editor {
    session: Session,
    history: UndoManager<Session>,
}

impl Editor {
    pub fn new(config: &EditorConfig, with_examples: bool) -> Self {
        let session = if with_examples {
            Session::with_examples(config.settings.clone())
        } else {
            Session::new(config.settings.clone())
        };

        let mut history = UndoManager::new().with_max_undo(config.history.max_undo);
        if !config.history.enabled {
            history.disable();
        }

        log::info!(
            "Editor ready with {} shader(s), history {}",
            session.len(),
            if history.is_enabled() { "enabled" } else { "disabled" }
        );
        Self { session, history }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &UndoManager<Session> {
        &self.history
    }

    // ---------------------------------------------------------------------
    // Shader operations
    // ---------------------------------------------------------------------

    pub fn new_shader(&mut self, name: &str, code: Option<String>) -> Result<(), CommandError> {
        if self.session.contains(name) {
            return Err(CommandError::ShaderExists(name.to_owned()));
        }
        let code = code.unwrap_or_else(|| DEFAULT_SHADER_CODE.to_owned());
        self.history
            .execute_action::<AddShader>((Shader::new(name, code), None), &mut self.session);
        Ok(())
    }

    pub fn delete_shader(&mut self, name: &str) -> Result<Shader, CommandError> {
        self.history
            .execute_action::<DeleteShader>(name.to_owned(), &mut self.session)
            .ok_or_else(|| CommandError::NoSuchShader(name.to_owned()))
    }

    /// Renames a shader, keeping its tab position. One undo step.
    pub fn rename_shader(&mut self, from: &str, to: &str) -> Result<(), CommandError> {
        let Some(position) = self.session.tab_position(from) else {
            return Err(CommandError::NoSuchShader(from.to_owned()));
        };
        if self.session.contains(to) {
            return Err(CommandError::ShaderExists(to.to_owned()));
        }

        self.history.begin_tx(format!("Rename {from} to {to}"));
        let deleted = self
            .history
            .execute_action::<DeleteShader>(from.to_owned(), &mut self.session);
        if let Some(shader) = deleted {
            self.history.execute_action::<AddShader>(
                (Shader::new(to, shader.code), Some(position)),
                &mut self.session,
            );
        }
        self.history.commit_tx();
        Ok(())
    }

    /// Adds a copy of `name` called `to` right after it. The copy is added
    /// under a scratch name and renamed, so this records a transaction
    /// nested inside another.
    pub fn duplicate_shader(&mut self, name: &str, to: &str) -> Result<(), CommandError> {
        let Some(source) = self.session.shader(name).cloned() else {
            return Err(CommandError::NoSuchShader(name.to_owned()));
        };
        if self.session.contains(to) {
            return Err(CommandError::ShaderExists(to.to_owned()));
        }

        let scratch = self.scratch_name(name, to);
        let position = self.session.tab_position(name).map(|p| p + 1);

        self.history.begin_tx(format!("Duplicate {name}"));
        self.history.execute_action::<AddShader>(
            (Shader::new(scratch.clone(), source.code), position),
            &mut self.session,
        );
        let renamed = self.rename_shader(&scratch, to);
        self.history.commit_tx();
        renamed
    }

    /// A free name for a provisional copy of `name`.
    fn scratch_name(&self, name: &str, reserved: &str) -> String {
        let mut candidate = format!("{name} copy");
        let mut n = 2;
        while candidate == reserved || self.session.contains(&candidate) {
            candidate = format!("{name} copy {n}");
            n += 1;
        }
        candidate
    }

    pub fn update_code(&mut self, name: &str, code: String) -> Result<(), CommandError> {
        self.history
            .execute_action::<UpdateShaderCode>((name.to_owned(), code), &mut self.session)
            .map(|_| ())
            .ok_or_else(|| CommandError::NoSuchShader(name.to_owned()))
    }

    fn update_settings(&mut self, update: impl FnOnce(&mut Settings)) {
        let mut settings = self.session.settings().clone();
        update(&mut settings);
        self.history
            .execute_action::<UpdateSettings>(settings, &mut self.session);
    }

    /// Starts over with an empty session and no history. Settings are kept.
    pub fn reset(&mut self) {
        self.session = Session::new(self.session.settings().clone());
        self.history.clear();
        log::info!("New project");
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    /// Applies one command, returning the text to show (possibly empty).
    pub fn apply(&mut self, command: Command) -> Result<String, CommandError> {
        log::debug!("Command: {command:?}");
        let output = match command {
            Command::New { name, code } => {
                self.new_shader(&name, code)?;
                String::new()
            }
            Command::Delete { name } => {
                self.delete_shader(&name)?;
                String::new()
            }
            Command::Rename { from, to } => {
                self.rename_shader(&from, &to)?;
                String::new()
            }
            Command::Duplicate { name, to } => {
                self.duplicate_shader(&name, &to)?;
                String::new()
            }
            Command::Code { name, code } => {
                self.update_code(&name, code)?;
                String::new()
            }
            Command::FontSize(size) => {
                self.update_settings(|s| s.font_size = size);
                String::new()
            }
            Command::DarkStyle(dark) => {
                self.update_settings(|s| s.dark_style = dark);
                String::new()
            }
            Command::Undo => {
                if self.history.undo_last_action(&mut self.session) {
                    String::new()
                } else {
                    "nothing to undo".into()
                }
            }
            Command::Redo => {
                if self.history.redo_last_action(&mut self.session) {
                    String::new()
                } else {
                    "nothing to redo".into()
                }
            }
            Command::UndoUntil(index) => {
                let id = self
                    .history
                    .undo_history()
                    .get(index)
                    .map(|entry| entry.id())
                    .ok_or(CommandError::NoSuchEntry(index))?;
                self.history.undo_until(id, &mut self.session);
                String::new()
            }
            Command::RedoUntil(index) => {
                let id = self
                    .history
                    .redo_history()
                    .get(index)
                    .map(|entry| entry.id())
                    .ok_or(CommandError::NoSuchEntry(index))?;
                self.history.redo_until(id, &mut self.session);
                String::new()
            }
            Command::UndoAll => {
                self.history.undo_all(&mut self.session);
                String::new()
            }
            Command::History => history_panel::show_history(&self.history),
            Command::Describe(text) => {
                self.history.set_next_action_description(text);
                String::new()
            }
            Command::Disable => {
                self.history.disable();
                String::new()
            }
            Command::Enable => {
                self.history.enable();
                String::new()
            }
            Command::Reset => {
                self.reset();
                String::new()
            }
            Command::Save => {
                self.history.mark_saved();
                "saved".into()
            }
            Command::List => self.list(),
        };
        Ok(output)
    }

    /// Tabs in order, the current one marked with `*`.
    fn list(&self) -> String {
        let current = self.session.current().map(|s| s.name.as_str());
        self.session
            .shaders()
            .map(|shader| {
                let marker = if Some(shader.name.as_str()) == current { '*' } else { ' ' };
                format!("{marker} {} ({} lines)\n", shader.name, shader.code.lines().count())
            })
            .collect()
    }

    /// Reads commands line by line until the input ends. Invalid commands
    /// are reported and skipped.
    pub fn run(&mut self, input: impl BufRead, output: &mut impl Write) -> io::Result<()> {
        for (number, line) in input.lines().enumerate() {
            let line = line?;
            let result = commands::parse(&line)
                .and_then(|command| command.map_or(Ok(String::new()), |c| self.apply(c)));
            match result {
                Ok(text) => output.write_all(text.as_bytes())?,
                Err(e) => {
                    log::warn!("line {}: {e}", number + 1);
                    writeln!(output, "error: {e}")?;
                }
            }
        }
        output.flush()
    }
}
