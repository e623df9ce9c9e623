use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use livecheck::{CheckerStatus, ContainerSize, EditAction, EditorShell};
use livecheck_lsp::{CheckerOptions, ClientError, LspChecker, default_initialize_params, path_to_uri};
use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;

/// Buffer contents for a fresh scratch file.
pub const DEFAULT_SNIPPET: &str = "-- Live checking\n\nexample (m n : ℕ) : m + n = n + m :=\nby simp";

/// Scratch file used when no path is given.
pub const SCRATCH_FILE: &str = "scratch.lean";

/// What a key press means to the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCommand {
    Edit(EditAction),
    Save,
    Quit,
}

/// Map a key event to a command. Releases and unbound keys map to `None`.
pub fn command_for_key(key: KeyEvent) -> Option<KeyCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let action = match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => return Some(KeyCommand::Save),
        (KeyModifiers::CONTROL, KeyCode::Char('q' | 'x')) => return Some(KeyCommand::Quit),
        (_, KeyCode::Left) => EditAction::Left,
        (_, KeyCode::Right) => EditAction::Right,
        (_, KeyCode::Up) => EditAction::Up,
        (_, KeyCode::Down) => EditAction::Down,
        (_, KeyCode::Home) => EditAction::Home,
        (_, KeyCode::End) => EditAction::End,
        (_, KeyCode::PageUp) => EditAction::PageUp,
        (_, KeyCode::PageDown) => EditAction::PageDown,
        (_, KeyCode::Enter) => EditAction::Newline,
        (_, KeyCode::Backspace) => EditAction::Backspace,
        (_, KeyCode::Delete) => EditAction::Delete,
        (_, KeyCode::Tab) => EditAction::InsertText("  ".to_string()),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => EditAction::Insert(c),
        _ => return None,
    };
    Some(KeyCommand::Edit(action))
}

/// Convert a terminal size in cells into the shell's container size.
///
/// Cells are taller than they are wide, so rows are scaled by `cell_aspect` to compare the
/// two sides in the same unit.
pub fn container_for_terminal(cols: u16, rows: u16, cell_aspect: f32) -> ContainerSize {
    let aspect = if cell_aspect.is_finite() && cell_aspect > 0.0 {
        cell_aspect
    } else {
        1.0
    };
    let height = (f32::from(rows) * aspect).round() as u32;
    ContainerSize::new(u32::from(cols), height)
}

/// Nearest ancestor directory that looks like a Lean project root.
pub fn find_project_root(path: &Path) -> Option<PathBuf> {
    const MARKERS: [&str; 4] = ["lakefile.lean", "lakefile.toml", "lean-toolchain", ".git"];

    let mut dir = path.parent()?.to_path_buf();
    if dir.as_os_str().is_empty() {
        dir = std::env::current_dir().ok()?;
    }
    loop {
        if MARKERS.iter().any(|m| dir.join(m).exists()) {
            return Some(dir);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Settings for starting the checker in the background.
pub struct CheckerLaunch {
    pub program: String,
    pub args: Vec<String>,
    pub goal_method: String,
    pub language_id: String,
}

type CheckerResult = Result<LspChecker, ClientError>;

/// Start the checker on a background thread.
///
/// The handshake can take a while (the checker may be loading its library), so the editor
/// stays usable and the checker is attached once the receiver yields.
pub fn spawn_checker(launch: CheckerLaunch, file: &Path) -> mpsc::Receiver<CheckerResult> {
    let root = find_project_root(file);
    let root_uri = root
        .as_ref()
        .map(|dir| path_to_uri(&dir.to_string_lossy()));

    let mut cmd = Command::new(&launch.program);
    cmd.args(&launch.args).stderr(Stdio::null());
    if let Some(dir) = &root {
        cmd.current_dir(dir);
    }

    let options = CheckerOptions {
        initialize_params: default_initialize_params(root_uri.as_deref()),
        goal_method: launch.goal_method,
        language_id: launch.language_id,
        ..CheckerOptions::default()
    };

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        tracing::info!(program = ?cmd.get_program(), "starting checker");
        let _ = tx.send(LspChecker::start(cmd, options));
    });
    rx
}

/// Application state.
pub struct App {
    shell: EditorShell<LspChecker>,
    path: PathBuf,
    autosave: bool,
    autosave_ok: Rc<Cell<bool>>,
    cell_aspect: f32,
    saved_version: u64,
    checker: Option<mpsc::Receiver<CheckerResult>>,
    startup_error: Option<String>,
    status_message: String,
    confirm_quit: bool,
    should_quit: bool,
}

impl App {
    /// Load `path` (or the scratch file) and mount the shell.
    pub fn new(
        path: Option<PathBuf>,
        autosave: bool,
        cell_aspect: f32,
        terminal_size: (u16, u16),
    ) -> io::Result<Self> {
        let (path, fallback) = match path {
            Some(path) => (path, ""),
            None => (PathBuf::from(SCRATCH_FILE), DEFAULT_SNIPPET),
        };
        let content = if path.exists() {
            fs::read_to_string(&path)?
        } else {
            fallback.to_string()
        };

        let mut shell = EditorShell::new(path.to_string_lossy(), &content);
        let autosave_ok = Rc::new(Cell::new(false));
        if autosave {
            let target = path.clone();
            let written = Rc::clone(&autosave_ok);
            shell = shell.on_value_change(move |text| match fs::write(&target, text) {
                Ok(()) => written.set(true),
                Err(err) => {
                    tracing::warn!(path = %target.display(), %err, "autosave failed");
                    written.set(false);
                }
            });
        }
        let (cols, rows) = terminal_size;
        shell.activate(container_for_terminal(cols, rows, cell_aspect));

        Ok(Self {
            shell,
            path,
            autosave,
            autosave_ok,
            cell_aspect,
            saved_version: 0,
            checker: None,
            startup_error: None,
            status_message: String::new(),
            confirm_quit: false,
            should_quit: false,
        })
    }

    /// Attach the checker once its handshake finishes.
    pub fn wait_for_checker(&mut self, rx: mpsc::Receiver<CheckerResult>) {
        self.checker = Some(rx);
    }

    pub fn shell(&self) -> &EditorShell<LspChecker> {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut EditorShell<LspChecker> {
        &mut self.shell
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_modified(&self) -> bool {
        self.shell.document().version() != self.saved_version
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn confirm_quit(&self) -> bool {
        self.confirm_quit
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Short description of the checker's state for the status line.
    pub fn checker_label(&self) -> String {
        if let Some(err) = &self.startup_error {
            return format!("checker unavailable: {err}");
        }
        match self.shell.status() {
            CheckerStatus::Waiting if self.checker.is_some() => "checker starting…".to_string(),
            CheckerStatus::Waiting => "no checker".to_string(),
            CheckerStatus::Ready => {
                let name = self
                    .shell
                    .client()
                    .and_then(|c| c.server_name())
                    .unwrap_or("checker");
                format!("{name} ready")
            }
            CheckerStatus::Failed(reason) => format!("checker offline: {reason}"),
        }
    }

    /// One frame of background work: attach a freshly started checker, then pump.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        if let Some(rx) = &self.checker {
            match rx.try_recv() {
                Ok(Ok(checker)) => {
                    self.shell.attach_client(checker);
                    self.checker = None;
                    changed = true;
                }
                Ok(Err(err)) => {
                    tracing::warn!(%err, "checker failed to start");
                    self.startup_error = Some(err.to_string());
                    self.checker = None;
                    changed = true;
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.startup_error = Some("startup thread exited".to_string());
                    self.checker = None;
                    changed = true;
                }
            }
        }
        changed | self.shell.tick()
    }

    /// The terminal was resized.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.shell
            .resize(container_for_terminal(cols, rows, self.cell_aspect));
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.confirm_quit {
            match key.code {
                KeyCode::Char('y' | 'Y') => match self.save() {
                    Ok(()) => self.should_quit = true,
                    Err(err) => {
                        self.status_message = format!("save failed: {err}");
                        self.confirm_quit = false;
                    }
                },
                KeyCode::Char('n' | 'N') => self.should_quit = true,
                KeyCode::Esc => {
                    self.confirm_quit = false;
                    self.status_message.clear();
                }
                _ => {}
            }
            return;
        }

        match command_for_key(key) {
            Some(KeyCommand::Save) => match self.save() {
                Ok(()) => self.status_message = format!("saved {}", self.path.display()),
                Err(err) => self.status_message = format!("save failed: {err}"),
            },
            Some(KeyCommand::Quit) => {
                if self.is_modified() {
                    self.confirm_quit = true;
                    self.status_message = "file modified; save before quitting? (y/n)".to_string();
                } else {
                    self.should_quit = true;
                }
            }
            Some(KeyCommand::Edit(action)) => self.edit(action),
            None => {}
        }
    }

    pub fn handle_paste(&mut self, text: String) {
        self.edit(EditAction::InsertText(text.replace("\r\n", "\n")));
    }

    fn edit(&mut self, action: EditAction) {
        let outcome = self.shell.edit(action);
        if !outcome.content_changed {
            return;
        }
        self.status_message.clear();
        // The autosave listener has already run for this edit.
        if self.autosave && self.autosave_ok.get() {
            self.saved_version = self.shell.document().version();
        } else if self.autosave {
            self.status_message = format!("autosave to {} failed", self.path.display());
        }
    }

    fn save(&mut self) -> io::Result<()> {
        fs::write(&self.path, self.shell.document().get_value())?;
        self.saved_version = self.shell.document().version();
        tracing::info!(path = %self.path.display(), "saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecheck::Orientation;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            command_for_key(press(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Some(KeyCommand::Save)
        );
        assert_eq!(
            command_for_key(press(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(KeyCommand::Quit)
        );
        assert_eq!(
            command_for_key(press(KeyCode::Char('ℕ'), KeyModifiers::NONE)),
            Some(KeyCommand::Edit(EditAction::Insert('ℕ')))
        );
        assert_eq!(
            command_for_key(press(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(KeyCommand::Edit(EditAction::Insert('A')))
        );
        assert_eq!(
            command_for_key(press(KeyCode::Tab, KeyModifiers::NONE)),
            Some(KeyCommand::Edit(EditAction::InsertText("  ".to_string())))
        );
        assert_eq!(
            command_for_key(press(KeyCode::Char('k'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn test_cell_aspect_decides_orientation() {
        // 100x60 cells at 2:1 is 100 wide by 120 tall.
        let size = container_for_terminal(100, 60, 2.0);
        assert_eq!(size, ContainerSize::new(100, 120));
        assert_eq!(Orientation::for_container(size), Orientation::Stacked);

        let size = container_for_terminal(200, 60, 2.0);
        assert_eq!(Orientation::for_container(size), Orientation::SideBySide);

        assert_eq!(container_for_terminal(10, 10, f32::NAN), ContainerSize::new(10, 10));
    }

    fn type_char(app: &mut App, c: char) {
        app.handle_key_event(press(KeyCode::Char(c), KeyModifiers::NONE));
    }

    #[test]
    fn test_failed_autosave_keeps_buffer_modified() {
        let path = std::env::temp_dir()
            .join(format!("livecheck-missing-{}", std::process::id()))
            .join("x.lean");
        let mut app = App::new(Some(path), true, 2.0, (100, 40)).unwrap();

        type_char(&mut app, 'a');
        assert_eq!(app.shell().document().version(), 1);
        assert!(app.is_modified());
        assert!(app.status_message().starts_with("autosave to"));

        app.handle_key_event(press(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(app.confirm_quit());
        assert!(!app.should_quit());
    }

    #[test]
    fn test_successful_autosave_marks_buffer_saved() {
        let path = std::env::temp_dir().join(format!("livecheck-autosave-{}.lean", std::process::id()));
        let mut app = App::new(Some(path.clone()), true, 2.0, (100, 40)).unwrap();

        type_char(&mut app, 'a');
        assert!(!app.is_modified());
        assert_eq!(fs::read_to_string(&path).unwrap(), "a");

        app.handle_key_event(press(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_paste_normalizes_crlf() {
        let path = std::env::temp_dir().join(format!("livecheck-paste-{}.lean", std::process::id()));
        let mut app = App::new(Some(path), false, 2.0, (100, 40)).unwrap();

        app.handle_paste("a\r\nb".to_string());
        assert_eq!(app.shell().document().get_value(), "a\nb");
        assert!(app.is_modified());
    }
}
