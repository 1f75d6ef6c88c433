use std::mem;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Table, TableState, Wrap};
use ratatui::Frame;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::bulk_delete::{resync_unresolved, DeletePlan, DeleteReport};
use crate::config::AppConfig;
use crate::db::SqliteStore;
use crate::error::CoreError;
use crate::models::{Exercise, Routine, UserProfile};
use crate::resource::{with_timeout, Entity, Resource, ResourceStore};
use crate::summary::summarize;

use super::forms::{ConfirmBulkDelete, ProfileField, ProfileForm, RoutineField, RoutineForm};
use super::helpers::{centered_rect, count_noun, surface_error};
use super::screens::{RoutinesScreen, ROUTINE_COLUMNS};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Top-level screens.
enum Screen {
    Routines,
    Profile,
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    CreatingRoutine(RoutineForm),
    EditingRoutine { id: String, form: RoutineForm },
    ConfirmBulkDelete(ConfirmBulkDelete),
    EditingProfile(ProfileForm),
    ConfirmProfileDelete,
}

/// Results delivered to the UI thread by background tasks.
pub(crate) enum AppEvent {
    BulkDeleteFinished(DeleteReport),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

fn resource_error<T: Entity>(resource: &Resource<T>) -> String {
    resource.error().unwrap_or("Request failed.").to_string()
}

/// Central application state shared across the TUI.
///
/// Store calls made in response to a key press are driven to completion on the
/// runtime with `block_on`; each is bounded by the request timeout. Bulk
/// deletes run on a spawned task and report back through `events`.
pub struct App {
    runtime: Handle,
    store: SqliteStore,
    routines: Resource<Routine>,
    profile: Resource<UserProfile>,
    user_id: String,
    catalog: Vec<Exercise>,
    table: RoutinesScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    pending_delete: Option<JoinHandle<()>>,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(runtime: Handle, store: SqliteStore, config: &AppConfig) -> Self {
        let timeout = config.request_timeout();
        let routine_store: Arc<dyn ResourceStore<Routine>> = Arc::new(store.clone());
        let profile_store: Arc<dyn ResourceStore<UserProfile>> = Arc::new(store.clone());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            runtime,
            store,
            routines: Resource::new(routine_store, timeout),
            profile: Resource::new(profile_store, timeout),
            user_id: config.user_id.clone(),
            catalog: Vec::new(),
            table: RoutinesScreen::default(),
            screen: Screen::Routines,
            mode: Mode::Normal,
            status: None,
            pending_delete: None,
            events_tx,
            events_rx,
        }
    }

    /// Load the exercise catalogue and the routine list. A failed routine load
    /// is shown in the footer rather than aborting startup.
    pub fn load(&mut self) -> Result<()> {
        let timeout = self.routines.timeout();
        self.catalog = self
            .runtime
            .block_on(with_timeout(timeout, self.store.exercise_catalog()))
            .context("failed to load exercise catalogue")?;
        debug!(exercises = self.catalog.len(), "loaded exercise catalogue");
        self.refresh_routines();
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::CreatingRoutine(form) => self.handle_routine_form(code, None, form)?,
            Mode::EditingRoutine { id, form } => self.handle_routine_form(code, Some(id), form)?,
            Mode::ConfirmBulkDelete(confirm) => self.handle_confirm_bulk_delete(code, confirm)?,
            Mode::EditingProfile(form) => self.handle_profile_form(code, form)?,
            Mode::ConfirmProfileDelete => self.handle_confirm_profile_delete(code)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    /// Ctrl+N adds an exercise line to the open routine form.
    pub(crate) fn handle_ctrl_n(&mut self) {
        if let Mode::CreatingRoutine(form) | Mode::EditingRoutine { form, .. } = &mut self.mode {
            if self.catalog.is_empty() {
                form.error = Some("The exercise catalogue is empty.".to_string());
            } else {
                form.add_entry();
                form.error = None;
            }
        }
    }

    /// Ctrl+D removes the focused exercise line from the open routine form.
    pub(crate) fn handle_ctrl_d(&mut self) {
        if let Mode::CreatingRoutine(form) | Mode::EditingRoutine { form, .. } = &mut self.mode {
            form.remove_entry();
        }
    }

    /// Drain results posted by background tasks.
    pub(crate) fn process_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::BulkDeleteFinished(report) => self.finish_bulk_delete(report),
            }
        }
    }

    /// Stop waiting on background work before the runtime goes away. Deletes
    /// already handed to SQLite may still commit.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.pending_delete.take() {
            handle.abort();
            warn!("aborted in-flight bulk delete on exit");
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Routines => {
                let len = self.routines.data().len();
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => *exit = true,
                    KeyCode::Up => self.table.move_cursor(-1, len),
                    KeyCode::Down => self.table.move_cursor(1, len),
                    KeyCode::Char(' ') => {
                        if let Some(id) = self.current_routine().map(|r| r.id.clone()) {
                            self.table.selection.toggle(&id);
                        }
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') => {
                        let ids = self.routines.ids();
                        self.table.selection.toggle_all(&ids);
                    }
                    KeyCode::Char('d') | KeyCode::Char('D') => {
                        if self.pending_delete.is_some() {
                            self.set_status("A delete is already running.", StatusKind::Error);
                        } else if self.table.selection.show_bulk_delete() {
                            self.clear_status();
                            let selection = &self.table.selection;
                            return Ok(Mode::ConfirmBulkDelete(ConfirmBulkDelete::new(
                                self.routines.data(),
                                |id| selection.is_selected(id),
                            )));
                        } else {
                            self.set_status("No routines selected.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::CreatingRoutine(RoutineForm::default()));
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
                        if let Some(routine) = self.current_routine() {
                            let form = RoutineForm::from_routine(routine, &self.catalog);
                            let id = routine.id.clone();
                            self.clear_status();
                            return Ok(Mode::EditingRoutine { id, form });
                        } else {
                            self.set_status("No routine selected to edit.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.clear_status();
                        self.refresh_routines();
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        self.clear_status();
                        return Ok(self.open_profile());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Profile => {
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('B') => {
                        self.clear_status();
                        self.screen = Screen::Routines;
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
                        let form = self
                            .profile
                            .data()
                            .first()
                            .map(ProfileForm::from_profile)
                            .unwrap_or_default();
                        self.clear_status();
                        return Ok(Mode::EditingProfile(form));
                    }
                    KeyCode::Char('x') | KeyCode::Char('X') => {
                        if self.profile.data().is_empty() {
                            self.set_status("There is no profile to delete.", StatusKind::Error);
                        } else {
                            self.clear_status();
                            return Ok(Mode::ConfirmProfileDelete);
                        }
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.clear_status();
                        return Ok(self.open_profile());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_routine_form(
        &mut self,
        code: KeyCode,
        id: Option<String>,
        mut form: RoutineForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Routine changes discarded.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.previous_field(),
            KeyCode::Up => form.move_entry(-1),
            KeyCode::Down => form.move_entry(1),
            KeyCode::Left => form.cycle_exercise(-1, self.catalog.len()),
            KeyCode::Right => form.cycle_exercise(1, self.catalog.len()),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_routine(id.as_deref(), &form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if !keep_open {
            Ok(Mode::Normal)
        } else if let Some(id) = id {
            Ok(Mode::EditingRoutine { id, form })
        } else {
            Ok(Mode::CreatingRoutine(form))
        }
    }

    fn handle_confirm_bulk_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmBulkDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.start_bulk_delete();
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmBulkDelete(confirm)),
        }
    }

    fn handle_profile_form(&mut self, code: KeyCode, mut form: ProfileForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Profile changes discarded.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_profile(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingProfile(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_profile_delete(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let user_id = self.user_id.clone();
                match self.runtime.block_on(self.profile.delete(&user_id)) {
                    Ok(()) => {
                        info!(user_id = %user_id, "profile deleted");
                        self.set_status("Profile deleted.", StatusKind::Info);
                    }
                    Err(_) => self.set_status(resource_error(&self.profile), StatusKind::Error),
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmProfileDelete),
        }
    }

    fn current_routine(&self) -> Option<&Routine> {
        self.table.current(self.routines.data())
    }

    fn refresh_routines(&mut self) {
        match self.runtime.block_on(self.routines.fetch()) {
            Ok(()) => {
                self.table.reset_for(self.routines.data().len());
                for routine in self.routines.data() {
                    if let Err(err) = summarize(routine) {
                        error!(routine = %routine.id, error = %err, "routine cannot be summarized");
                    }
                }
            }
            Err(_) => self.set_status(resource_error(&self.routines), StatusKind::Error),
        }
    }

    /// Switch to the profile screen and load the profile. With no profile, or
    /// when loading fails, the form opens so one can be created.
    fn open_profile(&mut self) -> Mode {
        self.screen = Screen::Profile;
        let user_id = self.user_id.clone();
        match self.runtime.block_on(self.profile.fetch_by_id(&user_id)) {
            Ok(Some(_)) => Mode::Normal,
            Ok(None) => {
                self.set_status("No profile yet. Fill in the form to create one.", StatusKind::Info);
                Mode::EditingProfile(ProfileForm::default())
            }
            Err(_) => {
                self.set_status(resource_error(&self.profile), StatusKind::Error);
                Mode::EditingProfile(ProfileForm::default())
            }
        }
    }

    fn save_routine(&mut self, id: Option<&str>, form: &RoutineForm) -> Result<()> {
        let draft = form.parse_inputs(&self.catalog)?;
        let routine = match id {
            Some(id) => self
                .runtime
                .block_on(self.routines.update(id, draft))
                .context("failed to update routine")?,
            None => self
                .runtime
                .block_on(self.routines.create(draft))
                .context("failed to create routine")?,
        };

        if let Some(index) = self.routines.data().iter().position(|r| r.id == routine.id) {
            self.table.cursor = index;
        }
        let verb = if id.is_some() { "Updated" } else { "Created" };
        self.set_status(format!("{verb} routine {routine}."), StatusKind::Info);
        Ok(())
    }

    /// Upsert under the configured user id, then re-read so the screen shows
    /// what the store holds.
    fn save_profile(&mut self, form: &ProfileForm) -> Result<()> {
        let draft = form.parse_inputs()?;
        let user_id = self.user_id.clone();
        self.runtime
            .block_on(self.profile.upsert(&user_id, draft))
            .context("failed to save profile")?;
        self.runtime
            .block_on(self.profile.fetch_by_id(&user_id))
            .context("failed to reload profile")?;
        self.set_status("Profile saved.", StatusKind::Info);
        Ok(())
    }

    /// Plan against the current collection and run the deletes on a background
    /// task. The report comes back through the event channel.
    fn start_bulk_delete(&mut self) {
        if self.pending_delete.is_some() {
            self.set_status("A delete is already running.", StatusKind::Error);
            return;
        }

        let plan = DeletePlan::new(&self.table.selection, &self.routines);
        if plan.is_empty() {
            self.table.selection.retain_existing(&self.routines.ids());
            self.set_status("None of the selected routines are listed.", StatusKind::Error);
            return;
        }

        let count = plan.targets().len();
        info!(count, generation = plan.generation(), "starting bulk delete");

        let store = self.routines.store();
        let timeout = self.routines.timeout();
        let events = self.events_tx.clone();
        let handle = self.runtime.spawn(async move {
            let report = plan.execute(store, timeout).await;
            if events.send(AppEvent::BulkDeleteFinished(report)).is_err() {
                debug!("bulk delete finished after the UI went away");
            }
        });

        self.pending_delete = Some(handle);
        self.set_status(
            format!("Deleting {}...", count_noun(count, "routine")),
            StatusKind::Info,
        );
    }

    fn finish_bulk_delete(&mut self, report: DeleteReport) {
        self.pending_delete = None;

        match report.apply(&mut self.routines, &mut self.table.selection) {
            Ok(outcome) => {
                let resync = resync_unresolved(
                    &outcome,
                    &mut self.routines,
                    &mut self.table.selection,
                );
                if let Err(err) = self.runtime.block_on(resync) {
                    warn!(error = %err, "could not re-read routines after unresolved deletes");
                }
                self.table.ensure_in_bounds(self.routines.data().len());
                match outcome.error_message("Routine") {
                    Some(message) => self.set_status(message, StatusKind::Error),
                    None => self.set_status(
                        format!("Deleted {}.", count_noun(outcome.deleted.len(), "routine")),
                        StatusKind::Info,
                    ),
                }
            }
            Err(CoreError::StaleState { .. }) => {
                self.refresh_routines();
                self.set_status(
                    "The routine list changed during the delete and was reloaded.",
                    StatusKind::Info,
                );
            }
            Err(err) => self.set_status(err.to_string(), StatusKind::Error),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match self.screen {
            Screen::Routines => self.draw_routines(frame, content_area),
            Screen::Profile => self.draw_profile(frame, content_area),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::CreatingRoutine(form) => self.draw_routine_form(frame, area, "New Routine", form),
            Mode::EditingRoutine { form, .. } => {
                self.draw_routine_form(frame, area, "Edit Routine", form)
            }
            Mode::ConfirmBulkDelete(confirm) => self.draw_confirm_bulk_delete(frame, area, confirm),
            Mode::EditingProfile(form) => self.draw_profile_form(frame, area, form),
            Mode::ConfirmProfileDelete => self.draw_confirm_profile_delete(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_routines(&self, frame: &mut Frame, area: Rect) {
        let ids = self.routines.ids();
        let selection = &self.table.selection;

        let mut title = vec![Span::styled(
            " Routines ",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.routines.loading() {
            title.push(Span::raw("(loading) "));
        }
        if selection.show_bulk_delete() {
            title.push(Span::styled(
                format!("[Delete ({})] ", selection.len()),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        let block = Block::default().borders(Borders::ALL).title(Line::from(title));

        if ids.is_empty() {
            let paragraph = Paragraph::new(vec![
                Line::from(""),
                Line::from("No routines yet. Press + to create one."),
            ])
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let rows = self
            .routines
            .data()
            .iter()
            .map(|routine| self.table.row(routine))
            .collect::<Vec<_>>();

        let table = Table::new(rows, ROUTINE_COLUMNS)
            .header(self.table.header(&ids))
            .block(block)
            .row_highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.table.cursor));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_profile(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" Profile ");

        let lines = match self.profile.data().first() {
            Some(profile) => {
                let avatar = if profile.avatar.is_empty() {
                    "(no avatar)".to_string()
                } else {
                    profile.avatar.clone()
                };
                vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("Hello {}", profile.username),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(format!("Avatar: {avatar}")),
                ]
            }
            None => vec![
                Line::from(""),
                Line::from("No profile loaded. Press E to create one."),
            ],
        };

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::CreatingRoutine(_)) | (_, Mode::EditingRoutine { .. }) => &[
                ("[Tab]", " Field   "),
                ("[\u{2190}\u{2192}]", " Exercise   "),
                ("[\u{2191}\u{2193}]", " Line   "),
                ("[^N/^D]", " Add/Remove line   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::EditingProfile(_)) => &[
                ("[Tab]", " Field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::ConfirmBulkDelete(_)) | (_, Mode::ConfirmProfileDelete) => {
                &[("[Y]", " Confirm   "), ("[N/Esc]", " Cancel")]
            }
            (Screen::Routines, Mode::Normal) => &[
                ("[\u{2191}\u{2193}]", " Navigate   "),
                ("[Space]", " Select   "),
                ("[A]", " All   "),
                ("[D]", " Delete   "),
                ("[+]", " New   "),
                ("[E]", " Edit   "),
                ("[R]", " Reload   "),
                ("[P]", " Profile   "),
                ("[Q]", " Quit"),
            ],
            (Screen::Profile, Mode::Normal) => &[
                ("[E]", " Edit   "),
                ("[X]", " Delete   "),
                ("[R]", " Reload   "),
                ("[B/Esc]", " Back   "),
                ("[Q]", " Quit"),
            ],
        };

        Line::from(
            keys.iter()
                .flat_map(|(key, label)| {
                    [
                        Span::styled(key.to_string(), key_style),
                        Span::raw(label.to_string()),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn draw_routine_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &RoutineForm) {
        let popup_area = centered_rect(80, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Name", RoutineField::Name),
            form.build_line("Day", RoutineField::Day),
            Line::from(""),
            Line::from(Span::styled(
                "Exercises",
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        lines.extend(form.entry_lines(&self.catalog));
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save \u{2022} Ctrl+N adds an exercise \u{2022} Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        let cursor = match form.active {
            RoutineField::Name => Some(("Name: ".len(), 0, RoutineField::Name)),
            RoutineField::Day => Some(("Day: ".len(), 1, RoutineField::Day)),
            _ => None,
        };
        if let Some((prefix, row, field)) = cursor {
            frame.set_cursor_position((
                inner.x + (prefix + form.value_len(field)) as u16,
                inner.y + row,
            ));
        }
    }

    fn draw_confirm_bulk_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBulkDelete) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(format!(
            "Delete {}?",
            count_noun(confirm.names.len(), "routine")
        ))];
        lines.extend(
            confirm
                .names
                .iter()
                .map(|name| Line::from(format!("  \u{2022} {name}"))),
        );
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_profile_form(&self, frame: &mut Frame, area: Rect, form: &ProfileForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Profile").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Username", ProfileField::Username),
            form.build_line("Avatar", ProfileField::Avatar),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save \u{2022} Tab to switch \u{2022} Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            ProfileField::Username => ("Username: ".len(), 0),
            ProfileField::Avatar => ("Avatar: ".len(), 1),
        };
        frame.set_cursor_position((
            inner.x + (prefix + form.value_len(form.active)) as u16,
            inner.y + row,
        ));
    }

    fn draw_confirm_profile_delete(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from("Delete your profile?"),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}
