use crate::calendar::{CalendarView, MonthGrid};
use crate::errors::SessionError;
use crate::guard::SaveGuard;
use crate::key::{StorageKey, derive_key};
use crate::models::{WorkoutDocument, placeholder_notes, welcome_notes};
use crate::store::DocumentStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const SEED_USERS: [&str; 3] = ["Matheus", "Noelia", "Ana"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NoUserSelected,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotesStatus {
    Idle,
    Saving,
    Saved,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// Transient user-facing message, shown once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Warning,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    SaveInFlight,
    NoUserReady,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The write was confirmed; the optimistic state stands.
    Saved { date: NaiveDate, active: bool },
    /// The write failed and the mark was restored to `active`.
    RolledBack {
        date: NaiveDate,
        active: bool,
        error: String,
    },
    Ignored { reason: IgnoreReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotesOutcome {
    Saved,
    Failed { error: String },
    Ignored { reason: IgnoreReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateRejection {
    EmptyName,
    AlreadyExists,
    /// Another user already derives the same storage key.
    KeyTaken { existing: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreateOutcome {
    /// `persisted` is false when the eager write of the initial documents failed.
    Created {
        name: String,
        key: StorageKey,
        persisted: bool,
    },
    Rejected { reason: CreateRejection },
}

#[derive(Debug, Clone)]
struct CurrentUser {
    name: String,
    key: StorageKey,
    /// `None` while loading.
    workouts: Option<WorkoutDocument>,
    notes: String,
    notes_status: NotesStatus,
}

/// In-memory mirror of the selected user plus the view state around it.
#[derive(Debug)]
pub struct Session {
    users: Vec<String>,
    current: Option<CurrentUser>,
    calendar: CalendarView,
    load_epoch: u64,
    notice: Option<Notice>,
}

/// Everything the page needs to draw itself.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub users: Vec<String>,
    pub selected: Option<String>,
    pub phase: Phase,
    pub calendar: MonthGrid,
    pub notes: String,
    pub notes_status: NotesStatus,
    pub saving_workouts: bool,
    pub saving_notes: bool,
    pub notice: Option<Notice>,
}

impl Session {
    pub fn new(users: Vec<String>, calendar: CalendarView) -> Self {
        Self {
            users,
            current: None,
            calendar,
            load_epoch: 0,
            notice: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.current {
            None => Phase::NoUserSelected,
            Some(user) if user.workouts.is_none() => Phase::Loading,
            Some(_) => Phase::Ready,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.current.as_ref().map(|user| user.name.as_str())
    }

    pub fn workouts(&self) -> Option<&WorkoutDocument> {
        self.current.as_ref().and_then(|user| user.workouts.as_ref())
    }

    pub fn notes(&self) -> Option<&str> {
        self.current.as_ref().map(|user| user.notes.as_str())
    }

    pub fn month_grid(&self) -> MonthGrid {
        self.calendar.render(self.workouts())
    }

    /// Replaces the current mirror with an empty, loading one and returns the
    /// epoch the matching `finish_load` must present.
    fn begin_load(&mut self, name: &str, key: StorageKey) -> u64 {
        self.load_epoch += 1;
        self.current = Some(CurrentUser {
            name: name.to_string(),
            key,
            workouts: None,
            notes: String::new(),
            notes_status: NotesStatus::Idle,
        });
        self.load_epoch
    }

    fn finish_load(&mut self, epoch: u64, workouts: WorkoutDocument, notes: String) -> bool {
        if epoch != self.load_epoch {
            return false;
        }
        match self.current.as_mut() {
            Some(user) => {
                user.workouts = Some(workouts);
                user.notes = notes;
                true
            }
            None => false,
        }
    }

    fn user_mut(&mut self, key: &StorageKey) -> Option<&mut CurrentUser> {
        self.current.as_mut().filter(|user| &user.key == key)
    }

    fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    fn view(&self, saving_workouts: bool, saving_notes: bool) -> SessionView {
        SessionView {
            users: self.users.clone(),
            selected: self.selected().map(str::to_string),
            phase: self.phase(),
            calendar: self.month_grid(),
            notes: self.notes().unwrap_or_default().to_string(),
            notes_status: self
                .current
                .as_ref()
                .map_or(NotesStatus::Idle, |user| user.notes_status),
            saving_workouts,
            saving_notes,
            notice: self.notice.clone(),
        }
    }
}

/// Owns the session for the lifetime of the process and runs every
/// operation that talks to the document store.
///
/// The session lock is never held across a store call. Work that reaches the
/// store runs in a spawned task so it completes even if the caller goes away.
#[derive(Clone)]
pub struct Tracker {
    store: Arc<dyn DocumentStore>,
    session: Arc<Mutex<Session>>,
    saving_workouts: SaveGuard,
    saving_notes: SaveGuard,
}

impl Tracker {
    pub fn new(store: Arc<dyn DocumentStore>, users: Vec<String>, calendar: CalendarView) -> Self {
        Self {
            store,
            session: Arc::new(Mutex::new(Session::new(users, calendar))),
            saving_workouts: SaveGuard::default(),
            saving_notes: SaveGuard::default(),
        }
    }

    pub fn session(&self) -> &Arc<Mutex<Session>> {
        &self.session
    }

    pub fn is_saving_workouts(&self) -> bool {
        self.saving_workouts.is_saving()
    }

    pub fn is_saving_notes(&self) -> bool {
        self.saving_notes.is_saving()
    }

    pub async fn view(&self) -> SessionView {
        let session = self.session.lock().await;
        session.view(self.is_saving_workouts(), self.is_saving_notes())
    }

    /// Like [`Tracker::view`] but consumes the pending notice and the
    /// "saved" notes label.
    pub async fn flash_view(&self) -> SessionView {
        let mut session = self.session.lock().await;
        let view = session.view(self.is_saving_workouts(), self.is_saving_notes());
        session.notice = None;
        if let Some(user) = session.current.as_mut() {
            if user.notes_status == NotesStatus::Saved {
                user.notes_status = NotesStatus::Idle;
            }
        }
        view
    }

    /// Selects the first known user, if any.
    pub async fn start(&self) -> Result<(), SessionError> {
        let first = self.session.lock().await.users.first().cloned();
        match first {
            Some(name) => self.select_user(&name).await,
            None => Ok(()),
        }
    }

    pub async fn select_user(&self, name: &str) -> Result<(), SessionError> {
        let known = self.session.lock().await.users.iter().any(|u| u == name);
        if !known {
            return Err(SessionError::UnknownUser(name.to_string()));
        }
        let this = self.clone();
        let name = name.to_string();
        detached(async move { this.load(&name).await }).await
    }

    pub async fn previous_month(&self) {
        self.session.lock().await.calendar.previous();
    }

    pub async fn next_month(&self) {
        self.session.lock().await.calendar.next();
    }

    /// Loads workouts and notes for `name`, creating an empty workout
    /// document when the fetch fails.
    async fn load(&self, name: &str) {
        let key = derive_key(name);
        let epoch = self.session.lock().await.begin_load(name, key.clone());
        info!("loading documents for {name} ({key})");

        let (workouts, notes) =
            tokio::join!(self.load_workouts(&key), self.load_notes(name, &key));

        let mut session = self.session.lock().await;
        if !session.finish_load(epoch, workouts, notes) {
            debug!("discarding stale load for {key}");
        }
    }

    async fn load_workouts(&self, key: &StorageKey) -> WorkoutDocument {
        match self.store.fetch_workouts(key).await {
            Ok(doc) => doc,
            Err(err) => {
                info!("no workout document for {key} ({err}), creating an empty one");
                let doc = WorkoutDocument::empty();
                if let Err(err) = self.store.put_workouts(key, &doc).await {
                    warn!("failed to create initial workout document for {key}: {err}");
                }
                doc
            }
        }
    }

    async fn load_notes(&self, name: &str, key: &StorageKey) -> String {
        match self.store.fetch_notes(key).await {
            Ok(text) => text,
            Err(err) => {
                debug!("no notes for {key} ({err}), showing placeholder");
                placeholder_notes(name)
            }
        }
    }

    pub async fn create_user(&self, name: &str) -> Result<CreateOutcome, SessionError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Ok(CreateOutcome::Rejected {
                reason: CreateRejection::EmptyName,
            });
        }
        let key = derive_key(&name);

        {
            let mut session = self.session.lock().await;
            if session.users.contains(&name) {
                session.notify(Notice::warning(format!(
                    "{name} already exists, select it from the list"
                )));
                return Ok(CreateOutcome::Rejected {
                    reason: CreateRejection::AlreadyExists,
                });
            }
            if let Some(existing) = session.users.iter().find(|u| derive_key(u) == key) {
                let existing = existing.clone();
                session.notify(Notice::warning(format!(
                    "{name} would share stored documents with {existing}"
                )));
                return Ok(CreateOutcome::Rejected {
                    reason: CreateRejection::KeyTaken { existing },
                });
            }
            session.users.push(name.clone());
            session.begin_load(&name, key.clone());
        }

        let this = self.clone();
        detached(async move {
            let persisted = this.write_initial_documents(&name, &key).await;
            let notice = if persisted {
                Notice::success("User created and documents saved")
            } else {
                Notice::error("Failed to create user documents")
            };
            this.session.lock().await.notify(notice);
            this.load(&name).await;
            CreateOutcome::Created {
                name,
                key,
                persisted,
            }
        })
        .await
    }

    async fn write_initial_documents(&self, name: &str, key: &StorageKey) -> bool {
        let result = match self.store.put_workouts(key, &WorkoutDocument::initial()).await {
            Ok(()) => self.store.put_notes(key, &welcome_notes(name)).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {
                info!("created documents for {name} ({key})");
                true
            }
            Err(err) => {
                error!("failed to create documents for {name} ({key}): {err}");
                false
            }
        }
    }

    /// Flips the mark for `date` optimistically and persists the whole
    /// document, rolling back on failure. Ignored while another workout save
    /// is in flight.
    pub async fn toggle_workout(&self, date: NaiveDate) -> Result<ToggleOutcome, SessionError> {
        let Some(permit) = self.saving_workouts.try_acquire() else {
            debug!("ignoring toggle of {date}: a workout save is in flight");
            return Ok(ToggleOutcome::Ignored {
                reason: IgnoreReason::SaveInFlight,
            });
        };

        let (key, snapshot, was_active, previous_stamp) = {
            let mut session = self.session.lock().await;
            let Some(user) = session.current.as_mut() else {
                return Ok(ToggleOutcome::Ignored {
                    reason: IgnoreReason::NoUserReady,
                });
            };
            let Some(doc) = user.workouts.as_mut() else {
                return Ok(ToggleOutcome::Ignored {
                    reason: IgnoreReason::NoUserReady,
                });
            };
            let previous_stamp = doc.updated_at.clone();
            let was_active = doc.toggle(date);
            (user.key.clone(), doc.clone(), was_active, previous_stamp)
        };

        let store = Arc::clone(&self.store);
        let session = Arc::clone(&self.session);
        detached(async move {
            let _permit = permit;
            let result = store.put_workouts(&key, &snapshot).await;
            let mut session = session.lock().await;
            match result {
                Ok(()) => {
                    // A reload while the write was in flight may predate it.
                    if let Some(doc) = session
                        .user_mut(&key)
                        .and_then(|user| user.workouts.as_mut())
                    {
                        doc.set_marked(date, !was_active);
                    }
                    session.notify(Notice::success("Saved"));
                    ToggleOutcome::Saved {
                        date,
                        active: !was_active,
                    }
                }
                Err(err) => {
                    error!("failed to save workout {date} for {key}: {err}");
                    if let Some(doc) = session
                        .user_mut(&key)
                        .and_then(|user| user.workouts.as_mut())
                    {
                        doc.set_marked(date, was_active);
                        if doc.updated_at == snapshot.updated_at {
                            doc.updated_at = previous_stamp;
                        }
                    }
                    session.notify(Notice::error("Failed to save"));
                    ToggleOutcome::RolledBack {
                        date,
                        active: was_active,
                        error: err.to_string(),
                    }
                }
            }
        })
        .await
    }

    /// Replaces the in-memory notes with `text` and writes them. On failure
    /// the text is kept; only the status changes.
    pub async fn save_notes(&self, text: String) -> Result<NotesOutcome, SessionError> {
        let key = {
            let mut session = self.session.lock().await;
            let Some(user) = session.current.as_mut() else {
                return Ok(NotesOutcome::Ignored {
                    reason: IgnoreReason::NoUserReady,
                });
            };
            user.notes.clone_from(&text);
            user.key.clone()
        };

        let Some(permit) = self.saving_notes.try_acquire() else {
            debug!("ignoring notes save for {key}: a notes save is in flight");
            return Ok(NotesOutcome::Ignored {
                reason: IgnoreReason::SaveInFlight,
            });
        };
        if let Some(user) = self.session.lock().await.user_mut(&key) {
            user.notes_status = NotesStatus::Saving;
        }

        let store = Arc::clone(&self.store);
        let session = Arc::clone(&self.session);
        detached(async move {
            let _permit = permit;
            let result = store.put_notes(&key, &text).await;
            let mut session = session.lock().await;
            let (status, notice, outcome) = match result {
                Ok(()) => (
                    NotesStatus::Saved,
                    Notice::success("Notes saved"),
                    NotesOutcome::Saved,
                ),
                Err(err) => {
                    error!("failed to save notes for {key}: {err}");
                    (
                        NotesStatus::Failed,
                        Notice::error("Failed to save notes"),
                        NotesOutcome::Failed {
                            error: err.to_string(),
                        },
                    )
                }
            };
            if let Some(user) = session.user_mut(&key) {
                user.notes_status = status;
            }
            session.notify(notice);
            outcome
        })
        .await
    }
}

/// Runs `work` on its own task and waits for it, so dropping the caller does
/// not abort a request already sent to the store.
async fn detached<T, F>(work: F) -> Result<T, SessionError>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    Ok(tokio::spawn(work).await?)
}
