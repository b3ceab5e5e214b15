mod conflict;
mod error;
mod repo;

pub use conflict::find_conflict;
pub use error::ScheduleError;
pub use repo::{Occupied, ScheduleMap};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::model::{Booking, Conflict, Day, Hour, ScheduleCollection};
use crate::store::{BookingStore, StoreError};

/// What the current actor may do, decided once by the (external)
/// authentication collaborator and evaluated at this boundary only —
/// not re-checked ad hoc inside every handler.
#[derive(Debug, Clone)]
pub struct Capability {
    pub can_mutate: bool,
    pub actor: String,
}

impl Capability {
    pub fn read_only(actor: impl Into<String>) -> Self {
        Self {
            can_mutate: false,
            actor: actor.into(),
        }
    }

    pub fn scheduler(actor: impl Into<String>) -> Self {
        Self {
            can_mutate: true,
            actor: actor.into(),
        }
    }
}

/// Deployment knobs. Defaults match the original seven-day grid with a
/// mandatory professor field.
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Days offered by the pickers; some deployments run 5 or 6.
    pub days: Vec<Day>,
    /// Whether a professor name must accompany every booking.
    pub require_professor: bool,
    /// Upper bound on each store call during a commit. A store that
    /// hangs past this returns the scheduler to its pre-commit phase
    /// with an error instead of leaving it committing forever.
    pub commit_timeout: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            days: Day::WEEK.to_vec(),
            require_professor: true,
            commit_timeout: Duration::from_secs(10),
        }
    }
}

/// A booking form in progress. Unset fields fail validation at submit,
/// never earlier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub room_id: String,
    pub course_name: String,
    pub section: String,
    /// Empty string means unset.
    pub professor_name: String,
    pub day: Option<Day>,
    pub start_time: Option<Hour>,
    pub end_time: Option<Hour>,
}

/// Room and original slot key of the booking being edited. The slot key
/// is the booking's identity, so an edit that moves day or start hour
/// retires this key and writes a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingRef {
    pub room_id: String,
    pub slot_key: String,
}

/// Where the edit/replace state machine currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Composing {
        editing: Option<EditingRef>,
    },
    /// A conflict was detected; the proposal is retained until the
    /// caller decides to replace the conflicting booking or cancel.
    ConflictPending {
        room_id: String,
        proposal: Booking,
        editing: Option<EditingRef>,
        conflict: Conflict,
    },
}

/// Result of a successful `submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Booking written and persisted; form cleared.
    Committed,
    /// An existing booking overlaps; awaiting replace-or-cancel.
    Conflict(Conflict),
}

/// The edit/replace controller: owns the in-memory schedules for the
/// session, runs conflict detection on submit, and pushes affected
/// rooms to the injected store.
///
/// All mutation is synchronous between store awaits; a second submit
/// while one is committing is rejected, not queued. Store failures are
/// surfaced without rolling back memory — last writer wins until the
/// next snapshot arrives.
pub struct Scheduler {
    schedules: ScheduleMap,
    store: Arc<dyn BookingStore>,
    capability: Capability,
    options: SchedulerOptions,
    phase: Phase,
    committing: bool,
}

impl Scheduler {
    pub fn new(store: Arc<dyn BookingStore>, capability: Capability) -> Self {
        Self::with_options(store, capability, SchedulerOptions::default())
    }

    pub fn with_options(
        store: Arc<dyn BookingStore>,
        capability: Capability,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            schedules: ScheduleMap::new(),
            store,
            capability,
            options,
            phase: Phase::Idle,
            committing: false,
        }
    }

    // ── Read-only query surface ──────────────────────────────

    /// The repository, for per-cell rendering queries. Reads never fail.
    pub fn schedules(&self) -> &ScheduleMap {
        &self.schedules
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// The conflicting record awaiting a replace/cancel decision, if any.
    pub fn pending_conflict(&self) -> Option<&Conflict> {
        match &self.phase {
            Phase::ConflictPending { conflict, .. } => Some(conflict),
            _ => None,
        }
    }

    pub fn editing(&self) -> Option<&EditingRef> {
        match &self.phase {
            Phase::Composing { editing } => editing.as_ref(),
            Phase::ConflictPending { editing, .. } => editing.as_ref(),
            Phase::Idle => None,
        }
    }

    // ── Session lifecycle ────────────────────────────────────

    /// Load the full collection from the store, replacing local state.
    pub async fn load(&mut self) -> Result<(), ScheduleError> {
        let store = self.store.clone();
        let collection = self.store_call("load_all", store.load_all()).await?;
        debug!("loaded {} rooms from store", collection.len());
        self.schedules.replace_all(collection);
        Ok(())
    }

    /// Remote-change notification: the store snapshot wins over any
    /// local optimistic state not yet committed.
    pub fn apply_snapshot(&mut self, snapshot: ScheduleCollection) {
        debug!("applying remote snapshot with {} rooms", snapshot.len());
        self.schedules.replace_all(snapshot);
    }

    // ── Edit/replace state machine ───────────────────────────

    /// Select an existing booking for editing and populate a draft from
    /// it. An empty cell leaves the state unchanged and returns `None`.
    pub fn begin_edit(
        &mut self,
        room_id: &str,
        day: Day,
        hour: Hour,
    ) -> Result<Option<BookingDraft>, ScheduleError> {
        self.require_mutate()?;
        let Some(occupied) = self.schedules.occupant(room_id, day, hour) else {
            return Ok(None);
        };
        let booking = occupied.booking;
        let draft = BookingDraft {
            room_id: room_id.to_string(),
            course_name: booking.course_name.clone(),
            section: booking.section.clone(),
            professor_name: booking.professor_name.clone().unwrap_or_default(),
            day: Some(booking.day),
            start_time: Some(booking.start_time),
            end_time: Some(booking.end_time),
        };
        let editing = EditingRef {
            room_id: room_id.to_string(),
            slot_key: occupied.slot_key.to_string(),
        };
        self.phase = Phase::Composing {
            editing: Some(editing),
        };
        Ok(Some(draft))
    }

    /// Clear the form and editing ref. Touches neither the repository
    /// nor the store. Also releases the in-flight guard left behind
    /// when a caller drops a commit future mid-await.
    pub fn cancel_editing(&mut self) {
        self.phase = Phase::Idle;
        self.committing = false;
    }

    /// Validate, run conflict detection, and either commit the booking
    /// or park it behind a replace/cancel decision.
    pub async fn submit(&mut self, draft: &BookingDraft) -> Result<SubmitOutcome, ScheduleError> {
        self.require_mutate()?;
        if self.committing {
            return Err(ScheduleError::Busy);
        }
        let editing = match &self.phase {
            Phase::Idle => None,
            Phase::Composing { editing } => editing.clone(),
            Phase::ConflictPending { .. } => {
                return Err(ScheduleError::InvalidState(
                    "a conflict is awaiting a replace/cancel decision",
                ));
            }
        };

        let booking = conflict::validate(draft, &self.options)?;

        // The original slot key is excluded so an in-progress edit does
        // not conflict with itself.
        let exclude = editing.as_ref().map(|e| e.slot_key.as_str());
        if let Some(schedule) = self.schedules.room(&draft.room_id)
            && let Some(found) = find_conflict(
                schedule,
                booking.day,
                booking.start_time,
                booking.end_time,
                exclude,
            )
        {
            self.phase = Phase::ConflictPending {
                room_id: draft.room_id.clone(),
                proposal: booking,
                editing,
                conflict: found.clone(),
            };
            return Ok(SubmitOutcome::Conflict(found));
        }

        self.commit(draft.room_id.clone(), booking, editing).await?;
        Ok(SubmitOutcome::Committed)
    }

    /// Replace the conflicting booking with the retained proposal. The
    /// proposal is only written once the removal has been persisted; a
    /// store failure leaves the decision pending for retry or cancel.
    pub async fn resolve_replace(&mut self) -> Result<(), ScheduleError> {
        self.require_mutate()?;
        if self.committing {
            return Err(ScheduleError::Busy);
        }
        let Phase::ConflictPending {
            room_id,
            proposal,
            editing,
            conflict,
        } = self.phase.clone()
        else {
            return Err(ScheduleError::InvalidState("no conflict awaiting resolution"));
        };

        self.committing = true;
        self.schedules.remove_slot(&room_id, &conflict.slot_key);
        let removal = self.persist_room(&room_id).await;
        self.committing = false;
        removal?;
        info!("replacing {} in {room_id}", conflict.slot_key);

        self.commit(room_id, proposal, editing).await
    }

    /// Abandon the proposal; the conflicting booking stays. Returns to
    /// composing with any editing ref intact.
    pub fn resolve_cancel(&mut self) -> Result<(), ScheduleError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::ConflictPending { editing, .. } => {
                self.phase = Phase::Composing { editing };
                Ok(())
            }
            other => {
                self.phase = other;
                Err(ScheduleError::InvalidState("no conflict awaiting resolution"))
            }
        }
    }

    /// Delete the booking selected for editing. No conflict check —
    /// removal cannot collide with anything.
    pub async fn delete(&mut self) -> Result<(), ScheduleError> {
        self.require_mutate()?;
        if self.committing {
            return Err(ScheduleError::Busy);
        }
        let editing = match &self.phase {
            Phase::Composing {
                editing: Some(editing),
            } => editing.clone(),
            _ => {
                return Err(ScheduleError::InvalidState(
                    "no booking selected for deletion",
                ));
            }
        };

        self.committing = true;
        self.schedules.remove_slot(&editing.room_id, &editing.slot_key);
        let result = self.persist_room(&editing.room_id).await;
        self.committing = false;
        result?;

        info!("deleted {} from {}", editing.slot_key, editing.room_id);
        self.phase = Phase::Idle;
        Ok(())
    }

    // ── Commit path ──────────────────────────────────────────

    /// Shared by "no conflict" and "replace": mutate the repository,
    /// persist every affected room, then go Idle. On failure the
    /// pre-commit phase is restored; memory is not rolled back.
    async fn commit(
        &mut self,
        room_id: String,
        booking: Booking,
        editing: Option<EditingRef>,
    ) -> Result<(), ScheduleError> {
        let prior = self.phase.clone();
        self.committing = true;
        let result = self.commit_inner(&room_id, booking, editing).await;
        self.committing = false;
        match result {
            Ok(()) => {
                self.phase = Phase::Idle;
                Ok(())
            }
            Err(e) => {
                self.phase = prior;
                Err(e)
            }
        }
    }

    async fn commit_inner(
        &mut self,
        room_id: &str,
        booking: Booking,
        editing: Option<EditingRef>,
    ) -> Result<(), ScheduleError> {
        let new_key = booking.slot_key();
        let mut touched: Vec<String> = Vec::new();

        if let Some(editing) = &editing {
            // A same-slot edit overwrites in place; otherwise the
            // original identity is retired first.
            if editing.room_id != room_id || editing.slot_key != new_key {
                self.schedules.remove_slot(&editing.room_id, &editing.slot_key);
                if editing.room_id != room_id {
                    touched.push(editing.room_id.clone());
                }
            }
        }

        self.schedules.put(room_id, booking);
        touched.push(room_id.to_string());

        for room in &touched {
            self.persist_room(room).await?;
        }
        info!("committed {new_key} in {room_id} by {}", self.capability.actor);
        Ok(())
    }

    /// Push one room's current in-memory state to the store: save when
    /// it has bookings, delete when it was pruned empty.
    async fn persist_room(&self, room_id: &str) -> Result<(), ScheduleError> {
        let store = self.store.clone();
        match self.schedules.room(room_id) {
            Some(schedule) => {
                self.store_call("save_room", store.save_room(room_id, schedule))
                    .await
            }
            None => self.store_call("delete_room", store.delete_room(room_id)).await,
        }
    }

    async fn store_call<T, F>(&self, op: &'static str, call: F) -> Result<T, ScheduleError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match timeout(self.options.commit_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("{op} failed: {e}");
                Err(ScheduleError::Store { op, message: e.0 })
            }
            Err(_) => {
                warn!("{op} timed out");
                Err(ScheduleError::Timeout { op })
            }
        }
    }

    fn require_mutate(&self) -> Result<(), ScheduleError> {
        if self.capability.can_mutate {
            Ok(())
        } else {
            debug!("{} denied: read-only access", self.capability.actor);
            Err(ScheduleError::PermissionDenied)
        }
    }
}
