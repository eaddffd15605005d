//! The rater service: the list of artworks plus every workflow that acts on
//! it, driven against an [`ArtworkGateway`].
//!
//! All state lives behind one lock that is never held across a remote call.
//! Each remote call is bracketed by a synchronous "begin" transition and a
//! "finish" that first re-resolves the entry by id and [`EntryKey`]; if the
//! entry was removed meanwhile the result is dropped.
//!
//! [`EntryKey`]: crate::entry::EntryKey
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::addition::{self, AddError, AdditionForm};
use crate::collection::{EntryCollection, FetchTicket};
use crate::config::Config;
use crate::deletion::{DeleteError, DeletePrompt, DeletionWorkflow};
use crate::entry::{EntryView, TransitionError};
use crate::gateway::ArtworkGateway;
use crate::model::{ArtworkId, SubmissionStatus};
use crate::notify::{Notification, Notifier, ADDED_MESSAGE, DELETED_MESSAGE, RATED_MESSAGE};

#[derive(Debug, Default)]
struct Board {
    entries: EntryCollection,
    deletion: DeletionWorkflow,
    form: AdditionForm,
}

#[derive(Clone)]
pub struct ArtRater {
    board: Arc<Mutex<Board>>,
    notifier: Arc<Notifier>,
    gateway: Arc<dyn ArtworkGateway>,
    in_flight: Arc<watch::Sender<usize>>,
    image_base: Arc<str>,
}

/// Counts one running metadata fetch; decremented on drop so a panicking
/// task still releases `settle`.
struct FetchGuard(Arc<watch::Sender<usize>>);

impl FetchGuard {
    fn new(counter: Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|n| *n += 1);
        Self(counter)
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n -= 1);
    }
}

impl ArtRater {
    /// Create the rater and start metadata fetches for the seed entries.
    /// Must be called from within a tokio runtime.
    pub async fn new<I>(gateway: Arc<dyn ArtworkGateway>, seed: I, image_base: &str) -> Self
    where
        I: IntoIterator<Item = (ArtworkId, bool)>,
    {
        let board = Board {
            entries: EntryCollection::seeded(seed),
            ..Default::default()
        };
        let rater = Self {
            board: Arc::new(Mutex::new(board)),
            notifier: Arc::new(Notifier::new()),
            gateway,
            in_flight: Arc::new(watch::channel(0).0),
            image_base: Arc::from(image_base),
        };
        rater.dispatch_fetches().await;
        rater
    }

    pub async fn from_config(cfg: &Config, gateway: Arc<dyn ArtworkGateway>) -> Self {
        Self::new(gateway, cfg.seed_entries(), &cfg.gateway.image_base_url).await
    }

    async fn dispatch_fetches(&self) {
        let tickets = self.board.lock().await.entries.take_scheduled();
        if tickets.is_empty() {
            return;
        }
        for ticket in tickets {
            let rater = self.clone();
            let guard = FetchGuard::new(self.in_flight.clone());
            tokio::spawn(async move {
                let _guard = guard;
                rater.load_metadata(ticket).await;
            });
        }
    }

    #[instrument(skip_all, fields(id = %ticket.id))]
    async fn load_metadata(&self, ticket: FetchTicket) {
        let fetched = match self.gateway.fetch_artwork(ticket.id).await {
            Ok(resp) => resp.data,
            Err(err) => {
                warn!(?err, "metadata fetch failed");
                None
            }
        };
        let mut board = self.board.lock().await;
        match board.entries.find_live_mut(ticket.id, ticket.key) {
            Some(entry) => {
                entry.finish_load(fetched);
            }
            None => debug!("entry removed; discarding metadata"),
        }
    }

    /// Wait until no metadata fetch is outstanding. Dropping the returned
    /// future leaves the fetches running.
    pub async fn settle(&self) {
        let mut rx = self.in_flight.subscribe();
        if rx.wait_for(|n| *n == 0).await.is_err() {
            warn!("fetch counter closed");
        }
    }

    pub async fn select_rating(&self, id: ArtworkId, rating: u8) -> Result<(), TransitionError> {
        let mut board = self.board.lock().await;
        let entry = board
            .entries
            .find_mut(id)
            .ok_or(TransitionError::EntryMissing(id))?;
        entry.select_rating(rating)
    }

    /// Submit the selected rating for `id`. Rejected unless a rating is
    /// selected and nothing has been submitted for this entry yet.
    ///
    /// Returns the terminal status, or `EntryMissing` if the entry was
    /// removed while the request was in flight.
    #[instrument(skip_all, fields(%id))]
    pub async fn submit(&self, id: ArtworkId) -> Result<SubmissionStatus, TransitionError> {
        let (request, key) = {
            let mut board = self.board.lock().await;
            let entry = board
                .entries
                .find_mut(id)
                .ok_or(TransitionError::EntryMissing(id))?;
            (entry.begin_submit()?, entry.key())
        };

        let accepted = match self.gateway.submit_rating(request).await {
            Ok(resp) if resp.is_success() => true,
            Ok(resp) => {
                warn!(message = ?resp.message, "rating not acknowledged");
                false
            }
            Err(err) => {
                warn!(?err, "rating submission failed");
                false
            }
        };

        let status = {
            let mut board = self.board.lock().await;
            let Some(entry) = board.entries.find_live_mut(id, key) else {
                debug!("entry removed; discarding rating result");
                return Err(TransitionError::EntryMissing(id));
            };
            entry.finish_submit(accepted)?
        };

        if status == SubmissionStatus::Submitted {
            info!(rating = request.rating, "rating recorded");
            self.notifier.emit(RATED_MESSAGE);
        } else {
            info!(rating = request.rating, "rating failed");
        }
        Ok(status)
    }

    /// Replace the add-form input, clearing any error shown on it.
    pub async fn edit_input(&self, text: &str) {
        self.board.lock().await.form.edit(text);
    }

    /// Validate `raw` and, if it names an unlisted artwork that exists in the
    /// catalog, append it to the list.
    #[instrument(skip(self))]
    pub async fn propose_add(&self, raw: &str) -> Result<ArtworkId, AddError> {
        let id = {
            let mut board = self.board.lock().await;
            board.form.edit(raw);
            match board.form.precheck(raw, &board.entries) {
                Ok(id) => id,
                Err(err) => {
                    board.form.fail(err.clone());
                    return Err(err);
                }
            }
        };

        let checked = addition::check_exists(self.gateway.as_ref(), id).await;

        {
            let mut board = self.board.lock().await;
            let added = checked.and_then(|()| {
                board
                    .entries
                    .add(id)
                    .map(|_| ())
                    .map_err(AddError::from)
            });
            if let Err(err) = added {
                info!(%err, "artwork not added");
                board.form.fail(err.clone());
                return Err(err);
            }
            board.form.succeed();
        }

        self.notifier.emit(ADDED_MESSAGE);
        self.dispatch_fetches().await;
        Ok(id)
    }

    /// Propose whatever is currently typed into the add form.
    pub async fn submit_form(&self) -> Result<ArtworkId, AddError> {
        let raw = self.board.lock().await.form.input().to_string();
        self.propose_add(&raw).await
    }

    pub async fn request_delete(&self, id: ArtworkId) -> Result<(), DeleteError> {
        let mut board = self.board.lock().await;
        let Board {
            entries, deletion, ..
        } = &mut *board;
        deletion.request(id, entries)
    }

    pub async fn confirm_delete(&self) -> Result<Option<ArtworkId>, DeleteError> {
        let removed = {
            let mut board = self.board.lock().await;
            let Board {
                entries, deletion, ..
            } = &mut *board;
            deletion.confirm(entries)?
        };
        if removed.is_some() {
            self.notifier.emit(DELETED_MESSAGE);
        }
        Ok(removed)
    }

    pub async fn cancel_delete(&self) {
        self.board.lock().await.deletion.cancel();
    }

    pub async fn pending_deletion(&self) -> Option<ArtworkId> {
        self.board.lock().await.deletion.pending()
    }

    pub async fn delete_prompt(&self) -> Option<DeletePrompt> {
        let board = self.board.lock().await;
        board.deletion.prompt(&board.entries)
    }

    pub async fn entries(&self) -> Vec<EntryView> {
        let board = self.board.lock().await;
        board
            .entries
            .entries()
            .iter()
            .map(|e| e.view(&self.image_base))
            .collect()
    }

    pub async fn entry(&self, id: ArtworkId) -> Option<EntryView> {
        let board = self.board.lock().await;
        board.entries.find(id).map(|e| e.view(&self.image_base))
    }

    pub async fn form(&self) -> AdditionForm {
        self.board.lock().await.form.clone()
    }

    /// The currently visible notification text, if any.
    pub fn notification(&self) -> Option<String> {
        self.notifier.current()
    }

    pub fn dismiss(&self) {
        self.notifier.dismiss();
    }

    pub fn subscribe(&self) -> watch::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Remove `id` directly, bypassing confirmation and the deletable check.
    /// In-flight results for the entry are discarded when they arrive.
    pub async fn evict(&self, id: ArtworkId) -> bool {
        let mut board = self.board.lock().await;
        board.deletion.forget(id);
        board.entries.remove(id)
    }
}
