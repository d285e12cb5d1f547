//! # Notebook Session
//!
//! One editing session on one focused notebook. The session owns the local
//! snapshot, applies edits to it, takes in remote snapshots, and commits on
//! demand.
//!
//! ## Lifecycle
//!
//! 1. [`NotebookSession::open`] seeds an empty placeholder from the focus
//!    identity and starts the reconciler. There is no remote handle yet.
//! 2. Each time the reconciler matches a remote record, it becomes the pending hydration.
//!    Applying it replaces the held notebook wholesale and records the handle.
//! 3. Edits go through [`add_section`](NotebookSession::add_section),
//!    [`remove_section`](NotebookSession::remove_section) and
//!    [`edit_block`](NotebookSession::edit_block).
//! 4. [`save`](NotebookSession::save) commits the full notebook and raises the
//!    saved confirmation.
//! 5. [`leave`](NotebookSession::leave) stops the subscription and navigates
//!    back to the main view.
//!
//! ## Remote Wins
//!
//! A hydration discards any unsaved local edits. This includes hydrations
//! triggered by changes to *other* notebooks, since every change re-delivers
//! the whole collection. There is no merge policy; the last full notebook to
//! arrive is what the session holds. A warning is logged when edits are lost
//! this way.
//!
//! ## When Hydrations Apply
//!
//! Only the newest hydration is kept pending; an older one that was never
//! applied is superseded, since each carries the whole notebook. It is applied
//! only at [`apply_pending`], [`next_remote`] and [`wait_until_ready`]. The
//! caller's event loop decides where that interleaves with edits. In
//! particular `save` never applies a hydration while its write is in flight.
//!
//! [`apply_pending`]: NotebookSession::apply_pending
//! [`next_remote`]: NotebookSession::next_remote
//! [`wait_until_ready`]: NotebookSession::wait_until_ready

use crate::blocks::Blocks;
use crate::config::KodoConfig;
use crate::display::{DisplayController, Layout};
use crate::error::{KodoError, Result};
use crate::model::{ContentBlock, FocusIdentity, Notebook, SectionType};
use crate::remote::{RemoteHandle, RemoteStore};
use crate::sync::{Subscription, SyncAdapter};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

/// The "go to main view" trigger. Fire and forget.
pub trait Navigator {
    fn go_to_main(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub layout: Layout,
    /// Set `lastEdited` to the current time on every save.
    pub stamp_last_edited: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Row,
            stamp_last_edited: false,
        }
    }
}

impl From<&KodoConfig> for SessionOptions {
    fn from(config: &KodoConfig) -> Self {
        Self {
            layout: config.default_layout(),
            stamp_last_edited: config.stamp_last_edited,
        }
    }
}

#[derive(Debug, Clone)]
struct Hydration {
    notebook: Notebook,
    handle: RemoteHandle,
}

/// The latest hydration from the reconciler and how many have been delivered.
#[derive(Debug, Clone, Default)]
struct Inbox {
    latest: Option<Hydration>,
    delivered: u64,
}

pub struct NotebookSession<R: RemoteStore + 'static> {
    adapter: SyncAdapter<R>,
    notebook: Notebook,
    handle: Option<RemoteHandle>,
    display: DisplayController,
    options: SessionOptions,
    saved: bool,
    dirty: bool,
    hydrations: u64,
    delivered_seen: u64,
    inbound: watch::Receiver<Inbox>,
    subscription: Subscription,
}

impl<R: RemoteStore + 'static> NotebookSession<R> {
    /// Starts a session focused on `identity`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn open(remote: Arc<R>, identity: FocusIdentity, options: SessionOptions) -> Self {
        let notebook = identity.placeholder();
        let adapter = SyncAdapter::new(remote, identity);

        let (tx, inbound) = watch::channel(Inbox::default());
        let subscription = adapter.subscribe(move |notebook, handle| {
            tx.send_modify(|inbox| {
                inbox.latest = Some(Hydration { notebook, handle });
                inbox.delivered += 1;
            });
        });

        tracing::info!(identity = %adapter.identity(), layout = %options.layout, "notebook session opened");

        Self {
            adapter,
            notebook,
            handle: None,
            display: DisplayController::new(options.layout),
            options,
            saved: false,
            dirty: false,
            hydrations: 0,
            delivered_seen: 0,
            inbound,
            subscription,
        }
    }

    pub fn identity(&self) -> &FocusIdentity {
        self.adapter.identity()
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub fn blocks(&self) -> &Blocks {
        &self.notebook.blocks
    }

    pub fn handle(&self) -> Option<&RemoteHandle> {
        self.handle.as_ref()
    }

    /// True once a remote record has been matched.
    pub fn is_ready(&self) -> bool {
        self.handle.is_some()
    }

    /// True when local edits have been made since the last hydration or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the saved confirmation is showing.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn dismiss_saved(&mut self) {
        self.saved = false;
    }

    pub fn hydration_count(&self) -> u64 {
        self.hydrations
    }

    pub fn layout(&self) -> Layout {
        self.display.layout()
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.display.set_layout(layout);
    }

    // --- Edits ---

    pub fn add_section(&mut self, section_type: SectionType) {
        self.notebook.blocks.append(section_type);
        self.dirty = true;
    }

    /// Removes the last block, if any.
    pub fn remove_section(&mut self) -> Option<ContentBlock> {
        let removed = self.notebook.blocks.remove_last();
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn edit_block(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.notebook.blocks.set_value(index, value)?;
        self.dirty = true;
        Ok(())
    }

    // --- Inbound ---

    /// Applies the pending hydration, if any, without waiting. Returns `1`
    /// when one was applied and `0` otherwise.
    pub fn apply_pending(&mut self) -> usize {
        let (latest, delivered) = {
            let inbox = self.inbound.borrow_and_update();
            (inbox.latest.clone(), inbox.delivered)
        };
        if delivered == self.delivered_seen {
            return 0;
        }
        let Some(hydration) = latest else {
            return 0;
        };

        let superseded = delivered - self.delivered_seen - 1;
        if superseded > 0 {
            tracing::debug!(identity = %self.adapter.identity(), superseded, "skipping superseded snapshots");
        }
        self.delivered_seen = delivered;
        self.hydrate(hydration);
        1
    }

    /// Waits for the next hydration and applies it. One that is already
    /// pending is applied right away.
    pub async fn next_remote(&mut self) -> Result<()> {
        while self.apply_pending() == 0 {
            self.inbound
                .changed()
                .await
                .map_err(|_| KodoError::SubscriptionClosed)?;
        }
        Ok(())
    }

    /// Waits until a remote record has been matched. A pending hydration is
    /// applied first.
    pub async fn wait_until_ready(&mut self) -> Result<()> {
        self.apply_pending();
        while !self.is_ready() {
            self.next_remote().await?;
        }
        Ok(())
    }

    fn hydrate(&mut self, hydration: Hydration) {
        if self.dirty {
            tracing::warn!(
                identity = %self.adapter.identity(),
                "remote snapshot replaced unsaved local edits"
            );
        }
        tracing::debug!(
            identity = %self.adapter.identity(),
            handle = %hydration.handle,
            blocks = hydration.notebook.blocks.len(),
            "hydrating notebook"
        );
        self.notebook = hydration.notebook;
        self.handle = Some(hydration.handle);
        self.dirty = false;
        self.hydrations += 1;
    }

    // --- Outbound ---

    /// Commits the full notebook to its remote record.
    ///
    /// On failure the local notebook is left untouched and stays editable.
    pub async fn save(&mut self) -> Result<()> {
        let Some(handle) = self.handle.clone() else {
            tracing::warn!(identity = %self.adapter.identity(), "save requested before notebook was ready");
            return Err(KodoError::NotReady);
        };

        let mut outgoing = self.notebook.clone();
        if self.options.stamp_last_edited {
            outgoing.set_last_edited(Utc::now().to_rfc3339());
        }

        match self.adapter.commit(Some(&handle), &outgoing).await {
            Ok(()) => {
                tracing::info!(
                    identity = %self.adapter.identity(),
                    blocks = outgoing.blocks.len(),
                    "notebook saved"
                );
                self.notebook = outgoing;
                self.dirty = false;
                self.saved = true;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(identity = %self.adapter.identity(), error = %e, "notebook save failed");
                Err(e)
            }
        }
    }

    /// Ends the session: stops consuming remote snapshots, then navigates to
    /// the main view. Unsaved edits are dropped.
    pub fn leave(self, navigator: &dyn Navigator) {
        self.subscription.cancel();
        tracing::info!(identity = %self.adapter.identity(), dirty = self.dirty, "leaving notebook session");
        navigator.go_to_main();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::memory::fixtures::RemoteFixture;
    use crate::remote::memory::MemoryRemote;
    use std::cell::Cell;
    use std::time::Duration;

    async fn ready_session(fixture: &RemoteFixture, owner: &str, title: &str) -> NotebookSession<MemoryRemote> {
        let mut session = NotebookSession::open(
            Arc::clone(&fixture.remote),
            FocusIdentity::new(owner, title),
            SessionOptions::default(),
        );
        tokio::time::timeout(Duration::from_secs(5), session.wait_until_ready())
            .await
            .expect("session never hydrated")
            .unwrap();
        session
    }

    async fn next_remote(session: &mut NotebookSession<MemoryRemote>) {
        tokio::time::timeout(Duration::from_secs(5), session.next_remote())
            .await
            .expect("no hydration arrived")
            .unwrap();
    }

    #[tokio::test]
    async fn opens_with_placeholder_and_no_handle() {
        let fixture = RemoteFixture::new();
        let session = NotebookSession::open(
            Arc::clone(&fixture.remote),
            FocusIdentity::new("u1", "Algebra").with_color("green"),
            SessionOptions::default(),
        );

        assert!(!session.is_ready());
        assert_eq!(session.notebook().title(), "Algebra");
        assert_eq!(session.notebook().color(), "green");
        assert!(session.blocks().is_empty());
        assert_eq!(session.layout(), Layout::Row);
    }

    #[tokio::test]
    async fn save_before_hydration_is_not_ready() {
        let fixture = RemoteFixture::new();
        let mut session = NotebookSession::open(
            Arc::clone(&fixture.remote),
            FocusIdentity::new("u1", "Algebra"),
            SessionOptions::default(),
        );
        session.add_section(SectionType::Code);

        let err = session.save().await.unwrap_err();
        assert!(matches!(err, KodoError::NotReady));
        assert!(!session.is_saved());
        assert_eq!(session.blocks().len(), 1);
    }

    #[tokio::test]
    async fn hydration_replaces_placeholder() {
        let fixture = RemoteFixture::new().with_filled_notebook("u1", "Algebra", 2);
        let session = ready_session(&fixture, "u1", "Algebra").await;

        assert_eq!(session.handle(), fixture.handle_of("u1", "Algebra").as_ref());
        assert_eq!(session.blocks().len(), 2);
        assert_eq!(session.blocks()[1].value, "Block 2");
        assert_eq!(session.hydration_count(), 1);
    }

    #[tokio::test]
    async fn second_snapshot_supersedes_first() {
        let fixture = RemoteFixture::new().with_filled_notebook("u1", "Algebra", 3);
        let mut session = ready_session(&fixture, "u1", "Algebra").await;
        let handle = session.handle().cloned().unwrap();

        let replacement = Notebook::new("u1", "#4a90e2", "Algebra")
            .with_blocks(vec![ContentBlock::with_value(SectionType::Code, "only")]);
        fixture.remote.update(&handle, &replacement).await.unwrap();
        next_remote(&mut session).await;

        assert_eq!(session.notebook(), &replacement);
        assert_eq!(session.hydration_count(), 2);
    }

    #[tokio::test]
    async fn unrelated_snapshot_discards_unsaved_edits() {
        let fixture = RemoteFixture::new().with_filled_notebook("u1", "Algebra", 1);
        let mut session = ready_session(&fixture, "u1", "Algebra").await;

        session.add_section(SectionType::Code);
        session.edit_block(0, "local only").unwrap();
        assert!(session.is_dirty());

        fixture.remote.insert_now(Notebook::new("u2", "red", "Unrelated"));
        next_remote(&mut session).await;

        assert!(!session.is_dirty());
        assert_eq!(session.blocks().len(), 1);
        assert_eq!(session.blocks()[0].value, "Block 1");
    }

    #[tokio::test]
    async fn idle_session_keeps_only_the_newest_snapshot() {
        let fixture = RemoteFixture::new().with_filled_notebook("u1", "Algebra", 1);
        let mut session = ready_session(&fixture, "u1", "Algebra").await;

        for i in 0..50 {
            fixture
                .remote
                .insert_now(Notebook::new("u2", "red", format!("Unrelated {i}")));
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(session.apply_pending(), 1);
        assert_eq!(session.apply_pending(), 0);
        assert_eq!(session.hydration_count(), 2);
        assert_eq!(session.blocks()[0].value, "Block 1");
    }

    #[tokio::test]
    async fn save_commits_current_blocks() {
        let fixture = RemoteFixture::new().with_empty_notebook("u1", "Algebra");
        let mut session = ready_session(&fixture, "u1", "Algebra").await;

        session.add_section(SectionType::Code);
        session.add_section(SectionType::Text);
        session.edit_block(0, "print(1)").unwrap();
        session.edit_block(1, "notes").unwrap();
        session.save().await.unwrap();

        let handle = session.handle().cloned().unwrap();
        let stored = fixture.remote.get(&handle).unwrap();
        assert_eq!(stored.blocks, session.blocks().clone());
        assert!(session.is_saved());
        assert!(!session.is_dirty());
        assert_eq!(stored.last_edited(), "");
    }

    #[tokio::test]
    async fn failed_save_keeps_local_state() {
        let fixture = RemoteFixture::new().with_empty_notebook("u1", "Algebra");
        let mut session = ready_session(&fixture, "u1", "Algebra").await;
        session.add_section(SectionType::Text);
        session.edit_block(0, "draft").unwrap();
        fixture.remote.set_simulate_write_error(true);

        let err = session.save().await.unwrap_err();

        assert!(matches!(err, KodoError::RemoteWrite(_)));
        assert!(!session.is_saved());
        assert!(session.is_dirty());
        assert_eq!(session.blocks()[0].value, "draft");

        // Still editable, and a later save goes through.
        fixture.remote.set_simulate_write_error(false);
        session.edit_block(0, "final").unwrap();
        session.save().await.unwrap();
        let stored = fixture.remote.get(session.handle().unwrap()).unwrap();
        assert_eq!(stored.blocks[0].value, "final");
    }

    #[tokio::test]
    async fn stamping_sets_last_edited_on_save() {
        let fixture = RemoteFixture::new().with_empty_notebook("u1", "Algebra");
        let mut session = NotebookSession::open(
            Arc::clone(&fixture.remote),
            FocusIdentity::new("u1", "Algebra"),
            SessionOptions {
                stamp_last_edited: true,
                ..Default::default()
            },
        );
        session.wait_until_ready().await.unwrap();
        session.save().await.unwrap();

        let stored = fixture.remote.get(session.handle().unwrap()).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stored.last_edited()).is_ok());
        assert_eq!(session.notebook().last_edited(), stored.last_edited());
    }

    #[tokio::test]
    async fn saved_confirmation_survives_until_dismissed() {
        let fixture = RemoteFixture::new().with_empty_notebook("u1", "Algebra");
        let mut session = ready_session(&fixture, "u1", "Algebra").await;
        session.save().await.unwrap();

        // The save echoes back through the subscription.
        next_remote(&mut session).await;
        assert!(session.is_saved());

        session.dismiss_saved();
        assert!(!session.is_saved());
    }

    #[tokio::test]
    async fn edit_out_of_range_is_rejected() {
        let fixture = RemoteFixture::new().with_filled_notebook("u1", "Algebra", 1);
        let mut session = ready_session(&fixture, "u1", "Algebra").await;

        let err = session.edit_block(5, "x").unwrap_err();
        assert!(matches!(err, KodoError::IndexOutOfRange { index: 5, len: 1 }));
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn remove_on_empty_is_not_an_edit() {
        let fixture = RemoteFixture::new().with_empty_notebook("u1", "Algebra");
        let mut session = ready_session(&fixture, "u1", "Algebra").await;
        assert!(session.remove_section().is_none());
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn leave_navigates_to_main() {
        struct Recorder<'a>(&'a Cell<u32>);
        impl Navigator for Recorder<'_> {
            fn go_to_main(&self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let fixture = RemoteFixture::new().with_empty_notebook("u1", "Algebra");
        let session = ready_session(&fixture, "u1", "Algebra").await;
        let calls = Cell::new(0);
        session.leave(&Recorder(&calls));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn layout_follows_options_and_toggles() {
        let fixture = RemoteFixture::new();
        let mut session = NotebookSession::open(
            Arc::clone(&fixture.remote),
            FocusIdentity::new("u1", "Algebra"),
            SessionOptions {
                layout: Layout::Grid,
                ..Default::default()
            },
        );
        assert_eq!(session.layout(), Layout::Grid);
        session.set_layout(Layout::Row);
        assert_eq!(session.layout(), Layout::Row);
    }
}
