//! The per-cell story playback state machine.
//!
//! A [`StoryPlayer`] owns one viewing cell's playback: which snap is
//! current, whose timer is running, what has already been played, and what
//! must happen when the host reports a gesture, a visibility change or the
//! application returning to the foreground.
//!
//! The machine walks `Idle → Loading(i) → Active(i)` then either advances
//! to `Loading(i + 1)` or ends in `Completed`; `Active(i)` is interruptible
//! to `Paused(i)` and back. A snap only becomes active once its image has
//! loaded AND the cell is visible, whichever happens last.
//!
//! Cells in a scrolling host are reused: [`assign_story`] and
//! [`did_end_display`] bump an internal epoch so image loads and timer
//! completions started under a previous display cycle are recognised and
//! discarded instead of leaking into the next story.
//!
//! All host-facing methods are synchronous and serialize on a single state
//! lock; side effects (header orders, load spawns, events) are collected
//! under the lock and performed after it is released, so event callbacks
//! may call back into the player freely.
//!
//! [`assign_story`]: StoryPlayer::assign_story
//! [`did_end_display`]: StoryPlayer::did_end_display

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock as StdRwLock};

use tracing::{debug, warn};

use reelmodel::Story;
use reelsnaps::{LoadError, SnapImage, SnapLoader};

use crate::config::PlaybackConfig;
use crate::events::StoryEvent;
use crate::header::StoryHeader;
use crate::lifecycle::ForegroundNotifier;
use crate::track::ProgressTrack;

/// Playback position of one cell, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No display cycle running (fresh cell, or between stories)
    Idle,
    /// Waiting for this snap's image before its timer may start
    Loading(usize),
    /// This snap's timer is counting down
    Active(usize),
    /// This snap's timer is frozen by a gesture
    Paused(usize),
    /// Every snap has played; `PreviewCompleted` has been emitted
    Completed,
}

type EventCallback = Arc<dyn Fn(&StoryEvent) + Send + Sync>;

/// One story playback engine per viewing cell.
///
/// Cheap to clone (handle over shared state). Requires a tokio runtime:
/// snap timers and image loads run as spawned tasks.
#[derive(Clone)]
pub struct StoryPlayer {
    inner: Arc<PlayerInner>,
}

struct PlayerInner {
    loader: Arc<dyn SnapLoader>,
    config: PlaybackConfig,
    state: Mutex<PlayerState>,
    callbacks: StdRwLock<HashMap<u64, EventCallback>>,
    callback_counter: AtomicU64,
}

struct PlayerState {
    story: Option<Arc<Story>>,
    playback: PlaybackState,
    current_index: usize,
    visible: bool,
    /// Display-cycle counter. Async completions carry the epoch they were
    /// started under and are discarded once it no longer matches.
    epoch: u64,
    /// Timer-generation counter. A completion from a timer that has been
    /// replaced (full-duration restart on foreground) is stale even within
    /// one epoch.
    activation: u64,
    track: ProgressTrack,
    header: Option<Arc<dyn StoryHeader>>,
    notifier: Option<ForegroundNotifier>,
    foreground_token: Option<u64>,
}

/// Header orders, replayed in submission order after the state lock drops
enum HeaderCall {
    SetOwner { name: String, picture_url: String },
    SetLabel(String),
    CreateBars(usize),
    FillBar(usize),
    ClearBar(usize),
}

struct LoadRequest {
    index: usize,
    url: String,
    epoch: u64,
}

/// Side effects decided under the state lock, performed after release
#[derive(Default)]
struct Effects {
    header: Option<Arc<dyn StoryHeader>>,
    header_calls: Vec<HeaderCall>,
    loads: Vec<LoadRequest>,
    events: Vec<StoryEvent>,
}

impl Effects {
    /// Queue a header order; dropped when the player runs headless
    fn header_call(&mut self, state: &PlayerState, call: HeaderCall) {
        if let Some(header) = &state.header {
            if self.header.is_none() {
                self.header = Some(Arc::clone(header));
            }
            self.header_calls.push(call);
        }
    }
}

impl StoryPlayer {
    /// Creates a player with the default configuration
    pub fn new(loader: Arc<dyn SnapLoader>) -> Self {
        Self::with_config(loader, PlaybackConfig::default())
    }

    /// Creates a player with an explicit configuration
    pub fn with_config(loader: Arc<dyn SnapLoader>, config: PlaybackConfig) -> Self {
        Self {
            inner: Arc::new(PlayerInner {
                loader,
                config,
                state: Mutex::new(PlayerState {
                    story: None,
                    playback: PlaybackState::Idle,
                    current_index: 0,
                    visible: false,
                    epoch: 0,
                    activation: 0,
                    track: ProgressTrack::new(0),
                    header: None,
                    notifier: None,
                    foreground_token: None,
                }),
                callbacks: StdRwLock::new(HashMap::new()),
                callback_counter: AtomicU64::new(1),
            }),
        }
    }

    /// Attaches the header view this player drives.
    ///
    /// Without a header the engine plays identically, just silently.
    pub fn attach_header(&self, header: Arc<dyn StoryHeader>) {
        let mut state = self.inner.state.lock().unwrap();
        state.header = Some(header);
    }

    /// Attaches the foreground notifier this player listens to while its
    /// cell is on screen.
    ///
    /// Registration happens per display cycle and the token is released on
    /// [`did_end_display`] (or when the player is dropped), so a recycled
    /// cell never leaves a ghost observer behind.
    ///
    /// [`did_end_display`]: StoryPlayer::did_end_display
    pub fn attach_foreground_notifier(&self, notifier: &ForegroundNotifier) {
        let mut state = self.inner.state.lock().unwrap();
        if let Some(token) = state.foreground_token.take() {
            if let Some(old) = &state.notifier {
                old.unregister(token);
            }
        }
        state.notifier = Some(notifier.clone());
    }

    /// Subscribe to playback events (completion, close requests).
    ///
    /// Returns a token for [`unregister_callback`]. Callbacks are invoked
    /// outside the state lock and may call back into the player.
    ///
    /// [`unregister_callback`]: StoryPlayer::unregister_callback
    pub fn register_callback<F>(&self, callback: F) -> u64
    where
        F: Fn(&StoryEvent) + Send + Sync + 'static,
    {
        let token = self.inner.callback_counter.fetch_add(1, Ordering::Relaxed);
        let mut callbacks = self.inner.callbacks.write().unwrap();
        callbacks.insert(token, Arc::new(callback));
        debug!(token, "story event callback registered");
        token
    }

    /// Remove a previously registered event callback
    pub fn unregister_callback(&self, token: u64) {
        let mut callbacks = self.inner.callbacks.write().unwrap();
        callbacks.remove(&token);
    }

    /// Binds a story to this cell and resets the display cycle.
    ///
    /// Any in-flight loads or timers from the previous story become stale
    /// (epoch bump) and will be discarded on arrival. Playback does not
    /// start here; it starts when the host reports [`will_display`].
    ///
    /// [`will_display`]: StoryPlayer::will_display
    pub fn assign_story(&self, story: Arc<Story>) {
        let mut effects = Effects::default();
        {
            let mut state = self.inner.state.lock().unwrap();
            state.epoch += 1;
            state.activation += 1;
            if let Some(token) = state.foreground_token.take() {
                if let Some(notifier) = &state.notifier {
                    notifier.unregister(token);
                }
            }
            state.track = ProgressTrack::new(story.snap_count());
            state.playback = PlaybackState::Idle;
            state.current_index = 0;
            state.visible = false;

            debug!(
                story = %story.id(),
                snaps = story.snap_count(),
                epoch = state.epoch,
                "story assigned to cell"
            );
            effects.header_call(
                &state,
                HeaderCall::SetOwner {
                    name: story.owner().name.clone(),
                    picture_url: story.owner().picture_url.clone(),
                },
            );
            state.story = Some(story);
        }
        self.run_effects(effects);
    }

    /// The cell is about to appear on screen; playback starts (or resumes)
    /// at `resume_index`.
    ///
    /// Snaps before `resume_index` show as already played. A zero-snap
    /// story completes immediately. Called while a cycle is already running
    /// or before any story is assigned, this is a no-op.
    pub fn will_display(&self, resume_index: usize) {
        let mut effects = Effects::default();
        {
            let mut state = self.inner.state.lock().unwrap();
            let Some(story) = state.story.clone() else {
                warn!("will_display without an assigned story");
                return;
            };
            if state.playback != PlaybackState::Idle {
                warn!(state = ?state.playback, "will_display during a running cycle, ignoring");
                return;
            }

            if story.is_empty() {
                debug!(story = %story.id(), "story has no snaps, completing immediately");
                state.visible = true;
                state.playback = PlaybackState::Completed;
                effects.events.push(StoryEvent::PreviewCompleted {
                    story_id: story.id().clone(),
                });
            } else if resume_index >= story.snap_count() {
                warn!(
                    story = %story.id(),
                    resume_index,
                    snaps = story.snap_count(),
                    "resume index out of range, ignoring display"
                );
                return;
            } else {
                state.visible = true;
                state.current_index = resume_index;
                debug!(
                    story = %story.id(),
                    resume_index,
                    "cell will display, starting playback"
                );

                effects.header_call(&state, HeaderCall::CreateBars(story.snap_count()));
                state.track.mark_played_up_to(resume_index);
                for played in 0..resume_index {
                    effects.header_call(&state, HeaderCall::FillBar(played));
                }

                self.register_foreground(&mut state);
                self.begin_snap(&mut state, &story, resume_index, &mut effects);
            }
        }
        self.run_effects(effects);
    }

    /// The cell has left the screen (scrolled away or viewer dismissed).
    ///
    /// Persists the resume position, cancels the running timer, releases
    /// the foreground token and clears the track. Safe to call twice: a
    /// second call finds the player idle and does nothing.
    pub fn did_end_display(&self) {
        let mut effects = Effects::default();
        {
            let mut state = self.inner.state.lock().unwrap();
            if state.playback == PlaybackState::Idle {
                debug!("did_end_display on an idle cell, ignoring");
                return;
            }

            if let Some(story) = &state.story {
                story.set_last_played_snap_index(state.current_index);
                debug!(
                    story = %story.id(),
                    resume_index = state.current_index,
                    "cell left screen, resume position persisted"
                );
            }
            // An empty story created no bars, nothing to clear
            if !state.track.is_empty() {
                effects.header_call(&state, HeaderCall::ClearBar(state.current_index));
            }

            if let Some(token) = state.foreground_token.take() {
                if let Some(notifier) = &state.notifier {
                    notifier.unregister(token);
                }
            }

            state.epoch += 1;
            state.activation += 1;
            state.track.clear_all();
            state.visible = false;
            state.current_index = 0;
            state.playback = PlaybackState::Idle;
        }
        self.run_effects(effects);
    }

    /// The host started dragging the story list: freeze the current snap
    pub fn will_begin_drag(&self) {
        self.pause_playback("drag");
    }

    /// The story list settled after a drag: resume the frozen snap
    pub fn did_end_decelerate(&self) {
        self.resume_playback("drag ended");
    }

    /// A long press landed on the cell: freeze the current snap
    pub fn long_press_begin(&self) {
        self.pause_playback("long press");
    }

    /// The long press lifted: resume the frozen snap
    pub fn long_press_end(&self) {
        self.resume_playback("long press ended");
    }

    /// The application returned to the foreground.
    ///
    /// The current snap restarts at full duration, out of pause if it was
    /// paused. Wired automatically when a [`ForegroundNotifier`] is
    /// attached; hosts without one may call this directly.
    pub fn on_foreground(&self) {
        let mut state = self.inner.state.lock().unwrap();
        if !state.visible {
            return;
        }
        let index = match state.playback {
            PlaybackState::Active(index) | PlaybackState::Paused(index) => index,
            _ => return,
        };
        let Some(story) = state.story.clone() else {
            return;
        };
        debug!(
            story = %story.id(),
            snap = index,
            "application foregrounded, restarting snap at full duration"
        );
        self.activate_snap(&mut state, &story, index);
    }

    /// The close control in the header was tapped.
    ///
    /// Only forwards the request to the host; tearing the cell down stays
    /// the host's call (it owns the view hierarchy).
    pub fn request_close(&self) {
        let event = {
            let state = self.inner.state.lock().unwrap();
            state.story.as_ref().map(|story| StoryEvent::CloseRequested {
                story_id: story.id().clone(),
            })
        };
        if let Some(event) = event {
            self.notify(&event);
        }
    }

    /// Outcome of an image load started by this player.
    ///
    /// Loads from a previous display cycle (stale epoch) are discarded. A
    /// failed load leaves the snap stuck in `Loading`; there is no retry
    /// within the cycle, the next display attempt starts a fresh one.
    fn handle_load_result(
        &self,
        epoch: u64,
        index: usize,
        result: Result<Arc<SnapImage>, LoadError>,
    ) {
        let mut state = self.inner.state.lock().unwrap();
        if state.epoch != epoch {
            debug!(
                snap = index,
                load_epoch = epoch,
                current_epoch = state.epoch,
                "discarding image load from a previous display cycle"
            );
            return;
        }

        match result {
            Ok(image) => {
                state.track.store_image(index, image);
                if state.visible && state.playback == PlaybackState::Loading(index) {
                    if let Some(story) = state.story.clone() {
                        self.activate_snap(&mut state, &story, index);
                    }
                } else {
                    debug!(
                        snap = index,
                        state = ?state.playback,
                        "snap image stored for later activation"
                    );
                }
            }
            Err(error) => {
                // The snap stays in Loading: no timer, no advance, no event.
                // The host sees a stuck bar rather than a crash.
                warn!(snap = index, %error, "snap image load failed");
            }
        }
    }

    /// A snap timer reached its deadline.
    ///
    /// Guards against two kinds of staleness: a completion from a previous
    /// display cycle (epoch) and a completion from a timer that has since
    /// been replaced or paused (activation generation).
    fn handle_timer_completed(&self, epoch: u64, activation: u64, index: usize) {
        let mut effects = Effects::default();
        {
            let mut state = self.inner.state.lock().unwrap();
            if state.epoch != epoch || state.activation != activation {
                debug!(snap = index, "discarding stale timer completion");
                return;
            }
            let Some(story) = state.story.clone() else {
                return;
            };
            match state.playback {
                PlaybackState::Active(current) | PlaybackState::Paused(current)
                    if current == index => {}
                _ => {
                    debug!(
                        snap = index,
                        state = ?state.playback,
                        "timer completion does not match playback state, ignoring"
                    );
                    return;
                }
            }

            state.track.complete(index);
            effects.header_call(&state, HeaderCall::FillBar(index));

            let next = index + 1;
            if next < story.snap_count() {
                // Persist on advance only: a story completed to the end
                // restarts from its last snap next time, as feeds expect
                story.set_last_played_snap_index(index);
                state.current_index = next;
                debug!(story = %story.id(), from = index, to = next, "snap complete, advancing");
                self.begin_snap(&mut state, &story, next, &mut effects);
            } else {
                state.playback = PlaybackState::Completed;
                debug!(story = %story.id(), "story preview completed");
                effects.events.push(StoryEvent::PreviewCompleted {
                    story_id: story.id().clone(),
                });
            }
        }
        self.run_effects(effects);
    }

    /// Freeze the current snap; only an active snap can pause
    fn pause_playback(&self, source: &str) {
        let mut state = self.inner.state.lock().unwrap();
        let index = match state.playback {
            PlaybackState::Active(index) => index,
            _ => {
                debug!(state = ?state.playback, source, "pause ignored");
                return;
            }
        };
        state.track.pause(index);
        state.playback = PlaybackState::Paused(index);
        debug!(snap = index, source, "playback paused");
    }

    /// Resume the frozen snap; only a paused snap can resume
    fn resume_playback(&self, source: &str) {
        let mut state = self.inner.state.lock().unwrap();
        let index = match state.playback {
            PlaybackState::Paused(index) => index,
            _ => {
                debug!(state = ?state.playback, source, "resume ignored");
                return;
            }
        };
        state.track.resume(index);
        state.playback = PlaybackState::Active(index);
        debug!(snap = index, source, "playback resumed");
    }

    /// Makes `index` the current snap: label update, then either immediate
    /// activation (image already here) or a load request.
    fn begin_snap(
        &self,
        state: &mut PlayerState,
        story: &Arc<Story>,
        index: usize,
        effects: &mut Effects,
    ) {
        let Some(snap) = story.snap(index) else {
            warn!(story = %story.id(), snap = index, "begin_snap past the story end, ignoring");
            return;
        };
        effects.header_call(state, HeaderCall::SetLabel(snap.last_updated.clone()));

        if state.track.image(index).is_some() {
            // Already loaded (prefetch, or load finished while off screen)
            self.activate_snap(state, story, index);
        } else {
            state.playback = PlaybackState::Loading(index);
            if state.track.mark_loading(index) {
                effects.loads.push(LoadRequest {
                    index,
                    url: snap.url.clone(),
                    epoch: state.epoch,
                });
            } else {
                debug!(snap = index, "image load already in flight, waiting");
            }
        }

        if self.inner.config.prefetch_next {
            let next = index + 1;
            if let Some(upcoming) = story.snap(next) {
                if state.track.mark_loading(next) {
                    effects.loads.push(LoadRequest {
                        index: next,
                        url: upcoming.url.clone(),
                        epoch: state.epoch,
                    });
                }
            }
        }
    }

    /// Starts (or restarts at full duration) the timer of snap `index`
    fn activate_snap(&self, state: &mut PlayerState, story: &Arc<Story>, index: usize) {
        state.activation += 1;
        let epoch = state.epoch;
        let activation = state.activation;
        let weak = Arc::downgrade(&self.inner);
        state.track.activate(
            index,
            self.inner.config.snap_duration,
            move || {
                if let Some(inner) = weak.upgrade() {
                    StoryPlayer { inner }.handle_timer_completed(epoch, activation, index);
                }
            },
        );
        state.playback = PlaybackState::Active(index);
        debug!(
            story = %story.id(),
            snap = index,
            duration = ?self.inner.config.snap_duration,
            "snap active"
        );
    }

    /// Hooks this display cycle up to the foreground notifier, if one is
    /// attached
    fn register_foreground(&self, state: &mut PlayerState) {
        let Some(notifier) = state.notifier.clone() else {
            return;
        };
        if let Some(token) = state.foreground_token.take() {
            notifier.unregister(token);
        }
        // The callback holds a weak handle: a dropped player must not be
        // kept alive by the notifier registry
        let weak = Arc::downgrade(&self.inner);
        let token = notifier.register(move || {
            if let Some(inner) = weak.upgrade() {
                StoryPlayer { inner }.on_foreground();
            }
        });
        state.foreground_token = Some(token);
    }

    /// Spawns the image load for one snap; the task holds only a weak
    /// handle, an orphaned load evaporates with its player
    fn spawn_load(&self, request: LoadRequest) {
        let loader = Arc::clone(&self.inner.loader);
        let weak = Arc::downgrade(&self.inner);
        debug!(snap = request.index, url = %request.url, "requesting snap image");
        tokio::spawn(async move {
            let result = loader.load(&request.url).await;
            if let Some(inner) = weak.upgrade() {
                StoryPlayer { inner }.handle_load_result(request.epoch, request.index, result);
            }
        });
    }

    /// Performs the side effects decided under the state lock
    fn run_effects(&self, effects: Effects) {
        let Effects {
            header,
            header_calls,
            loads,
            events,
        } = effects;

        if let Some(header) = header {
            for call in header_calls {
                match call {
                    HeaderCall::SetOwner { name, picture_url } => {
                        header.set_owner(&name, &picture_url)
                    }
                    HeaderCall::SetLabel(text) => header.set_last_updated_label(&text),
                    HeaderCall::CreateBars(count) => header.create_progress_bars(count),
                    HeaderCall::FillBar(index) => header.fill_progress_bar(index),
                    HeaderCall::ClearBar(index) => header.clear_progress_bar(index),
                }
            }
        }
        for request in loads {
            self.spawn_load(request);
        }
        for event in events {
            self.notify(&event);
        }
    }

    /// Fan an event out to the registered callbacks (outside any lock)
    fn notify(&self, event: &StoryEvent) {
        let callbacks: Vec<EventCallback> = {
            let callbacks = self.inner.callbacks.read().unwrap();
            callbacks.values().cloned().collect()
        };
        debug!(?event, listeners = callbacks.len(), "emitting story event");
        for callback in callbacks {
            callback(event);
        }
    }

    /// Current playback position
    pub fn state(&self) -> PlaybackState {
        self.inner.state.lock().unwrap().playback
    }

    /// Index of the snap currently showing (0 when idle)
    pub fn current_index(&self) -> usize {
        self.inner.state.lock().unwrap().current_index
    }

    /// Story bound to this cell, if any
    pub fn story(&self) -> Option<Arc<Story>> {
        self.inner.state.lock().unwrap().story.clone()
    }

    /// Whether the cell is currently on screen
    pub fn is_visible(&self) -> bool {
        self.inner.state.lock().unwrap().visible
    }

    /// Decoded image of snap `index` for the current display cycle, once
    /// loaded. This is the host's render path.
    pub fn snap_image(&self, index: usize) -> Option<Arc<SnapImage>> {
        self.inner.state.lock().unwrap().track.image(index)
    }
}

impl Drop for PlayerInner {
    fn drop(&mut self) {
        // Last handle gone: give the foreground token back so the notifier
        // does not keep invoking a dead cell
        if let Ok(state) = self.state.get_mut() {
            if let Some(token) = state.foreground_token.take() {
                if let Some(notifier) = &state.notifier {
                    notifier.unregister(token);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reelmodel::{Snap, StoryId, StoryOwner};
    use std::sync::atomic::AtomicUsize;

    /// Chargeur qui ne répond jamais : les snaps restent en chargement
    struct NeverLoader;

    #[async_trait]
    impl SnapLoader for NeverLoader {
        async fn load(&self, _url: &str) -> reelsnaps::Result<Arc<SnapImage>> {
            std::future::pending().await
        }
    }

    fn stub_story(snap_count: usize) -> Arc<Story> {
        let snaps = (0..snap_count)
            .map(|i| Snap::new(format!("https://example.com/{i}.jpg"), format!("{i}h")))
            .collect();
        Arc::new(Story::new(
            StoryId::new("story-test"),
            StoryOwner::new("ana", "https://example.com/ana.png"),
            snaps,
        ))
    }

    fn player() -> StoryPlayer {
        StoryPlayer::new(Arc::new(NeverLoader))
    }

    #[tokio::test]
    async fn test_initial_state() {
        let player = player();
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(player.current_index(), 0);
        assert!(player.story().is_none());
        assert!(!player.is_visible());
    }

    #[tokio::test]
    async fn test_will_display_without_story_is_noop() {
        let player = player();
        player.will_display(0);
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(!player.is_visible());
    }

    #[tokio::test]
    async fn test_will_display_enters_loading() {
        let player = player();
        player.assign_story(stub_story(3));
        player.will_display(0);
        assert_eq!(player.state(), PlaybackState::Loading(0));
        assert!(player.is_visible());
    }

    #[tokio::test]
    async fn test_will_display_during_running_cycle_is_noop() {
        let player = player();
        player.assign_story(stub_story(3));
        player.will_display(0);
        player.will_display(2);
        assert_eq!(player.state(), PlaybackState::Loading(0));
        assert_eq!(player.current_index(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_resume_index_is_noop() {
        let player = player();
        player.assign_story(stub_story(3));
        player.will_display(7);
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(!player.is_visible());
    }

    #[tokio::test]
    async fn test_empty_story_completes_immediately() {
        let player = player();
        let completions = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&completions);
        player.register_callback(move |event| {
            if matches!(event, StoryEvent::PreviewCompleted { .. }) {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        player.assign_story(stub_story(0));
        player.will_display(0);
        assert_eq!(player.state(), PlaybackState::Completed);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pause_while_loading_is_noop() {
        let player = player();
        player.assign_story(stub_story(2));
        player.will_display(0);
        player.long_press_begin();
        assert_eq!(player.state(), PlaybackState::Loading(0));
        player.long_press_end();
        assert_eq!(player.state(), PlaybackState::Loading(0));
    }

    #[tokio::test]
    async fn test_assign_story_resets_cycle() {
        let player = player();
        player.assign_story(stub_story(3));
        player.will_display(1);
        assert_eq!(player.current_index(), 1);

        player.assign_story(stub_story(2));
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(!player.is_visible());
        assert_eq!(player.current_index(), 0);
    }

    #[tokio::test]
    async fn test_did_end_display_while_idle_is_noop() {
        let player = player();
        player.did_end_display();
        assert_eq!(player.state(), PlaybackState::Idle);
    }

    #[tokio::test]
    async fn test_unregister_callback_stops_delivery() {
        let player = player();
        player.assign_story(stub_story(1));
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let token = player.register_callback(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        player.request_close();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        player.unregister_callback(token);
        player.request_close();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_close_without_story_emits_nothing() {
        let player = player();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        player.register_callback(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        player.request_close();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
