//! Session lifecycle: init, load, play/pause, dispose.
//!
//! Exactly one session is live at a time, enforced by [`SessionRegistry`]
//! rather than a process global. The controller owns the designated
//! execution context and the collaborator seams (engine factory and
//! presentation host); each `init` builds a fresh session, and `dispose`
//! tears it down in dependency order: status timer, render context, engine,
//! then surface and frame buffer.

use crate::engine::{DecodeEngine, EngineFactory, FrameCallback, RenderContext};
use crate::error::Error;
use crate::frame_buffer::FrameBuffer;
use crate::main_context::{ContextHandle, MainContext, Timer};
use crate::presentation::{PresentationHost, SurfaceId};
use crate::render_pass::{Diagnostics, RenderPipeline};
use crate::scheduler::RenderScheduler;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use url::Url;

/// Buffer size used until the first load reports the stream's resolution.
const DEFAULT_WIDTH: u32 = 1920;
const DEFAULT_HEIGHT: u32 = 1080;

const STATUS_TIMER_PERIOD: Duration = Duration::from_millis(33);
/// Status is logged once per `STATUS_LOG_EVERY` ticks, roughly once a second.
const STATUS_LOG_EVERY: u64 = 30;

/// Bounded retry for video-track detection during `load`.
#[derive(Debug, Clone, Copy)]
struct TrackPoll {
    tries: u32,
    interval: Duration,
}

impl Default for TrackPoll {
    fn default() -> Self {
        Self {
            tries: 50,
            interval: Duration::from_millis(100),
        }
    }
}

/// State owned by one live playback session.
pub(crate) struct Session {
    engine: Box<dyn DecodeEngine>,
    render_ctx: Arc<Mutex<Option<Box<dyn RenderContext>>>>,
    frame_buffer: Arc<FrameBuffer>,
    scheduler: Arc<RenderScheduler>,
    surface_id: SurfaceId,
    frame_count: Arc<AtomicU64>,
    status_timer: Option<Timer>,
}

impl Session {
    /// Create the software render context and arm the scheduler, once.
    /// Idempotent: a no-op when the context already exists, so repeated
    /// activation attempts during `load` are harmless.
    fn ensure_render_context(
        &mut self,
        handle: &ContextHandle,
        host: &Arc<dyn PresentationHost>,
        diagnostics: Diagnostics,
    ) -> Result<(), Error> {
        if self.render_ctx.lock().is_some() {
            return Ok(());
        }

        log::debug!("creating software render context");
        self.engine.set_property("vo", "null")?;
        self.engine.set_property("hwdec", "no")?;
        self.engine.set_property("vd-lavc-dr", "no")?;
        self.engine.set_property("keep-open", "yes")?;

        let scheduler = Arc::clone(&self.scheduler);
        let on_update: FrameCallback = Arc::new(move || scheduler.on_decode_signal());
        let ctx = self.engine.create_render_context(on_update)?;
        *self.render_ctx.lock() = Some(ctx);

        let pipeline = Arc::new(RenderPipeline {
            render_ctx: Arc::clone(&self.render_ctx),
            frame_buffer: Arc::clone(&self.frame_buffer),
            pending: self.scheduler.pending_flag(),
            handle: handle.clone(),
            host: Arc::clone(host),
            surface_id: self.surface_id,
            frame_count: Arc::clone(&self.frame_count),
            diagnostics,
        });
        self.scheduler.arm(Arc::new(move || pipeline.run_pass()));
        log::debug!("software render context ready");
        Ok(())
    }

    /// Match the frame buffer to the stream's decoded resolution, if the
    /// engine already knows it.
    fn renegotiate_dimensions(&self) {
        let width = self.engine.get_property_i64("width").unwrap_or(0);
        let height = self.engine.get_property_i64("height").unwrap_or(0);
        if width <= 0 || height <= 0 {
            return;
        }
        let (width, height) = (width as u32, height as u32);
        if (width, height) != self.frame_buffer.dimensions() {
            log::info!("stream resolution is {width}x{height}; reallocating frame buffer");
            self.frame_buffer.allocate(width, height);
        }
    }

    /// Wait for an active video track, bounded by `poll`. Track metadata can
    /// lag the load command while the stream opens asynchronously.
    fn poll_for_video_track(&self, poll: TrackPoll) -> bool {
        for attempt in 0..poll.tries {
            if self.has_video_track() {
                log::debug!("video track detected after {attempt} polls");
                return true;
            }
            if attempt + 1 < poll.tries {
                std::thread::sleep(poll.interval);
            }
        }
        false
    }

    fn has_video_track(&self) -> bool {
        let Ok(count) = self.engine.get_property_i64("track-list/count") else {
            return false;
        };
        (0..count).any(|i| {
            self.engine
                .get_property_string(&format!("track-list/{i}/type"))
                .is_ok_and(|kind| kind == "video")
        })
    }

    fn log_status(&self) {
        let paused = self.engine.get_property_string("pause").ok();
        let position = self.engine.get_property_string("time-pos").ok();
        let filename = self.engine.get_property_string("filename").ok();
        log::debug!(
            "status: paused={} time={} file={}",
            paused.as_deref().unwrap_or("?"),
            position.as_deref().unwrap_or("?"),
            filename.as_deref().unwrap_or("none"),
        );

        if let Ok(count) = self.engine.get_property_i64("track-list/count") {
            log::trace!("track count: {count}");
        }
    }
}

/// Holder of the single live session.
///
/// `create` enforces the one-session invariant with a checked transition;
/// a second `init` while one is live fails rather than replacing it.
pub(crate) struct SessionRegistry {
    slot: Mutex<Option<Session>>,
}

impl SessionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    fn is_live(&self) -> bool {
        self.slot.lock().is_some()
    }

    fn create(&self, session: Session) -> Result<(), Error> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        *slot = Some(session);
        Ok(())
    }

    fn with<R>(&self, f: impl FnOnce(&mut Session) -> Result<R, Error>) -> Result<R, Error> {
        let mut slot = self.slot.lock();
        let session = slot.as_mut().ok_or(Error::NotInitialized)?;
        f(session)
    }

    /// Non-blocking peek for the status timer; skipped while a controller
    /// operation holds the slot.
    fn try_with(&self, f: impl FnOnce(&Session)) {
        if let Some(slot) = self.slot.try_lock() {
            if let Some(session) = slot.as_ref() {
                f(session);
            }
        }
    }

    fn destroy(&self) -> Option<Session> {
        self.slot.lock().take()
    }
}

/// Orchestrates the session lifecycle over the injected collaborator seams.
pub struct SessionController {
    registry: Arc<SessionRegistry>,
    engine_factory: EngineFactory,
    host: Arc<dyn PresentationHost>,
    context: MainContext,
    diagnostics: Diagnostics,
    track_poll: TrackPoll,
}

impl SessionController {
    pub fn new(engine_factory: EngineFactory, host: Arc<dyn PresentationHost>) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            engine_factory,
            host,
            context: MainContext::new(),
            diagnostics: Diagnostics::default(),
            track_poll: TrackPoll::default(),
        }
    }

    /// Enable debug aids such as the empty-frame marker overlay.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Tune the bounded video-track detection retry used by `load`.
    pub fn with_track_poll(mut self, tries: u32, interval: Duration) -> Self {
        self.track_poll = TrackPoll { tries, interval };
        self
    }

    /// Create a fresh session: allocate the default frame buffer, register
    /// the presentation surface, create and initialize the decode engine,
    /// and start the status timer. Render-context creation is deferred to
    /// the first successful `load`, when the stream's actual resolution is
    /// known.
    pub fn init(&self) -> Result<SurfaceId, Error> {
        if self.registry.is_live() {
            return Err(Error::AlreadyInitialized);
        }

        log::info!("initializing player session");
        let frame_buffer = Arc::new(FrameBuffer::new(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        let surface_id = self.host.register_surface();

        let mut engine = match (self.engine_factory)() {
            Ok(engine) => engine,
            Err(err) => {
                self.host.unregister_surface(surface_id);
                return Err(Error::EngineCreateFailed(err));
            }
        };

        let setup = (|| {
            engine.set_option("config", "yes")?;
            engine.set_option("input-default-bindings", "yes")?;
            engine.set_option("force-window", "yes")?;
            engine.set_option("msg-level", "all=v")?;
            engine.initialize()
        })();
        if let Err(err) = setup {
            self.host.unregister_surface(surface_id);
            return Err(Error::EngineInitFailed(err));
        }

        let session = Session {
            engine,
            render_ctx: Arc::new(Mutex::new(None)),
            frame_buffer,
            scheduler: Arc::new(RenderScheduler::new(self.context.handle())),
            surface_id,
            frame_count: Arc::new(AtomicU64::new(0)),
            status_timer: Some(self.start_status_timer()),
        };

        if let Err(err) = self.registry.create(session) {
            // Lost an init race; the dropped session releases the engine.
            self.host.unregister_surface(surface_id);
            return Err(err);
        }

        log::info!("player session initialized, surface {}", surface_id.0);
        Ok(surface_id)
    }

    /// Load a media source into the live session.
    ///
    /// Applies segmented-streaming tuning before the load command where the
    /// URL calls for it, renegotiates the frame buffer against the decoded
    /// resolution, then activates the render path. A source without a video
    /// track degrades to a warning: playback may proceed audio-only.
    ///
    /// Blocks the calling thread for up to the configured track-poll budget
    /// while the stream opens.
    pub fn load(&self, source: &str) -> Result<(), Error> {
        let handle = self.context.handle();
        let host = Arc::clone(&self.host);
        let diagnostics = self.diagnostics;
        let track_poll = self.track_poll;

        self.registry.with(|session| {
            log::info!("loading source: {source}");

            if is_segmented_stream(source) {
                log::debug!("segmented HTTP stream detected; applying streaming tuning");
                set_tuning(session.engine.as_ref(), "hls-bitrate", "max");
                set_tuning(session.engine.as_ref(), "cache", "yes");
                set_tuning(session.engine.as_ref(), "demuxer-max-bytes", "50M");
            }

            session
                .engine
                .command(&["loadfile", source])
                .map_err(Error::LoadFailed)?;

            session.renegotiate_dimensions();
            session.ensure_render_context(&handle, &host, diagnostics)?;

            if session.poll_for_video_track(track_poll) {
                // The activation above may have raced the track probe; this
                // second call is a no-op when the context already exists.
                session.ensure_render_context(&handle, &host, diagnostics)?;
            } else {
                log::warn!("no video track found after loading; continuing without video");
            }

            log::info!("source loaded");
            Ok(())
        })
    }

    pub fn play(&self) -> Result<(), Error> {
        self.registry.with(|session| {
            log::debug!("play");
            session.engine.set_property("pause", "no")?;
            Ok(())
        })
    }

    /// Tolerant: pausing without a live session is a benign success, so
    /// teardown sequences from the controlling side stay idempotent.
    pub fn pause(&self) -> Result<(), Error> {
        let result = self.registry.with(|session| {
            log::debug!("pause");
            session.engine.set_property("pause", "yes")?;
            Ok(())
        });
        match result {
            Err(Error::NotInitialized) => Ok(()),
            other => other,
        }
    }

    /// Tear the live session down; a benign success when none is live.
    pub fn dispose(&self) -> Result<(), Error> {
        let Some(mut session) = self.registry.destroy() else {
            return Ok(());
        };
        log::info!("disposing player session");

        // Stop periodic work and refuse further decode signals.
        session.status_timer.take();
        session.scheduler.shutdown();

        // Waits on an in-flight render pass before freeing the context; a
        // pass queued behind this point no-ops against the empty slot.
        session.render_ctx.lock().take();

        let surface_id = session.surface_id;
        // Engine, then frame buffer, released by the session drop.
        drop(session);
        self.host.unregister_surface(surface_id);
        Ok(())
    }

    /// Shared pixel storage of the live session, for the consumer side.
    pub fn frame_buffer(&self) -> Option<Arc<FrameBuffer>> {
        self.registry
            .with(|session| Ok(Arc::clone(&session.frame_buffer)))
            .ok()
    }

    /// Frames delivered to the presentation host so far.
    pub fn frame_count(&self) -> u64 {
        self.registry
            .with(|session| Ok(session.frame_count.load(Ordering::Relaxed)))
            .unwrap_or(0)
    }

    fn start_status_timer(&self) -> Timer {
        let registry = Arc::downgrade(&self.registry);
        let ticks = AtomicU64::new(0);
        Timer::start(self.context.handle(), STATUS_TIMER_PERIOD, move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            if ticks.fetch_add(1, Ordering::Relaxed) % STATUS_LOG_EVERY != 0 {
                return;
            }
            registry.try_with(|session| session.log_status());
        })
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}

fn set_tuning(engine: &dyn DecodeEngine, key: &str, value: &str) {
    if let Err(err) = engine.set_property(key, value) {
        log::warn!("tuning property {key}={value} rejected: {err}");
    }
}

fn is_segmented_stream(source: &str) -> bool {
    match Url::parse(source) {
        Ok(url) => Path::new(url.path())
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("m3u8")),
        // Not a parseable URL; fall back to a substring probe.
        Err(_) => source.contains(".m3u8"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, RenderError, RenderTarget};
    use std::collections::HashMap;

    #[derive(Clone, Default)]
    struct OpLog(Arc<Mutex<Vec<String>>>);

    impl OpLog {
        fn push(&self, op: impl Into<String>) {
            self.0.lock().push(op.into());
        }

        fn snapshot(&self) -> Vec<String> {
            self.0.lock().clone()
        }

        fn index_of(&self, op: &str) -> Option<usize> {
            self.0.lock().iter().position(|o| o == op)
        }
    }

    struct MockEngine {
        ops: OpLog,
        props: Arc<Mutex<HashMap<String, String>>>,
        resolution: Option<(i64, i64)>,
        has_video_track: bool,
        fail_load: bool,
        fail_initialize: bool,
        callback_slot: Arc<Mutex<Option<FrameCallback>>>,
    }

    impl DecodeEngine for MockEngine {
        fn set_option(&self, key: &str, value: &str) -> Result<(), EngineError> {
            self.ops.push(format!("set_option {key}={value}"));
            Ok(())
        }

        fn initialize(&mut self) -> Result<(), EngineError> {
            self.ops.push("initialize");
            if self.fail_initialize {
                return Err(EngineError::new(-1, "init refused"));
            }
            Ok(())
        }

        fn set_property(&self, key: &str, value: &str) -> Result<(), EngineError> {
            self.ops.push(format!("set_property {key}={value}"));
            self.props.lock().insert(key.into(), value.into());
            Ok(())
        }

        fn get_property_i64(&self, key: &str) -> Result<i64, EngineError> {
            self.ops.push(format!("get_property {key}"));
            match key {
                "width" => self.resolution.map(|r| r.0),
                "height" => self.resolution.map(|r| r.1),
                "track-list/count" => Some(if self.has_video_track { 2 } else { 1 }),
                _ => None,
            }
            .ok_or_else(|| EngineError::new(-10, "property unavailable"))
        }

        fn get_property_string(&self, key: &str) -> Result<String, EngineError> {
            if key == "track-list/0/type" {
                return Ok("audio".into());
            }
            if key == "track-list/1/type" && self.has_video_track {
                return Ok("video".into());
            }
            self.props
                .lock()
                .get(key)
                .cloned()
                .ok_or_else(|| EngineError::new(-10, "property unavailable"))
        }

        fn command(&self, args: &[&str]) -> Result<(), EngineError> {
            self.ops.push(format!("command {}", args.join(" ")));
            if self.fail_load && args.first() == Some(&"loadfile") {
                return Err(EngineError::new(-2, "cannot open source"));
            }
            Ok(())
        }

        fn create_render_context(
            &mut self,
            on_update: FrameCallback,
        ) -> Result<Box<dyn RenderContext>, EngineError> {
            self.ops.push("create_render_context");
            *self.callback_slot.lock() = Some(on_update);
            Ok(Box::new(MockRenderContext {
                ops: self.ops.clone(),
            }))
        }
    }

    impl Drop for MockEngine {
        fn drop(&mut self) {
            self.ops.push("engine_dropped");
        }
    }

    struct MockRenderContext {
        ops: OpLog,
    }

    impl RenderContext for MockRenderContext {
        fn render(&mut self, target: RenderTarget<'_>) -> Result<(), RenderError> {
            target.pixels.fill(200);
            Ok(())
        }
    }

    impl Drop for MockRenderContext {
        fn drop(&mut self) {
            self.ops.push("render_context_dropped");
        }
    }

    #[derive(Default)]
    struct MockHost {
        registered: AtomicU64,
        unregistered: AtomicU64,
        frames: AtomicU64,
    }

    impl PresentationHost for MockHost {
        fn register_surface(&self) -> SurfaceId {
            SurfaceId(self.registered.fetch_add(1, Ordering::SeqCst) as i64 + 1)
        }

        fn mark_frame_available(&self, _surface: SurfaceId) {
            self.frames.fetch_add(1, Ordering::SeqCst);
        }

        fn unregister_surface(&self, _surface: SurfaceId) {
            self.unregistered.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        ops: OpLog,
        callback_slot: Arc<Mutex<Option<FrameCallback>>>,
        host: Arc<MockHost>,
        controller: SessionController,
    }

    fn fixture_with(
        resolution: Option<(i64, i64)>,
        has_video_track: bool,
        fail_load: bool,
        fail_initialize: bool,
    ) -> Fixture {
        let ops = OpLog::default();
        let callback_slot: Arc<Mutex<Option<FrameCallback>>> = Arc::new(Mutex::new(None));
        let host = Arc::new(MockHost::default());

        let factory_ops = ops.clone();
        let factory_slot = Arc::clone(&callback_slot);
        let factory: EngineFactory = Box::new(move || {
            Ok(Box::new(MockEngine {
                ops: factory_ops.clone(),
                props: Arc::new(Mutex::new(HashMap::new())),
                resolution,
                has_video_track,
                fail_load,
                fail_initialize,
                callback_slot: Arc::clone(&factory_slot),
            }))
        });

        let controller = SessionController::new(factory, host.clone())
            .with_track_poll(3, Duration::from_millis(1));

        Fixture {
            ops,
            callback_slot,
            host,
            controller,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Some((640, 480)), true, false, false)
    }

    #[test]
    fn init_registers_surface_and_defers_render_context() {
        let f = fixture();
        let surface = f.controller.init().unwrap();
        assert_eq!(surface, SurfaceId(1));

        let ops = f.ops.snapshot();
        assert!(ops.contains(&"initialize".to_string()));
        assert!(
            !ops.contains(&"create_render_context".to_string()),
            "render context must wait for the first load"
        );
        assert_eq!(
            f.controller.frame_buffer().unwrap().dimensions(),
            (1920, 1080)
        );
    }

    #[test]
    fn double_init_fails_repeatably() {
        let f = fixture();
        f.controller.init().unwrap();
        assert!(matches!(f.controller.init(), Err(Error::AlreadyInitialized)));
        assert!(matches!(f.controller.init(), Err(Error::AlreadyInitialized)));
    }

    #[test]
    fn failed_engine_init_leaves_no_session() {
        let f = fixture_with(Some((640, 480)), true, false, true);
        assert!(matches!(
            f.controller.init(),
            Err(Error::EngineInitFailed(_))
        ));
        assert_eq!(f.host.unregistered.load(Ordering::SeqCst), 1);

        // The slot stayed free, so a corrected engine can init again later.
        assert!(matches!(f.controller.play(), Err(Error::NotInitialized)));
    }

    #[test]
    fn load_renegotiates_resolution_and_activates_render_path() {
        let f = fixture();
        f.controller.init().unwrap();
        f.controller.load("file:///movies/clip.mkv").unwrap();

        assert_eq!(f.controller.frame_buffer().unwrap().dimensions(), (640, 480));

        let width_query = f.ops.index_of("get_property width").unwrap();
        let ctx_create = f.ops.index_of("create_render_context").unwrap();
        assert!(
            width_query < ctx_create,
            "render context must be created after the resolution query"
        );
        assert!(f.callback_slot.lock().is_some());
    }

    #[test]
    fn segmented_stream_tuning_is_applied_before_the_load_command() {
        let f = fixture();
        f.controller.init().unwrap();
        f.controller
            .load("https://cdn.example.com/live/stream.m3u8")
            .unwrap();

        let tuned = f.ops.index_of("set_property hls-bitrate=max").unwrap();
        let cached = f.ops.index_of("set_property cache=yes").unwrap();
        let demux = f.ops.index_of("set_property demuxer-max-bytes=50M").unwrap();
        let loaded = f
            .ops
            .index_of("command loadfile https://cdn.example.com/live/stream.m3u8")
            .unwrap();
        assert!(tuned < loaded && cached < loaded && demux < loaded);
    }

    #[test]
    fn plain_sources_skip_streaming_tuning() {
        let f = fixture();
        f.controller.init().unwrap();
        f.controller.load("file:///movies/clip.mkv").unwrap();

        assert!(f.ops.index_of("set_property hls-bitrate=max").is_none());
    }

    #[test]
    fn rejected_load_keeps_the_session_usable() {
        let f = fixture_with(Some((640, 480)), true, true, false);
        f.controller.init().unwrap();

        assert!(matches!(
            f.controller.load("file:///broken.mkv"),
            Err(Error::LoadFailed(_))
        ));
        // Session survives; play still reaches the engine.
        f.controller.play().unwrap();
    }

    #[test]
    fn missing_video_track_degrades_to_a_warning() {
        let f = fixture_with(Some((640, 480)), false, false, false);
        f.controller.init().unwrap();

        // Load succeeds even though only an audio track exists.
        f.controller.load("file:///podcast.mka").unwrap();
        assert!(f.ops.index_of("create_render_context").is_some());
    }

    #[test]
    fn repeated_render_context_activation_is_idempotent() {
        let f = fixture();
        f.controller.init().unwrap();
        f.controller.load("file:///movies/clip.mkv").unwrap();
        f.controller.load("file:///movies/clip.mkv").unwrap();

        let ops = f.ops.snapshot();
        let creations = ops
            .iter()
            .filter(|op| op.as_str() == "create_render_context")
            .count();
        assert_eq!(creations, 1);
    }

    #[test]
    fn play_pause_toggle_the_engine_pause_property() {
        let f = fixture();
        f.controller.init().unwrap();
        f.controller.load("file:///movies/clip.mkv").unwrap();

        f.controller.play().unwrap();
        f.controller.pause().unwrap();
        f.controller.play().unwrap();

        let pauses: Vec<_> = f
            .ops
            .snapshot()
            .into_iter()
            .filter(|op| op.starts_with("set_property pause="))
            .collect();
        assert_eq!(
            pauses,
            vec![
                "set_property pause=no",
                "set_property pause=yes",
                "set_property pause=no"
            ]
        );
    }

    #[test]
    fn pause_without_session_is_benign() {
        let f = fixture();
        f.controller.pause().unwrap();
        assert!(matches!(f.controller.play(), Err(Error::NotInitialized)));
    }

    #[test]
    fn dispose_is_idempotent_and_ordered() {
        let f = fixture();
        f.controller.init().unwrap();
        f.controller.load("file:///movies/clip.mkv").unwrap();

        f.controller.dispose().unwrap();
        f.controller.dispose().unwrap();

        let ctx_drop = f.ops.index_of("render_context_dropped").unwrap();
        let engine_drop = f.ops.index_of("engine_dropped").unwrap();
        assert!(
            ctx_drop < engine_drop,
            "render context must be freed before the engine"
        );
        assert_eq!(f.host.unregistered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reinit_after_dispose_creates_a_fresh_session() {
        let f = fixture();
        let first = f.controller.init().unwrap();
        f.controller.dispose().unwrap();
        let second = f.controller.init().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn decode_signals_drive_frames_to_the_host() {
        let f = fixture();
        f.controller.init().unwrap();
        f.controller.load("file:///movies/clip.mkv").unwrap();

        let callback = f.callback_slot.lock().clone().unwrap();
        (*callback)();

        // The pass and notify run on the context thread.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while f.host.frames.load(Ordering::SeqCst) == 0 {
            assert!(std::time::Instant::now() < deadline, "frame never arrived");
            std::thread::sleep(Duration::from_millis(5));
        }

        let frame = f.controller.frame_buffer().unwrap().copy_for_consumer();
        assert_eq!((frame.width, frame.height), (640, 480));
        assert!(frame.pixels.iter().all(|&b| b == 200));
        assert_eq!(f.controller.frame_count(), 1);
    }

    #[test]
    fn decode_signals_after_dispose_are_no_ops() {
        let f = fixture();
        f.controller.init().unwrap();
        f.controller.load("file:///movies/clip.mkv").unwrap();

        let callback = f.callback_slot.lock().clone().unwrap();
        f.controller.dispose().unwrap();
        (*callback)();
        (*callback)();

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(f.host.frames.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn segmented_stream_detection_reads_the_url_path() {
        assert!(is_segmented_stream("https://cdn.example.com/a/b.m3u8"));
        assert!(is_segmented_stream(
            "https://cdn.example.com/a/b.M3U8?token=x"
        ));
        assert!(is_segmented_stream("stream.m3u8"));
        assert!(!is_segmented_stream("https://cdn.example.com/clip.mp4"));
        assert!(!is_segmented_stream(
            "https://cdn.example.com/clip.mp4?name=x.m3u8.bak"
        ));
    }
}
