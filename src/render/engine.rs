use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::compose::Track;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::render::loader::{load_samples, FileSampleSource, SampleSource, SynthesizedSamples};
use crate::render::mixer::Mixer;
use crate::render::recorder::Recorder;
use crate::render::session::{ResourceLedger, Session};
use crate::render::transport::Transport;
use crate::render::RenderedAudio;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Loading,
    Scheduled,
    Recording,
    Done,
    Failed,
    Disposed,
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Shared flag that aborts a render at its next block boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Renders Tracks offline into sample buffers.
///
/// Each call to [`render`](Self::render) runs one session:
///
/// ```text
/// Idle -> Loading -> Scheduled -> Recording -> Done   -> Disposed
///            |           |            |
///            +-----------+------------+-----> Failed -> Disposed
/// ```
///
/// Every resource the session acquires is released before `render`
/// returns, whatever the outcome. Dropping the returned future releases
/// them too and still leaves the engine `Disposed`. The engine renders one
/// track at a time; wrap it in a `tokio::sync::Mutex` to share it.
pub struct RenderEngine {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    source: Arc<dyn SampleSource>,
    ledger: Arc<ResourceLedger>,
    cancel: CancelHandle,
    state: RenderState,
    history: Vec<RenderState>,
}

impl RenderEngine {
    /// An engine reading samples from `config.sample_root`, or synthesizing
    /// them when no root is configured.
    pub fn new(config: EngineConfig, catalog: Arc<Catalog>) -> Self {
        let source: Arc<dyn SampleSource> = match &config.sample_root {
            Some(root) => Arc::new(FileSampleSource::new(root.clone())),
            None => Arc::new(SynthesizedSamples),
        };
        Self::with_source(config, catalog, source)
    }

    pub fn with_source(config: EngineConfig, catalog: Arc<Catalog>, source: Arc<dyn SampleSource>) -> Self {
        Self {
            config,
            catalog,
            source,
            ledger: Arc::new(ResourceLedger::new()),
            cancel: CancelHandle::default(),
            state: RenderState::Idle,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<ResourceLedger> {
        &self.ledger
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// States the most recent render passed through, in order.
    pub fn history(&self) -> &[RenderState] {
        &self.history
    }

    #[instrument(skip_all, fields(title = %track.title, bpm = track.bpm, measures = track.measures))]
    pub async fn render(&mut self, track: &Track) -> Result<RenderedAudio> {
        self.cancel.reset();
        self.history.clear();
        self.state = RenderState::Idle;

        // Declared before the session so it drops after it.
        let guard = DisposeGuard(self);
        let mut session = Session::new(Arc::clone(&guard.0.ledger));
        let engine = &mut *guard.0;
        let result = engine.run(track, &mut session).await;

        match &result {
            Ok(audio) => {
                engine.transition(RenderState::Done);
                info!(
                    frames = audio.samples.len(),
                    seconds = audio.duration_seconds,
                    "render finished"
                );
            }
            Err(Error::Cancelled) => {
                engine.transition(RenderState::Failed);
                warn!("render cancelled");
            }
            Err(err) => {
                engine.transition(RenderState::Failed);
                warn!(%err, "render failed");
            }
        }

        session.dispose();
        result
    }

    async fn run(&mut self, track: &Track, session: &mut Session) -> Result<RenderedAudio> {
        let sample_rate = self.config.sample_rate;

        self.transition(RenderState::Loading);
        let samples = load_samples(Arc::clone(&self.source), &self.catalog, &track.samples, sample_rate).await?;
        session.adopt_samples(samples);
        self.check_cancelled()?;

        let mixer = Mixer::build(track, &self.catalog, session.samples(), sample_rate)?;
        session.install_mixer(mixer);
        let transport = Transport::new(track, sample_rate, self.config.block_size, self.config.fade_out_seconds);
        debug!(
            events = transport.events().len(),
            frames = transport.frame_count(),
            "transport scheduled"
        );
        let frame_count = transport.frame_count();
        session.install_transport(transport);
        self.transition(RenderState::Scheduled);

        session.install_recorder(Recorder::new(sample_rate, frame_count));
        self.transition(RenderState::Recording);

        let mut scratch = vec![0.0f32; self.config.block_size.max(1)];
        loop {
            self.check_cancelled()?;
            if session.advance(&mut scratch)? {
                break;
            }
            tokio::task::yield_now().await;
        }

        session.finish()
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    fn transition(&mut self, next: RenderState) {
        debug!(from = %self.state, to = %next, "render state");
        self.state = next;
        self.history.push(next);
    }
}

/// Marks the engine `Disposed` when a render ends, including when its
/// future is dropped mid-flight.
struct DisposeGuard<'a>(&'a mut RenderEngine);

impl Drop for DisposeGuard<'_> {
    fn drop(&mut self) {
        if self.0.state != RenderState::Disposed {
            self.0.transition(RenderState::Disposed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{Composer, Parameters};

    fn config() -> EngineConfig {
        EngineConfig {
            sample_rate: 8_000,
            block_size: 1_024,
            ..EngineConfig::default()
        }
    }

    fn track() -> Track {
        let parameters = Parameters {
            title: None,
            key: 5,
            mode: 2,
            bpm: 100.0,
            energy: 0.2,
            valence: 0.6,
            swing: 0.0,
            chords: vec![2, 5, 1],
            melodies: vec![vec![1, 2], vec![3], vec![]],
        };
        Composer::default().compose(&parameters).unwrap().track
    }

    #[tokio::test]
    async fn walks_every_state() {
        let mut engine = RenderEngine::new(config(), Arc::new(Catalog::builtin()));
        assert_eq!(engine.state(), RenderState::Idle);
        engine.render(&track()).await.unwrap();
        assert_eq!(
            engine.history(),
            [
                RenderState::Loading,
                RenderState::Scheduled,
                RenderState::Recording,
                RenderState::Done,
                RenderState::Disposed,
            ]
        );
        assert_eq!(engine.ledger().live(), 0);
    }

    #[tokio::test]
    async fn pre_cancelled_handle_does_not_leak_into_next_render() {
        let mut engine = RenderEngine::new(config(), Arc::new(Catalog::builtin()));
        engine.cancel_handle().cancel();
        assert!(engine.render(&track()).await.is_ok());
    }

    #[tokio::test]
    async fn abandoned_render_reports_disposed() {
        let mut engine = RenderEngine::new(config(), Arc::new(Catalog::builtin()));
        let track = track();
        {
            let render = engine.render(&track);
            tokio::pin!(render);
            // A single poll leaves the render suspended in loading.
            tokio::select! {
                biased;
                _ = &mut render => panic!("render finished in a single poll"),
                _ = std::future::ready(()) => {}
            }
        }
        assert_eq!(engine.state(), RenderState::Disposed);
        assert_eq!(engine.history().last(), Some(&RenderState::Disposed));
        assert_eq!(engine.ledger().live(), 0);

        engine.render(&track).await.unwrap();
        assert_eq!(engine.history().first(), Some(&RenderState::Loading));
    }

    #[tokio::test]
    async fn loading_failure_ends_disposed() {
        let config = EngineConfig {
            sample_root: Some("/nonexistent/moodtrack-samples".into()),
            ..config()
        };
        let mut engine = RenderEngine::new(config, Arc::new(Catalog::builtin()));
        let err = engine.render(&track()).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            engine.history(),
            [RenderState::Loading, RenderState::Failed, RenderState::Disposed]
        );
        assert_eq!(engine.ledger().live(), 0);
    }
}
