//! Per-render resource ownership.
//!
//! A [`Session`] owns every live render resource: decoded samples, the mixer
//! and its voices, the transport clock and the recorder. Each resource is
//! registered in a shared [`ResourceLedger`] through a [`Ticket`] that gives
//! its count back when dropped. [`Session::dispose`] releases everything and
//! runs on every exit path, including `Drop` when a render future is
//! abandoned mid-flight.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, RenderStage, Result};
use crate::io::SampleBuffer;
use crate::render::mixer::Mixer;
use crate::render::recorder::Recorder;
use crate::render::transport::Transport;
use crate::render::RenderedAudio;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Sample,
    Voice,
    Clock,
    Recorder,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Sample,
        ResourceKind::Voice,
        ResourceKind::Clock,
        ResourceKind::Recorder,
    ];

    fn slot(self) -> usize {
        match self {
            ResourceKind::Sample => 0,
            ResourceKind::Voice => 1,
            ResourceKind::Clock => 2,
            ResourceKind::Recorder => 3,
        }
    }
}

/// Live resource counts, shared between an engine and its sessions.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    counts: [AtomicUsize; 4],
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `count` resources of `kind` until the ticket is dropped.
    pub fn acquire(self: &Arc<Self>, kind: ResourceKind, count: usize) -> Ticket {
        self.counts[kind.slot()].fetch_add(count, Ordering::AcqRel);
        Ticket {
            ledger: Arc::clone(self),
            kind,
            count,
        }
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.counts[kind.slot()].load(Ordering::Acquire)
    }

    /// Total live resources of every kind.
    pub fn live(&self) -> usize {
        ResourceKind::ALL.iter().map(|&kind| self.count(kind)).sum()
    }
}

#[derive(Debug)]
pub struct Ticket {
    ledger: Arc<ResourceLedger>,
    kind: ResourceKind,
    count: usize,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.ledger.counts[self.kind.slot()].fetch_sub(self.count, Ordering::AcqRel);
    }
}

/// Key for a loaded sample: group name and variant index.
pub type SampleKey = (String, usize);

pub struct Session {
    ledger: Arc<ResourceLedger>,
    samples: HashMap<SampleKey, Arc<SampleBuffer>>,
    mixer: Option<Mixer>,
    transport: Option<Transport>,
    recorder: Option<Recorder>,
    tickets: Vec<Ticket>,
    disposed: bool,
}

impl Session {
    pub fn new(ledger: Arc<ResourceLedger>) -> Self {
        Self {
            ledger,
            samples: HashMap::new(),
            mixer: None,
            transport: None,
            recorder: None,
            tickets: Vec::new(),
            disposed: false,
        }
    }

    pub fn adopt_samples(&mut self, samples: HashMap<SampleKey, Arc<SampleBuffer>>) {
        self.tickets
            .push(self.ledger.acquire(ResourceKind::Sample, samples.len()));
        self.samples.extend(samples);
    }

    pub fn samples(&self) -> &HashMap<SampleKey, Arc<SampleBuffer>> {
        &self.samples
    }

    pub fn install_mixer(&mut self, mixer: Mixer) {
        self.tickets
            .push(self.ledger.acquire(ResourceKind::Voice, mixer.voice_count()));
        self.mixer = Some(mixer);
    }

    pub fn install_transport(&mut self, transport: Transport) {
        self.tickets.push(self.ledger.acquire(ResourceKind::Clock, 1));
        self.transport = Some(transport);
    }

    pub fn install_recorder(&mut self, recorder: Recorder) {
        self.tickets.push(self.ledger.acquire(ResourceKind::Recorder, 1));
        self.recorder = Some(recorder);
    }

    /// Run the clock for one block and record it. Returns `true` once the
    /// recorder holds the full track.
    pub fn advance(&mut self, scratch: &mut [f32]) -> Result<bool> {
        let (Some(mixer), Some(transport), Some(recorder)) =
            (&mut self.mixer, &mut self.transport, &mut self.recorder)
        else {
            return Err(Error::render(RenderStage::Recording, "session is not armed"));
        };

        scratch.fill(0.0);
        let written = transport.process(mixer, scratch);
        recorder.capture(&scratch[..written]);
        Ok(recorder.is_complete() || transport.is_finished())
    }

    /// Stop the clock and hand back the recording.
    pub fn finish(&mut self) -> Result<RenderedAudio> {
        if let Some(transport) = &mut self.transport {
            transport.stop();
        }
        let recorder = self
            .recorder
            .take()
            .ok_or_else(|| Error::render(RenderStage::Recording, "no recorder armed"))?;
        recorder.finish()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release every resource. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(transport) = &mut self.transport {
            transport.stop();
        }
        self.recorder = None;
        self.transport = None;
        if let Some(mixer) = &mut self.mixer {
            mixer.silence();
        }
        self.mixer = None;
        self.samples.clear();
        let released = self.tickets.len();
        self.tickets.clear();
        self.disposed = true;
        debug!(released, "render session disposed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}
