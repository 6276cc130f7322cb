use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use companion_launcher::errors::Result;
use companion_launcher::launch::{ChildExit, ChildHandle, ForwardedSignal, LaunchSpec, ProcessBackend};

/// How a fake child behaves once spawned.
#[derive(Debug, Clone, Copy)]
pub enum FakeBehaviour {
    /// `wait` resolves straight away with this outcome.
    ExitImmediately(ChildExit),
    /// Keeps running until it receives any signal, then exits with this outcome.
    ExitOnSignal(ChildExit),
    /// Keeps running until [`FakeRecorder::release`] is called.
    ExitWhenReleased(ChildExit),
}

/// What the fake backend observed; shared with the test.
#[derive(Debug, Default)]
pub struct FakeRecord {
    pub spawned: Vec<LaunchSpec>,
    pub signals: Vec<ForwardedSignal>,
    pub wait_calls: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeRecorder {
    record: Arc<Mutex<FakeRecord>>,
    release: Arc<Notify>,
}

impl FakeRecorder {
    pub fn spawned(&self) -> Vec<LaunchSpec> {
        self.record.lock().unwrap().spawned.clone()
    }

    pub fn signals(&self) -> Vec<ForwardedSignal> {
        self.record.lock().unwrap().signals.clone()
    }

    pub fn wait_calls(&self) -> usize {
        self.record.lock().unwrap().wait_calls
    }

    /// Let an `ExitWhenReleased` child terminate.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Backend that never starts real processes.
pub struct FakeBackend {
    behaviour: FakeBehaviour,
    spawn_error: Option<std::io::ErrorKind>,
    recorder: FakeRecorder,
}

impl FakeBackend {
    pub fn new(behaviour: FakeBehaviour) -> Self {
        Self {
            behaviour,
            spawn_error: None,
            recorder: FakeRecorder::default(),
        }
    }

    /// Every spawn fails with the given error kind.
    pub fn failing(kind: std::io::ErrorKind) -> Self {
        Self {
            spawn_error: Some(kind),
            ..Self::new(FakeBehaviour::ExitImmediately(ChildExit::Exited(0)))
        }
    }

    pub fn recorder(&self) -> FakeRecorder {
        self.recorder.clone()
    }
}

impl ProcessBackend for FakeBackend {
    fn spawn(&mut self, spec: &LaunchSpec) -> std::io::Result<Box<dyn ChildHandle>> {
        if let Some(kind) = self.spawn_error {
            return Err(std::io::Error::from(kind));
        }

        self.recorder.record.lock().unwrap().spawned.push(spec.clone());
        Ok(Box::new(FakeChild {
            behaviour: self.behaviour,
            recorder: self.recorder.clone(),
        }))
    }
}

struct FakeChild {
    behaviour: FakeBehaviour,
    recorder: FakeRecorder,
}

impl ChildHandle for FakeChild {
    fn id(&self) -> Option<u32> {
        Some(4242)
    }

    fn forward(&mut self, signal: ForwardedSignal) -> Result<()> {
        self.recorder.record.lock().unwrap().signals.push(signal);
        Ok(())
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<ChildExit>> + Send + '_>> {
        let (signalled, behaviour) = {
            let mut record = self.recorder.record.lock().unwrap();
            record.wait_calls += 1;
            (!record.signals.is_empty(), self.behaviour)
        };
        let release = Arc::clone(&self.recorder.release);

        Box::pin(async move {
            match behaviour {
                FakeBehaviour::ExitImmediately(exit) => Ok(exit),
                FakeBehaviour::ExitOnSignal(exit) if signalled => Ok(exit),
                FakeBehaviour::ExitOnSignal(_) => std::future::pending().await,
                FakeBehaviour::ExitWhenReleased(exit) => {
                    release.notified().await;
                    Ok(exit)
                }
            }
        })
    }
}
