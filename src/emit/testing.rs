//! Test doubles for the emission seams.  Compiled only under `cfg(test)`.

use std::sync::{Arc, Mutex};

use super::{EmitError, EmitterFactory, InputEmitter, LayoutHandle, LayoutSwitcher, NamedKey};

/// One call observed by [`RecordingEmitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    Text(String),
    Key(NamedKey),
    Combo(Vec<NamedKey>),
}

type Hook = Arc<dyn Fn(&Emitted) + Send + Sync>;

/// Factory whose emitters append every call to a shared log.
///
/// `on_emit` runs after each recorded call (e.g. to raise the cancel flag
/// mid-run); `fail_on_text` makes typing that exact text fail.
#[derive(Clone, Default)]
pub struct RecordingFactory {
    log: Arc<Mutex<Vec<Emitted>>>,
    on_emit: Option<Hook>,
    fail_on_text: Option<String>,
    fail_open: bool,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_emit(mut self, hook: impl Fn(&Emitted) + Send + Sync + 'static) -> Self {
        self.on_emit = Some(Arc::new(hook));
        self
    }

    pub fn fail_on_text(mut self, text: &str) -> Self {
        self.fail_on_text = Some(text.to_owned());
        self
    }

    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn emitted(&self) -> Vec<Emitted> {
        self.log.lock().unwrap().clone()
    }
}

impl EmitterFactory for RecordingFactory {
    fn open(&self) -> Result<Box<dyn InputEmitter>, EmitError> {
        if self.fail_open {
            return Err(EmitError::Backend("no display".into()));
        }
        Ok(Box::new(RecordingEmitter {
            factory: self.clone(),
        }))
    }
}

pub struct RecordingEmitter {
    factory: RecordingFactory,
}

impl RecordingEmitter {
    fn record(&self, event: Emitted) {
        self.factory.log.lock().unwrap().push(event.clone());
        if let Some(hook) = &self.factory.on_emit {
            hook(&event);
        }
    }
}

impl InputEmitter for RecordingEmitter {
    fn type_literal(&mut self, text: &str) -> Result<(), EmitError> {
        if self.factory.fail_on_text.as_deref() == Some(text) {
            return Err(EmitError::Typing(format!("refused {text:?}")));
        }
        self.record(Emitted::Text(text.to_owned()));
        Ok(())
    }

    fn press_key(&mut self, key: NamedKey) -> Result<(), EmitError> {
        self.record(Emitted::Key(key));
        Ok(())
    }

    fn press_combo(&mut self, keys: &[NamedKey]) -> Result<(), EmitError> {
        self.record(Emitted::Combo(keys.to_vec()));
        Ok(())
    }
}

/// In-memory [`LayoutSwitcher`] that tracks the active layout.
#[derive(Debug)]
pub struct FakeLayout {
    current: Mutex<Option<LayoutHandle>>,
    reference: Option<LayoutHandle>,
    activations: Mutex<Vec<LayoutHandle>>,
    fail: bool,
}

impl FakeLayout {
    pub fn new(current: Option<LayoutHandle>, reference: Option<LayoutHandle>) -> Self {
        Self {
            current: Mutex::new(current),
            reference,
            activations: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing_activation(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn current(&self) -> Option<LayoutHandle> {
        *self.current.lock().unwrap()
    }

    pub fn activations(&self) -> Vec<LayoutHandle> {
        self.activations.lock().unwrap().clone()
    }
}

impl LayoutSwitcher for FakeLayout {
    fn active_layout(&self) -> Option<LayoutHandle> {
        self.current()
    }

    fn reference_layout(&self) -> Option<LayoutHandle> {
        self.reference
    }

    fn activate(&self, layout: LayoutHandle) -> Result<(), EmitError> {
        if self.fail {
            return Err(EmitError::Layout("access denied".into()));
        }
        self.activations.lock().unwrap().push(layout);
        *self.current.lock().unwrap() = Some(layout);
        Ok(())
    }
}
