//! Recording style engine shared by the integration tests.

use std::sync::{Arc, Mutex};

use stylemount::{Options, Selectors, StyleHandle, StyleMap, StyleRegistry};

/// One mount or unmount call, tagged with the stylesheet id and the
/// version of the handle that received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Add(String, usize),
    Remove(String, usize),
}

#[derive(Debug, Default)]
pub struct Log {
    pub created: Mutex<Vec<(String, StyleMap)>>,
    pub calls: Mutex<Vec<Call>>,
}

impl Log {
    pub fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn adds(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Add(..)))
            .count()
    }

    pub fn removes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Remove(..)))
            .count()
    }
}

#[derive(Debug)]
struct RecordingHandle {
    id: String,
    version: usize,
    selectors: Selectors,
    log: Arc<Log>,
}

impl StyleHandle for RecordingHandle {
    fn id(&self) -> &str {
        &self.id
    }

    fn add(&self) {
        self.log
            .calls
            .lock()
            .unwrap()
            .push(Call::Add(self.id.clone(), self.version));
    }

    fn remove(&self) {
        self.log
            .calls
            .lock()
            .unwrap()
            .push(Call::Remove(self.id.clone(), self.version));
    }

    fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    fn css(&self) -> String {
        format!("/* {} v{} */", self.id, self.version)
    }
}

/// A registry whose engine records every handle it creates and every
/// mount/unmount call. Selectors map each `.class` selector to
/// `class-<version>`.
pub fn recording_registry() -> (StyleRegistry, Arc<Log>) {
    let log = Arc::new(Log::default());
    let engine_log = Arc::clone(&log);
    let registry = StyleRegistry::new(move |styles: &StyleMap, options: &Options| {
        let id = options.id.clone().unwrap_or_default();
        let mut created = engine_log.created.lock().unwrap();
        let version = created.len();
        created.push((id.clone(), styles.clone()));

        let mut selectors = Selectors::new();
        for (selector, _) in styles.iter() {
            if let Some(class) = selector.strip_prefix('.') {
                selectors.insert(class, format!("{}-{}", class, version));
            }
        }

        Arc::new(RecordingHandle {
            id,
            version,
            selectors,
            log: Arc::clone(&engine_log),
        }) as Arc<dyn StyleHandle>
    });
    (registry, log)
}
