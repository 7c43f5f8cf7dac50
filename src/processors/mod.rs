//! Docstring processors and their global registry.
//!
//! A processor takes the whole API forest and transforms it in place, usually
//! by rewriting docstrings. The pipeline applies a configured chain of them in
//! order, handing each the renderer-supplied [`Resolver`](crate::interfaces::Resolver)
//! so rewritten text can link into the final output.
//!
//! [`PROCESSORS`] maps configuration names to factories. The registry only
//! holds constructors the embedder registered; there is no discovery
//! mechanism. Factories, not shared instances, keep each run on a fresh
//! processor with no cross-call state.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::interfaces::Processor;

pub mod crossref;

pub use crossref::CrossrefProcessor;

/// Global singleton processor map with the builtin processors (crossref)
pub static PROCESSORS: Lazy<ProcessorMap> = Lazy::new(ProcessorMap::create);

type ProcessorFactory = Arc<dyn Fn() -> Box<dyn Processor> + Send + Sync>;

pub struct ProcessorMap(Arc<RwLock<Vec<(String, ProcessorFactory)>>>);

impl Clone for ProcessorMap {
    fn clone(&self) -> Self {
        ProcessorMap(self.0.clone())
    }
}

impl ProcessorMap {
    pub fn create() -> Self {
        ProcessorMap(Arc::new(RwLock::new(vec![(
            "crossref".to_string(),
            Arc::new(|| Box::new(CrossrefProcessor::new()) as Box<dyn Processor>)
                as ProcessorFactory,
        )])))
    }

    /// Register a processor type under a configuration name, replacing any
    /// previous registration for that name.
    pub fn insert<T: Processor + Default + 'static>(&self, name: String) {
        let factory: ProcessorFactory = Arc::new(|| Box::new(T::default()) as Box<dyn Processor>);
        let mut writer = self.0.write();
        if let Some(entry) = writer.iter_mut().find(|(n, _)| n == &name) {
            entry.1 = factory;
        } else {
            writer.push((name, factory));
        }
    }

    /// Construct a fresh instance of the processor registered under `name`.
    pub fn get(&self, name: &str) -> Option<Box<dyn Processor>> {
        let reader = self.0.read();
        reader
            .iter()
            .find(|(registered, _)| registered == name)
            .map(|(_, factory)| factory())
    }

    pub fn names(&self) -> Vec<String> {
        let reader = self.0.read();
        reader.iter().map(|(name, _)| name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{apitree::ApiObject, error::DocmarkError, interfaces::Resolver};

    #[derive(Default)]
    struct NoopProcessor;

    impl Processor for NoopProcessor {
        fn process(
            &mut self,
            _modules: &mut [ApiObject],
            _resolver: Option<&dyn Resolver>,
        ) -> Result<(), DocmarkError> {
            Ok(())
        }
    }

    #[test]
    fn builtin_crossref_is_registered() {
        let map = ProcessorMap::create();
        assert!(map.names().contains(&"crossref".to_string()));
        assert!(map.get("crossref").is_some());
        assert!(map.get("does-not-exist").is_none());
    }

    #[test]
    fn insert_registers_and_replaces() {
        let map = ProcessorMap::create();
        map.insert::<NoopProcessor>("noop".to_string());
        assert!(map.get("noop").is_some());
        let before = map.names().len();
        map.insert::<NoopProcessor>("noop".to_string());
        assert_eq!(map.names().len(), before);
    }
}
