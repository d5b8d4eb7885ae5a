// System aggregate - named, ordered module collection with a shared lifecycle
use tracing::{error, info};

use crate::application::module::Module;
use crate::error::Result;

/// Lifecycle root owning an ordered collection of modules.
///
/// Insertion order is preserved and duplicates are kept. `start`/`stop` walk
/// the modules in order and abort on the first failure; modules already
/// started are not rolled back.
pub struct System {
    name: String,
    modules: Vec<Box<dyn Module>>,
}

impl System {
    pub fn new(name: impl Into<String>, modules: impl IntoIterator<Item = Box<dyn Module>>) -> Self {
        let mut system = Self {
            name: name.into(),
            modules: Vec::new(),
        };
        system.modules.extend(modules);
        system
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn modules(&self) -> &[Box<dyn Module>] {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut [Box<dyn Module>] {
        &mut self.modules
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Replace the collection wholesale (clear, then extend)
    pub fn set_modules(&mut self, modules: impl IntoIterator<Item = Box<dyn Module>>) {
        self.modules.clear();
        self.modules.extend(modules);
    }

    /// Replace the collection from fallible items (e.g. decoded configuration).
    ///
    /// On the first error the collection is left empty and the error returned;
    /// it is never left partially filled.
    pub fn try_set_modules<I, E>(&mut self, modules: I) -> std::result::Result<(), E>
    where
        I: IntoIterator<Item = std::result::Result<Box<dyn Module>, E>>,
    {
        self.modules.clear();
        for module in modules {
            match module {
                Ok(module) => self.modules.push(module),
                Err(e) => {
                    self.modules.clear();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Append one module at the end
    pub fn push(&mut self, module: Box<dyn Module>) {
        self.modules.push(module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Start every module in order (fail-fast)
    pub async fn start(&mut self) -> Result<()> {
        info!(system = %self.name, modules = self.modules.len(), "Starting system");
        for module in self.modules.iter_mut() {
            info!(system = %self.name, module = %module.name(), "Starting module");
            if let Err(e) = module.start().await {
                error!(system = %self.name, module = %module.name(), error = %e, "Module failed to start");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Stop every module in order (fail-fast)
    pub async fn stop(&mut self) -> Result<()> {
        info!(system = %self.name, modules = self.modules.len(), "Stopping system");
        for module in self.modules.iter_mut() {
            info!(system = %self.name, module = %module.name(), "Stopping module");
            if let Err(e) = module.stop().await {
                error!(system = %self.name, module = %module.name(), error = %e, "Module failed to stop");
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ProcessModule, RemoteModule};
    use crate::domain::Stage;
    use crate::error::SupervisorError;
    use crate::port::http_client::mocks::MockHttpClient;
    use crate::port::process_launcher::mocks::MockProcessLauncher;
    use std::sync::Arc;

    fn process(name: &str) -> Box<dyn Module> {
        Box::new(ProcessModule::new(
            name,
            Arc::new(MockProcessLauncher::new_success()),
        ))
    }

    #[test]
    fn test_construction_preserves_order_and_duplicates() {
        let system = System::new("s1", vec![process("a"), process("b"), process("a")]);

        assert_eq!(system.name(), "s1");
        assert_eq!(system.module_names(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut system = System::new("s1", Vec::new());
        assert!(system.is_empty());

        system.push(process("a"));
        system.push(process("a"));

        assert_eq!(system.len(), 2);
        assert_eq!(system.module_names(), vec!["a", "a"]);
    }

    #[test]
    fn test_set_modules_replaces() {
        let mut system = System::new("s1", vec![process("A"), process("B"), process("C")]);

        system.set_modules(vec![process("D"), process("E")]);

        assert_eq!(system.module_names(), vec!["D", "E"]);
    }

    #[test]
    fn test_try_set_modules_leaves_empty_on_error() {
        let mut system = System::new("s1", vec![process("A")]);

        let decoded: Vec<std::result::Result<Box<dyn Module>, String>> =
            vec![Ok(process("D")), Err("bad spec".to_string()), Ok(process("E"))];
        let err = system.try_set_modules(decoded).unwrap_err();

        assert_eq!(err, "bad spec");
        assert!(system.is_empty());

        let decoded: Vec<std::result::Result<Box<dyn Module>, String>> =
            vec![Ok(process("F")), Ok(process("G"))];
        system.try_set_modules(decoded).unwrap();
        assert_eq!(system.module_names(), vec!["F", "G"]);
    }

    #[tokio::test]
    async fn test_start_stop_all_modules() {
        let http = Arc::new(MockHttpClient::new_ok());
        let remote: Box<dyn Module> = Box::new(RemoteModule::new("http://localhost", "8080", http.clone()));
        let mut system = System::new("s1", vec![process("pkg.mod"), remote]);

        system.start().await.unwrap();
        assert!(system.modules().iter().all(|m| m.stage() == Stage::Started));

        system.stop().await.unwrap();
        assert!(system.modules().iter().all(|m| m.stage() == Stage::Stopped));

        // start/stop never touch the network
        assert_eq!(http.call_count(), 0);
    }

    #[tokio::test]
    async fn test_start_is_fail_fast() {
        let mut system = System::new("s1", vec![process("a"), process("b"), process("c")]);

        // Stop "b" so it can no longer be started
        system.modules_mut()[1].stop().await.unwrap();

        let err = system.start().await.unwrap_err();

        assert!(matches!(err, SupervisorError::Domain(_)));
        let stages: Vec<Stage> = system.modules().iter().map(|m| m.stage()).collect();
        assert_eq!(stages, vec![Stage::Started, Stage::Stopped, Stage::Created]);
    }
}
