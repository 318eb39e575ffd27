use tracing::{debug, info, warn};

use crate::event::Event;
use crate::host::ContentHost;
use crate::module::{ContainerId, InstanceId, Module, ModuleHandle};
use crate::warning::LifecycleWarning;

/// Catalog of modules plus the single live content instance.
///
/// The registry is either **idle** (no current module, no instance) or
/// **active** (exactly one module flagged active, exactly one instance alive).
/// Every load tears the previous instance down before the next one is
/// created, so two instances never coexist.
///
/// Operations never fail. Anything that goes wrong is logged and reported as
/// an [`Event::ModuleWarning`] in the returned event list; callers that need
/// to know whether a switch took effect check [`current_module`](Self::current_module).
pub struct ModuleRegistry {
    host: Box<dyn ContentHost>,
    container: ContainerId,
    modules: Vec<Module>,
    current: Option<usize>,
    instance: Option<InstanceId>,
}

impl ModuleRegistry {
    pub fn new(host: Box<dyn ContentHost>, container: ContainerId) -> Self {
        Self::with_catalog(host, container, Vec::new())
    }

    /// Create a registry pre-populated with a configured catalog.
    ///
    /// Catalog entries always start inactive regardless of their incoming flag.
    pub fn with_catalog(
        host: Box<dyn ContentHost>,
        container: ContainerId,
        catalog: Vec<Module>,
    ) -> Self {
        let mut registry = Self {
            host,
            container,
            modules: Vec::with_capacity(catalog.len()),
            current: None,
            instance: None,
        };
        for module in catalog {
            let _ = registry.register_module(module);
        }
        registry
    }

    /// Load the first catalog entry, if there is one.
    pub fn start(&mut self) -> Vec<Event> {
        match self.handle_at(0) {
            Some(first) => self.load_module(Some(first)),
            None => {
                debug!(container = %self.container, "module catalog is empty, staying idle");
                Vec::new()
            }
        }
    }

    /// Unload the current module and activate `module` in its place.
    ///
    /// An absent or dangling handle is a no-op. A module without content
    /// still unloads the current one but leaves the registry idle, as does a
    /// host instantiation failure.
    pub fn load_module(&mut self, module: Option<ModuleHandle>) -> Vec<Event> {
        let Some(idx) = module.map(ModuleHandle::index).filter(|&i| i < self.modules.len()) else {
            let warning = LifecycleWarning::InvalidModule;
            warn!("{warning}");
            return vec![Event::ModuleWarning(warning)];
        };

        let mut events = self.unload_current_module();

        let (id, name) = {
            let m = &self.modules[idx];
            (m.id.clone(), m.name.clone())
        };

        let Some(content) = self.modules[idx].content.clone() else {
            let warning = LifecycleWarning::MissingContent { id, name };
            warn!("{warning}");
            events.push(Event::ModuleWarning(warning));
            return events;
        };

        match self.host.instantiate(&content, &self.container) {
            Ok(instance) => {
                self.instance = Some(instance);
                self.current = Some(idx);
                self.modules[idx].is_active = true;
                info!(module_id = %id, content = %content, "loaded module: {name}");
                events.push(Event::ModuleLoaded { id, name });
            }
            Err(err) => {
                let warning = LifecycleWarning::InstantiateFailed {
                    id,
                    reason: format!("{err:#}"),
                };
                warn!("{warning}");
                events.push(Event::ModuleWarning(warning));
            }
        }

        events
    }

    /// Load the catalog entry at `index` (number-key selection).
    pub fn load_slot(&mut self, index: usize) -> Vec<Event> {
        self.load_module(self.handle_at(index))
    }

    /// Load the first module whose name matches.
    pub fn load_module_by_name(&mut self, name: &str) -> Vec<Event> {
        match self.find_by_name(name) {
            Some(handle) => self.load_module(Some(handle)),
            None => Self::not_found(name),
        }
    }

    /// Load the first module whose id matches.
    pub fn load_module_by_id(&mut self, id: &str) -> Vec<Event> {
        match self.find_by_id(id) {
            Some(handle) => self.load_module(Some(handle)),
            None => Self::not_found(id),
        }
    }

    fn not_found(key: &str) -> Vec<Event> {
        let warning = LifecycleWarning::NotFound { key: key.to_string() };
        warn!("{warning}");
        vec![Event::ModuleWarning(warning)]
    }

    /// Destroy the live instance and clear the current module. Safe to call
    /// when nothing is loaded.
    pub fn unload_current_module(&mut self) -> Vec<Event> {
        if let Some(instance) = self.instance.take() {
            self.host.destroy(instance);
        }

        let mut events = Vec::new();
        if let Some(idx) = self.current.take() {
            let module = &mut self.modules[idx];
            module.is_active = false;
            info!(module_id = %module.id, "unloaded module: {}", module.name);
            events.push(Event::ModuleUnloaded { id: module.id.clone() });
        }
        events
    }

    /// Append a module to the catalog. It starts inactive.
    ///
    /// Ids are not required to be unique: a duplicate is accepted with a
    /// warning and lookups keep returning the earliest entry.
    pub fn register_module(&mut self, mut module: Module) -> (ModuleHandle, Vec<Event>) {
        module.is_active = false;
        if self.find_by_id(&module.id).is_some() {
            warn!(module_id = %module.id, "registered module id is already in the catalog; lookups by id return the first entry");
        }
        info!(module_id = %module.id, "registered new module: {}", module.name);
        let handle = ModuleHandle(self.modules.len());
        let event = Event::ModuleRegistered {
            id: module.id.clone(),
            name: module.name.clone(),
            slot: handle.index(),
        };
        self.modules.push(module);
        (handle, vec![event])
    }

    /// Snapshot of the catalog. Changes to the returned list never reach the
    /// registry.
    pub fn available_modules(&self) -> Vec<Module> {
        self.modules.clone()
    }

    /// Borrowed view of the catalog in registry order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn current_module(&self) -> Option<&Module> {
        self.current.map(|i| &self.modules[i])
    }

    pub fn current_instance(&self) -> Option<InstanceId> {
        self.instance
    }

    pub fn get(&self, handle: ModuleHandle) -> Option<&Module> {
        self.modules.get(handle.0)
    }

    pub fn handle_at(&self, index: usize) -> Option<ModuleHandle> {
        (index < self.modules.len()).then_some(ModuleHandle(index))
    }

    pub fn find_by_name(&self, name: &str) -> Option<ModuleHandle> {
        self.modules.iter().position(|m| m.name == name).map(ModuleHandle)
    }

    pub fn find_by_id(&self, id: &str) -> Option<ModuleHandle> {
        self.modules.iter().position(|m| m.id == id).map(ModuleHandle)
    }

    pub fn container(&self) -> &ContainerId {
        &self.container
    }

    pub fn host(&self) -> &dyn ContentHost {
        &*self.host
    }

    pub fn host_mut(&mut self) -> &mut dyn ContentHost {
        &mut *self.host
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Drop for ModuleRegistry {
    fn drop(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.host.destroy(instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use anyhow::bail;

    use crate::module::ContentRef;

    /// Records every host call and tracks which instances are alive.
    #[derive(Default)]
    struct HostLog {
        live: HashSet<InstanceId>,
        max_live: usize,
        calls: Vec<String>,
    }

    struct FakeHost {
        next: u64,
        log: Rc<RefCell<HostLog>>,
    }

    impl FakeHost {
        fn new() -> (Self, Rc<RefCell<HostLog>>) {
            let log = Rc::new(RefCell::new(HostLog::default()));
            (Self { next: 1, log: log.clone() }, log)
        }
    }

    impl ContentHost for FakeHost {
        fn instantiate(&mut self, content: &ContentRef, container: &ContainerId) -> anyhow::Result<InstanceId> {
            if content.key() == "broken" {
                bail!("prefab is corrupt");
            }
            let id = InstanceId(self.next);
            self.next += 1;
            let mut log = self.log.borrow_mut();
            log.live.insert(id);
            log.max_live = log.max_live.max(log.live.len());
            log.calls.push(format!("create:{}:{}", content, container));
            Ok(id)
        }

        fn destroy(&mut self, instance: InstanceId) {
            let mut log = self.log.borrow_mut();
            log.live.remove(&instance);
            log.calls.push(format!("destroy:{}", instance.0));
        }

        fn as_any(&self) -> &dyn Any { self }
        fn as_any_mut(&mut self) -> &mut dyn Any { self }
    }

    fn module(name: &str, id: &str, content: Option<&str>) -> Module {
        Module::new(name, id, content.map(ContentRef::new))
    }

    fn registry_with(catalog: Vec<Module>) -> (ModuleRegistry, Rc<RefCell<HostLog>>) {
        let (host, log) = FakeHost::new();
        (ModuleRegistry::with_catalog(Box::new(host), ContainerId::default(), catalog), log)
    }

    fn sample() -> (ModuleRegistry, Rc<RefCell<HostLog>>) {
        registry_with(vec![
            module("Hangar", "hangar", Some("hangar")),
            module("Arena", "arena", Some("arena")),
            module("Vault", "vault", None),
        ])
    }

    fn active_count(reg: &ModuleRegistry) -> usize {
        reg.modules().iter().filter(|m| m.is_active()).count()
    }

    #[test]
    fn catalog_entries_start_inactive() {
        let mut m = module("Hangar", "hangar", Some("hangar"));
        m.is_active = true;
        let (reg, _) = registry_with(vec![m]);
        assert_eq!(active_count(&reg), 0);
        assert!(reg.current_module().is_none());
    }

    #[test]
    fn start_loads_first_module() {
        let (mut reg, log) = sample();
        let events = reg.start();
        assert_eq!(reg.current_module().unwrap().id, "hangar");
        assert!(matches!(&events[0], Event::ModuleLoaded { id, .. } if id == "hangar"));
        assert_eq!(log.borrow().calls, vec!["create:hangar:ModuleContainer"]);
    }

    #[test]
    fn start_on_empty_catalog_stays_idle() {
        let (mut reg, log) = registry_with(Vec::new());
        assert!(reg.start().is_empty());
        assert!(reg.current_module().is_none());
        assert!(log.borrow().calls.is_empty());
    }

    #[test]
    fn at_most_one_module_active_across_loads() {
        let (mut reg, log) = sample();
        for idx in [0, 1, 2, 1, 0, 0, 2, 1] {
            reg.load_slot(idx);
            assert!(active_count(&reg) <= 1);
            assert!(log.borrow().live.len() <= 1);
        }
        assert_eq!(log.borrow().max_live, 1);
    }

    #[test]
    fn switching_unloads_previous_first() {
        let (mut reg, log) = sample();
        reg.load_slot(0);
        let events = reg.load_slot(1);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Event::ModuleUnloaded { id } if id == "hangar"));
        assert!(matches!(&events[1], Event::ModuleLoaded { id, .. } if id == "arena"));
        assert_eq!(
            log.borrow().calls,
            vec!["create:hangar:ModuleContainer", "destroy:1", "create:arena:ModuleContainer"]
        );
        assert!(!reg.modules()[0].is_active());
        assert!(reg.modules()[1].is_active());
    }

    #[test]
    fn reloading_same_module_recreates_instance() {
        let (mut reg, log) = sample();
        reg.load_module_by_id("hangar");
        let first = reg.current_instance().unwrap();
        reg.load_module_by_id("hangar");
        let second = reg.current_instance().unwrap();
        assert_ne!(first, second);
        assert_eq!(log.borrow().live.len(), 1);
        assert_eq!(log.borrow().max_live, 1);
        assert_eq!(reg.current_module().unwrap().id, "hangar");
    }

    #[test]
    fn unload_then_current_is_none() {
        let (mut reg, log) = sample();
        reg.load_slot(1);
        let events = reg.unload_current_module();
        assert!(matches!(&events[0], Event::ModuleUnloaded { id } if id == "arena"));
        assert!(reg.current_module().is_none());
        assert!(reg.current_instance().is_none());
        assert!(log.borrow().live.is_empty());
    }

    #[test]
    fn unload_when_idle_is_noop() {
        let (mut reg, log) = sample();
        assert!(reg.unload_current_module().is_empty());
        assert!(reg.unload_current_module().is_empty());
        assert!(reg.current_module().is_none());
        assert!(log.borrow().calls.is_empty());
    }

    #[test]
    fn module_without_content_leaves_idle() {
        let (mut reg, log) = sample();
        reg.load_slot(0);
        let events = reg.load_module_by_name("Vault");
        assert!(reg.current_module().is_none());
        assert!(log.borrow().live.is_empty());
        assert!(matches!(&events[0], Event::ModuleUnloaded { id } if id == "hangar"));
        assert!(matches!(
            &events[1],
            Event::ModuleWarning(LifecycleWarning::MissingContent { id, .. }) if id == "vault"
        ));
        assert!(!reg.modules()[2].is_active());
    }

    #[test]
    fn absent_module_reference_is_invalid() {
        let (mut reg, log) = sample();
        reg.load_slot(0);
        let events = reg.load_module(None);
        assert!(matches!(&events[..], [Event::ModuleWarning(LifecycleWarning::InvalidModule)]));
        // current module untouched
        assert_eq!(reg.current_module().unwrap().id, "hangar");
        assert_eq!(log.borrow().live.len(), 1);
    }

    #[test]
    fn dangling_handle_is_invalid() {
        let (mut reg, _) = sample();
        let events = reg.load_module(Some(ModuleHandle(42)));
        assert!(matches!(&events[..], [Event::ModuleWarning(LifecycleWarning::InvalidModule)]));
        assert!(reg.load_slot(3).iter().all(|e| matches!(e, Event::ModuleWarning(_))));
    }

    #[test]
    fn unknown_name_is_not_found_and_state_unchanged() {
        let (mut reg, log) = registry_with(Vec::new());
        let events = reg.load_module_by_name("Unknown");
        assert!(matches!(
            &events[..],
            [Event::ModuleWarning(LifecycleWarning::NotFound { key })] if key == "Unknown"
        ));
        assert!(reg.current_module().is_none());
        assert!(log.borrow().calls.is_empty());

        let (mut reg, _) = sample();
        reg.load_slot(1);
        reg.load_module_by_name("Unknown");
        assert_eq!(reg.current_module().unwrap().id, "arena");
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (mut reg, _) = sample();
        let events = reg.load_module_by_id("nope");
        assert!(matches!(
            &events[..],
            [Event::ModuleWarning(LifecycleWarning::NotFound { key })] if key == "nope"
        ));
    }

    #[test]
    fn register_then_load_by_id() {
        let (mut reg, log) = registry_with(Vec::new());
        let (handle, events) = reg.register_module(module("Arcade", "arcade-1", Some("arcade")));
        assert!(!reg.get(handle).unwrap().is_active());
        assert!(matches!(
            &events[..],
            [Event::ModuleRegistered { id, name, slot: 0 }] if id == "arcade-1" && name == "Arcade"
        ));
        assert!(reg.current_module().is_none());

        reg.load_module_by_id("arcade-1");
        assert_eq!(reg.current_module().unwrap().id, "arcade-1");
        assert_eq!(log.borrow().live.len(), 1);
    }

    #[test]
    fn duplicate_ids_resolve_to_first_entry() {
        let (mut reg, _) = sample();
        let (dup, events) = reg.register_module(module("Hangar B", "hangar", Some("arena")));
        assert_eq!(dup.index(), 3);
        assert!(matches!(&events[..], [Event::ModuleRegistered { slot: 3, .. }]));
        assert_eq!(reg.len(), 4);
        assert_eq!(reg.find_by_id("hangar").unwrap().index(), 0);

        reg.load_module_by_id("hangar");
        assert_eq!(reg.current_module().unwrap().name, "Hangar");
    }

    #[test]
    fn available_modules_is_a_snapshot() {
        let (mut reg, _) = sample();
        let mut snapshot = reg.available_modules();
        snapshot.push(module("Ghost", "ghost", Some("ghost")));
        snapshot[0].name = "Renamed".into();
        let again = reg.available_modules();
        assert_eq!(again.len(), 3);
        assert_eq!(again[0].name, "Hangar");

        reg.load_slot(0);
        assert!(reg.available_modules()[0].is_active());
    }

    #[test]
    fn instantiate_failure_leaves_idle() {
        let (mut reg, log) = registry_with(vec![
            module("Hangar", "hangar", Some("hangar")),
            module("Broken", "broken", Some("broken")),
        ]);
        reg.load_slot(0);
        let events = reg.load_slot(1);
        assert!(matches!(&events[0], Event::ModuleUnloaded { .. }));
        assert!(matches!(
            &events[1],
            Event::ModuleWarning(LifecycleWarning::InstantiateFailed { id, reason })
                if id == "broken" && reason.contains("corrupt")
        ));
        assert!(reg.current_module().is_none());
        assert!(log.borrow().live.is_empty());
        assert_eq!(active_count(&reg), 0);
    }

    #[test]
    fn drop_destroys_live_instance() {
        let (mut reg, log) = sample();
        reg.load_slot(0);
        drop(reg);
        assert!(log.borrow().live.is_empty());
    }

    #[test]
    fn host_downcasts_to_concrete_type() {
        let (reg, _) = sample();
        assert!(reg.host().as_any().downcast_ref::<FakeHost>().is_some());
    }
}
