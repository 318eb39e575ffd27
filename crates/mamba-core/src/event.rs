use crate::warning::LifecycleWarning;

#[derive(Debug, Clone)]
pub enum Event {
    ModuleLoaded { id: String, name: String },
    ModuleUnloaded { id: String },
    /// `slot` is the zero-based catalog index of the new entry.
    ModuleRegistered { id: String, name: String, slot: usize },
    ModuleWarning(LifecycleWarning),
    ToggleDayNight,
    SetTimeOfDay { day: bool },
    ToggleHud,
    Quit,
}
