use std::collections::HashMap;
use std::time::Instant;

use crate::bus::EventBus;
use crate::console::Console;
use crate::event::Event;
use crate::fps::FrameClock;
use crate::module::{ContentRef, Module};
use crate::registry::ModuleRegistry;

/// Output from a command execution.
pub enum CommandOutput {
    /// Lines to display in the console.
    Lines(Vec<String>),
    /// Signal that the app should quit.
    Quit,
}

/// Everything a command may touch.
///
/// Lifecycle events produced by registry calls are published on `bus` so the
/// app reacts to console-driven switches the same way it reacts to keys.
pub struct CommandContext<'a> {
    pub registry: &'a mut ModuleRegistry,
    pub console: &'a mut Console,
    pub bus: &'a mut EventBus,
    pub clock: &'a FrameClock,
    pub started_at: Instant,
}

/// A console command.
pub trait Command {
    fn name(&self) -> &str;
    fn aliases(&self) -> &[&str] {
        &[]
    }
    fn description(&self) -> &str;
    fn usage(&self) -> &str {
        self.name()
    }
    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput;
}

/// Registry of console commands.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    lookup: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let idx = self.commands.len();
        self.lookup.insert(cmd.name().to_string(), idx);
        for alias in cmd.aliases() {
            self.lookup.insert(alias.to_string(), idx);
        }
        self.commands.push(cmd);
    }

    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandOutput {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            return CommandOutput::Lines(vec![]);
        };

        match self.lookup.get(name) {
            Some(&idx) => self.commands[idx].execute(args, ctx),
            None => CommandOutput::Lines(vec![format!(
                "unknown command: '{}'. Type 'help' for available commands.",
                name
            )]),
        }
    }

    /// One line per command: usage, description and aliases.
    pub fn help_lines(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|cmd| {
                let aliases = cmd.aliases();
                if aliases.is_empty() {
                    format!("  {:24} {}", cmd.usage(), cmd.description())
                } else {
                    format!(
                        "  {:24} {} (aliases: {})",
                        cmd.usage(),
                        cmd.description(),
                        aliases.join(", ")
                    )
                }
            })
            .collect()
    }
}

/// Publish registry events and describe the outcome in one console line.
fn report(events: Vec<Event>, ctx: &mut CommandContext) -> CommandOutput {
    let mut lines: Vec<String> = events
        .iter()
        .map(|ev| match ev {
            Event::ModuleLoaded { name, .. } => format!("loaded: {}", name),
            Event::ModuleUnloaded { id } => format!("unloaded: {}", id),
            Event::ModuleRegistered { name, slot, .. } => {
                format!("registered {} as slot {}", name, slot + 1)
            }
            Event::ModuleWarning(w) => format!("warning: {}", w),
            other => format!("{:?}", other),
        })
        .collect();
    if lines.is_empty() {
        lines.push("nothing to do".into());
    }
    ctx.bus.publish_all(events);
    CommandOutput::Lines(lines)
}

// ── Built-in commands ──

pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &str { "help" }
    fn aliases(&self) -> &[&str] { &["?"] }
    fn description(&self) -> &str { "List commands" }

    // The full listing needs the command registry itself, which the app
    // renders via `CommandRegistry::help_lines`.
    fn execute(&self, _args: &[&str], _ctx: &mut CommandContext) -> CommandOutput {
        CommandOutput::Lines(vec!["Type 'help' to list all commands.".into()])
    }
}

pub struct ClearCommand;

impl Command for ClearCommand {
    fn name(&self) -> &str { "clear" }
    fn aliases(&self) -> &[&str] { &["cls"] }
    fn description(&self) -> &str { "Clear console log" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        ctx.console.clear_logs();
        CommandOutput::Lines(vec![])
    }
}

pub struct ModulesCommand;

impl Command for ModulesCommand {
    fn name(&self) -> &str { "modules" }
    fn aliases(&self) -> &[&str] { &["mods"] }
    fn description(&self) -> &str { "List the module catalog" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        if ctx.registry.is_empty() {
            return CommandOutput::Lines(vec!["no modules registered".into()]);
        }
        let lines = ctx
            .registry
            .modules()
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let key = if i < crate::input::MAX_SLOT_KEYS {
                    format!("[{}]", i + 1)
                } else {
                    "   ".to_string()
                };
                let content = m.content.as_ref().map(ContentRef::key).unwrap_or("-");
                let marker = if m.is_active() { " *" } else { "" };
                format!("  {} {} ({}) <{}>{}", key, m.name, m.id, content, marker)
            })
            .collect();
        CommandOutput::Lines(lines)
    }
}

pub struct LoadCommand;

impl Command for LoadCommand {
    fn name(&self) -> &str { "load" }
    fn description(&self) -> &str { "Load a module by name" }
    fn usage(&self) -> &str { "load <name>" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        if args.is_empty() {
            return CommandOutput::Lines(vec!["usage: load <name>".into()]);
        }
        // Names may contain spaces.
        let events = ctx.registry.load_module_by_name(&args.join(" "));
        report(events, ctx)
    }
}

pub struct LoadIdCommand;

impl Command for LoadIdCommand {
    fn name(&self) -> &str { "load-id" }
    fn aliases(&self) -> &[&str] { &["switch", "sw"] }
    fn description(&self) -> &str { "Load a module by id" }
    fn usage(&self) -> &str { "load-id <id>" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        match args {
            [id] => {
                let events = ctx.registry.load_module_by_id(id);
                report(events, ctx)
            }
            _ => CommandOutput::Lines(vec!["usage: load-id <id>".into()]),
        }
    }
}

pub struct UnloadCommand;

impl Command for UnloadCommand {
    fn name(&self) -> &str { "unload" }
    fn description(&self) -> &str { "Unload the current module" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let events = ctx.registry.unload_current_module();
        report(events, ctx)
    }
}

pub struct CurrentCommand;

impl Command for CurrentCommand {
    fn name(&self) -> &str { "current" }
    fn description(&self) -> &str { "Show the active module" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let line = match ctx.registry.current_module() {
            Some(m) if m.description.is_empty() => format!("{} ({})", m.name, m.id),
            Some(m) => format!("{} ({}): {}", m.name, m.id, m.description),
            None => "no module loaded".into(),
        };
        CommandOutput::Lines(vec![line])
    }
}

pub struct RegisterCommand;

impl Command for RegisterCommand {
    fn name(&self) -> &str { "register" }
    fn aliases(&self) -> &[&str] { &["reg"] }
    fn description(&self) -> &str { "Add a module to the catalog (- for no content)" }
    fn usage(&self) -> &str { "register <id> <prefab|-> [name]" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let [id, prefab, name @ ..] = args else {
            return CommandOutput::Lines(vec![format!("usage: {}", self.usage())]);
        };
        let content = (*prefab != "-").then(|| ContentRef::new(*prefab));
        let name = if name.is_empty() { id.to_string() } else { name.join(" ") };
        let (_, events) = ctx.registry.register_module(Module::new(name, *id, content));
        report(events, ctx)
    }
}

pub struct DayNightCommand;

impl Command for DayNightCommand {
    fn name(&self) -> &str { "daynight" }
    fn aliases(&self) -> &[&str] { &["dn"] }
    fn description(&self) -> &str { "Toggle or set the day/night cycle" }
    fn usage(&self) -> &str { "daynight [day|night]" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let (event, line) = match args.first().copied() {
            None | Some("toggle") => (Event::ToggleDayNight, "toggling day/night"),
            Some("day") => (Event::SetTimeOfDay { day: true }, "switching to day"),
            Some("night") => (Event::SetTimeOfDay { day: false }, "switching to night"),
            Some(_) => return CommandOutput::Lines(vec![format!("usage: {}", self.usage())]),
        };
        ctx.bus.publish(event);
        CommandOutput::Lines(vec![line.into()])
    }
}

pub struct HudCommand;

impl Command for HudCommand {
    fn name(&self) -> &str { "hud" }
    fn description(&self) -> &str { "Toggle the HUD overlay" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        ctx.bus.publish(Event::ToggleHud);
        CommandOutput::Lines(vec![])
    }
}

pub struct QuitCommand;

impl Command for QuitCommand {
    fn name(&self) -> &str { "quit" }
    fn aliases(&self) -> &[&str] { &["exit", "q"] }
    fn description(&self) -> &str { "Exit the simulator" }

    fn execute(&self, _args: &[&str], _ctx: &mut CommandContext) -> CommandOutput {
        CommandOutput::Quit
    }
}

pub struct UptimeCommand;

impl Command for UptimeCommand {
    fn name(&self) -> &str { "uptime" }
    fn description(&self) -> &str { "Show runtime uptime" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let secs = ctx.started_at.elapsed().as_secs();
        CommandOutput::Lines(vec![format!(
            "Uptime: {:02}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )])
    }
}

pub struct FpsCommand;

impl Command for FpsCommand {
    fn name(&self) -> &str { "fps" }
    fn aliases(&self) -> &[&str] { &["tps"] }
    fn description(&self) -> &str { "Show frames-per-second" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        CommandOutput::Lines(vec![format!("FPS: {:.1}", ctx.clock.fps())])
    }
}

pub struct EchoCommand;

impl Command for EchoCommand {
    fn name(&self) -> &str { "echo" }
    fn description(&self) -> &str { "Print message to console" }
    fn usage(&self) -> &str { "echo <message>" }

    fn execute(&self, args: &[&str], _ctx: &mut CommandContext) -> CommandOutput {
        CommandOutput::Lines(vec![args.join(" ")])
    }
}

/// Create a CommandRegistry pre-loaded with all built-in commands.
pub fn builtin_registry() -> CommandRegistry {
    let mut reg = CommandRegistry::new();
    reg.register(Box::new(HelpCommand));
    reg.register(Box::new(ClearCommand));
    reg.register(Box::new(ModulesCommand));
    reg.register(Box::new(LoadCommand));
    reg.register(Box::new(LoadIdCommand));
    reg.register(Box::new(UnloadCommand));
    reg.register(Box::new(CurrentCommand));
    reg.register(Box::new(RegisterCommand));
    reg.register(Box::new(DayNightCommand));
    reg.register(Box::new(HudCommand));
    reg.register(Box::new(QuitCommand));
    reg.register(Box::new(UptimeCommand));
    reg.register(Box::new(FpsCommand));
    reg.register(Box::new(EchoCommand));
    reg
}
