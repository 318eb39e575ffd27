mod controls;
mod snapshot;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use mamba_config::{ConfigSource, SceneConfig};
use mamba_core::{
    bus::EventBus,
    command::{self, CommandContext, CommandOutput, CommandRegistry},
    console::Console,
    event::Event,
    fps::{FrameClock, FrameDelta},
    input::module_slot_for_key,
    logging::{self, LogBuffer, LogConfig, LogEntry, LogLevel},
    module::{ContainerId, ContentRef, Module},
    registry::ModuleRegistry,
};
use mamba_ui::{
    console::render_console,
    layout::shell_layout,
    scene_view::{render_scene, CameraMarker},
    shell::{render_shell, CycleView, ShellView},
};
use mamba_world::{
    camera::FreeCam,
    daynight::DayNightCycle,
    host::SceneHost,
    hud::{Hud, HudContext},
};

use controls::Controls;
use snapshot::SnapshotCommand;

const HUD_HEIGHT: u16 = 14;
const CYCLE_PANEL_WIDTH: u16 = 18;

struct AppState {
    started_at: Instant,
    status_line: String,
}

impl AppState {
    fn new() -> Self {
        Self {
            started_at: Instant::now(),
            status_line: "no module loaded".to_string(),
        }
    }
}

struct App {
    state: AppState,
    registry: ModuleRegistry,
    bus: EventBus,
    log_buffer: LogBuffer,
    console: Console,
    clock: FrameClock,
    commands: CommandRegistry,
    daynight: DayNightCycle,
    camera: FreeCam,
    controls: Controls,
    hud: Hud,
}

fn catalog(config: &SceneConfig) -> Vec<Module> {
    config
        .modules
        .iter()
        .map(|m| {
            Module::new(&m.name, &m.id, m.prefab.as_deref().map(ContentRef::new))
                .with_description(&m.description)
        })
        .collect()
}

impl App {
    fn new(log_buffer: LogBuffer, config: SceneConfig) -> Self {
        let host = SceneHost::new(config.prefabs.clone());
        let registry = ModuleRegistry::with_catalog(
            Box::new(host),
            ContainerId::new(&config.container),
            catalog(&config),
        );

        let mut commands = command::builtin_registry();
        commands.register(Box::new(SnapshotCommand));

        let mut app = Self {
            state: AppState::new(),
            registry,
            bus: EventBus::new(),
            log_buffer,
            console: Console::default(),
            clock: FrameClock::default(),
            commands,
            daynight: DayNightCycle::new(config.lighting),
            camera: FreeCam::new(config.camera),
            controls: Controls::default(),
            hud: Hud::new(config.hud),
        };

        if config.autoload_first {
            let events = app.registry.start();
            app.bus.publish_all(events);
        }
        app
    }

    fn scene_host(&self) -> Option<&SceneHost> {
        self.registry.host().as_any().downcast_ref::<SceneHost>()
    }

    /// Drain new entries from the shared log buffer into the console.
    fn sync_logs(&mut self) {
        if let Ok(mut buf) = self.log_buffer.lock() {
            for entry in buf.drain(..) {
                self.console.push_log(entry);
            }
        }
    }

    fn console_line(&mut self, target: &str, message: String) {
        self.console.push_log(LogEntry {
            level: LogLevel::Info,
            target: target.into(),
            message,
        });
    }

    /// Execute a console command. Returns `true` when the app should quit.
    fn dispatch_command(&mut self, input: &str) -> bool {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return false;
        }

        self.console_line("console", format!("> {}", trimmed));

        if trimmed == "help" || trimmed == "?" {
            for line in self.commands.help_lines() {
                self.console_line("help", line);
            }
            return false;
        }

        let mut ctx = CommandContext {
            registry: &mut self.registry,
            console: &mut self.console,
            bus: &mut self.bus,
            clock: &self.clock,
            started_at: self.state.started_at,
        };

        match self.commands.execute(trimmed, &mut ctx) {
            CommandOutput::Lines(lines) => {
                for line in lines {
                    self.console_line("console", line);
                }
                false
            }
            CommandOutput::Quit => true,
        }
    }

    /// Keys while the console is closed.
    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if let Some(slot) = module_slot_for_key(&key, self.registry.len()) {
            let events = self.registry.load_slot(slot);
            self.bus.publish_all(events);
            return;
        }

        let look_step = self.camera.look_step();
        if self
            .controls
            .on_key(&key, now, look_step, self.camera.cursor_locked())
        {
            return;
        }

        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.bus.publish(Event::Quit),
            KeyCode::Char(c) if c.eq_ignore_ascii_case(&self.daynight.toggle_key()) => {
                self.bus.publish(Event::ToggleDayNight)
            }
            KeyCode::Char(c) if c.eq_ignore_ascii_case(&self.hud.toggle_key()) => {
                self.bus.publish(Event::ToggleHud)
            }
            _ => tracing::trace!(code = ?key.code, "unbound key"),
        }
    }

    /// Handle one drained event. Returns `true` on quit.
    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Quit => return true,
            Event::ModuleLoaded { name, .. } => {
                self.state.status_line = format!("MODULE: {}", name);
            }
            Event::ModuleUnloaded { .. } => {
                if self.registry.current_module().is_none() {
                    self.state.status_line = "no module loaded".to_string();
                }
            }
            Event::ModuleRegistered { name, slot, .. } => {
                self.state.status_line = format!("REGISTERED: {} [{}]", name, slot + 1);
            }
            Event::ModuleWarning(warning) => {
                self.state.status_line = format!("WARNING: {}", warning);
            }
            Event::ToggleDayNight => self.daynight.toggle(),
            Event::SetTimeOfDay { day } => self.daynight.set_time_of_day(day),
            Event::ToggleHud => self.hud.toggle(),
        }
        false
    }

    /// Advance the simulation by one frame. The HUD frame-rate estimate
    /// takes the uncapped delta.
    fn step(&mut self, now: Instant, delta: FrameDelta) {
        let dt = delta.dt.as_secs_f32();
        self.daynight.update(dt);
        if let Some(host) = self
            .registry
            .host_mut()
            .as_any_mut()
            .downcast_mut::<SceneHost>()
        {
            self.daynight.apply(host.scene_mut());
        }

        let input = self.controls.take_input(now);
        self.camera.update(&input, dt);
        self.hud.update(delta.raw.as_secs_f32());
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    let log_buffer = logging::init(&LogConfig::default());
    tracing::info!("mamba starting up");

    let (config, source) = SceneConfig::load()?;
    match &source {
        ConfigSource::Builtin => tracing::info!("using built-in scene"),
        ConfigSource::File(_) => tracing::info!(path = %source, "loaded scene config"),
    }
    config.supports_host_api(env!("CARGO_PKG_VERSION"))?;
    for id in config.duplicate_module_ids() {
        tracing::warn!(module_id = id, "duplicate module id in config, lookups use the first entry");
    }

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, log_buffer, config);
    restore_terminal(terminal)?;
    res
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    log_buffer: LogBuffer,
    config: SceneConfig,
) -> Result<()> {
    let mut app = App::new(log_buffer, config);
    let poll_timeout = Duration::from_millis(16);

    loop {
        // ── Sync logs from tracing into console ──
        app.sync_logs();

        // ── Advance simulation ──
        let now = Instant::now();
        let delta = app.clock.frame(now);
        app.console.update(now);
        app.step(now, delta);

        // ── Render ──
        terminal.draw(|f| {
            let hud_height = if app.hud.is_visible() { HUD_HEIGHT } else { 0 };
            let rects = shell_layout(f.area(), hud_height, CYCLE_PANEL_WIDTH);

            let module_title = app
                .registry
                .current_module()
                .map(|m| m.name.as_str())
                .unwrap_or("IDLE");
            let hud = app.hud.is_visible().then(|| {
                app.hud.lines(&HudContext {
                    position: app.camera.position(),
                    elapsed: app.state.started_at.elapsed().as_secs_f32(),
                    is_day: Some(app.daynight.is_day()),
                    module: app.registry.current_module().map(|m| m.name.as_str()),
                })
            });
            let view = ShellView {
                module_title,
                status_line: &app.state.status_line,
                hud,
                cycle: CycleView {
                    is_day: app.daynight.is_day(),
                    transition: app.daynight.transition(),
                },
            };

            let marker = CameraMarker {
                position: app.camera.position(),
                forward: app.camera.forward(),
            };
            let scene_host = app.scene_host();
            render_shell(f, rects, view, |f, hero_area| {
                if let Some(host) = scene_host {
                    render_scene(f, hero_area, host.scene(), &marker, module_title);
                }
            });

            if app.console.is_visible() {
                let fraction = app.console.overlay_fraction(now);
                let show_cursor = app.console.is_open();
                render_console(f, f.area(), &app.console, app.clock.fps(), fraction, show_cursor);
            }
        })?;

        // ── Poll → Publish ──
        if event::poll(poll_timeout)? {
            match event::read()? {
                CEvent::Key(key) if key.kind != KeyEventKind::Release => {
                    if key.code == KeyCode::Char('`') || key.code == KeyCode::Char('~') {
                        if key.kind == KeyEventKind::Press {
                            app.console.toggle(Instant::now());
                        }
                    } else if app.console.is_open() {
                        match key.code {
                            KeyCode::Enter => {
                                let input = app.console.submit_input();
                                if app.dispatch_command(&input) {
                                    return Ok(());
                                }
                            }
                            KeyCode::Backspace => app.console.backspace(),
                            KeyCode::Left => app.console.cursor_left(),
                            KeyCode::Right => app.console.cursor_right(),
                            KeyCode::PageUp => app.console.scroll_up(10),
                            KeyCode::PageDown => app.console.scroll_down(10),
                            KeyCode::Esc => app.console.toggle(Instant::now()),
                            KeyCode::Char(c) => app.console.insert_char(c),
                            _ => {}
                        }
                    } else {
                        app.handle_key(key, Instant::now());
                    }
                }
                _ => {}
            }
        }

        // ── Drain → Handle ──
        for ev in app.bus.drain() {
            if app.handle_event(ev) {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use mamba_core::logging::new_log_buffer;

    fn app() -> App {
        App::new(new_log_buffer(16), SceneConfig::default())
    }

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn pump(app: &mut App) -> bool {
        app.bus.drain().into_iter().any(|ev| app.handle_event(ev))
    }

    #[test]
    fn autoloads_first_module() {
        let mut app = app();
        assert_eq!(app.registry.current_module().map(|m| m.id.as_str()), Some("hangar"));
        pump(&mut app);
        assert_eq!(app.state.status_line, "MODULE: Hangar");
        assert_eq!(app.scene_host().map(|h| h.live_instances()), Some(1));
    }

    #[test]
    fn number_keys_switch_modules() {
        let mut app = app();
        app.handle_key(press('2'), Instant::now());
        pump(&mut app);
        assert_eq!(app.registry.current_module().map(|m| m.id.as_str()), Some("arena"));
        assert_eq!(app.state.status_line, "MODULE: Neon Arena");
        assert_eq!(app.scene_host().map(|h| h.live_instances()), Some(1));
    }

    #[test]
    fn module_without_prefab_reports_warning() {
        let mut app = app();
        app.handle_key(press('4'), Instant::now());
        pump(&mut app);
        assert!(app.registry.current_module().is_none());
        assert!(app.state.status_line.starts_with("WARNING:"));
    }

    #[test]
    fn toggle_keys_reach_daynight_and_hud() {
        let mut app = app();
        assert!(app.daynight.is_day());
        app.handle_key(press('t'), Instant::now());
        app.handle_key(press('h'), Instant::now());
        pump(&mut app);
        assert!(!app.daynight.is_day());
        assert!(!app.hud.is_visible());
    }

    #[test]
    fn console_commands_flow_through_bus() {
        let mut app = app();
        assert!(!app.dispatch_command("daynight night"));
        assert!(!app.dispatch_command("load Data Core"));
        pump(&mut app);
        assert!(!app.daynight.is_day());
        assert_eq!(app.registry.current_module().map(|m| m.id.as_str()), Some("datacore"));
        assert!(app.dispatch_command("quit"));
    }

    #[test]
    fn help_lists_snapshot() {
        let mut app = app();
        app.dispatch_command("help");
        assert!(app
            .console
            .log_lines()
            .iter()
            .any(|l| l.message.contains("snapshot")));
    }

    #[test]
    fn hud_rate_uses_uncapped_delta() {
        let mut app = app();
        app.step(
            Instant::now(),
            FrameDelta {
                dt: Duration::from_millis(250),
                raw: Duration::from_secs(2),
            },
        );
        // one smoothing step: 0 + (2.0 - 0) * 0.1
        assert!((app.hud.fps() - 5.0).abs() < 1e-3, "fps was {}", app.hud.fps());
    }

    #[test]
    fn console_registration_reaches_status_line() {
        let mut app = app();
        assert!(!app.dispatch_command("register arcade-1 arena Retro Arcade"));
        pump(&mut app);
        assert_eq!(app.state.status_line, "REGISTERED: Retro Arcade [5]");
        assert_eq!(app.registry.len(), 5);
    }

    #[test]
    fn quit_key_ends_loop() {
        let mut app = app();
        app.handle_key(press('q'), Instant::now());
        assert!(pump(&mut app));
    }

    #[test]
    fn step_applies_lighting_to_scene() {
        let mut app = app();
        app.daynight.set_time_of_day(false);
        app.step(
            Instant::now(),
            FrameDelta {
                dt: Duration::from_secs(5),
                raw: Duration::from_secs(5),
            },
        );
        let host = app.scene_host().expect("scene host");
        assert!(host.scene().lights().all(|(_, l)| (l.intensity - 2.5).abs() < 1e-3));
        assert!(!host.scene().sun.is_up());
    }
}
