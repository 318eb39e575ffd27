use serde_json::{json, Value};

use mamba_core::command::{Command, CommandContext, CommandOutput};
use mamba_core::registry::ModuleRegistry;
use mamba_world::host::SceneHost;

/// `snapshot`: dump the catalog, current module and scene stats as JSON.
pub struct SnapshotCommand;

pub fn snapshot(registry: &ModuleRegistry) -> Value {
    let modules: Vec<Value> = registry
        .modules()
        .iter()
        .map(|m| {
            json!({
                "name": m.name,
                "id": m.id,
                "content": m.content.as_ref().map(|c| c.key()),
                "description": m.description,
                "active": m.is_active(),
            })
        })
        .collect();

    let scene = registry
        .host()
        .as_any()
        .downcast_ref::<SceneHost>()
        .map(|host| {
            json!({
                "nodes": host.scene().len(),
                "lights": host.scene().lights().count(),
                "live_instances": host.live_instances(),
            })
        })
        .unwrap_or(Value::Null);

    json!({
        "container": registry.container().name(),
        "current": registry.current_module().map(|m| m.id.as_str()),
        "instance": registry.current_instance().map(|i| i.0),
        "modules": modules,
        "scene": scene,
    })
}

impl Command for SnapshotCommand {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn description(&self) -> &str {
        "Dump module registry state as JSON"
    }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let value = snapshot(ctx.registry);
        match serde_json::to_string_pretty(&value) {
            Ok(text) => CommandOutput::Lines(text.lines().map(str::to_string).collect()),
            Err(err) => CommandOutput::Lines(vec![format!("snapshot failed: {err}")]),
        }
    }
}
