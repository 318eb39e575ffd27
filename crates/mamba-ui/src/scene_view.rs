//! Top-down map of the active environment.
//!
//! Walls are drawn as outlines, neon lights as coloured points dimmed by
//! their current intensity, and the camera as a dot with a heading line. The
//! background follows the scene's ambient colour so day and night read at a
//! glance.

use glam::Vec3;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points, Rectangle},
        Block, Borders, Paragraph,
    },
    Frame,
};

use mamba_world::scene::{NodeKind, Scene};

const MIN_EXTENT: f64 = 10.0;
const HEADING_LENGTH: f64 = 4.0;
const MAX_NEON: f32 = 2.5;

pub struct CameraMarker {
    pub position: Vec3,
    pub forward: Vec3,
}

fn to_color(c: Vec3) -> Color {
    let c = (c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    Color::Rgb(c.x as u8, c.y as u8, c.z as u8)
}

struct WallRect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

fn walls(scene: &Scene) -> Vec<WallRect> {
    scene
        .iter()
        .filter(|(_, node)| matches!(node.kind, NodeKind::Wall { .. }))
        .filter_map(|(id, node)| {
            let center = scene.world_position(id)?;
            let size = node.scale;
            Some(WallRect {
                x: f64::from(center.x - size.x / 2.0),
                y: f64::from(center.z - size.z / 2.0),
                width: f64::from(size.x),
                height: f64::from(size.z),
            })
        })
        .collect()
}

/// Half-width of the square map window: the wall extents plus a margin, or
/// enough to frame the camera when there are no walls.
fn extent(walls: &[WallRect], camera: &CameraMarker) -> f64 {
    let from_walls = walls
        .iter()
        .flat_map(|w| [w.x.abs(), (w.x + w.width).abs(), w.y.abs(), (w.y + w.height).abs()])
        .fold(0.0_f64, f64::max);
    let from_camera = f64::from(camera.position.x.abs().max(camera.position.z.abs()));
    (from_walls.max(from_camera) * 1.1).max(MIN_EXTENT)
}

pub fn render_scene(f: &mut Frame, area: Rect, scene: &Scene, camera: &CameraMarker, title: &str) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());

    let walls = walls(scene);
    if walls.is_empty() && scene.lights().next().is_none() {
        let hint = Paragraph::new(Line::from("no module loaded: press 1-9 or type `load <name>`"))
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(hint, area);
        return;
    }

    let extent = extent(&walls, camera);

    let lights: Vec<((f64, f64), Color)> = scene
        .lights()
        .filter_map(|(id, light)| {
            let pos = scene.world_position(id)?;
            let brightness = 0.3 + 0.7 * (light.intensity / MAX_NEON).clamp(0.0, 1.0);
            Some((
                (f64::from(pos.x), f64::from(pos.z)),
                to_color(light.color * brightness),
            ))
        })
        .collect();

    let cam = (f64::from(camera.position.x), f64::from(camera.position.z));
    let heading = glam::Vec2::new(camera.forward.x, camera.forward.z).normalize_or_zero();
    let tip = (
        cam.0 + f64::from(heading.x) * HEADING_LENGTH,
        cam.1 + f64::from(heading.y) * HEADING_LENGTH,
    );

    let canvas = Canvas::default()
        .block(block)
        .background_color(to_color(scene.atmosphere.ambient))
        .marker(Marker::Braille)
        .x_bounds([-extent, extent])
        .y_bounds([-extent, extent])
        .paint(move |ctx| {
            for wall in &walls {
                ctx.draw(&Rectangle {
                    x: wall.x,
                    y: wall.y,
                    width: wall.width,
                    height: wall.height,
                    color: Color::Gray,
                });
            }
            for (coords, color) in &lights {
                ctx.draw(&Points {
                    coords: &[*coords],
                    color: *color,
                });
            }
            ctx.layer();
            ctx.draw(&CanvasLine {
                x1: cam.0,
                y1: cam.1,
                x2: tip.0,
                y2: tip.1,
                color: Color::White,
            });
            ctx.draw(&Points {
                coords: &[cam],
                color: Color::LightYellow,
            });
        });
    f.render_widget(canvas, area);
}
