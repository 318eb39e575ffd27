use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use mamba_world::hud::HudLines;

use crate::layout::ShellRects;

pub struct CycleView {
    pub is_day: bool,
    /// 1.0 at full day, 0.0 at full night.
    pub transition: f32,
}

pub struct ShellView<'a> {
    pub module_title: &'a str,
    pub status_line: &'a str,
    /// `None` hides the HUD strip.
    pub hud: Option<HudLines>,
    pub cycle: CycleView,
}

pub fn render_shell(
    f: &mut Frame,
    rects: ShellRects,
    view: ShellView<'_>,
    hero: impl FnOnce(&mut Frame, Rect),
) {
    let top = Paragraph::new(Line::from(format!(
        "MAMBA | {} | {}",
        view.module_title, view.status_line
    )))
    .style(Style::default())
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(top, rects.top);

    hero(f, rects.hero);

    let Some(hud) = view.hud else {
        return;
    };
    if rects.hud.height == 0 {
        return;
    }

    let accent = Style::default().fg(Color::Cyan);

    let left_text = Text::from(hud.left.into_iter().map(Line::from).collect::<Vec<_>>());
    let left = Paragraph::new(left_text)
        .style(accent)
        .block(Block::default().borders(Borders::ALL).title("FLIGHT"));
    f.render_widget(left, rects.hud_left);

    let (label, color) = if view.cycle.is_day {
        ("DAY", Color::Yellow)
    } else {
        ("NIGHT", Color::Blue)
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("CYCLE"))
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(f64::from(view.cycle.transition.clamp(0.0, 1.0)))
        .label(label);
    f.render_widget(gauge, rects.hud_center);

    let right_text = Text::from(hud.right.into_iter().map(Line::from).collect::<Vec<_>>());
    let right = Paragraph::new(right_text)
        .style(accent)
        .block(Block::default().borders(Borders::ALL).title("SYSTEM"));
    f.render_widget(right, rects.hud_right);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::shell_layout;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn draw(hud: Option<HudLines>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| {
                let rects = shell_layout(f.area(), if hud.is_some() { 12 } else { 0 }, 20);
                let view = ShellView {
                    module_title: "Hangar",
                    status_line: "loaded",
                    hud: hud.clone(),
                    cycle: CycleView {
                        is_day: false,
                        transition: 0.25,
                    },
                };
                render_shell(f, rects, view, |f, area| {
                    f.render_widget(Paragraph::new("HERO"), area);
                });
            })
            .unwrap();
        text(terminal.backend().buffer())
    }

    #[test]
    fn renders_top_bar_hero_and_panels() {
        let out = draw(Some(HudLines {
            left: vec!["FPS: 60".into()],
            right: vec!["MODULE: Hangar".into()],
        }));
        assert!(out.contains("MAMBA | Hangar | loaded"));
        assert!(out.contains("HERO"));
        assert!(out.contains("FPS: 60"));
        assert!(out.contains("MODULE: Hangar"));
        assert!(out.contains("NIGHT"));
    }

    #[test]
    fn hidden_hud_skips_panels() {
        let out = draw(None);
        assert!(out.contains("HERO"));
        assert!(!out.contains("CYCLE"));
        assert!(!out.contains("FLIGHT"));
    }
}
