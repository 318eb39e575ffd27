use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellRects {
    pub top: Rect,
    pub hero: Rect,
    pub hud: Rect,
    pub hud_left: Rect,
    pub hud_center: Rect,
    pub hud_right: Rect,
}

/// Split the screen into top bar, hero and a three-column HUD strip.
///
/// A `hud_height` of zero hides the strip and gives the rows to the hero.
pub fn shell_layout(area: Rect, hud_height: u16, center_width: u16) -> ShellRects {
    let hud_height = if hud_height == 0 {
        0
    } else {
        hud_height.max(5).min(area.height.saturating_sub(2).max(5))
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),          // top bar
            Constraint::Min(1),             // hero
            Constraint::Length(hud_height), // hud
        ])
        .split(area);

    let hud = chunks[2];
    let center_width = center_width.min(hud.width.saturating_sub(2).max(10));

    let hud_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(center_width),
            Constraint::Percentage(45),
        ])
        .split(hud);

    ShellRects {
        top: chunks[0],
        hero: chunks[1],
        hud,
        hud_left: hud_cols[0],
        hud_center: hud_cols[1],
        hud_right: hud_cols[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_stack_vertically() {
        let r = shell_layout(Rect::new(0, 0, 100, 40), 14, 20);
        assert_eq!(r.top.height, 1);
        assert_eq!(r.hud.height, 14);
        assert_eq!(r.hero.height, 40 - 1 - 14);
        assert_eq!(r.hud_center.width, 20);
        assert_eq!(r.hud_left.y, r.hud.y);
    }

    #[test]
    fn hidden_hud_gives_rows_to_hero() {
        let r = shell_layout(Rect::new(0, 0, 80, 24), 0, 20);
        assert_eq!(r.hud.height, 0);
        assert_eq!(r.hero.height, 23);
    }

    #[test]
    fn hud_keeps_minimum_height() {
        let r = shell_layout(Rect::new(0, 0, 80, 24), 2, 20);
        assert_eq!(r.hud.height, 5);
    }
}
