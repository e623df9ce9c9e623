use crate::app::App;
use livecheck::{BlockKind, Orientation, PanelBlock, Severity};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // editor + panel
            Constraint::Length(1), // status line
            Constraint::Length(1), // shortcuts
        ])
        .split(frame.area());

    let direction = match app.shell().orientation() {
        Orientation::Stacked => Direction::Vertical,
        Orientation::SideBySide => Direction::Horizontal,
    };
    let panes = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[0]);

    render_editor(frame, app, panes[0]);
    render_panel(frame, &app.shell().panel(), panes[1]);
    render_status_line(frame, app, chunks[1]);
    render_shortcuts(frame, app, chunks[2]);
}

fn render_editor(frame: &mut Frame, app: &mut App, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    app.shell_mut().set_viewport(inner_width, inner_height);

    let shell = app.shell();
    let document = shell.document();
    let (scroll_top, scroll_left) = shell
        .widget()
        .map(|w| (w.scroll_top(), w.scroll_left()))
        .unwrap_or((0, 0));

    let lines: Vec<Line> = (scroll_top..document.line_count().min(scroll_top + inner_height))
        .map(|line| Line::raw(document.line_text(line).unwrap_or_default()))
        .collect();

    let title = format!(
        " {} {}",
        app.path().display(),
        if app.is_modified() { "[+] " } else { "" }
    );
    let paragraph = Paragraph::new(lines)
        .scroll((0, scroll_left.min(u16::MAX as usize) as u16))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);

    if inner_width == 0 || inner_height == 0 {
        return;
    }
    let Some(widget) = shell.widget() else {
        return;
    };
    let row = widget.cursor().line as usize - 1;
    let col = widget.visual_column(document);
    if row < scroll_top || col < scroll_left {
        return;
    }
    let (rel_row, rel_col) = (row - scroll_top, col - scroll_left);
    if rel_row >= inner_height || rel_col >= inner_width {
        return;
    }
    frame.set_cursor_position((area.x + 1 + rel_col as u16, area.y + 1 + rel_row as u16));
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Information => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

/// Lines for the info panel: each block's header, then its body verbatim, then a blank line.
pub fn panel_lines(blocks: &[PanelBlock]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in blocks {
        let header_style = match block.kind {
            BlockKind::Goal => Style::default().fg(Color::Cyan),
            BlockKind::Message(severity) => Style::default().fg(severity_color(severity)),
        }
        .add_modifier(Modifier::BOLD);

        lines.push(Line::from(Span::styled(block.header.clone(), header_style)));
        lines.extend(block.body.split('\n').map(|l| Line::raw(l.to_string())));
        lines.push(Line::default());
    }
    lines
}

fn render_panel(frame: &mut Frame, blocks: &[PanelBlock], area: Rect) {
    let paragraph = Paragraph::new(panel_lines(blocks))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" info "));
    frame.render_widget(paragraph, area);
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let cursor = app
        .shell()
        .cursor()
        .or_else(|| app.shell().widget().map(|w| w.cursor()));
    let position = cursor.map(|c| c.to_string()).unwrap_or_default();

    let text = if app.status_message().is_empty() {
        format!(
            "{} | v{} | {}",
            position,
            app.shell().document().version(),
            app.checker_label()
        )
    } else {
        app.status_message().to_string()
    };

    let status_line = Paragraph::new(text).style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(status_line, area);
}

fn render_shortcuts(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = if app.confirm_quit() {
        "Y: save and quit  N: quit without saving  Esc: cancel"
    } else {
        "Ctrl-S: save  Ctrl-Q/Ctrl-X: quit  Tab: indent"
    };
    let line = Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(line, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecheck::{CursorPosition, PanelBlock, PointInfo};

    #[test]
    fn test_panel_lines_keep_body_verbatim() {
        let goal = PointInfo {
            position: CursorPosition::new(4, 3),
            state: "m n : ℕ\n⊢   m + n = n + m".to_string(),
        };
        let lines = panel_lines(&[PanelBlock::goal(&goal)]);

        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, vec!["goal at 4:2", "m n : ℕ", "⊢   m + n = n + m", ""]);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Cyan));
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(severity_color(Severity::Information), Color::Green);
        assert_eq!(severity_color(Severity::Warning), Color::Yellow);
        assert_eq!(severity_color(Severity::Error), Color::Red);
    }
}
