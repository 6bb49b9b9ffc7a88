use ratatui::prelude::{Line, Span};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    widgets::{
        Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Tabs,
        canvas::{Canvas, Points},
    },
};

use crate::{
    clock::{format_duration, format_hours},
    constants::RING_SETTINGS,
    storage::KeyValueStore,
};

use super::{
    App, Tab,
    pie::{self, Ring},
    ui_helpers, view_style,
};

const NAME_WIDTH: usize = 18;

struct SliceView {
    points: Vec<(f64, f64)>,
    color: Color,
    label: Option<(f64, f64, String)>,
}

impl<S: KeyValueStore> App<S> {
    pub(super) fn draw_frame(&self, f: &mut Frame) {
        let size = f.size();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
            .split(size);
        let panel = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(columns[0]);

        self.render_tabs(f, panel[0]);
        match self.tab {
            Tab::Schedule => self.render_schedule_list(f, panel[1]),
            Tab::Todos => self.render_todo_list(f, panel[1]),
            Tab::Presets => self.render_preset_list(f, panel[1]),
        }
        self.render_footer(f, panel[2]);
        self.render_ring(f, columns[1]);
    }

    fn render_tabs(&self, f: &mut Frame, area: Rect) {
        let open = self.planner.state().todos.open_count();
        let titles: Vec<Line> = Tab::ALL
            .iter()
            .map(|tab| match tab {
                Tab::Todos if open > 0 => Line::from(format!("{} ({})", tab.title(), open)),
                _ => Line::from(tab.title()),
            })
            .collect();

        let tabs = Tabs::new(titles)
            .select(self.tab.position())
            .block(rounded_block("daypie"))
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn render_schedule_list(&self, f: &mut Frame, area: Rect) {
        let state = self.planner.state();
        let items: Vec<ListItem> = state
            .schedule
            .blocks()
            .iter()
            .enumerate()
            .map(|(i, block)| {
                let color = view_style::hex_to_color(&block.color);
                let selected = state.selected.as_ref() == Some(&block.id);
                let dot = if selected { "◉ " } else { "● " };
                let text = format!(
                    "{}-{} {:<width$} {:>5}",
                    format_hours(block.start),
                    format_hours(block.end),
                    ui_helpers::truncate_label(&block.name, NAME_WIDTH),
                    format_duration(block.duration()),
                    width = NAME_WIDTH
                );

                if i == self.block_index {
                    let text_color = view_style::text_color_for_bg(color);
                    ListItem::new(Line::from(vec![
                        Span::raw(dot).fg(text_color),
                        Span::raw(text).fg(text_color),
                    ]))
                    .style(Style::default().fg(text_color).bg(color))
                } else {
                    ListItem::new(Line::from(vec![
                        Span::raw(dot).fg(color),
                        Span::raw(text).fg(Color::White),
                    ]))
                }
            })
            .collect();

        self.render_list(f, area, items, self.block_index);
    }

    fn render_todo_list(&self, f: &mut Frame, area: Rect) {
        let todos = &self.planner.state().todos;
        if todos.is_empty() {
            let empty = Paragraph::new(Span::styled(
                "No todos yet. Press a to add one.",
                Style::default().fg(Color::Gray),
            ))
            .block(rounded_block(""));
            f.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = todos
            .items()
            .iter()
            .map(|todo| {
                let (mark, style) = if todo.completed {
                    (
                        "[x] ",
                        Style::default()
                            .fg(Color::Gray)
                            .add_modifier(Modifier::CROSSED_OUT),
                    )
                } else {
                    ("[ ] ", Style::default().fg(Color::White))
                };
                ListItem::new(Line::from(vec![
                    Span::raw(mark).fg(Color::Gray),
                    Span::styled(todo.text.clone(), style),
                ]))
            })
            .collect();

        self.render_list(f, area, items, self.todo_index);
    }

    fn render_preset_list(&self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .planner
            .state()
            .presets
            .presets()
            .iter()
            .map(|preset| {
                let mut spans = vec![
                    Span::raw(preset.name.clone()).fg(Color::White),
                    Span::raw(format!("  {} blocks", preset.schedule.len())).fg(Color::Gray),
                ];
                if preset.id.is_protected() {
                    spans.push(Span::raw("  locked").fg(Color::DarkGray));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        self.render_list(f, area, items, self.preset_index);
    }

    fn render_list(&self, f: &mut Frame, area: Rect, items: Vec<ListItem>, cursor: usize) {
        let highlight = match self.tab {
            Tab::Schedule => Style::default(),
            Tab::Todos | Tab::Presets => Style::default().fg(Color::Black).bg(Color::White),
        };

        let mut list_state = ListState::default();
        list_state.select(Some(cursor));

        let list = List::new(items)
            .block(rounded_block(""))
            .highlight_style(highlight);
        f.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let line = if let Some((label, buf)) = self.input.prompt() {
            Line::from(vec![
                Span::styled(
                    format!("{}: ", label),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("{}_", buf)).fg(Color::White),
                Span::raw("  enter ok  esc cancel").fg(Color::DarkGray),
            ])
        } else if let Some(notice) = &self.notice {
            Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Yellow)))
        } else {
            let hints: &[(&str, &str)] = match self.tab {
                Tab::Schedule => &[
                    ("enter", "select"),
                    ("e", "end"),
                    ("+/-", "nudge"),
                    ("r", "rename"),
                    ("c", "colour"),
                    ("s", "split"),
                    ("x", "delete"),
                ],
                Tab::Todos => &[("a", "add"), ("space", "toggle"), ("x", "delete")],
                Tab::Presets => &[("n", "save current"), ("enter", "load"), ("x", "delete")],
            };
            let mut spans: Vec<Span> = hints
                .iter()
                .flat_map(|(key, label)| view_style::key_hint_span(key, label))
                .collect();
            spans.extend(view_style::key_hint_span("tab", "switch"));
            spans.extend(view_style::key_hint_span("q", "quit"));
            Line::from(spans)
        };

        let footer = Paragraph::new(line).block(rounded_block(""));
        f.render_widget(footer, area);
    }

    fn render_ring(&self, f: &mut Frame, area: Rect) {
        let state = self.planner.state();

        let detail = match state.selected_block() {
            Some(block) => format!(
                "{} {}-{} ({})",
                block.name,
                format_hours(block.start),
                format_hours(block.end),
                format_duration(block.duration())
            ),
            None => format!("{} planned", format_duration(state.schedule.total_hours())),
        };
        let border_color = state
            .selected_block()
            .map(|block| view_style::hex_to_color(&block.color))
            .unwrap_or(Color::White);

        let frame_block = rounded_block("")
            .title(
                Line::from(Span::styled(detail, Style::default().fg(Color::White)))
                    .alignment(Alignment::Right),
            )
            .border_style(Style::default().fg(border_color));

        let inner = frame_block.inner(area);
        let (x_bound, y_bound) = canvas_bounds(inner);
        let cell_width = if inner.width == 0 {
            0.0
        } else {
            2.0 * x_bound / inner.width as f64
        };

        let slices: Vec<SliceView> = state
            .schedule
            .blocks()
            .iter()
            .map(|block| {
                let selected = state.selected.as_ref() == Some(&block.id);
                let ring = Ring {
                    inner: RING_SETTINGS.inner_radius,
                    outer: if selected {
                        RING_SETTINGS.selected_outer_radius
                    } else {
                        RING_SETTINGS.outer_radius
                    },
                    radial_steps: RING_SETTINGS.radial_steps,
                    angular_step_hours: RING_SETTINGS.angular_step_hours,
                };
                let label = pie::slice_label(block, RING_SETTINGS.label_min_fraction).map(|text| {
                    let (x, y) = pie::label_anchor(block, &ring);
                    let half_width = text.chars().count() as f64 * cell_width / 2.0;
                    (x - half_width, y, text)
                });
                SliceView {
                    points: pie::slice_points(block.start, block.end, &ring),
                    color: view_style::hex_to_color(&block.color),
                    label,
                }
            })
            .collect();

        let canvas = Canvas::default()
            .block(frame_block)
            .marker(Marker::Braille)
            .x_bounds([-x_bound, x_bound])
            .y_bounds([-y_bound, y_bound])
            .paint(|ctx| {
                for slice in &slices {
                    ctx.draw(&Points {
                        coords: &slice.points,
                        color: slice.color,
                    });
                }
                ctx.layer();
                for slice in &slices {
                    if let Some((x, y, text)) = &slice.label {
                        ctx.print(
                            *x,
                            *y,
                            Span::styled(
                                text.clone(),
                                Style::default()
                                    .fg(Color::White)
                                    .add_modifier(Modifier::BOLD),
                            ),
                        );
                    }
                }
            });
        f.render_widget(canvas, area);
    }
}

fn rounded_block(title: &str) -> Block<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::White));
    if title.is_empty() {
        block
    } else {
        block.title(Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::White),
        )))
    }
}

/// Half-extents of the canvas so the ring stays round. A terminal cell is
/// about twice as tall as it is wide.
fn canvas_bounds(area: Rect) -> (f64, f64) {
    let width = area.width.max(1) as f64;
    let height = area.height.max(1) as f64 * 2.0;
    if width >= height {
        (width / height, 1.0)
    } else {
        (1.0, height / width)
    }
}
