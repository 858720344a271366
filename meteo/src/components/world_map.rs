//! World map with one marker per preset city

use crossterm::event::KeyCode;
use meteo_dispatch::EventKind;
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders,
        canvas::{Canvas, Map, MapResolution},
    },
};

use super::Component;
use crate::action::Action;
use crate::cities::PRESET_CITIES;
use crate::state::{MapState, MapViewport};

const MARKER: &str = "●";
const SELECTED_MARKER: &str = "◉";

pub struct WorldMapProps<'a> {
    pub map: &'a MapState,
    pub selected_city: &'a str,
    pub is_focused: bool,
}

/// Map pane; keeps the canvas area for marker hit-testing
#[derive(Default)]
pub struct WorldMap {
    canvas: Option<Rect>,
}

impl WorldMap {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cell where a coordinate lands inside `area`, if it is in view.
///
/// Uses the same projection as the canvas label layer.
pub fn marker_cell(viewport: &MapViewport, area: Rect, lon: f64, lat: f64) -> Option<(u16, u16)> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    let [left, right] = viewport.x_bounds();
    let [bottom, top] = viewport.y_bounds();
    if !(left..=right).contains(&lon) || !(bottom..=top).contains(&lat) {
        return None;
    }
    let x = ((lon - left) * f64::from(area.width - 1) / (right - left)) as u16;
    let y = ((top - lat) * f64::from(area.height - 1) / (top - bottom)) as u16;
    Some((area.x + x, area.y + y))
}

/// Index of the preset marker nearest to a clicked cell.
///
/// A marker counts when the click is within two columns and one row of it.
pub fn marker_at(viewport: &MapViewport, area: Rect, column: u16, row: u16) -> Option<usize> {
    PRESET_CITIES
        .iter()
        .enumerate()
        .filter_map(|(index, city)| {
            let (x, y) = marker_cell(viewport, area, city.lon, city.lat)?;
            let dx = (i32::from(x) - i32::from(column)).abs();
            let dy = (i32::from(y) - i32::from(row)).abs();
            (dx <= 2 && dy <= 1).then_some((index, dx * dx + 4 * dy * dy))
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(index, _)| index)
}

impl Component<Action> for WorldMap {
    type Props<'a> = WorldMapProps<'a>;

    fn handle_event(&mut self, event: &EventKind, props: WorldMapProps<'_>) -> Vec<Action> {
        let viewport = &props.map.viewport;

        if let Some((column, row)) = event.click_position() {
            return self
                .canvas
                .filter(|area| area.contains(Position::new(column, row)))
                .and_then(|area| marker_at(viewport, area, column, row))
                .map(|index| Action::CitySelect(PRESET_CITIES[index].key.to_string()))
                .into_iter()
                .collect();
        }

        if let EventKind::Scroll { column, row, delta } = event {
            let inside = self
                .canvas
                .is_some_and(|area| area.contains(Position::new(*column, *row)));
            return match (inside, delta.signum()) {
                (true, -1) => vec![Action::MapZoomIn],
                (true, 1) => vec![Action::MapZoomOut],
                _ => vec![],
            };
        }

        if !props.is_focused {
            return vec![];
        }
        let EventKind::Key(key) = event else {
            return vec![];
        };
        match key.code {
            KeyCode::Left => vec![Action::MapPan { lon: -1, lat: 0 }],
            KeyCode::Right => vec![Action::MapPan { lon: 1, lat: 0 }],
            KeyCode::Up => vec![Action::MapPan { lon: 0, lat: 1 }],
            KeyCode::Down => vec![Action::MapPan { lon: 0, lat: -1 }],
            KeyCode::Char('+') | KeyCode::Char('=') => vec![Action::MapZoomIn],
            KeyCode::Char('-') => vec![Action::MapZoomOut],
            KeyCode::Char('0') => vec![Action::MapReset],
            KeyCode::Char('n') => vec![Action::MapMarkerCycle(1)],
            KeyCode::Char('p') => vec![Action::MapMarkerCycle(-1)],
            KeyCode::Enter => PRESET_CITIES
                .get(props.map.marker_cursor)
                .map(|city| Action::CitySelect(city.key.to_string()))
                .into_iter()
                .collect(),
            _ => vec![],
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: WorldMapProps<'_>) {
        let viewport = props.map.viewport;
        let border = if props.is_focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Rgb(80, 80, 100))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Line::from(vec![
                Span::styled(" 🌍 World map ", Style::default().bold()),
                Span::styled(
                    format!("{}× ", viewport.zoom),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        let inner = block.inner(area);
        self.canvas = Some(inner);

        let show_all_labels = viewport.zoom >= 2.0;
        let cursor = props.is_focused.then_some(props.map.marker_cursor);
        let selected = props.selected_city;

        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds(viewport.x_bounds())
            .y_bounds(viewport.y_bounds())
            .paint(move |ctx| {
                ctx.draw(&Map {
                    resolution: MapResolution::High,
                    color: Color::Rgb(70, 90, 70),
                });
                ctx.layer();
                for (index, city) in PRESET_CITIES.iter().enumerate() {
                    let is_selected = city.key == selected;
                    let is_cursor = cursor == Some(index);
                    let (symbol, mut style) = if is_selected {
                        (SELECTED_MARKER, Style::default().fg(Color::Red).bold())
                    } else {
                        (MARKER, Style::default().fg(Color::Yellow))
                    };
                    if is_cursor {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    let mut spans = vec![Span::styled(symbol, style)];
                    if show_all_labels || is_selected || is_cursor {
                        spans.push(Span::styled(
                            format!(" {}", city.label),
                            Style::default().fg(Color::White),
                        ));
                    }
                    ctx.print(city.lon, city.lat, Line::from(spans));
                }
            });
        frame.render_widget(canvas, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities;
    use meteo_dispatch::testing::*;

    fn props(map: &MapState, is_focused: bool) -> WorldMapProps<'_> {
        WorldMapProps {
            map,
            selected_city: "moscow",
            is_focused,
        }
    }

    #[test]
    fn test_marker_cell_projection() {
        let viewport = MapViewport::default();
        let area = Rect::new(0, 0, 181, 91);
        // Bounds: lon -180..180, lat -70..110.
        assert_eq!(marker_cell(&viewport, area, -180.0, 110.0), Some((0, 0)));
        assert_eq!(marker_cell(&viewport, area, 0.0, 20.0), Some((90, 45)));
        assert_eq!(marker_cell(&viewport, area, 0.0, -80.0), None);
    }

    #[test]
    fn test_marker_at_finds_nearest() {
        let viewport = MapViewport::default();
        let area = Rect::new(1, 1, 120, 40);
        let berlin = cities::find("berlin").unwrap();
        let (x, y) = marker_cell(&viewport, area, berlin.lon, berlin.lat).unwrap();
        let hit = marker_at(&viewport, area, x, y).map(|i| PRESET_CITIES[i].key);
        assert_eq!(hit, Some("berlin"));

        let sydney = cities::find("sydney").unwrap();
        let (x, y) = marker_cell(&viewport, area, sydney.lon, sydney.lat).unwrap();
        assert_eq!(
            marker_at(&viewport, area, x + 1, y).map(|i| PRESET_CITIES[i].key),
            Some("sydney")
        );
        // Middle of the Pacific.
        assert_eq!(marker_at(&viewport, area, 3, 30), None);
    }

    #[test]
    fn test_keys_when_focused() {
        let mut component = WorldMap::new();
        let map = MapState::default();
        component
            .handle_event(&EventKind::Key(char_key('+')), props(&map, true))
            .assert_first(Action::MapZoomIn);
        component
            .handle_event(&EventKind::Key(key("left")), props(&map, true))
            .assert_first(Action::MapPan { lon: -1, lat: 0 });
        component
            .handle_event(&EventKind::Key(key("0")), props(&map, true))
            .assert_first(Action::MapReset);
        component
            .handle_event(&EventKind::Key(key("n")), props(&map, true))
            .assert_first(Action::MapMarkerCycle(1));
        component
            .handle_event(&EventKind::Key(key("enter")), props(&map, true))
            .assert_first(Action::CitySelect("moscow".into()));
        component
            .handle_event(&EventKind::Key(key("left")), props(&map, false))
            .assert_empty();
    }

    #[test]
    fn test_render_then_click_marker() {
        let mut harness = RenderHarness::new(120, 40);
        let mut component = WorldMap::new();
        let map = MapState::default();

        let output = harness.render_to_string_plain(|frame| {
            component.render(frame, frame.area(), props(&map, false));
        });
        assert!(output.contains("World map"));
        assert!(output.contains("◉ Moscow"));

        let canvas = Rect::new(1, 1, 118, 38);
        let tokyo = cities::find("tokyo").unwrap();
        let (x, y) = marker_cell(&map.viewport, canvas, tokyo.lon, tokyo.lat).unwrap();
        component
            .handle_event(&click(x, y), props(&map, false))
            .assert_first(Action::CitySelect("tokyo".into()));
    }
}
