use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::Component;
use crate::action::Action;
use crate::state::Focus;

#[derive(Default)]
pub struct HelpBar;

pub struct HelpBarProps {
    pub focus: Focus,
}

fn hints(focus: Focus) -> &'static [(&'static str, &'static str)] {
    match focus {
        Focus::Lookup => &[
            ("↑↓", "choose"),
            ("enter", "select"),
            ("esc", "clear"),
            ("tab", "next pane"),
            ("ctrl+c", "quit"),
        ],
        Focus::Panel => &[("r", "refresh"), ("tab", "next pane"), ("q", "quit")],
        Focus::Strip => &[
            ("←→", "move"),
            ("[ ]", "page"),
            ("enter", "select"),
            ("r", "reload"),
            ("tab", "next pane"),
            ("q", "quit"),
        ],
        Focus::Map => &[
            ("arrows", "pan"),
            ("+/-", "zoom"),
            ("0", "reset"),
            ("n/p", "marker"),
            ("enter", "select"),
            ("q", "quit"),
        ],
    }
}

impl Component<Action> for HelpBar {
    type Props<'a> = HelpBarProps;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let spans: Vec<Span> = hints(props.focus)
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(format!(" {}", key), Style::default().fg(Color::Cyan).bold()),
                    Span::styled(format!(" {} ", label), Style::default().fg(Color::DarkGray)),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans).centered()), area);
    }
}
