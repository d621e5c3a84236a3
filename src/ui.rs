use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::{
    passage::{CharacterEntry, Status},
    session::SessionSnapshot,
    stats::Results,
    timer::Phase,
    App,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.session.snapshot();

        match (snapshot.finished, snapshot.results) {
            (true, Some(results)) => render_results(&results, area, buf),
            _ => render_typing(&snapshot, &self.corpus_name, area, buf),
        }
    }
}

fn render_typing(snapshot: &SessionSnapshot, corpus_name: &str, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_width: usize = snapshot
        .entries
        .iter()
        .map(|e| e.target.width().unwrap_or(1))
        .sum();
    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(2), // timer
            Constraint::Length(prompt_occupied_lines),
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let timer_text = if snapshot.phase == Phase::Idle {
        "Type to start...".to_string()
    } else {
        format!("Time Remaining: {}s", snapshot.seconds_remaining)
    };
    Paragraph::new(Span::styled(timer_text, dim_bold_style))
        .alignment(Alignment::Left)
        .render(chunks[1], buf);

    let spans = snapshot
        .entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| entry_span(entry, idx == snapshot.cursor))
        .collect::<Vec<Span>>();

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        format!("(tab) restart / (esc) quit   {corpus_name}"),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

fn entry_span(entry: &CharacterEntry, at_cursor: bool) -> Span<'static> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let (text, style) = match entry.status {
        Status::Pending => (
            entry.target.to_string(),
            Style::default().fg(Color::DarkGray).patch(bold_style),
        ),
        Status::Correct => (entry.target.to_string(), bold_style.fg(Color::White)),
        Status::Incorrect => (
            match entry.target {
                ' ' => "·".to_owned(),
                c => c.to_string(),
            },
            bold_style.fg(Color::Red),
        ),
    };

    let style = if at_cursor {
        style.add_modifier(Modifier::UNDERLINED).bg(Color::Gray)
    } else {
        style
    };

    Span::styled(text, style)
}

fn render_results(results: &Results, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // wpm
            Constraint::Length(1), // padding
            Constraint::Length(1), // raw + accuracy
            Constraint::Length(1), // padding
            Constraint::Length(3), // explanations
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        format!("WPM: {}", results.wpm),
        bold_style.fg(Color::Magenta),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "Raw WPM: {} | Accuracy: {}%",
            results.raw_wpm,
            results.accuracy_label()
        ),
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    Paragraph::new(vec![
        Line::from("WPM indicates the number of correct words typed per minute."),
        Line::from("Raw WPM indicates the total number of words typed per minute."),
        Line::from("Accuracy is the percentage of characters correctly entered."),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);

    Paragraph::new(Span::styled(
        "(tab) restart / (esc) quit",
        italic_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[7], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        language::Language,
        session::{Event, Session, SessionConfig},
        timer::ManualTickScheduler,
    };
    use rand::{rngs::StdRng, SeedableRng};

    fn create_test_app(duration_secs: u32) -> App {
        let session = Session::with_rng(
            Language::from_word_list("test", "cat").unwrap(),
            SessionConfig {
                number_of_words: 2,
                duration_secs,
            },
            Box::new(ManualTickScheduler::new()),
            Box::new(StdRng::seed_from_u64(5)),
        )
        .unwrap();
        App::new(session, "test")
    }

    fn render(app: &App) -> String {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);

        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_render_idle() {
        let app = create_test_app(30);
        let screen = render(&app);

        assert!(screen.contains("Type to start..."));
        assert!(screen.contains("cat cat"));
        assert!(screen.contains("(tab) restart"));
    }

    #[test]
    fn test_render_running_shows_time_remaining() {
        let mut app = create_test_app(30);
        app.session.apply(Event::Character('c')).unwrap();
        let id = app.session.live_tick().unwrap();
        app.session.apply(Event::Tick(id)).unwrap();

        assert!(render(&app).contains("Time Remaining: 29s"));
    }

    #[test]
    fn test_render_incorrect_space_as_dot() {
        let mut app = create_test_app(30);
        for c in "catx".chars() {
            app.session.apply(Event::Character(c)).unwrap();
        }

        assert!(render(&app).contains("cat·cat"));
    }

    #[test]
    fn test_render_results() {
        let mut app = create_test_app(1);
        for c in "cat ".chars() {
            app.session.apply(Event::Character(c)).unwrap();
        }
        let id = app.session.live_tick().unwrap();
        app.session.apply(Event::Tick(id)).unwrap();

        let screen = render(&app);
        assert!(screen.contains("WPM: 60"));
        assert!(screen.contains("Raw WPM: 60 | Accuracy: 100.00%"));
        assert!(screen.contains("correct words typed per minute"));
    }

    #[test]
    fn test_render_tiny_area_does_not_panic() {
        let app = create_test_app(30);
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
    }
}
