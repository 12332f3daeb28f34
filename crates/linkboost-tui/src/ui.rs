use linkboost_core::{ChatRole, Profile, Provider, Section, Status, View};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, NavItem};

/// Wrap text to fit within a given width, returning multiple lines
/// Uses word boundaries for wrapping (doesn't break mid-word)
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn section_heading(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_uppercase(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn dim(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}

/// Single-line input with horizontal scrolling; returns the cursor column
/// offset inside the box.
fn render_input(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    text: &str,
    cursor: usize,
    placeholder: &str,
) -> u16 {
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width > 0 && cursor >= inner_width {
        cursor - inner_width + 1
    } else {
        0
    };

    let content = if text.is_empty() {
        Line::from(dim(placeholder.to_string()))
    } else {
        let visible: String = text.chars().skip(scroll_offset).take(inner_width).collect();
        Line::from(Span::styled(visible, Style::default().fg(Color::Cyan)))
    };

    frame.render_widget(Paragraph::new(content).block(block), area);
    (cursor - scroll_offset) as u16
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let notice_height = u16::from(app.state().notice.is_some());

    let [header_area, body_area, notice_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(notice_height),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.view() {
        View::Onboarding => render_onboarding(app, frame, body_area),
        View::ProfileView => render_profile(app, frame, body_area),
        View::AiOptimizer => render_optimizer(app, frame, body_area),
        View::PostGenerator => render_post_generator(app, frame, body_area),
        View::Settings => render_settings(app, frame, body_area),
    }

    if notice_height > 0 {
        render_notice(app, frame, notice_area);
    }
    render_footer(app, frame, footer_area);

    // Popups, in order of priority
    if app.show_provider_picker {
        render_provider_picker(app, frame, area);
    } else if app.show_model_picker {
        render_model_picker(app, frame, area);
    } else if app.state().nav_open {
        render_navigation(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.state();
    let mut spans = vec![
        Span::styled(" LinkBoost ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!(" {} ", app.view().label()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(" {}: {} ", app.provider.as_str(), app.model),
            Style::default().fg(Color::Black),
        ),
    ];

    if state.is_busy() {
        spans.push(Span::styled(
            format!(" {}{} ", state.message.trim_end_matches('.'), app.ellipsis()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ));
    }

    spans.push(Span::styled(
        format!(" v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Black),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect) {
    let Some(notice) = app.state().notice.as_deref() else {
        return;
    };
    let line = Line::from(vec![
        Span::styled(" ! ", Style::default().bg(Color::Red).fg(Color::White).bold()),
        Span::styled(format!(" {} ", notice), Style::default().fg(Color::Red)),
        dim("(x to dismiss)"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    if app.show_provider_picker || app.show_model_picker || app.state().nav_open {
        hints.extend(hint("j/k", "move"));
        hints.extend(hint("Enter", "select"));
        hints.extend(hint("Esc", "close"));
    } else {
        match (app.view(), app.input_mode) {
            (View::Onboarding, InputMode::Editing) => {
                hints.extend(hint("Enter", "analyze"));
                hints.extend(hint("Tab", "menu"));
                hints.extend(hint("Esc", "normal"));
            }
            (View::AiOptimizer, InputMode::Editing) => {
                hints.extend(hint("Enter", "regenerate"));
                hints.extend(hint("Esc", "cancel"));
            }
            (View::PostGenerator, InputMode::Editing) => {
                hints.extend(hint("Enter", "send"));
                hints.extend(hint("Esc", "normal"));
            }
            (_, InputMode::Editing) => {}
            (View::Onboarding, InputMode::Normal) => {
                hints.extend(hint("i", "edit url"));
            }
            (View::ProfileView, InputMode::Normal) => {
                hints.extend(hint("e", "enhance"));
                hints.extend(hint("j/k", "scroll"));
                hints.extend(hint("o", "new profile"));
            }
            (View::AiOptimizer, InputMode::Normal) => {
                hints.extend(hint("j/k", "section"));
                hints.extend(hint("r", "regenerate"));
                hints.extend(hint("f", "feedback"));
            }
            (View::PostGenerator, InputMode::Normal) => {
                hints.extend(hint("i", "write"));
                hints.extend(hint("j/k", "scroll"));
            }
            (View::Settings, InputMode::Normal) => {
                hints.extend(hint("p", "provider"));
                hints.extend(hint("m", "model"));
            }
        }
        if app.input_mode == InputMode::Normal {
            hints.extend(hint("Tab", "menu"));
            hints.extend(hint("q", "quit"));
        }
    }

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_onboarding(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.state();
    let popup = centered_rect(72, 13, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Get Started ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [intro_area, input_area, status_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(inner);

    let intro = Text::from(vec![
        Line::from(Span::styled(
            "Turn your LinkedIn profile into a landing page",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(dim("Paste a public profile URL (linkedin.com/in/...) and press Enter.")),
    ]);
    frame.render_widget(Paragraph::new(intro).wrap(Wrap { trim: true }), intro_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Profile URL ");
    let cursor_x = render_input(
        frame,
        input_area,
        input_block,
        &app.url_input,
        app.url_cursor,
        "https://www.linkedin.com/in/your-name",
    );
    if editing && !state.nav_open {
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }

    let mut status_lines = Vec::new();
    match state.status {
        Status::Scraping | Status::Analyzing => status_lines.push(Line::from(Span::styled(
            format!("{}{}", state.message.trim_end_matches('.'), app.ellipsis()),
            Style::default().fg(Color::Yellow),
        ))),
        Status::Error => status_lines.push(Line::from(Span::styled(
            state.message.clone(),
            Style::default().fg(Color::Red),
        ))),
        Status::Idle | Status::Success => {}
    }
    if state.data.is_some() {
        status_lines.push(Line::from(dim(format!(
            "{}'s profile is still loaded. Tab to open the menu.",
            state.display_name()
        ))));
    }
    frame.render_widget(
        Paragraph::new(status_lines).wrap(Wrap { trim: true }),
        status_area,
    );
}

fn profile_sidebar(profile: &Profile) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        profile.full_name.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))];
    if !profile.headline.is_empty() {
        lines.push(Line::from(profile.headline.clone()));
    }
    if !profile.location.is_empty() {
        lines.push(Line::from(dim(profile.location.clone())));
    }
    if !profile.current_position.is_empty() {
        lines.push(Line::from(dim(profile.current_position.clone())));
    }
    lines.push(Line::from(vec![
        Span::styled(profile.connections_count.clone(), Style::default().bold()),
        dim(" connections  "),
        Span::styled(
            if profile.follower_count.is_empty() {
                "0".to_string()
            } else {
                profile.follower_count.clone()
            },
            Style::default().bold(),
        ),
        dim(" followers"),
    ]));

    let badges: Vec<Span> = [
        (profile.open_to_work, "Open to work", Color::Green),
        (profile.hiring, "Hiring", Color::Magenta),
        (profile.premium, "Premium", Color::Yellow),
        (profile.verified, "Verified", Color::Cyan),
        (profile.influencer, "Top voice", Color::Blue),
    ]
    .into_iter()
    .filter(|(on, _, _)| *on)
    .flat_map(|(_, label, color)| {
        [
            Span::styled(format!(" {} ", label), Style::default().bg(color).fg(Color::Black)),
            Span::raw(" "),
        ]
    })
    .collect();
    if !badges.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(badges));
    }

    lines.push(Line::default());
    lines.push(Line::from(dim(format!("Photo: {}", profile.profile_image))));
    if !profile.linkedin_url.is_empty() {
        lines.push(Line::from(dim(profile.linkedin_url.clone())));
    }

    for (title, items) in [
        ("Skills", &profile.skills),
        ("Languages", &profile.languages),
        ("Certifications", &profile.certifications),
    ] {
        if items.is_empty() {
            continue;
        }
        lines.push(Line::default());
        lines.push(section_heading(title));
        for item in items {
            lines.push(Line::from(format!("• {}", item)));
        }
    }
    lines
}

fn profile_body(profile: &Profile) -> Vec<Line<'static>> {
    let mut lines = vec![section_heading("About")];
    if profile.about.is_empty() {
        lines.push(Line::from(dim("No summary on this profile.")));
    } else {
        lines.extend(profile.about.lines().map(|l| Line::from(l.to_string())));
    }

    lines.push(Line::default());
    lines.push(section_heading("Experience"));
    if profile.experience.is_empty() {
        lines.push(Line::from(dim("No experience listed.")));
    }
    for job in &profile.experience {
        let mut title = vec![Span::styled(job.title.clone(), Style::default().bold())];
        if !job.company.is_empty() {
            title.push(Span::raw(format!(" · {}", job.company)));
        }
        lines.push(Line::from(title));

        let mut dates = String::new();
        if !job.start_date.is_empty() {
            dates = format!("{} - {}", job.start_date, job.end_date);
        }
        if !job.duration.is_empty() {
            dates = if dates.is_empty() {
                job.duration.clone()
            } else {
                format!("{} ({})", dates, job.duration)
            };
        }
        if !job.location.is_empty() {
            dates = if dates.is_empty() {
                job.location.clone()
            } else {
                format!("{} · {}", dates, job.location)
            };
        }
        if !dates.is_empty() {
            lines.push(Line::from(dim(dates)));
        }
        lines.extend(
            job.description
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| Line::from(format!("  {}", l.trim()))),
        );
        lines.push(Line::default());
    }

    if !profile.education.is_empty() {
        lines.push(section_heading("Education"));
        for school in &profile.education {
            lines.push(Line::from(Span::styled(school.school.clone(), Style::default().bold())));
            let degree = [school.degree.as_str(), school.field_of_study.as_str()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            if !degree.is_empty() {
                lines.push(Line::from(degree));
            }
            if !school.start_date.is_empty() || !school.end_date.is_empty() {
                lines.push(Line::from(dim(format!(
                    "{} - {}",
                    school.start_date, school.end_date
                ))));
            }
            lines.push(Line::default());
        }
    }

    if !profile.featured.is_empty() {
        lines.push(section_heading("Featured"));
        for item in &profile.featured {
            lines.push(Line::from(vec![
                Span::raw(format!("• {} ", item.title)),
                dim(item.url.clone()),
            ]));
        }
    }
    lines
}

fn render_profile(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(profile) = app.state().data.clone() else {
        let empty = Paragraph::new(Text::from(vec![
            Line::from("No profile loaded yet."),
            Line::from(dim("Open the menu (Tab) and pick \"Analyze Another Profile\".")),
        ]))
        .block(Block::default().borders(Borders::ALL).title(" Profile Overview "));
        frame.render_widget(empty, area);
        return;
    };

    let [side_area, main_area] =
        Layout::horizontal([Constraint::Length(38), Constraint::Min(0)]).areas(area);

    let sidebar = Paragraph::new(profile_sidebar(&profile))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(sidebar, side_area);

    let body = profile_body(&profile);
    let max_scroll = (body.len() as u16).saturating_sub(1);
    app.profile_scroll = app.profile_scroll.min(max_scroll);

    let state = app.state();
    let title = if state.status == Status::Analyzing {
        format!(" Profile · {}{} ", state.message.trim_end_matches('.'), app.ellipsis())
    } else if state.status == Status::Error {
        format!(" Profile · {} ", state.message)
    } else {
        " Profile · press e to enhance with AI ".to_string()
    };
    let title_color = match state.status {
        Status::Error => Color::Red,
        Status::Analyzing => Color::Yellow,
        _ => Color::Cyan,
    };

    let main = Paragraph::new(body)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(title, Style::default().fg(title_color))),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.profile_scroll, 0));
    frame.render_widget(main, main_area);
}

/// The scraped text a section would replace.
fn current_text(profile: Option<&Profile>, section: Section) -> String {
    let Some(profile) = profile else {
        return String::new();
    };
    match section {
        Section::Headline => profile.headline.clone(),
        Section::About => profile.about.clone(),
        Section::ExperienceBullets => profile
            .experience
            .iter()
            .map(|job| {
                if job.description.is_empty() {
                    format!("• {}", job.title)
                } else {
                    format!("• {}: {}", job.title, job.description)
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_optimizer(app: &mut App, frame: &mut Frame, area: Rect) {
    let state = app.state();
    let Some(optimized) = state.optimized.clone() else {
        let message = match state.status {
            Status::Analyzing => Line::from(Span::styled(
                format!("{}{}", state.message.trim_end_matches('.'), app.ellipsis()),
                Style::default().fg(Color::Yellow),
            )),
            Status::Error => Line::from(Span::styled(
                format!("{} (press e to retry)", state.message),
                Style::default().fg(Color::Red),
            )),
            _ if state.data.is_some() => Line::from("Press e to generate optimized content."),
            _ => Line::from(dim("Load a profile first, then enhance it from the profile view.")),
        };
        let empty = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title(" AI Enhancer "))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    };

    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Length(30), Constraint::Min(0)]).areas(area);

    let items: Vec<ListItem> = Section::all()
        .iter()
        .map(|section| {
            let mut spans = vec![Span::raw(format!(" {} ", section.title()))];
            if state.is_regenerating(*section) {
                spans.push(Span::styled(
                    format!("rewriting{}", app.ellipsis()),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Sections "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let section = app.selected_section();
    let editing = app.input_mode == InputMode::Editing;
    let before = current_text(state.data.as_ref(), section);
    let after = match section {
        Section::Headline => optimized.headline.clone(),
        Section::About => optimized.about.clone(),
        Section::ExperienceBullets => optimized
            .experience_bullets
            .iter()
            .map(|b| format!("• {}", b))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    let regenerating = state.is_regenerating(section);
    let ellipsis = app.ellipsis();

    frame.render_stateful_widget(list, list_area, &mut app.section_state);

    let [before_area, after_area, feedback_area] = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(detail_area);

    let before_text = if before.is_empty() {
        Text::from(dim("(empty on the scraped profile)"))
    } else {
        Text::from(before)
    };
    frame.render_widget(
        Paragraph::new(before_text)
            .style(Style::default().fg(Color::Gray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(" Current "),
            )
            .wrap(Wrap { trim: true }),
        before_area,
    );

    let after_title = if regenerating {
        format!(" Suggested {} · rewriting{} ", section.title(), ellipsis)
    } else {
        format!(" Suggested {} ", section.title())
    };
    let after_lines: Vec<Line> = after.lines().map(parse_markdown_line).collect();
    frame.render_widget(
        Paragraph::new(after_lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green))
                    .title(after_title),
            )
            .wrap(Wrap { trim: true }),
        after_area,
    );

    let feedback_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Feedback (f to type, r for default) ");
    let cursor_x = render_input(
        frame,
        feedback_area,
        feedback_block,
        &app.feedback_input,
        app.feedback_cursor,
        section.default_feedback(),
    );
    if editing {
        frame.set_cursor_position((feedback_area.x + cursor_x + 1, feedback_area.y + 1));
    }
}

fn render_post_generator(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    let state = app.state();
    let wrap_width = chat_area.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut total_rows = 0usize;
    let mut push = |line: Line<'static>, plain: &str| {
        total_rows += wrap_text_to_width(plain, wrap_width).len();
        lines.push(line);
    };

    if state.chat_history.is_empty() && state.chat_pending == 0 {
        push(
            Line::from(dim("Describe a post idea, e.g. \"announce my new role\".")),
            "",
        );
    }

    for msg in &state.chat_history {
        match msg.role {
            ChatRole::User => {
                push(
                    Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )),
                    "You:",
                );
                for line in msg.content.lines() {
                    push(Line::from(line.to_string()), line);
                }
            }
            ChatRole::Assistant => {
                push(
                    Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )),
                    "AI:",
                );
                for line in msg.content.lines() {
                    push(parse_markdown_line(line), line);
                }
            }
        }
        push(Line::default(), "");
    }

    if state.chat_pending > 0 {
        push(
            Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            "AI:",
        );
        push(
            Line::from(Span::styled(
                format!("Writing{}", app.ellipsis()),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
            "Writing...",
        );
    }

    let chat_input = state.chat_input.clone();
    let visible_rows = chat_area.height.saturating_sub(2) as usize;
    let max_scroll = total_rows.saturating_sub(visible_rows) as u16;
    if app.chat_follow || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.chat_follow = true;
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" Post Generator · {}: {} ", app.provider.as_str(), app.model)),
        )
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Message (i to type, Enter to send) ");
    let cursor_x = render_input(
        frame,
        input_area,
        input_block,
        &chat_input,
        app.chat_cursor,
        "",
    );
    if editing {
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_settings(app: &App, frame: &mut Frame, area: Rect) {
    let label = |text: &'static str| Span::styled(format!("{:<16}", text), Style::default().fg(Color::Cyan));
    let credential = |found: Option<&'static str>, env: Option<&'static str>| match (found, env) {
        (Some(source), _) => Span::styled(source, Style::default().fg(Color::Green)),
        (None, Some(var)) => Span::styled(format!("missing (set {})", var), Style::default().fg(Color::Red)),
        (None, None) => Span::styled("missing", Style::default().fg(Color::Red)),
    };

    let provider = app.provider;
    let key_source = app.config.api_key(provider).map(|(_, source)| source.label());
    let apify_source = app.config.apify_token().map(|(_, source)| source.label());

    let mut lines = vec![
        Line::from(vec![label("Provider"), Span::raw(provider.display_name())]),
        Line::from(vec![label("Model"), Span::raw(app.model.clone())]),
        Line::from(vec![label("API key"), credential(key_source, provider.api_key_env())]),
    ];
    if provider == Provider::Ollama {
        lines.push(Line::from(vec![
            label("Ollama URL"),
            Span::raw(app.config.ollama_url().to_string()),
        ]));
    }
    lines.extend([
        Line::default(),
        Line::from(vec![label("Scraper actor"), Span::raw(app.config.scraper_actor().to_string())]),
        Line::from(vec![label("Scraper URL"), Span::raw(app.config.scraper_base_url().to_string())]),
        Line::from(vec![label("Apify token"), credential(apify_source, Some("APIFY_TOKEN"))]),
        Line::default(),
        Line::from(vec![label("Config file"), dim(app.config_path.display().to_string())]),
    ]);

    if let Some(error) = &app.settings_error {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }

    let settings = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Settings (p provider, m model) "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(settings, area);
}

fn render_navigation(app: &mut App, frame: &mut Frame, area: Rect) {
    let items = NavItem::all();
    let popup_area = centered_rect(40, items.len() as u16 + 4, area);
    frame.render_widget(Clear, popup_area);

    let current = NavItem::View(app.view());
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let style = if *item == current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", item.label())).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", app.state().display_name()))
        .title_bottom(Line::from(dim(" Esc to close ")).centered());

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.nav_state);
}

fn render_provider_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let providers = Provider::all();
    let popup_area = centered_rect(50, providers.len() as u16 + 2, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Select Provider ");

    let items: Vec<ListItem> = providers
        .iter()
        .map(|provider| {
            let key_source = app.config.api_key(*provider).map(|(_, source)| source);
            let is_current = *provider == app.provider;

            let status = match key_source {
                Some(source) => format!("({})", source.label()),
                None => "(needs key)".to_string(),
            };
            let prefix = if is_current { "* " } else { "  " };

            let style = if is_current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if key_source.is_some() {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(format!("{}{} {}", prefix, provider.display_name(), status)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.provider_picker_state);
}

fn render_model_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(44, app.available_models.len() as u16 + 2, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Select Model (Enter to select, Esc to cancel) ");

    let items: Vec<ListItem> = app
        .available_models
        .iter()
        .map(|model| {
            let style = if *model == app.model {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", model)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.model_picker_state);
}
