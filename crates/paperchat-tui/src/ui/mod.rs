use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub mod typing;

use crate::app::{App, Route};
use crate::views::auth::{LoginField, SignupField};
use crate::views::plans::PlanFocus;
use crate::views::workspace::UploadField;
use paperchat_client::{GuardDecision, SessionSource};
use paperchat_types::Session;

pub fn draw<S: SessionSource>(f: &mut Frame, app: &App<S>) {
    match app.guard_decision() {
        // No flash of protected content, no flash of redirect.
        GuardDecision::Loading => {}
        GuardDecision::Unauthenticated | GuardDecision::Forbidden => {}
        GuardDecision::Authorized => match app.route {
            Route::Home => draw_home(f),
            Route::Login => draw_login(f, app),
            Route::Signup => draw_signup(f, app),
            Route::Forbidden => draw_forbidden(f),
            Route::Workspace | Route::Upgrade | Route::Chat | Route::PlanAdmin => {
                draw_shell(f, app)
            }
        },
    }

    if let Some(flash) = &app.flash {
        draw_flash(f, flash);
    }
}

fn draw_home(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let title = Paragraph::new("Paperchat")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let body = Paragraph::new(
        "Chat with your PDFs.\n\nUpload a document, ask questions, keep the answers.\n\n\
         l  Log in\ns  Sign up\nq  Quit",
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::NONE));
    f.render_widget(body, chunks[1]);
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool, masked: bool) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    let shown: String = if masked {
        value.chars().map(|_| '*').collect()
    } else {
        value.to_string()
    };
    Line::from(vec![
        Span::styled(
            format!("{}{:<10}", marker, label),
            if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            },
        ),
        Span::raw(shown),
    ])
}

fn draw_login<S: SessionSource>(f: &mut Frame, app: &App<S>) {
    let form = &app.login;
    let popup = centered_fixed_rect(52, 11, f.area());
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Log In ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines = vec![
        field_line(
            "Email",
            &form.email,
            form.focus() == LoginField::Email,
            false,
        ),
        field_line(
            "Password",
            &form.password,
            form.focus() == LoginField::Password,
            !form.show_password,
        ),
        Line::from(""),
    ];
    if form.submitting {
        lines.push(Line::from(Span::styled(
            format!("{} Signing in...", spinner_frame(app.tick_count)),
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(notice) = &form.notice {
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter sign in | Tab next field | Ctrl+P show password | Esc back",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn draw_signup<S: SessionSource>(f: &mut Frame, app: &App<S>) {
    let form = &app.signup;
    let popup = centered_fixed_rect(56, 13, f.area());
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Sign Up ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines = vec![
        field_line(
            "Full name",
            &form.fullname,
            form.focus() == SignupField::Fullname,
            false,
        ),
        field_line(
            "Email",
            &form.email,
            form.focus() == SignupField::Email,
            false,
        ),
        field_line(
            "Mobile",
            &form.mobile,
            form.focus() == SignupField::Mobile,
            false,
        ),
        field_line(
            "Password",
            &form.password,
            form.focus() == SignupField::Password,
            !form.show_password,
        ),
        Line::from(""),
    ];
    if form.submitting {
        lines.push(Line::from(Span::styled(
            format!("{} Creating account...", spinner_frame(app.tick_count)),
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(notice) = &form.notice {
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Enter create account | Tab next field | Esc back",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn draw_forbidden(f: &mut Frame) {
    let popup = centered_fixed_rect(48, 7, f.area());
    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Access Denied ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);
    let body = Paragraph::new("You are not authorized to view this page.\n\nEnter back to workspace")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(body, inner);
}

fn draw_shell<S: SessionSource>(f: &mut Frame, app: &App<S>) {
    let session = app.current_session();

    let (sidebar_area, content_area) = if app.sidebar_visible {
        let areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(f.area());
        (Some(areas[0]), areas[1])
    } else {
        (None, f.area())
    };

    if let Some(area) = sidebar_area {
        draw_sidebar(f, app, session.as_ref(), area);
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(content_area);

    match app.route {
        Route::Workspace => draw_workspace(f, app, rows[0]),
        Route::Chat => draw_chat(f, app, rows[0]),
        Route::Upgrade => draw_upgrade(f, app, rows[0]),
        Route::PlanAdmin => draw_plan_admin(f, app, rows[0]),
        _ => {}
    }

    draw_status_bar(f, app, rows[1]);

    if app.upload.open && app.route == Route::Workspace {
        draw_upload_modal(f, app);
    }

    if let Some(buffer) = &app.image_prompt {
        draw_image_prompt(f, buffer);
    }
}

fn draw_image_prompt(f: &mut Frame, buffer: &str) {
    let popup = centered_fixed_rect(60, 6, f.area());
    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Profile Image ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);
    let lines = vec![
        Line::from(format!("File: {}", buffer)),
        Line::from(""),
        Line::from(Span::styled(
            "Enter upload | Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn draw_sidebar<S: SessionSource>(
    f: &mut Frame,
    app: &App<S>,
    session: Option<&Session>,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(inner);

    let (name, email) = session
        .map(|s| (s.fullname.as_str(), s.email.as_str()))
        .unwrap_or(("User Name", "Email Address"));
    let profile = Paragraph::new(format!("\n{}\n{}", name, email))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(profile, rows[0]);

    let is_admin = session.map(|s| s.is_admin()).unwrap_or(false);
    let nav_item = |label: &str, route: Route| -> ListItem<'static> {
        let style = if app.route == route {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        ListItem::new(label.to_string()).style(style)
    };
    let mut items = vec![
        nav_item("  F2  Workspace", Route::Workspace),
        nav_item("  F3  Upgrade", Route::Upgrade),
    ];
    if is_admin {
        items.push(nav_item("  F4  Plans (admin)", Route::PlanAdmin));
    }
    items.push(ListItem::new("  ^U  Upload PDF").style(Style::default().fg(Color::Gray)));
    items.push(ListItem::new("  ^I  Profile image").style(Style::default().fg(Color::Gray)));
    items.push(ListItem::new("  ^L  Log out").style(Style::default().fg(Color::Gray)));
    f.render_widget(List::new(items), rows[1]);

    match session {
        Some(s) if s.is_admin() => {
            let label = Paragraph::new("Unlimited Credits (Admin)")
                .style(Style::default().fg(Color::Green));
            f.render_widget(label, rows[2]);
        }
        Some(s) => {
            let ratio = if s.credit > 0 {
                (s.used_credits as f64 / s.credit as f64).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(Color::Cyan))
                .ratio(ratio)
                .label(format!("Used {} of {} credits", s.used_credits, s.credit));
            f.render_widget(gauge, rows[2]);
        }
        None => {}
    }
}

fn draw_workspace<S: SessionSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let view = &app.workspace;
    let title = " Workspace - your PDFs ";

    if view.loading {
        let body = Paragraph::new("Loading files...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(body, area);
        return;
    }

    if view.files.is_empty() {
        let mut text = "No PDFs uploaded yet. Press 'u' to upload one.".to_string();
        if let Some(notice) = &view.notice {
            text = format!("{}\n\n{}", notice, text);
        }
        let body = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(body, area);
        return;
    }

    let items: Vec<ListItem> = view
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let when = file
                .created_at
                .map(|t| t.format("%d %b %Y, %H:%M").to_string())
                .unwrap_or_else(|| "Unknown date".to_string());
            let pending = view.deleting.as_deref() == Some(file.id.as_str());
            let label = if pending {
                format!("{}  ({})  [Deleting...]", file.title, when)
            } else {
                format!("{}  ({})", file.title, when)
            };
            let style = if pending {
                Style::default().fg(Color::DarkGray)
            } else if i == view.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(label).style(style)
        })
        .collect();

    let block_title = match &view.notice {
        Some(notice) => format!("{} | {} (Esc to dismiss)", title, notice),
        None => format!("{} | Enter chat, d delete, u upload", title),
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(block_title));
    f.render_widget(list, area);
}

fn draw_chat<S: SessionSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let view = &app.chat;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let title = view
        .file
        .as_ref()
        .map(|file| format!(" {} ", file.title))
        .unwrap_or_else(|| " Chat ".to_string());

    if view.entries.is_empty() {
        let body = Paragraph::new("Start by asking a question about the PDF below.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(body, chunks[0]);
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for (i, entry) in view.entries.iter().enumerate() {
            let marker = if i == view.selected { ">" } else { " " };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} Q: ", marker),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(entry.question.clone()),
            ]));
            let answer: &str = if view.last_answer_id.as_deref() == Some(entry.id.as_str()) {
                view.typing.visible(&entry.answer)
            } else {
                &entry.answer
            };
            for answer_line in answer.lines() {
                lines.push(Line::from(format!("    {}", answer_line)));
            }
            lines.push(Line::from(Span::styled(
                format!("    Source: {}", entry.source()),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(""));
        }
        let transcript = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(transcript, chunks[0]);
    }

    let input_label = if view.asking {
        format!("{} Processing...", spinner_frame(app.tick_count))
    } else if view.question.is_empty() {
        "Type your question...".to_string()
    } else {
        view.question.clone()
    };
    let input_style = if view.asking || view.question.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let input_title = match &view.notice {
        Some(notice) => format!(" {} ", notice),
        None => " Enter ask | ^D delete entry | ^E export | Esc back ".to_string(),
    };
    let input = Paragraph::new(input_label).style(input_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(input_title)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(input, chunks[1]);
}

fn draw_upgrade<S: SessionSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let view = &app.upgrade;
    let title = " Plans - upgrade for more credits ";

    let mut lines: Vec<Line> = Vec::new();
    if view.loading {
        lines.push(Line::from("Loading plans..."));
    } else if view.plans.is_empty() {
        lines.push(Line::from("No plans available."));
    }
    for (i, plan) in view.plans.iter().enumerate() {
        let marker = if i == view.selected { ">" } else { " " };
        let busy = view.busy_plan.as_deref() == Some(plan.id.as_str());
        let tail = if plan.is_free() {
            "Current Plan".to_string()
        } else if busy {
            format!("{} Processing...", spinner_frame(app.tick_count))
        } else {
            format!("{} credits", plan.credits)
        };
        let note = if plan.note.is_empty() {
            "Unlimited notes"
        } else {
            plan.note.as_str()
        };
        let style = if i == view.selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{} {:<12} {:>8}  {:<18} {}",
                marker,
                plan.name,
                format!("{} Rs", plan.price),
                tail,
                note
            ),
            style,
        )));
    }
    lines.push(Line::from(""));

    if let Some(pending) = &view.pending_order {
        lines.push(Line::from(Span::styled(
            format!(
                "Order {} open for {} paise. Pay it with your gateway app, then",
                pending.order.id, pending.order.amount
            ),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(Span::styled(
            "enter <payment_id> <signature> and press Enter to verify. Esc cancels.",
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(format!("Proof: {}", view.proof_input)));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter purchase selected plan | Esc dismiss notices",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if let Some(message) = &view.message {
        lines.push(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Green),
        )));
    }
    if let Some(notice) = &view.notice {
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Red),
        )));
    }

    let body = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(body, area);
}

fn draw_plan_admin<S: SessionSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let view = &app.plans;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);

    let form_title = if view.editing.is_some() {
        " Edit Plan "
    } else {
        " Create Plan "
    };
    let mut form_lines = vec![
        field_line("Name", &view.name, view.focus() == PlanFocus::Name, false),
        field_line("Price", &view.price, view.focus() == PlanFocus::Price, false),
        field_line(
            "Credits",
            &view.credits,
            view.focus() == PlanFocus::Credits,
            false,
        ),
        field_line("Note", &view.note, view.focus() == PlanFocus::Note, false),
    ];
    match &view.notice {
        Some(notice) => form_lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Red),
        ))),
        None => form_lines.push(Line::from(Span::styled(
            "Enter save | Tab to table | Esc cancel edit",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    let form = Paragraph::new(Text::from(form_lines))
        .block(Block::default().borders(Borders::ALL).title(form_title));
    f.render_widget(form, chunks[0]);

    let table_focused = view.focus() == PlanFocus::Table;
    let items: Vec<ListItem> = view
        .plans
        .iter()
        .enumerate()
        .map(|(i, plan)| {
            let pending = view.deleting.as_deref() == Some(plan.id.as_str());
            let marker = if table_focused && i == view.selected {
                ">"
            } else {
                " "
            };
            let label = format!(
                "{} {:<12} {:>8}  {:>7} credits  {}{}",
                marker,
                plan.name,
                format!("{} Rs", plan.price),
                plan.credits,
                if plan.note.is_empty() { "-" } else { plan.note.as_str() },
                if pending { "  [Deleting...]" } else { "" },
            );
            let style = if pending {
                Style::default().fg(Color::DarkGray)
            } else if table_focused && i == view.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(label).style(style)
        })
        .collect();
    let list_title = if items.is_empty() {
        " All Plans - none yet ".to_string()
    } else {
        " All Plans | e edit, d delete ".to_string()
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(list_title));
    f.render_widget(list, chunks[1]);
}

fn draw_upload_modal<S: SessionSource>(f: &mut Frame, app: &App<S>) {
    let form = &app.upload;
    let popup = centered_fixed_rect(60, 10, f.area());
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Upload PDF (max 2 MB) ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines = vec![
        field_line("Title", &form.title, form.focus() == UploadField::Title, false),
        field_line("File", &form.path, form.focus() == UploadField::Path, false),
        Line::from(""),
    ];
    if form.uploading {
        lines.push(Line::from(Span::styled(
            format!("{} Uploading...", spinner_frame(app.tick_count)),
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(notice) = &form.notice {
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Enter upload | Tab switch field | Esc close",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn draw_status_bar<S: SessionSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let session_label = match app.current_session() {
        Some(s) => format!("{} ({:?})", s.email, s.role),
        None => "signed out".to_string(),
    };
    let status_text = format!(
        " Paperchat | {:?} | {} | ^B sidebar | ^C quit ",
        app.route, session_label
    );
    let status = Paragraph::new(status_text)
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Left);
    f.render_widget(status, area);
}

fn draw_flash(f: &mut Frame, flash: &str) {
    let area = f.area();
    if area.height < 2 {
        return;
    }
    let row = Rect::new(area.x, area.y, area.width, 1);
    let widget = Paragraph::new(format!(" {} (Esc to dismiss) ", flash))
        .style(Style::default().fg(Color::Black).bg(Color::Yellow));
    f.render_widget(Clear, row);
    f.render_widget(widget, row);
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width.max(1));
    let h = height.min(area.height.max(1));
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

fn spinner_frame(tick: usize) -> &'static str {
    const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
    FRAMES[tick % FRAMES.len()]
}
