use crate::calendar::DayCell;
use crate::session::{NoticeKind, NotesStatus, Phase, SessionView};
use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    users: Vec<UserOption<'a>>,
    notice: Option<NoticeBanner<'a>>,
    label: &'a str,
    leading_blanks: u32,
    days: &'a [DayCell],
    disabled: bool,
    notes: &'a str,
    notes_status: &'static str,
}

struct UserOption<'a> {
    name: &'a str,
    selected: bool,
}

struct NoticeBanner<'a> {
    class: &'static str,
    message: &'a str,
}

/// Renders the page for `view`. Every piece of user text goes through the
/// template's HTML escaping.
pub fn render_index(view: &SessionView) -> askama::Result<String> {
    let users = view
        .users
        .iter()
        .map(|name| UserOption {
            name,
            selected: view.selected.as_deref() == Some(name.as_str()),
        })
        .collect();
    let notice = view.notice.as_ref().map(|notice| NoticeBanner {
        class: match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Warning => "warn",
            NoticeKind::Error => "error",
        },
        message: &notice.message,
    });

    IndexTemplate {
        users,
        notice,
        label: &view.calendar.label,
        leading_blanks: view.calendar.leading_blanks,
        days: &view.calendar.days,
        disabled: view.phase != Phase::Ready,
        notes: &view.notes,
        notes_status: notes_status_label(view.notes_status),
    }
    .render()
}

fn notes_status_label(status: NotesStatus) -> &'static str {
    match status {
        NotesStatus::Idle => "",
        NotesStatus::Saving => "Saving...",
        NotesStatus::Saved => "Saved",
        NotesStatus::Failed => "Error",
    }
}
