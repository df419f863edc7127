/// Transient popup notifications
use std::time::Duration;

pub const NOTICE_DURATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub ticket: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// Holds at most one notice. Showing a new one supersedes the old notice and
/// its pending dismissal: a dismissal only clears the notice it was issued for.
#[derive(Debug, Default)]
pub struct Notifier {
    current: Option<Notice>,
    next_ticket: u64,
}

impl Notifier {
    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    /// Show `message`, returning the ticket its auto-dismiss must present.
    pub fn show(&mut self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.current = Some(Notice {
            ticket,
            kind,
            message: message.into(),
        });
        ticket
    }

    pub fn dismiss(&mut self, ticket: u64) -> bool {
        match &self.current {
            Some(notice) if notice.ticket == ticket => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}
