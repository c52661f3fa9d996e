use derive_more::Display;

use crate::calendar::{event, resolve_month, set_date, step_days, Calendar, CalendarStore};
use crate::cmds::{Cmd, MonthQuery};
use crate::provider::StateProvider;
use crate::render::{escape, Renderer};

pub const DEFAULT_DENIAL_NOTICE: &str = "Only the GM can use that calendar command.";

/// Who gets to see a message. Displays as the chat prefix.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Audience {
    #[display(fmt = "/w \"{}\"", _0)]
    Whisper(String),
    #[display(fmt = "/w gm")]
    Privileged,
    #[display(fmt = "/direct")]
    Broadcast,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "{} {}", audience, body)]
pub struct Message {
    pub audience: Audience,
    pub body: String,
}

impl Message {
    pub fn whisper(to: &str, body: String) -> Self {
        Message {
            audience: Audience::Whisper(clean_who(to)),
            body,
        }
    }

    pub fn privileged(body: String) -> Self {
        Message {
            audience: Audience::Privileged,
            body,
        }
    }

    pub fn broadcast(body: String) -> Self {
        Message {
            audience: Audience::Broadcast,
            body,
        }
    }
}

/// Strips the ` (GM)` marker and double quotes from a speaker name.
pub fn clean_who(who: &str) -> String {
    let who = who.trim();
    let who = match who.len().checked_sub(5) {
        Some(at) if who.is_char_boundary(at) && who[at..].eq_ignore_ascii_case(" (gm)") => {
            &who[..at]
        }
        _ => who,
    };
    who.replace('"', "").trim().to_owned()
}

pub trait Authority {
    fn is_privileged(&self, caller: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Authority for F {
    fn is_privileged(&self, caller: &str) -> bool {
        self(caller)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reply {
    pub messages: Vec<Message>,
    /// Whether the calendar was modified and needs flushing.
    pub changed: bool,
}

impl Reply {
    fn unchanged(message: Message) -> Self {
        Reply {
            messages: vec![message],
            changed: false,
        }
    }

    fn changed(messages: Vec<Message>) -> Self {
        Reply {
            messages,
            changed: true,
        }
    }
}

/// Maps commands onto the calendar and decides who sees the result.
pub struct CommandHandler {
    renderer: Renderer,
    denial_notice: String,
}

impl CommandHandler {
    pub fn new(renderer: Renderer, denial_notice: &str) -> Self {
        CommandHandler {
            renderer,
            denial_notice: denial_notice.to_owned(),
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    fn summary(&self, cal: &Calendar) -> String {
        self.renderer.render_day_summary(cal)
    }

    /// The day summary, or the asked-for month. `Err` holds the whisper for
    /// a month that does not exist.
    fn view(&self, cal: &Calendar, query: Option<MonthQuery>) -> Result<String, String> {
        let query = match query {
            Some(query) => query,
            None => return Ok(self.summary(cal)),
        };

        match resolve_month(cal, &query.month, query.year.as_deref()) {
            Some(shown) => Ok(self.renderer.render_month(cal, shown)),
            None => {
                let names = cal.months().iter().map(|m| escape(&m.name)).collect::<Vec<_>>();
                Err(format!(
                    "No month '{}'. Try next, previous, 1-{} or one of: {}",
                    escape(&query.month),
                    names.len(),
                    names.join(", ")
                ))
            }
        }
    }

    pub fn handle<P: StateProvider>(
        &self,
        store: &mut CalendarStore<P>,
        caller: &str,
        privileged: bool,
        cmd: Cmd,
    ) -> Reply {
        if cmd.requires_privilege() && !privileged {
            log::debug!("Denied '{}' to {}", cmd.name(), caller);
            return Reply::unchanged(Message::whisper(caller, escape(&self.denial_notice)));
        }

        match cmd {
            Cmd::Show(query) => match self.view(store.get(), query) {
                Ok(html) | Err(html) => Reply::unchanged(Message::whisper(caller, html)),
            },
            Cmd::Unknown(verb) => {
                log::debug!("Unknown calendar command '{}' from {}", verb, caller);
                Reply::unchanged(Message::whisper(caller, self.summary(store.get())))
            }
            Cmd::AdvanceDay(n) => {
                step_days(store.get_mut(), i64::from(n));
                Reply::changed(vec![Message::privileged(self.summary(store.get()))])
            }
            Cmd::RetreatDay(n) => {
                step_days(store.get_mut(), -i64::from(n));
                Reply::changed(vec![Message::privileged(self.summary(store.get()))])
            }
            Cmd::SetDate { day, month, year } => {
                set_date(store.get_mut(), &day, &month, year.as_deref());
                Reply::changed(vec![Message::privileged(self.summary(store.get()))])
            }
            Cmd::SendDate(query) => match self.view(store.get(), query) {
                Ok(html) => Reply::unchanged(Message::broadcast(html)),
                Err(notice) => Reply::unchanged(Message::whisper(caller, notice)),
            },
            Cmd::Help => Reply::unchanged(Message::whisper(caller, self.renderer.render_help())),
            Cmd::AddEvent(ev) => {
                let name = ev.name.clone();
                if event::add_event(store.get_mut(), ev) {
                    Reply::changed(vec![Message::privileged(self.summary(store.get()))])
                } else {
                    Reply::unchanged(Message::whisper(
                        caller,
                        format!("Event '{}' already exists on that day.", escape(&name)),
                    ))
                }
            }
            Cmd::RemoveEvent(name) => match event::remove_events(store.get_mut(), &name) {
                0 => Reply::unchanged(Message::whisper(
                    caller,
                    format!("No event named '{}'.", escape(&name)),
                )),
                n => Reply::changed(vec![
                    Message::privileged(format!(
                        "Removed {} event(s) named '{}'.",
                        n,
                        escape(name.trim())
                    )),
                    Message::privileged(self.summary(store.get())),
                ]),
            },
            Cmd::Events => Reply::unchanged(Message::whisper(
                caller,
                self.renderer.render_event_list(store.get()),
            )),
            Cmd::Sets(kind, None) => {
                Reply::unchanged(Message::whisper(caller, self.renderer.render_set_list(kind)))
            }
            Cmd::Sets(kind, Some(name)) => match kind.apply(store.get_mut(), &name) {
                Ok(theme) => {
                    let mut messages = Vec::new();
                    if let Some(theme) = theme {
                        messages.push(Message::whisper(
                            caller,
                            format!("Applied the matching '{}' theme.", theme),
                        ));
                    }
                    messages.push(Message::privileged(self.summary(store.get())));
                    Reply::changed(messages)
                }
                Err(err) => Reply::unchanged(Message::whisper(
                    caller,
                    format!(
                        "{}: {}{}",
                        kind.label(),
                        escape(&err.to_string()),
                        self.renderer.render_set_list(kind)
                    ),
                )),
            },
            Cmd::ResetCalendar => {
                store.reset();
                Reply::changed(vec![Message::privileged(self.summary(store.get()))])
            }
            Cmd::Invalid(err) => {
                Reply::unchanged(Message::whisper(caller, escape(&err.to_string())))
            }
        }
    }
}
