use std::io::Write;

use crate::calendar::CalendarStore;
use crate::cmds;
use crate::control::{Authority, CommandHandler, Message};
use crate::events::{ChatMessage, Dispatcher, Event};
use crate::provider::{Result, StateProvider};

/// Ties the store, the command handler and the privilege check together.
pub struct App<P: StateProvider, A: Authority> {
    store: CalendarStore<P>,
    handler: CommandHandler,
    authority: A,
}

impl<P: StateProvider, A: Authority> App<P, A> {
    pub fn new(store: CalendarStore<P>, handler: CommandHandler, authority: A) -> Self {
        App {
            store,
            handler,
            authority,
        }
    }

    pub fn store(&self) -> &CalendarStore<P> {
        &self.store
    }

    /// Persists the reconciled calendar and announces the current date.
    pub fn startup(&mut self) -> Result<Vec<Message>> {
        self.store.flush()?;

        let label = self.handler.renderer().date_label(self.store.get());
        log::info!(
            "{} Calendar Running, current date: {}",
            env!("CARGO_PKG_VERSION"),
            label
        );

        Ok(vec![Message::privileged(format!(
            "Calendar initialized. Current date: {}",
            crate::render::escape(&label)
        ))])
    }

    /// Handles one chat message. Non-calendar chatter yields nothing.
    pub fn handle(&mut self, msg: &ChatMessage) -> Result<Vec<Message>> {
        let cmd = match cmds::parse_command(&msg.content) {
            Some(cmd) => cmd,
            None => return Ok(Vec::new()),
        };

        let privileged = self.authority.is_privileged(&msg.who);
        log::debug!("'{}' from {} (privileged: {})", cmd.name(), msg.who, privileged);

        let reply = self.handler.handle(&mut self.store, &msg.who, privileged, cmd);
        if reply.changed {
            self.store.flush()?;
        }
        Ok(reply.messages)
    }

    pub fn run<W: Write>(
        &mut self,
        dispatcher: Dispatcher,
        mut out: W,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        for msg in self.startup()? {
            writeln!(out, "{}", msg)?;
        }

        while let Ok(event) = dispatcher.next() {
            match event {
                Event::Input(msg) => {
                    for reply in self.handle(&msg)? {
                        writeln!(out, "{}", reply)?;
                    }
                    out.flush()?;
                }
                Event::Quit => break,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Audience;
    use crate::provider::{MemoryProvider, STATE_KEY};
    use crate::render::Renderer;

    fn app() -> App<MemoryProvider, impl Fn(&str) -> bool> {
        let store = CalendarStore::open(MemoryProvider::new());
        let handler = CommandHandler::new(Renderer::default(), "Nope.");
        App::new(store, handler, |who: &str| who.starts_with("GM"))
    }

    fn chat(who: &str, content: &str) -> ChatMessage {
        ChatMessage {
            who: who.to_owned(),
            content: content.to_owned(),
        }
    }

    #[test]
    fn startup_flushes_and_announces() {
        let mut app = app();
        let messages = app.startup().unwrap();
        assert_eq!(app.store().provider().flush_count(), 1);
        assert!(app.store().provider().get(STATE_KEY).is_some());
        assert_eq!(messages[0].audience, Audience::Privileged);
        assert!(messages[0].body.ends_with("Sul, 1 Zarantyr, 998 YK"));
    }

    #[test]
    fn flushes_only_on_change() {
        let mut app = app();
        assert!(app.handle(&chat("Bob", "hello")).unwrap().is_empty());
        app.handle(&chat("Bob", "!cal")).unwrap();
        app.handle(&chat("Bob", "!cal advanceDay")).unwrap();
        assert_eq!(app.store().provider().flush_count(), 0);

        app.handle(&chat("GM", "!cal advanceDay")).unwrap();
        assert_eq!(app.store().provider().flush_count(), 1);
        assert_eq!(app.store().get().current().day_of_the_month(), 2);
    }

    #[test]
    fn denial_is_whispered() {
        let mut app = app();
        let replies = app.handle(&chat("Bob", "!cal sendDate")).unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].to_string(), "/w \"Bob\" Nope.");
    }

    #[test]
    fn run_writes_prefixed_lines() {
        let mut app = app();
        let dispatcher = Dispatcher::detached();
        let sink = dispatcher.event_sink().clone();
        sink.send(Event::Input(chat("GM", "!cal sendDate"))).unwrap();
        sink.send(Event::Quit).unwrap();

        let mut out = Vec::new();
        app.run(dispatcher, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("/w gm Calendar initialized."));
        assert!(lines[1].starts_with("/direct <table"));
    }
}
