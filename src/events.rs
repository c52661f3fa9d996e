use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

/// One line of chat: who said it and what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub who: String,
    pub content: String,
}

impl ChatMessage {
    /// Reads `who: content`. Lines without a speaker, or that start with a
    /// command, are attributed to `default_who`.
    pub fn parse_line(line: &str, default_who: &str) -> Self {
        let line = line.trim();
        match line.split_once(": ") {
            Some((who, content)) if !who.trim().is_empty() && !who.starts_with('!') => ChatMessage {
                who: who.trim().to_owned(),
                content: content.trim().to_owned(),
            },
            _ => ChatMessage {
                who: default_who.to_owned(),
                content: line.to_owned(),
            },
        }
    }
}

pub enum Event {
    Input(ChatMessage),
    Quit,
}

pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    _input_handle: Option<thread::JoinHandle<()>>,
}

impl Dispatcher {
    /// Starts a thread that forwards stdin lines as `Event::Input`, then
    /// `Event::Quit` at end of input.
    pub fn from_stdin(default_who: &str) -> Dispatcher {
        let (tx, rx) = mpsc::channel();
        let input_handle = {
            let tx = tx.clone();
            let default_who = default_who.to_owned();
            thread::spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    match line {
                        Ok(line) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            let msg = ChatMessage::parse_line(&line, &default_who);
                            if tx.send(Event::Input(msg)).is_err() {
                                return;
                            }
                        }
                        Err(err) => {
                            log::warn!("Stopped reading input: {}", err);
                            break;
                        }
                    }
                }
                let _ = tx.send(Event::Quit);
            })
        };

        Dispatcher {
            rx,
            tx,
            _input_handle: Some(input_handle),
        }
    }

    /// A dispatcher fed only through `event_sink`.
    pub fn detached() -> Dispatcher {
        let (tx, rx) = mpsc::channel();
        Dispatcher {
            rx,
            tx,
            _input_handle: None,
        }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    pub fn event_sink(&self) -> &mpsc::Sender<Event> {
        &self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_speaker_from_content() {
        let msg = ChatMessage::parse_line("Alice (GM): !cal advanceDay", "GM");
        assert_eq!(msg.who, "Alice (GM)");
        assert_eq!(msg.content, "!cal advanceDay");
    }

    #[test]
    fn bare_lines_use_default_speaker() {
        let msg = ChatMessage::parse_line("!cal setDate 1: 2", "GM");
        assert_eq!(msg.who, "GM");
        assert_eq!(msg.content, "!cal setDate 1: 2");

        let msg = ChatMessage::parse_line("  !cal  ", "Bob");
        assert_eq!(msg.who, "Bob");
        assert_eq!(msg.content, "!cal");
    }

    #[test]
    fn detached_dispatcher_delivers_in_order() {
        let dispatcher = Dispatcher::detached();
        let sink = dispatcher.event_sink().clone();
        sink.send(Event::Input(ChatMessage::parse_line("a: b", "x"))).unwrap();
        sink.send(Event::Quit).unwrap();

        assert!(matches!(dispatcher.next(), Ok(Event::Input(m)) if m.who == "a"));
        assert!(matches!(dispatcher.next(), Ok(Event::Quit)));
    }
}
