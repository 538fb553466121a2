//! CLI Chat Command
//!
//! Offline REPL over the conversation flow. Typed text is normalized the same
//! way as an inbound WhatsApp text message; a line starting with `@` stands in
//! for a button or list tap and is passed through verbatim as a reply id.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use afyabot_core::{route, Intent, ReplySpec};

use crate::terminal_output::{dim, note_info};

/// Result of one REPL line.
#[derive(Debug, PartialEq)]
pub enum ChatTurn {
    Reply(ReplySpec),
    Exit,
}

pub fn respond(line: &str) -> ChatTurn {
    let line = line.trim();
    if matches!(line.to_lowercase().as_str(), "exit" | "quit") {
        return ChatTurn::Exit;
    }
    let intent = match line.strip_prefix('@') {
        Some(id) => Intent::from_reply_id(id),
        None => Intent::from_text(line),
    };
    ChatTurn::Reply(route(intent.as_str()))
}

pub fn run() -> Result<()> {
    note_info("Afyabot chat. Say 'hi' to begin, '@<id>' to tap a button, 'exit' to quit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match respond(&line) {
            ChatTurn::Exit => break,
            ChatTurn::Reply(reply) => {
                println!("{}", dim(&format!("[{}]", reply.kind())));
                println!("{}", reply.to_string().trim_end());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use afyabot_core::FALLBACK_TEXT;

    #[test]
    fn typed_text_is_lowercased() {
        assert_eq!(respond("  Hello \n"), ChatTurn::Reply(route("hello")));
    }

    #[test]
    fn at_prefix_is_a_verbatim_reply_id() {
        assert_eq!(respond("@pharmacy"), ChatTurn::Reply(route("pharmacy")));
        assert_eq!(respond("@Pharmacy"), ChatTurn::Reply(ReplySpec::text(FALLBACK_TEXT)));
    }

    #[test]
    fn exit_words_stop_the_loop() {
        assert_eq!(respond("exit"), ChatTurn::Exit);
        assert_eq!(respond("QUIT"), ChatTurn::Exit);
    }
}
