//! Fuzz target for IRC message parsing
//!
//! Feeds arbitrary lines to the message parser and the helpers the session
//! applies to parsed messages, ensuring none of them panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.is_empty() || input.len() > 512 {
            return;
        }

        let _ = smirc::Prefix::parse(input);
        let _ = smirc::ctcp::display_text(input);

        if let Ok(message) = smirc::Message::parse(input) {
            let _ = message.code();
            let _ = message.initiator();
            let _ = message.trailing();
            let _ = message.with_command("PONG");
        }
    }
});
