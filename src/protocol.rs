//! Wire rendering for server-originated frames.
//!
//! Every frame is plain UTF-8 text. Server announcements embed ANSI
//! color codes; clients are expected to render or strip them. The
//! exact strings here are a compatibility contract with existing
//! clients, so change them with care.

const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

pub const USAGE_ME: &str = "Usage: /me <message>";
pub const USAGE_EM: &str = "Usage: /em <message>";

/// Yellow join announcement carrying the post-registration count.
pub fn join_announcement(name: &str, online: usize) -> String {
    format!("{YELLOW}\nA wild {name} has joined the chat! ({online} online)\n{RESET}")
}

/// Red departure announcement carrying the post-removal count.
pub fn leave_announcement(name: &str, online: usize) -> String {
    format!("{RED}\nOh dear, {name} has disconnected the chat. ({online} online)\n{RESET}")
}

/// Cyan `/list` reply: online count plus a comma-joined name listing.
pub fn user_list(names: &[String]) -> String {
    format!(
        "{CYAN}\nCurrent Online Users ({}): {}\n{RESET}",
        names.len(),
        names.join(", ")
    )
}

/// Magenta third-person emote for `/me`.
pub fn emote(name: &str, text: &str) -> String {
    format!("{MAGENTA}\n* {name} {text} *\n{RESET}")
}

/// Magenta anonymous emote for `/em`; the sender is omitted by design.
pub fn anonymous_emote(text: &str) -> String {
    format!("{MAGENTA}\n* {text} *\n{RESET}")
}

pub fn unknown_command(name: &str) -> String {
    format!("\nUnknown command: {name}\n")
}
