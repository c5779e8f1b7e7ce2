// src/command_handler/handlers/info_ops.rs
// ============================================
// Static informational replies
// ============================================

use crate::command_handler::CommandReply;

pub const START_TEXT: &str =
    "👋 Hi! I am a server monitoring bot. Use /help for the list of commands.";

pub const HELP_TEXT: &str = "📋 <b>Commands:</b>\n\
/start - Start working with the bot\n\
/help - Show this message\n\
/status - Current server state\n\
/c &lt;command&gt; - Run a shell command on the server\n\
/top - Top processes by CPU\n\
/netstat - Listening sockets\n\
/traffic - Network traffic\n\
/ssh &lt;add|remove&gt; &lt;public_key&gt; - Manage SSH keys\n\
/file - Save the attached file (send it with /file as the caption)\n\
/reboot - Reboot the server\n\
/logs - Last lines of the agent log\n\
/sysinfo - Hostname, OS and CPU cores";

pub fn handle_start() -> CommandReply {
    CommandReply::html(START_TEXT)
}

pub fn handle_help() -> CommandReply {
    CommandReply::html(HELP_TEXT)
}
