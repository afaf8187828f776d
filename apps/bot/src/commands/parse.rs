/// A recognized bot command with its (trimmed) argument text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Start,
    Hello,
    Setup(&'a str),
    Generate(&'a str),
}

impl<'a> Command<'a> {
    /// Parses `/name[@bot] [argument...]`. Returns `None` for plain text,
    /// commands the bot does not know, and commands addressed to another bot.
    /// Command names and the mention are matched case-insensitively.
    pub fn parse(text: &'a str, bot_username: &str) -> Option<Self> {
        let text = text.trim_start();
        if !text.starts_with('/') {
            return None;
        }

        let (token, rest) = match text.find(char::is_whitespace) {
            Some(i) => text.split_at(i),
            None => (text, ""),
        };
        // Group chats address commands as /setup@SomeBot
        let (name, mention) = match token.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (token, None),
        };
        if mention.is_some_and(|m| !m.eq_ignore_ascii_case(bot_username)) {
            return None;
        }
        let name = name.to_ascii_lowercase();
        let argument = rest.trim();

        match name.as_str() {
            "/start" => Some(Command::Start),
            "/hello" => Some(Command::Hello),
            "/setup" => Some(Command::Setup(argument)),
            "/generate" => Some(Command::Generate(argument)),
            _ => None,
        }
    }

    /// Tag used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Hello => "hello",
            Command::Setup(_) => "setup",
            Command::Generate(_) => "generate",
        }
    }
}
