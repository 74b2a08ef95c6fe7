use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};

use crate::models::connections::{ConnectionConfig, DbType};

/// Line based question/answer prompt.
///
/// Secrets are read with echo disabled when stdin is a terminal, otherwise
/// they are read as a plain line.
pub struct Prompt<R: BufRead, W: Write> {
    input: R,
    output: W,
    hide_secrets: bool,
}

impl Prompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin = io::stdin();
        let hide_secrets = stdin.is_terminal();

        Prompt {
            input: stdin.lock(),
            output: io::stdout(),
            hide_secrets,
        }
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompt {
            input,
            output,
            hide_secrets: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", title)?;
        writeln!(self.output, "{}", "-".repeat(title.len()))
    }

    /// Ask a question. An empty answer takes the default when there is one.
    pub fn ask(&mut self, question: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(default) => write!(self.output, "{} [{}]: ", question, default)?,
            None => write!(self.output, "{}: ", question)?,
        }
        self.output.flush()?;

        let answer = self.read_line()?;
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer)
    }

    /// Pick one of `options` by number or by name. Asks again on an invalid
    /// answer.
    pub fn choice(
        &mut self,
        question: &str,
        options: &[&str],
        default: usize,
    ) -> io::Result<String> {
        loop {
            writeln!(self.output, "{}:", question)?;
            for (i, option) in options.iter().enumerate() {
                writeln!(self.output, "  [{}] {}", i, option)?;
            }

            let fallback = options.get(default).copied();
            let answer = self.ask(">", fallback)?;

            if let Some(option) = options.iter().find(|option| **option == answer) {
                return Ok(option.to_string());
            }
            if let Some(option) = answer.parse::<usize>().ok().and_then(|i| options.get(i)) {
                return Ok(option.to_string());
            }

            writeln!(self.output, "Value \"{}\" is invalid.", answer)?;
        }
    }

    pub fn secret(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}: ", question)?;
        self.output.flush()?;

        if !self.hide_secrets {
            return self.read_line();
        }

        enable_raw_mode()?;
        let secret = read_hidden();
        disable_raw_mode()?;
        writeln!(self.output)?;

        secret
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim().to_string())
    }
}

fn read_hidden() -> io::Result<String> {
    let mut secret = String::new();

    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(secret),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
                }
                KeyCode::Char(c) => secret.push(c),
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Esc => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
                }
                _ => {}
            }
        }
    }
}

/// Collect the parameters of one connection.
pub fn collect_connection<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    label: &str,
    default_collation: &str,
) -> io::Result<ConnectionConfig> {
    let name = prompt.ask("Enter a name for the connection", Some(label))?;
    let driver = prompt.choice("Select a database driver", &["mysql", "pgsql"], 0)?;
    let db_type = DbType::from_driver(&driver)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let host = prompt.ask("Enter the host to connect to", Some("127.0.0.1"))?;
    let port = ask_port(prompt, db_type.default_port())?;
    let database = prompt.ask("Enter the database to diff", Some(&name))?;
    let username = prompt.ask("Enter the username to connect with", Some(&database))?;
    let password = prompt.secret("Enter the password to connect with")?;
    let collation = prompt.ask("Enter the collation of the database", Some(default_collation))?;

    Ok(ConnectionConfig {
        name,
        db_type,
        host,
        port,
        database,
        username,
        password,
        collation: (!collation.is_empty()).then_some(collation),
    })
}

fn ask_port<R: BufRead, W: Write>(prompt: &mut Prompt<R, W>, default: u16) -> io::Result<u16> {
    let default = default.to_string();
    loop {
        let answer = prompt.ask("Enter the port to connect on", Some(&default))?;
        match answer.parse() {
            Ok(port) => return Ok(port),
            Err(_) => writeln!(prompt.output, "Port \"{}\" is not a number.", answer)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn empty_answer_takes_default() {
        let mut prompt = prompt("\n  custom  \n");

        assert_eq!(prompt.ask("Host", Some("127.0.0.1")).unwrap(), "127.0.0.1");
        assert_eq!(prompt.ask("Host", Some("127.0.0.1")).unwrap(), "custom");

        let written = String::from_utf8(prompt.into_output()).unwrap();
        assert!(written.starts_with("Host [127.0.0.1]: "));
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut prompt = prompt("");

        let err = prompt.ask("Host", Some("127.0.0.1")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn choice_accepts_index_or_name_and_retries() {
        let mut prompt = prompt("oracle\n1\npgsql\n\n");
        let options = ["mysql", "pgsql"];

        assert_eq!(prompt.choice("Driver", &options, 0).unwrap(), "pgsql");
        assert_eq!(prompt.choice("Driver", &options, 0).unwrap(), "pgsql");
        assert_eq!(prompt.choice("Driver", &options, 0).unwrap(), "mysql");

        let written = String::from_utf8(prompt.into_output()).unwrap();
        assert!(written.contains("Value \"oracle\" is invalid."));
    }

    #[test]
    fn collects_connection_with_chained_defaults() {
        // name, driver, host, port, database, username, password, collation
        let mut prompt = prompt("shop\n1\n\n\n\n\nsecret\n\n");

        let config = collect_connection(&mut prompt, "Database 1", "utf8mb4_general_ci").unwrap();

        assert_eq!(
            config,
            ConnectionConfig {
                name: "shop".to_string(),
                db_type: DbType::Postgres,
                host: "127.0.0.1".to_string(),
                port: 5432,
                database: "shop".to_string(),
                username: "shop".to_string(),
                password: "secret".to_string(),
                collation: Some("utf8mb4_general_ci".to_string()),
            }
        );
    }

    #[test]
    fn invalid_port_is_asked_again() {
        let mut prompt = prompt("\n\n\nabc\n3307\nshop\nroot\n\nutf8mb4_bin\n");

        let config = collect_connection(&mut prompt, "Database 2", "utf8mb4_general_ci").unwrap();

        assert_eq!(config.name, "Database 2");
        assert_eq!(config.db_type, DbType::MySql);
        assert_eq!(config.port, 3307);
        assert_eq!(config.database, "shop");
        assert_eq!(config.username, "root");
        assert_eq!(config.password, "");
        assert_eq!(config.collation.as_deref(), Some("utf8mb4_bin"));
    }
}
