//! Interactive session
//!
//! Holds the two input fields (wallet, token list) between commands and maps
//! shell lines onto Load / Clear triggers.

use std::sync::Arc;

use super::orchestrator::{LoadError, LoadOrchestrator, LoadReport, LoadRequest};
use crate::ports::{ChainPort, PriceSourcePort, RenderSink};

pub const HELP: &str = "\
commands:
  wallet <address>     set the wallet field
  tokens <list>        replace the token list (comma or newline separated)
  tokens+ <list>       append a line to the token list
  load                 load balances and prices
  clear                clear both fields and the table
  show                 print the current fields
  help                 this text
  quit | exit          leave the shell";

/// The two text inputs of the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub wallet: String,
    pub tokens: String,
}

impl FormState {
    pub fn append_tokens(&mut self, line: &str) {
        if !self.tokens.is_empty() {
            self.tokens.push('\n');
        }
        self.tokens.push_str(line);
    }

    pub fn clear(&mut self) {
        self.wallet.clear();
        self.tokens.clear();
    }

    pub fn to_request(&self) -> LoadRequest {
        LoadRequest::new(self.wallet.clone(), self.tokens.clone())
    }
}

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Wallet(String),
    Tokens(String),
    AppendTokens(String),
    Load,
    Clear,
    Show,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => ShellCommand::Empty,
            "wallet" => ShellCommand::Wallet(rest.to_string()),
            "tokens" => ShellCommand::Tokens(rest.to_string()),
            "tokens+" => ShellCommand::AppendTokens(rest.to_string()),
            "load" => ShellCommand::Load,
            "clear" => ShellCommand::Clear,
            "show" => ShellCommand::Show,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => ShellCommand::Unknown(other.to_string()),
        }
    }
}

/// What the shell should do after a command
#[derive(Debug)]
pub enum SessionOutcome {
    Continue,
    Print(String),
    Loaded(Box<LoadReport>),
    Quit,
}

/// Form state bound to an orchestrator
pub struct Session<C, P, S> {
    form: FormState,
    orchestrator: Arc<LoadOrchestrator<C, P, S>>,
}

impl<C, P, S> Session<C, P, S>
where
    C: ChainPort,
    P: PriceSourcePort,
    S: RenderSink,
{
    pub fn new(orchestrator: Arc<LoadOrchestrator<C, P, S>>) -> Self {
        Self {
            form: FormState::default(),
            orchestrator,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub async fn execute(&mut self, command: ShellCommand) -> SessionOutcome {
        match command {
            ShellCommand::Wallet(wallet) => {
                self.form.wallet = wallet;
                SessionOutcome::Continue
            }
            ShellCommand::Tokens(tokens) => {
                self.form.tokens = tokens;
                SessionOutcome::Continue
            }
            ShellCommand::AppendTokens(line) => {
                self.form.append_tokens(&line);
                SessionOutcome::Continue
            }
            ShellCommand::Load => match self.orchestrator.load(&self.form.to_request()).await {
                Ok(report) => SessionOutcome::Loaded(Box::new(report)),
                Err(e @ LoadError::AlreadyRunning) => SessionOutcome::Print(e.to_string()),
                // Already reported on the sink
                Err(_) => SessionOutcome::Continue,
            },
            ShellCommand::Clear => {
                if self.orchestrator.clear() {
                    self.form.clear();
                    SessionOutcome::Continue
                } else {
                    SessionOutcome::Print(LoadError::AlreadyRunning.to_string())
                }
            }
            ShellCommand::Show => SessionOutcome::Print(format!(
                "wallet: {}\ntokens:\n{}",
                self.form.wallet, self.form.tokens
            )),
            ShellCommand::Help => SessionOutcome::Print(HELP.to_string()),
            ShellCommand::Quit => SessionOutcome::Quit,
            ShellCommand::Empty => SessionOutcome::Continue,
            ShellCommand::Unknown(word) => {
                SessionOutcome::Print(format!("unknown command '{}', try 'help'", word))
            }
        }
    }
}
