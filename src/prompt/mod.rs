//! Question-and-answer front end.
//!
//! Choice questions (operation, database type) get TAB completion; list
//! answers are split on `", "`; passwords are read without echo.

use crate::connect::{ConnectionConfig, DEFAULT_DATABASE, DEFAULT_MASTER_USER};
use crate::error::Result;
use crate::provision::{Dialect, Operation, OperationRequest, policy_for, split_list};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use std::io::{self, Write};

/// Completes one of a fixed set of answers.
pub struct Choices {
    items: Vec<(&'static str, &'static str)>,
}

impl Choices {
    pub fn operations() -> Self {
        Self {
            items: Operation::ALL
                .iter()
                .map(|op| (op.as_str(), op.description()))
                .collect(),
        }
    }

    pub fn dialects() -> Self {
        Self {
            items: Dialect::ALL.iter().map(|d| (d.as_str(), "")).collect(),
        }
    }

    pub fn candidates(&self, word: &str) -> Vec<Pair> {
        let word = word.to_lowercase();
        self.items
            .iter()
            .filter(|(text, _)| text.starts_with(&word))
            .map(|(text, desc)| Pair {
                display: if desc.is_empty() {
                    text.to_string()
                } else {
                    format!("{text:<18} {desc}")
                },
                replacement: text.to_string(),
            })
            .collect()
    }
}

impl Completer for Choices {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        Ok((start, self.candidates(&line[start..pos])))
    }
}

/// One question asked while building a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    Usernames,
    Permissions,
    Tables,
    ServiceUsername,
    ServicePassword,
    Schemas,
}

/// Questions for `operation`, in the order they are asked.
pub fn questions_for(operation: Operation, dialect: Dialect) -> Vec<Question> {
    let mut questions = match operation {
        Operation::AddUser => vec![Question::Usernames, Question::Permissions, Question::Tables],
        Operation::AddServiceUser => vec![Question::ServiceUsername, Question::ServicePassword],
        Operation::RemoveUser => vec![Question::Usernames],
    };
    if policy_for(dialect).requires_schemas(operation) {
        questions.push(Question::Schemas);
    }
    questions
}

impl Hinter for Choices {
    type Hint = String;
}

impl Highlighter for Choices {}

impl Validator for Choices {}

impl Helper for Choices {}

pub struct Prompter {
    editor: Editor<Choices, DefaultHistory>,
}

impl Prompter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: Editor::new()?,
        })
    }

    fn choose(&mut self, question: &str, choices: Choices) -> Result<String> {
        println!("{question}");
        self.editor.set_helper(Some(choices));
        let answer = self.editor.readline("> ")?;
        self.editor.set_helper(None);
        Ok(answer.trim().to_string())
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        Ok(self.editor.readline(question)?.trim().to_string())
    }

    fn ask_or(&mut self, question: &str, default: &str) -> Result<String> {
        let answer = self.ask(&format!("{question} [Press ENTER for: {default}] "))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    fn ask_list(&mut self, question: &str) -> Result<Vec<String>> {
        Ok(split_list(&self.ask(question)?))
    }

    fn ask_secret(&mut self, question: &str) -> Result<String> {
        print!("{question}");
        io::stdout().flush()?;
        let secret = rpassword::read_password()?;
        Ok(secret)
    }

    pub fn operation(&mut self) -> Result<Operation> {
        let answer = self.choose("What would you like to do?", Choices::operations())?;
        Ok(answer.parse::<Operation>()?)
    }

    pub fn dialect(&mut self) -> Result<Dialect> {
        let answer = self.choose("What is the type of the database?", Choices::dialects())?;
        Ok(answer.parse::<Dialect>()?)
    }

    /// Endpoint, master credentials and database name. Pre-answered values
    /// are used as given. The master password is skipped when `with_password`
    /// is false.
    pub fn connection(
        &mut self,
        dialect: Dialect,
        endpoint: Option<String>,
        username: Option<String>,
        database: Option<String>,
        with_password: bool,
    ) -> Result<ConnectionConfig> {
        let endpoint = match endpoint {
            Some(endpoint) => endpoint,
            None => self.ask("What is the endpoint of the RDS instance? ")?,
        };
        let username = match username {
            Some(username) => username,
            None => self.ask_or("What is the master username?", DEFAULT_MASTER_USER)?,
        };
        let password = if with_password {
            self.ask_secret("What is the master password? (input hidden) ")?
        } else {
            String::new()
        };
        let database = match database {
            Some(database) => database,
            None => self.ask_or("What is the database name?", DEFAULT_DATABASE)?,
        };
        Ok(ConnectionConfig {
            dialect,
            endpoint,
            username,
            password,
            database,
        })
    }

    /// Per-operation lists, asked in [`questions_for`] order.
    pub fn request(
        &mut self,
        operation: Operation,
        dialect: Dialect,
        database: &str,
    ) -> Result<OperationRequest> {
        let mut request = OperationRequest::new(operation, dialect, database);
        for question in questions_for(operation, dialect) {
            request = match question {
                Question::Usernames => {
                    request.users(self.ask_list("What are their usernames? (separated by commas) ")?)
                }
                Question::Permissions => request.permissions(self.ask_list(&format!(
                    "What are their permissions? (separated by commas) [Press ENTER for {}] ",
                    policy_for(dialect).default_permissions().join(", ")
                ))?),
                Question::Tables => request.tables(self.ask_list(
                    "Which tables should they have access to? (separated by commas) [Press ENTER for *] ",
                )?),
                Question::ServiceUsername => {
                    request.users(vec![self.ask("What is the service users username? ")?])
                }
                Question::ServicePassword => request.service_password(
                    self.ask_secret("What is the service users password? (input hidden) ")?,
                ),
                Question::Schemas => request
                    .schemas(self.ask_list("What are the schema names? (separated by commas) ")?),
            };
        }
        Ok(request)
    }
}
