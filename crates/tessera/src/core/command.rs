//! Command tables
//!
//! A diagram type is described by an ordered table of [`Command`]s, each pairing a
//! line [`Pattern`] with a handler that mutates the diagram model. The first
//! command whose pattern matches a line owns it.

use thiserror::Error;
use tracing::{debug, span, trace, Level};

use super::error::{DiagramError, DiagramResult};
use super::grammar::{self, CharClass, Captures, Fragment, LineMatcher, Pattern};
use super::skin::SkinParams;
use super::source::SourceLine;

/// Rejection raised by a command handler
///
/// Handlers validate before mutating, so a returned error leaves the model as it
/// was before the line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CommandError {
    pub message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<DiagramError> for CommandError {
    fn from(error: DiagramError) -> Self {
        Self::new(error.to_string())
    }
}

pub type Handler<D> = fn(&mut D, &Captures) -> Result<(), CommandError>;

/// A grammar rule with its handler
pub struct Command<D> {
    pub name: &'static str,
    pub pattern: Pattern,
    pub handler: Handler<D>,
}

impl<D> Command<D> {
    pub fn new(name: &'static str, grammar: Fragment, handler: Handler<D>) -> Self {
        Self {
            name,
            pattern: Pattern::new(grammar),
            handler,
        }
    }
}

impl<D> std::fmt::Debug for Command<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("pattern", &self.pattern.describe())
            .finish()
    }
}

/// Ordered command table for one diagram type
#[derive(Debug)]
pub struct CommandRegistry<D> {
    commands: Vec<Command<D>>,
}

impl<D> Default for CommandRegistry<D> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<D> CommandRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command; earlier registrations take priority
    pub fn register(&mut self, name: &'static str, grammar: Fragment, handler: Handler<D>) {
        self.commands.push(Command::new(name, grammar, handler));
    }

    pub fn commands(&self) -> &[Command<D>] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// First command claiming the line, with its captures
    pub fn find(&self, line: &str) -> Option<(&Command<D>, Captures)> {
        self.commands
            .iter()
            .find_map(|command| command.pattern.matches(line).map(|caps| (command, caps)))
    }

    fn matchers<'src>(&self) -> Vec<LineMatcher<'src>> {
        self.commands.iter().map(|c| c.pattern.matcher()).collect()
    }

    /// Run the owning command of one line against the model
    pub fn execute(&self, diagram: &mut D, line: &SourceLine) -> DiagramResult<&'static str> {
        self.dispatch(&self.matchers(), diagram, line)
    }

    fn dispatch<'src>(
        &self,
        matchers: &[LineMatcher<'src>],
        diagram: &mut D,
        line: &'src SourceLine,
    ) -> DiagramResult<&'static str> {
        let found = self
            .commands
            .iter()
            .zip(matchers)
            .find_map(|(command, matcher)| matcher.matches(&line.text).map(|c| (command, c)));
        let Some((command, captures)) = found else {
            debug!(location = %line.location, text = %line.text, "No command matches");
            return Err(DiagramError::grammar_mismatch(&line.text, line.location));
        };
        trace!(command = command.name, captures = captures.len(), "Dispatching");
        (command.handler)(diagram, &captures).map_err(|error| {
            debug!(command = command.name, %error, "Command rejected line");
            DiagramError::semantic(error.message, &line.text, line.location)
        })?;
        Ok(command.name)
    }

    /// Run every line in order, stopping at the first failure
    ///
    /// Grammars are compiled once for the whole run.
    pub fn execute_all(&self, diagram: &mut D, lines: &[SourceLine]) -> DiagramResult<()> {
        let dispatch_span = span!(Level::DEBUG, "dispatch", lines = lines.len());
        let _enter = dispatch_span.enter();
        let matchers = self.matchers();
        for line in lines {
            self.dispatch(&matchers, diagram, line)?;
        }
        Ok(())
    }

    /// Grammar listing, used for "expected one of" hints
    pub fn describe(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|c| format!("{}: {}", c.name, c.pattern))
            .collect()
    }
}

/// Models accepting the commands shared by every diagram type
pub trait TitledDiagram {
    fn set_title(&mut self, title: String);
    fn skin_mut(&mut self) -> &mut SkinParams;
}

fn title_handler<D: TitledDiagram>(
    diagram: &mut D,
    captures: &Captures,
) -> Result<(), CommandError> {
    let title = captures.get("TITLE").unwrap_or_default().trim().to_string();
    diagram.set_title(title);
    Ok(())
}

fn skinparam_handler<D: TitledDiagram>(
    diagram: &mut D,
    captures: &Captures,
) -> Result<(), CommandError> {
    let name = captures.get("NAME").unwrap_or_default();
    let value = captures.get("VALUE").unwrap_or_default().trim();
    diagram.skin_mut().set_by_name(name, value)?;
    Ok(())
}

/// Register `title` and `skinparam`
pub fn register_common_commands<D: TitledDiagram>(registry: &mut CommandRegistry<D>) {
    registry.register(
        "title",
        grammar::concat(vec![
            grammar::lit("title"),
            grammar::space1(),
            grammar::capture("TITLE", CharClass::Any),
        ]),
        title_handler::<D>,
    );
    registry.register(
        "skinparam",
        grammar::concat(vec![
            grammar::lit("skinparam"),
            grammar::space1(),
            grammar::capture("NAME", CharClass::Word),
            grammar::space1(),
            grammar::capture("VALUE", CharClass::Any),
        ]),
        skinparam_handler::<D>,
    );
}
