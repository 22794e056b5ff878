//! Interactive REPL.

use crate::commands::{
    format_match, format_state, format_value, format_variables, load_state, parse_assignment,
};
use crate::config::Config;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config as EditorConfig, Editor};
use varstate_core::{ComplexState, ConditionMatcher};

const HELP_TEXT: &str = r#"
Available commands:
  help                          Show this help

  state <definition>            Load a state (all-in-one form or @name)
  reset                         Restore the state as it was loaded

  id                            Show the composite identifier
  desc                          Show the composite description
  get <variable>                Read a variable or dotted path
  set <variable> <value>        Assign a variable
  set <name=value>...           Assign several variables
  vars [pattern]                List top-level variables

  match <condition>             Test a condition against the state

  save                          Print the persisted form
  load <persisted>              Restore values from a persisted form

  quit, exit                    Exit the REPL
"#;

/// A REPL session holding one live state.
pub struct Session {
    config: Config,
    loaded: Option<ComplexState>,
    state: Option<ComplexState>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            loaded: None,
            state: None,
        }
    }

    /// Loads a state definition, replacing the current state.
    pub fn load(&mut self, definition: &str) -> Result<String, Box<dyn std::error::Error>> {
        let state = load_state(&self.config, definition)?;
        let output = format_state(&state);
        self.loaded = Some(state.clone());
        self.state = Some(state);
        Ok(output)
    }

    fn state(&self) -> Result<&ComplexState, Box<dyn std::error::Error>> {
        self.state
            .as_ref()
            .ok_or_else(|| "no state loaded (use 'state <definition>')".into())
    }

    fn state_mut(&mut self) -> Result<&mut ComplexState, Box<dyn std::error::Error>> {
        self.state
            .as_mut()
            .ok_or_else(|| "no state loaded (use 'state <definition>')".into())
    }

    /// Executes one REPL line. Returns `None` when the session should end.
    pub fn execute(&mut self, line: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match cmd.to_lowercase().as_str() {
            "" => Ok(Some(String::new())),

            "help" | "?" => Ok(Some(HELP_TEXT.to_string())),

            "quit" | "exit" | "q" => Ok(None),

            "state" => {
                if rest.is_empty() {
                    return Ok(Some("Usage: state <definition>".to_string()));
                }
                self.load(rest).map(Some)
            }

            "reset" => {
                let loaded = self
                    .loaded
                    .clone()
                    .ok_or("no state loaded (use 'state <definition>')")?;
                let output = format_state(&loaded);
                self.state = Some(loaded);
                Ok(Some(output))
            }

            "id" => Ok(Some(self.state()?.id().cyan().to_string())),

            "desc" | "description" => Ok(Some(self.state()?.description())),

            "get" => {
                let [variable] = args.as_slice() else {
                    return Ok(Some("Usage: get <variable>".to_string()));
                };
                Ok(Some(format_value(self.state()?.get(variable)?)))
            }

            "set" => {
                let state = self.state_mut()?;
                match args.as_slice() {
                    [] => return Ok(Some("Usage: set <variable> <value>".to_string())),
                    [variable, value] if !variable.contains('=') => state.set(variable, *value)?,
                    assignments => {
                        for assignment in assignments {
                            let (name, value) = parse_assignment(assignment)?;
                            state.set(name, value)?;
                        }
                    }
                }
                Ok(Some(format_state(state)))
            }

            "vars" => {
                let pattern = args.first().copied();
                Ok(Some(format_variables(self.state()?, pattern)?))
            }

            "match" => {
                if rest.is_empty() {
                    return Ok(Some("Usage: match <condition>".to_string()));
                }
                let mut matcher = ConditionMatcher::new(rest)?;
                Ok(Some(format_match(matcher.matches_complex(self.state()?)?)))
            }

            "save" => Ok(Some(self.state()?.serialize()?)),

            "load" => {
                let state = self.state_mut()?;
                state.deserialize(rest)?;
                Ok(Some(format_state(state)))
            }

            _ => Ok(Some(format!(
                "Unknown command: {}. Type 'help' for available commands.",
                cmd
            ))),
        }
    }
}

pub fn run(config: &Config, definition: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "varstate REPL".bold().cyan());

    let mut session = Session::new(config.clone());
    if let Some(definition) = definition {
        println!("{}\n", session.load(definition)?);
    }

    let editor_config = EditorConfig::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(editor_config)?;

    let history_path = std::env::var("HOME")
        .map(|h| std::path::PathBuf::from(h).join(".varstate_history"))
        .unwrap_or_else(|_| ".varstate_history".into());
    let _ = rl.load_history(&history_path);

    println!("Type 'help' for available commands.\n");

    loop {
        let prompt = format!("{} ", "varstate>".cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                match session.execute(&line) {
                    Ok(Some(output)) => println!("{}\n", output),
                    Ok(None) => break,
                    Err(e) => println!("{}: {}\n", "Error".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        colored::control::set_override(false);
        let mut config = Config::default();
        config.states.insert(
            "editor".to_string(),
            "main:red,green,blue;mode:edit,view:view#red".to_string(),
        );
        let mut session = Session::new(config);
        session.load("@editor").unwrap();
        session
    }

    fn exec(session: &mut Session, line: &str) -> String {
        session.execute(line).unwrap().unwrap()
    }

    #[test]
    fn test_requires_state() {
        colored::control::set_override(false);
        let mut session = Session::new(Config::default());
        let err = session.execute("id").unwrap_err();
        assert!(err.to_string().contains("no state loaded"));

        exec(&mut session, "state main#x");
        assert_eq!(exec(&mut session, "id"), "main=x");
    }

    #[test]
    fn test_get_and_set() {
        let mut session = session();
        assert_eq!(exec(&mut session, "get main"), "red");

        exec(&mut session, "set main green");
        assert_eq!(exec(&mut session, "get main"), "green");

        exec(&mut session, "set main=blue mode=edit");
        assert_eq!(exec(&mut session, "id"), "main=blue,mode=edit");

        assert!(session.execute("set main pink").is_err());
        assert!(session.execute("get nope").is_err());
    }

    #[test]
    fn test_match_condition_with_spaces() {
        let mut session = session();
        assert_eq!(exec(&mut session, "match red && LHS:mode == RHS:view"), "true");
        exec(&mut session, "set main green");
        assert_eq!(exec(&mut session, "match red"), "false");
        assert!(session.execute("match red &&").is_err());
    }

    #[test]
    fn test_save_load_reset() {
        let mut session = session();
        exec(&mut session, "set main green");
        assert_eq!(exec(&mut session, "save"), "green,view");

        exec(&mut session, "load blue,edit");
        assert_eq!(exec(&mut session, "id"), "main=blue,mode=edit");

        exec(&mut session, "reset");
        assert_eq!(exec(&mut session, "id"), "main=red,mode=view");
    }

    #[test]
    fn test_vars_and_desc() {
        let mut session = session();
        assert_eq!(exec(&mut session, "vars mo.*"), "mode = view");
        assert_eq!(exec(&mut session, "desc"), "main=red,mode=view");
    }

    #[test]
    fn test_quit_and_unknown() {
        let mut session = session();
        assert!(session.execute("quit").unwrap().is_none());
        assert!(exec(&mut session, "frobnicate").starts_with("Unknown command"));
        assert!(exec(&mut session, "help").contains("Available commands"));
    }
}
