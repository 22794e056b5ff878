//! Command execution.

use crate::config::Config;
use crate::Commands;
use colored::Colorize;
use varstate_core::{ComplexState, ConditionMatcher};

/// Executes a command and returns the formatted output.
pub fn execute(config: &Config, cmd: Commands) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Repl { .. } => unreachable!(),

        Commands::Describe { definition } => {
            let state = load_state(config, &definition)?;
            Ok(format_state(&state))
        }

        Commands::Spec { definition } => {
            let state = load_state(config, &definition)?;
            let json = state.specification().to_json()?;
            Ok(serde_json::to_string_pretty(&json)?)
        }

        Commands::Get {
            definition,
            variable,
        } => {
            let state = load_state(config, &definition)?;
            Ok(format_value(state.get(&variable)?))
        }

        Commands::Set {
            definition,
            assignments,
        } => {
            let mut state = load_state(config, &definition)?;
            apply_assignments(&mut state, &assignments)?;

            let mut output = format_state(&state);
            if state.sub_states().is_empty() {
                output.push_str(&format!(
                    "\n{} {}",
                    "persisted:".bold(),
                    state.serialize()?
                ));
            }
            Ok(output)
        }

        Commands::Vars {
            definition,
            pattern,
        } => {
            let state = load_state(config, &definition)?;
            Ok(format_variables(&state, pattern.as_deref())?)
        }

        Commands::Match {
            definition,
            condition,
            assignments,
        } => {
            let mut state = load_state(config, &definition)?;
            apply_assignments(&mut state, &assignments)?;

            let mut matcher = ConditionMatcher::new(condition)?;
            Ok(format_match(matcher.matches_complex(&state)?))
        }

        Commands::Check { condition } => {
            let expr = varstate_expr::parse(&condition)?;
            Ok(format!("{}\n{:#?}", "OK".green(), expr))
        }

        Commands::Restore {
            definition,
            persisted,
        } => {
            let mut state = load_state(config, &definition)?;
            state.deserialize(&persisted)?;
            Ok(format_state(&state))
        }
    }
}

/// Builds a state from a definition argument (`@name` or all-in-one).
pub fn load_state(
    config: &Config,
    definition: &str,
) -> Result<ComplexState, Box<dyn std::error::Error>> {
    let definition = config.resolve_definition(definition)?;
    Ok(ComplexState::parse(definition)?)
}

/// Splits `name=value`.
pub fn parse_assignment(assignment: &str) -> Result<(&str, &str), String> {
    assignment
        .split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", assignment))
}

fn apply_assignments(
    state: &mut ComplexState,
    assignments: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    for assignment in assignments {
        let (name, value) = parse_assignment(assignment)?;
        state.set(name, value)?;
    }
    Ok(())
}

/// Formats the identifier and description of a state.
pub fn format_state(state: &ComplexState) -> String {
    format!(
        "{} {}\n{} {}",
        "id:".bold(),
        state.id().cyan(),
        "description:".bold(),
        state.description()
    )
}

pub fn format_value(value: Option<&str>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "(unset)".dimmed().to_string(),
    }
}

pub fn format_match(matched: bool) -> String {
    if matched {
        "true".green().to_string()
    } else {
        "false".red().to_string()
    }
}

/// Formats top-level variables matching `pattern`, one per line.
pub fn format_variables(
    state: &ComplexState,
    pattern: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    let matching = state.get_matching(pattern)?;
    if matching.is_empty() {
        return Ok("No matching variables".yellow().to_string());
    }

    Ok(matching
        .into_iter()
        .map(|(name, value)| format!("{} = {}", name.cyan(), format_value(value)))
        .collect::<Vec<_>>()
        .join("\n"))
}
