//! Command tree synthesized from discovered functions.
//!
//! Functions whose path has a module segment are grouped under a command
//! named after the module; root-level functions attach directly to the
//! program. Groups and leaves keep the order in which their first function
//! appears.

use super::flags::{collect_input, flag_for, open_args, requests_help};
use super::{BuildError, Outcome};
use crate::errors::CliError;
use crate::naming::kebab_case;
use clap::error::ErrorKind;
use clap::{ArgMatches, Command};
use convex_caller::RemoteCaller;
use convex_schema::ParsedFunction;
use serde_json::Value;
use std::collections::HashMap;
use std::ffi::OsString;

const RESERVED_FLAGS: &[&str] = &["help"];

enum Node<'a> {
    Group {
        module: &'a str,
        functions: Vec<&'a ParsedFunction>,
    },
    Leaf(&'a ParsedFunction),
}

/// A program command with one subcommand per function, bound to a caller.
pub struct CommandTree<'a> {
    command: Command,
    leaves: HashMap<Vec<String>, &'a ParsedFunction>,
    caller: &'a RemoteCaller,
}

impl<'a> CommandTree<'a> {
    /// Attach groups and function commands to `program`.
    ///
    /// # Errors
    /// Two siblings with the same command name, two flags of one command
    /// with the same name, or a flag that collides with `--help`.
    pub fn build(
        program: Command,
        functions: &'a [ParsedFunction],
        caller: &'a RemoteCaller,
    ) -> Result<Self, BuildError> {
        let mut leaves = HashMap::new();
        let mut root_names = Names::new(program.get_name());
        let mut command = program
            .subcommand_required(true)
            .arg_required_else_help(true)
            .disable_help_subcommand(true);

        for node in layout(functions) {
            match node {
                Node::Group { module, functions } => {
                    let group_name = kebab_case(module);
                    root_names.claim(&group_name, module)?;

                    let mut group = Command::new(group_name.clone())
                        .about(format!("{} module functions", module))
                        .subcommand_required(true)
                        .arg_required_else_help(true)
                        .disable_help_subcommand(true);

                    let mut names = Names::new(&group_name);
                    for function in functions {
                        let leaf = leaf_command(function)?;
                        names.claim(leaf.get_name(), &function.path)?;
                        leaves.insert(
                            vec![group_name.clone(), leaf.get_name().to_string()],
                            function,
                        );
                        group = group.subcommand(leaf);
                    }
                    command = command.subcommand(group);
                }
                Node::Leaf(function) => {
                    let leaf = leaf_command(function)?;
                    root_names.claim(leaf.get_name(), &function.path)?;
                    leaves.insert(vec![leaf.get_name().to_string()], function);
                    command = command.subcommand(leaf);
                }
            }
        }

        tracing::debug!("Built {} function commands", leaves.len());

        Ok(Self {
            command,
            leaves,
            caller,
        })
    }

    /// The assembled clap command.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// The function bound to a command path such as `["todos", "get-all"]`.
    pub fn function_at(&self, names: &[&str]) -> Option<&'a ParsedFunction> {
        let key: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        self.leaves.get(&key).copied()
    }

    /// Parse `args` (including the program name) and invoke the selected function.
    ///
    /// Help and version requests are returned as [`Outcome::Exit`]; every
    /// other parse failure is a [`CliError::Usage`] and nothing is called.
    pub async fn run<I, T>(&self, args: I) -> Result<Outcome, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.command.clone().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(err) => return exit_or_usage(err),
        };

        let (names, leaf_matches) = selected(&matches);
        let function = self
            .leaves
            .get(&names)
            .ok_or_else(|| CliError::InvalidInput(format!("Unknown command: {}", names.join(" "))))?;

        // The open-schema catch-all swallows a trailing --help
        if requests_help(leaf_matches, &function.json_schema) {
            let mut argv = vec![self.command.get_name().to_string()];
            argv.extend(names.iter().cloned());
            argv.push("--help".to_string());
            return match self.command.clone().try_get_matches_from(argv) {
                Err(err) => exit_or_usage(err),
                Ok(_) => Err(CliError::InvalidInput("Invalid flag: --help".to_string())),
            };
        }

        let input = collect_input(leaf_matches, &function.json_schema).map_err(CliError::InvalidInput)?;
        tracing::debug!("Dispatching {} with {} argument(s)", function.path, input.len());

        let value = self
            .caller
            .invoke(&function.path, function.function_type, Value::Object(input))
            .await?;
        Ok(Outcome::Completed(value))
    }
}

fn exit_or_usage(err: clap::Error) -> Result<Outcome, CliError> {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => Ok(Outcome::Exit(err)),
        _ => Err(CliError::Usage(err)),
    }
}

/// Group functions by module, preserving first-appearance order.
fn layout(functions: &[ParsedFunction]) -> Vec<Node<'_>> {
    let mut nodes: Vec<Node<'_>> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();

    for function in functions {
        match function.module() {
            Some(module) => match group_index.get(module) {
                Some(&index) => {
                    if let Node::Group { functions, .. } = &mut nodes[index] {
                        functions.push(function);
                    }
                }
                None => {
                    group_index.insert(module, nodes.len());
                    nodes.push(Node::Group {
                        module,
                        functions: vec![function],
                    });
                }
            },
            None => nodes.push(Node::Leaf(function)),
        }
    }

    nodes
}

fn leaf_command(function: &ParsedFunction) -> Result<Command, BuildError> {
    let schema = &function.json_schema;
    let mut command = Command::new(kebab_case(function.function_name()))
        .about(format!("{} ({})", function.path, function.function_type));

    if schema.is_open() {
        command = command.arg(open_args());
    }

    let mut flags = Names::new(&function.path);
    for (name, property) in schema.property_iter() {
        let flag = kebab_case(name);
        if flag.is_empty() || RESERVED_FLAGS.contains(&flag.as_str()) {
            return Err(BuildError::ReservedFlag {
                path: function.path.clone(),
                property: name.clone(),
            });
        }
        flags.claim_flag(&flag, name)?;
        command = command.arg(flag_for(name, property, schema.is_required(name)));
    }

    Ok(command)
}

/// Names claimed under one parent, with the source that claimed each.
struct Names {
    parent: String,
    claimed: HashMap<String, String>,
}

impl Names {
    fn new(parent: &str) -> Self {
        Self {
            parent: parent.to_string(),
            claimed: HashMap::new(),
        }
    }

    fn claim(&mut self, name: &str, source: &str) -> Result<(), BuildError> {
        match self.claimed.insert(name.to_string(), source.to_string()) {
            Some(first) => Err(BuildError::DuplicateCommand {
                parent: self.parent.clone(),
                name: name.to_string(),
                first,
                second: source.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn claim_flag(&mut self, flag: &str, property: &str) -> Result<(), BuildError> {
        match self.claimed.insert(flag.to_string(), property.to_string()) {
            Some(first) => Err(BuildError::DuplicateFlag {
                path: self.parent.clone(),
                flag: flag.to_string(),
                first,
                second: property.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn selected(matches: &ArgMatches) -> (Vec<String>, &ArgMatches) {
    let mut names = Vec::new();
    let mut current = matches;
    while let Some((name, sub)) = current.subcommand() {
        names.push(name.to_string());
        current = sub;
    }
    (names, current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use convex_caller::{
        ApiNode, Connector, FunctionTarget, Transport, TransportError, TransportResult,
    };
    use convex_schema::{ArgDefinition, ArgType, FunctionDefinition, FunctionType};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(FunctionType, String, Value)>>>;

    struct Recorder {
        calls: Calls,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn query(&self, target: &FunctionTarget, args: Value) -> TransportResult<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((FunctionType::Query, target.name().to_string(), args));
            Ok(json!([]))
        }

        async fn mutation(&self, target: &FunctionTarget, args: Value) -> TransportResult<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((FunctionType::Mutation, target.name().to_string(), args));
            Ok(json!("new-id"))
        }

        async fn action(&self, _target: &FunctionTarget, _args: Value) -> TransportResult<Value> {
            Err(TransportError::Function("boom".to_string()))
        }
    }

    struct RecordingConnector {
        calls: Calls,
    }

    #[async_trait]
    impl Connector for RecordingConnector {
        async fn connect(&self, _url: &str) -> TransportResult<Box<dyn Transport>> {
            Ok(Box::new(Recorder {
                calls: self.calls.clone(),
            }))
        }
    }

    fn caller() -> (RemoteCaller, Calls) {
        let calls = Calls::default();
        let caller = RemoteCaller::new(
            "http://localhost:3210",
            ApiNode::default(),
            RecordingConnector {
                calls: calls.clone(),
            },
        );
        (caller, calls)
    }

    fn parsed(defs: Vec<FunctionDefinition>) -> Vec<ParsedFunction> {
        defs.iter().map(ParsedFunction::from_definition).collect()
    }

    fn todos() -> Vec<ParsedFunction> {
        parsed(vec![
            FunctionDefinition::new("getAll", FunctionType::Query)
                .in_module("todos")
                .without_args(),
            FunctionDefinition::new("create", FunctionType::Mutation)
                .in_module("todos")
                .arg("text", ArgDefinition::required(ArgType::String)),
            FunctionDefinition::new("ping", FunctionType::Query).without_args(),
            FunctionDefinition::new("sendEmail", FunctionType::Action).in_module("notifications"),
        ])
    }

    fn subcommand_names(command: &Command) -> Vec<String> {
        command
            .get_subcommands()
            .map(|c| c.get_name().to_string())
            .collect()
    }

    #[test]
    fn test_tree_shape() {
        let functions = todos();
        let (caller, _) = caller();
        let tree = CommandTree::build(Command::new("app"), &functions, &caller).unwrap();

        let root = tree.command();
        assert_eq!(subcommand_names(root), vec!["todos", "ping", "notifications"]);

        let group = root.find_subcommand("todos").unwrap();
        assert_eq!(subcommand_names(group), vec!["get-all", "create"]);
        assert_eq!(
            group.get_about().map(|a| a.to_string()),
            Some("todos module functions".to_string())
        );

        let leaf = group.find_subcommand("create").unwrap();
        assert_eq!(
            leaf.get_about().map(|a| a.to_string()),
            Some("todos.create (mutation)".to_string())
        );

        assert_eq!(
            tree.function_at(&["todos", "get-all"]).map(|f| f.path.as_str()),
            Some("todos.getAll")
        );
        assert_eq!(tree.function_at(&["ping"]).map(|f| f.path.as_str()), Some("ping"));
        assert!(tree.function_at(&["todos"]).is_none());
    }

    #[test]
    fn test_debug_assert_passes() {
        let functions = todos();
        let (caller, _) = caller();
        let tree = CommandTree::build(Command::new("app"), &functions, &caller).unwrap();
        tree.command().clone().debug_assert();
    }

    #[test]
    fn test_duplicate_command_names() {
        let functions = parsed(vec![
            FunctionDefinition::new("getAll", FunctionType::Query).in_module("todos"),
            FunctionDefinition::new("get_all", FunctionType::Query).in_module("todos"),
            FunctionDefinition::new("GetAll", FunctionType::Query).in_module("todos"),
        ]);
        let (caller, _) = caller();

        let err = CommandTree::build(Command::new("app"), &functions, &caller)
            .err()
            .unwrap();
        assert_eq!(
            err,
            BuildError::DuplicateCommand {
                parent: "todos".to_string(),
                name: "get-all".to_string(),
                first: "todos.getAll".to_string(),
                second: "todos.GetAll".to_string(),
            }
        );
    }

    #[test]
    fn test_module_collides_with_root_function() {
        let functions = parsed(vec![
            FunctionDefinition::new("list", FunctionType::Query).in_module("todos"),
            FunctionDefinition::new("todos", FunctionType::Query),
        ]);
        let (caller, _) = caller();

        let err = CommandTree::build(Command::new("app"), &functions, &caller)
            .err()
            .unwrap();
        assert!(matches!(err, BuildError::DuplicateCommand { ref name, .. } if name == "todos"));
    }

    #[test]
    fn test_flag_collisions() {
        let functions = parsed(vec![
            FunctionDefinition::new("create", FunctionType::Mutation)
                .in_module("todos")
                .arg("dueDate", ArgDefinition::optional(ArgType::String))
                .arg("due-date", ArgDefinition::optional(ArgType::String)),
        ]);
        let (caller, _) = caller();
        let err = CommandTree::build(Command::new("app"), &functions, &caller)
            .err()
            .unwrap();
        assert!(matches!(err, BuildError::DuplicateFlag { ref flag, .. } if flag == "due-date"));

        let functions = parsed(vec![
            FunctionDefinition::new("create", FunctionType::Mutation)
                .in_module("todos")
                .arg("help", ArgDefinition::optional(ArgType::String)),
        ]);
        let err = CommandTree::build(Command::new("app"), &functions, &caller)
            .err()
            .unwrap();
        assert_eq!(
            err,
            BuildError::ReservedFlag {
                path: "todos.create".to_string(),
                property: "help".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_run_dispatches() {
        let functions = todos();
        let (caller, calls) = caller();
        let tree = CommandTree::build(Command::new("app"), &functions, &caller).unwrap();

        let outcome = tree
            .run(["app", "todos", "create", "--text", "Buy milk"])
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Completed(ref v) if *v == json!("new-id")));

        let outcome = tree.run(["app", "ping"]).await.unwrap();
        assert!(matches!(outcome, Outcome::Completed(ref v) if *v == json!([])));

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                (FunctionType::Mutation, "todos:create".to_string(), json!({"text": "Buy milk"})),
                (FunctionType::Query, "ping".to_string(), json!({})),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_usage_errors_do_not_call() {
        let functions = todos();
        let (caller, calls) = caller();
        let tree = CommandTree::build(Command::new("app"), &functions, &caller).unwrap();

        let err = tree.run(["app", "todos", "create"]).await.unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));

        let err = tree.run(["app", "todos", "remove"]).await.unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_help_is_exit() {
        let functions = todos();
        let (caller, _) = caller();
        let tree = CommandTree::build(Command::new("app"), &functions, &caller).unwrap();

        for argv in [vec!["app"], vec!["app", "--help"], vec!["app", "todos"]] {
            let outcome = tree.run(argv).await.unwrap();
            assert!(matches!(outcome, Outcome::Exit(_)));
        }
    }

    #[tokio::test]
    async fn test_open_schema_help_after_other_flags() {
        let functions = todos();
        let (caller, calls) = caller();
        let tree = CommandTree::build(Command::new("app"), &functions, &caller).unwrap();

        for argv in [
            vec!["app", "notifications", "send-email", "--help"],
            vec!["app", "notifications", "send-email", "--to", "a@b.c", "--help"],
        ] {
            match tree.run(argv).await.unwrap() {
                Outcome::Exit(err) => {
                    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
                    assert!(err.to_string().contains("notifications.sendEmail (action)"));
                }
                other => panic!("expected help, got {:?}", other),
            }
        }
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_wraps_call_errors() {
        let functions = todos();
        let (caller, _) = caller();
        let tree = CommandTree::build(Command::new("app"), &functions, &caller).unwrap();

        let err = tree
            .run(["app", "notifications", "send-email", "--to", "a@b.c"])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to call action \"notifications.sendEmail\": boom"
        );
    }
}
