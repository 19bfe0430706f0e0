//! Scripted YAML suites.
//!
//! Lets the CLI drive the engine without compiling Rust test code. Each file
//! is one source grouping; its tests keep their declaration order and files
//! are visited in sorted path order, so discovery is deterministic.
//!
//! # Suite format
//!
//! ```yaml
//! name: vstest.Tests
//! helpers:
//!   other:
//!     - assert_eq: { expected: 1, actual: $0 }
//! tests:
//!   - name: TestValid
//!     steps:
//!       - pass: Test is valid.
//!   - name: SupClassTest
//!     params: [int]
//!     cases: [[1], [2]]
//!     steps:
//!       - call: { helper: other, args: [$0] }
//! ```
//!
//! Operands written as `$N` read argument `N` of the current frame, `@key`
//! reads per-invocation fixture state, and `$$...` escapes a literal dollar.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::assertion;
use crate::context::TestContext;
use crate::definition::{ParameterSet, TestDefinition, TestSuite};
use crate::diagnostics::{EngineError, EngineResult};
use crate::signal::{BodyResult, Signal};
use crate::value::{ParamKind, Value};

/// Helper calls nested deeper than this are a fault.
const MAX_CALL_DEPTH: usize = 64;

// =============================================================================
// FILE FORMAT
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteFile {
    name: Option<String>,
    #[serde(default)]
    helpers: BTreeMap<String, Vec<Step>>,
    #[serde(default)]
    tests: Vec<TestSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TestSpec {
    name: String,
    #[serde(default)]
    params: Vec<ParamKind>,
    #[serde(default)]
    cases: Vec<Vec<Value>>,
    #[serde(default)]
    fixture: BTreeMap<String, Value>,
    #[serde(default)]
    setup: Vec<Step>,
    #[serde(default)]
    steps: Vec<Step>,
    #[serde(default)]
    teardown: Vec<Step>,
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    Print(Operand),
    Pass(Option<String>),
    Fail(Option<String>),
    Inconclusive(Option<String>),
    Throw {
        category: String,
        message: String,
    },
    AssertEq {
        expected: Operand,
        actual: Operand,
    },
    AssertTrue {
        value: Operand,
        #[serde(default)]
        message: Option<String>,
    },
    Set {
        key: String,
        value: Operand,
    },
    Call {
        helper: String,
        #[serde(default)]
        args: Vec<Operand>,
    },
    Panic(Option<String>),
}

/// A step argument: a literal, a bound argument, or fixture state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum Operand {
    Literal(Value),
    Arg(usize),
    State(String),
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        let Value::Str(text) = &value else {
            return Operand::Literal(value);
        };
        if let Some(escaped) = text.strip_prefix("$$") {
            return Operand::Literal(Value::Str(format!("${escaped}")));
        }
        if let Some(index) = text.strip_prefix('$').and_then(|n| n.parse().ok()) {
            return Operand::Arg(index);
        }
        if let Some(key) = text.strip_prefix('@').filter(|k| !k.is_empty()) {
            return Operand::State(key.to_string());
        }
        Operand::Literal(value)
    }
}

/// Per-invocation fixture holder for scripted tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptState(pub BTreeMap<String, Value>);

// =============================================================================
// INTERPRETER
// =============================================================================

struct Script {
    helpers: BTreeMap<String, Vec<Step>>,
}

impl Script {
    fn run(&self, steps: &[Step], args: &[Value], ctx: &mut TestContext, depth: usize) -> BodyResult {
        for step in steps {
            self.step(step, args, ctx, depth)
                .map_err(Signal::without_location)?;
        }
        Ok(())
    }

    fn step(&self, step: &Step, args: &[Value], ctx: &mut TestContext, depth: usize) -> BodyResult {
        match step {
            Step::Print(operand) => {
                let text = plain(&resolve(operand, args, ctx)?);
                ctx.emit(text);
                Ok(())
            }
            Step::Pass(message) => assertion::pass(message.as_deref()),
            Step::Fail(message) => assertion::fail(message.as_deref()),
            Step::Inconclusive(message) => assertion::inconclusive(message.as_deref()),
            Step::Throw { category, message } => assertion::fault(category, message),
            Step::AssertEq { expected, actual } => {
                let expected = resolve(expected, args, ctx)?;
                let actual = resolve(actual, args, ctx)?;
                assertion::equal_display(expected, actual)
            }
            Step::AssertTrue { value, message } => {
                let value = resolve(value, args, ctx)?;
                let message = message
                    .clone()
                    .unwrap_or_else(|| format!("Expected: True But was: {value}"));
                assertion::is_true(value == Value::Bool(true), message)
            }
            Step::Set { key, value } => {
                let value = resolve(value, args, ctx)?;
                ctx.fixture_mut::<ScriptState>()?.0.insert(key.clone(), value);
                Ok(())
            }
            Step::Call { helper, args: operands } => {
                if depth >= MAX_CALL_DEPTH {
                    return assertion::fault(
                        "RecursionLimit",
                        &format!("helper `{helper}` nested deeper than {MAX_CALL_DEPTH}"),
                    );
                }
                let steps = self.helpers.get(helper.as_str()).ok_or_else(|| {
                    Signal::fault("UnknownHelper", format!("no helper named `{helper}`"))
                })?;
                let frame = operands
                    .iter()
                    .map(|operand| resolve(operand, args, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                self.run(steps, &frame, ctx, depth + 1)
            }
            Step::Panic(message) => {
                panic!("{}", message.as_deref().unwrap_or("scripted panic"))
            }
        }
    }
}

fn resolve(operand: &Operand, args: &[Value], ctx: &TestContext) -> Result<Value, Signal> {
    match operand {
        Operand::Literal(value) => Ok(value.clone()),
        Operand::Arg(index) => args.get(*index).cloned().ok_or_else(|| {
            Signal::fault(
                "ArgumentError",
                format!("no argument ${index} ({} bound)", args.len()),
            )
        }),
        Operand::State(key) => ctx
            .fixture::<ScriptState>()?
            .0
            .get(key)
            .cloned()
            .ok_or_else(|| Signal::fault("StateError", format!("no fixture value `@{key}`"))),
    }
}

/// Text form used by `print`: strings unquoted, everything else as displayed.
fn plain(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// LOADING AND DISCOVERY
// =============================================================================

/// Parses one suite from YAML text. `path` is only used for diagnostics and
/// the default suite name.
pub fn parse_suite(path: &Path, content: &str) -> EngineResult<TestSuite> {
    let file: SuiteFile = serde_yaml::from_str(content)
        .map_err(|e| EngineError::yaml("suite", path, content, &e))?;
    validate(path, &file)?;

    let name = file.name.clone().unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let script = Arc::new(Script {
        helpers: file.helpers,
    });

    let mut suite = TestSuite::new(name);
    for spec in file.tests {
        suite = suite.test(compile(spec, &script));
    }
    debug!(suite = %suite.name, tests = suite.len(), "loaded scripted suite");
    Ok(suite)
}

pub fn load_suite(path: &Path) -> EngineResult<TestSuite> {
    let content = fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
    parse_suite(path, &content)
}

/// Discovers all YAML files under `root`, sorted by path. A file path is
/// returned as-is.
pub fn discover_yaml_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Loads every suite under `root`, in deterministic order.
pub fn discover(root: &Path) -> EngineResult<Vec<TestSuite>> {
    if !root.exists() {
        return Err(EngineError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        ));
    }
    discover_yaml_files(root)
        .iter()
        .map(|path| load_suite(path))
        .collect()
}

fn compile(spec: TestSpec, script: &Arc<Script>) -> TestDefinition {
    let steps = Arc::new(spec.steps);
    let body_script = Arc::clone(script);
    let mut definition = TestDefinition::new(spec.name, move |ctx| {
        let args = ctx.args().to_vec();
        body_script.run(&steps, &args, ctx, 0)
    })
    .with_params(spec.params);

    definition.parameter_sets = spec.cases.into_iter().map(ParameterSet).collect();

    let initial = ScriptState(spec.fixture);
    definition = definition.with_fixture(move || Ok(initial.clone()));

    if !spec.setup.is_empty() {
        let setup = Arc::new(spec.setup);
        let setup_script = Arc::clone(script);
        definition = definition.with_setup(move |ctx| {
            let args = ctx.args().to_vec();
            setup_script.run(&setup, &args, ctx, 0)
        });
    }
    if !spec.teardown.is_empty() {
        let teardown = Arc::new(spec.teardown);
        let teardown_script = Arc::clone(script);
        definition = definition.with_teardown(move |ctx| {
            let args = ctx.args().to_vec();
            teardown_script.run(&teardown, &args, ctx, 0)
        });
    }
    definition
}

/// Static checks that would otherwise only surface as faults at run time.
fn validate(path: &Path, file: &SuiteFile) -> EngineResult<()> {
    let invalid = |message: String| EngineError::Suite {
        path: path.to_path_buf(),
        message,
    };

    let all_steps = file
        .helpers
        .values()
        .chain(file.tests.iter().flat_map(|t| [&t.setup, &t.steps, &t.teardown]));
    for steps in all_steps {
        for step in steps {
            if let Step::Call { helper, .. } = step {
                if !file.helpers.contains_key(helper) {
                    return Err(invalid(format!("call to unknown helper `{helper}`")));
                }
            }
        }
    }

    for test in &file.tests {
        if test.name.trim().is_empty() {
            return Err(invalid("test with an empty name".to_string()));
        }
        for step in test.setup.iter().chain(&test.steps).chain(&test.teardown) {
            for index in arg_refs(step) {
                if index >= test.params.len() {
                    return Err(invalid(format!(
                        "test `{}` reads ${index} but declares {} parameter(s)",
                        test.name,
                        test.params.len()
                    )));
                }
            }
        }
    }
    Ok(())
}

fn arg_refs(step: &Step) -> Vec<usize> {
    let operands: Vec<&Operand> = match step {
        Step::Print(o) => vec![o],
        Step::AssertEq { expected, actual } => vec![expected, actual],
        Step::AssertTrue { value, .. } => vec![value],
        Step::Set { value, .. } => vec![value],
        Step::Call { args, .. } => args.iter().collect(),
        _ => vec![],
    };
    operands
        .into_iter()
        .filter_map(|o| match o {
            Operand::Arg(index) => Some(*index),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_parse_from_plain_values() {
        assert_eq!(Operand::from(Value::from("$0")), Operand::Arg(0));
        assert_eq!(Operand::from(Value::from("@count")), Operand::State("count".into()));
        assert_eq!(
            Operand::from(Value::from("$$5")),
            Operand::Literal(Value::from("$5"))
        );
        assert_eq!(Operand::from(Value::Int(3)), Operand::Literal(Value::Int(3)));
        assert_eq!(Operand::from(Value::from("@")), Operand::Literal(Value::from("@")));
    }

    #[test]
    fn steps_parse_from_single_key_maps() {
        let steps: Vec<Step> = serde_yaml::from_str(
            r#"
- print: hello
- fail: null
- throw: { category: InvalidOperationException, message: Test-exception }
- assert_eq: { expected: 1, actual: $0 }
"#,
        )
        .unwrap();
        assert_eq!(steps[0], Step::Print(Operand::Literal(Value::from("hello"))));
        assert_eq!(steps[1], Step::Fail(None));
        assert!(matches!(steps[2], Step::Throw { .. }));
        assert_eq!(
            steps[3],
            Step::AssertEq {
                expected: Operand::Literal(Value::Int(1)),
                actual: Operand::Arg(0)
            }
        );
    }

    #[test]
    fn suite_names_qualify_tests() {
        let suite = parse_suite(
            Path::new("math.yaml"),
            "tests:\n  - name: adds\n    steps: [ { assert_eq: { expected: 2, actual: 2 } } ]\n",
        )
        .unwrap();
        assert_eq!(suite.name, "math");
        assert_eq!(suite.definitions[0].name, "math.adds");
    }

    #[test]
    fn unknown_helpers_and_unbound_args_are_rejected() {
        let err = parse_suite(
            Path::new("bad.yaml"),
            "tests:\n  - name: t\n    steps: [ { call: { helper: nope } } ]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown helper"));

        let err = parse_suite(
            Path::new("bad.yaml"),
            "tests:\n  - name: t\n    steps: [ { print: $1 } ]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("$1"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_suite(Path::new("broken.yaml"), "tests: [").unwrap_err();
        assert!(matches!(err, EngineError::Parse { .. }));
    }
}
