//! Test definitions as supplied by a discovery collaborator.
//!
//! A [`TestDefinition`] is immutable once built. Bodies, hooks and fixture
//! factories are shared behind `Arc` so definitions can be read from every
//! worker of a parallel run without copying.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::context::TestContext;
use crate::signal::BodyResult;
use crate::value::{ParamKind, Value};

/// Executable test body.
pub type TestBody = Arc<dyn Fn(&mut TestContext) -> BodyResult + Send + Sync>;

/// Setup or teardown routine; same shape as a body.
pub type Hook = TestBody;

/// Builds one fresh fixture-holder instance.
pub type FixtureFactory = Arc<dyn Fn() -> Result<Box<dyn Any + Send>, String> + Send + Sync>;

/// Ordered arguments for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet(pub Vec<Value>);

impl ParameterSet {
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(Value::to_string).collect();
        write!(f, "({})", rendered.join(", "))
    }
}

/// A named, parameterizable test body.
#[derive(Clone)]
pub struct TestDefinition {
    pub name: String,
    pub params: Vec<ParamKind>,
    pub parameter_sets: Vec<ParameterSet>,
    pub body: TestBody,
    pub setup: Option<Hook>,
    pub teardown: Option<Hook>,
    pub fixture: Option<FixtureFactory>,
}

impl TestDefinition {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut TestContext) -> BodyResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            parameter_sets: Vec::new(),
            body: Arc::new(body),
            setup: None,
            teardown: None,
            fixture: None,
        }
    }

    /// Declares the body's parameter kinds, in order.
    pub fn with_params(mut self, params: impl IntoIterator<Item = ParamKind>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Adds one parameter set; declaration order is invocation order.
    pub fn case<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.parameter_sets.push(ParameterSet::new(values));
        self
    }

    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(&mut TestContext) -> BodyResult + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(setup));
        self
    }

    pub fn with_teardown<F>(mut self, teardown: F) -> Self
    where
        F: Fn(&mut TestContext) -> BodyResult + Send + Sync + 'static,
    {
        self.teardown = Some(Arc::new(teardown));
        self
    }

    /// Registers a factory for the per-invocation fixture holder. The factory
    /// runs once per invocation; instances are never shared.
    pub fn with_fixture<T, F>(mut self, factory: F) -> Self
    where
        T: Any + Send,
        F: Fn() -> Result<T, String> + Send + Sync + 'static,
    {
        self.fixture = Some(Arc::new(move || {
            factory().map(|instance| Box::new(instance) as Box<dyn Any + Send>)
        }));
        self
    }

    pub fn is_parameterized(&self) -> bool {
        !self.parameter_sets.is_empty()
    }
}

impl fmt::Debug for TestDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDefinition")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("parameter_sets", &self.parameter_sets)
            .field("setup", &self.setup.is_some())
            .field("teardown", &self.teardown.is_some())
            .field("fixture", &self.fixture.is_some())
            .finish()
    }
}

/// A source grouping of definitions, kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct TestSuite {
    pub name: String,
    pub definitions: Vec<Arc<TestDefinition>>,
}

impl TestSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: Vec::new(),
        }
    }

    /// Adds a definition, qualifying its name with the suite name.
    pub fn test(mut self, definition: TestDefinition) -> Self {
        let definition = definition.qualified(&self.name);
        self.push(definition);
        self
    }

    pub fn push(&mut self, definition: TestDefinition) {
        self.definitions.push(Arc::new(definition));
    }

    /// Keeps only definitions whose name contains `pattern`.
    pub fn filter(&self, pattern: &str) -> Self {
        Self {
            name: self.name.clone(),
            definitions: self
                .definitions
                .iter()
                .filter(|d| d.name.contains(pattern))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl TestDefinition {
    fn qualified(mut self, prefix: &str) -> Self {
        if !prefix.is_empty() {
            self.name = format!("{prefix}.{}", self.name);
        }
        self
    }
}
