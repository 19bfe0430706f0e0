//! Case expansion: one definition in, an ordered list of invocations out.
//!
//! Expansion is pure. It validates every parameter set against the declared
//! parameters and renders display names, failing fast on a collision instead
//! of letting two results share a name later.

use std::collections::HashMap;
use std::sync::Arc;

use crate::definition::{ParameterSet, TestDefinition};
use crate::diagnostics::ExpansionError;

/// One concrete, independently executable run of a definition.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub definition: Arc<TestDefinition>,
    pub parameters: Option<ParameterSet>,
    pub display_name: String,
}

impl Invocation {
    /// Arguments to bind, in declaration order.
    pub fn args(&self) -> Vec<crate::value::Value> {
        self.parameters
            .as_ref()
            .map(|set| set.values().to_vec())
            .unwrap_or_default()
    }
}

/// Renders the display name for `definition` bound to `parameters`.
pub fn display_name(definition: &TestDefinition, parameters: Option<&ParameterSet>) -> String {
    match parameters {
        Some(set) => format!("{}{}", definition.name, set),
        None => definition.name.clone(),
    }
}

/// Expands a definition into its invocations.
///
/// - zero parameter sets: exactly one invocation with no arguments
/// - N parameter sets: N invocations, in declaration order
pub fn expand(definition: &Arc<TestDefinition>) -> Result<Vec<Invocation>, ExpansionError> {
    if !definition.is_parameterized() {
        return Ok(vec![Invocation {
            definition: Arc::clone(definition),
            parameters: None,
            display_name: display_name(definition, None),
        }]);
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut invocations = Vec::with_capacity(definition.parameter_sets.len());

    for (index, set) in definition.parameter_sets.iter().enumerate() {
        check_parameters(definition, index, set)?;

        let name = display_name(definition, Some(set));
        if let Some(&first) = seen.get(&name) {
            return Err(ExpansionError::DuplicateInvocationName {
                name,
                first: format!("#{first} {}", definition.parameter_sets[first]),
                second: format!("#{index} {set}"),
            });
        }
        seen.insert(name.clone(), index);

        invocations.push(Invocation {
            definition: Arc::clone(definition),
            parameters: Some(set.clone()),
            display_name: name,
        });
    }

    Ok(invocations)
}

fn check_parameters(
    definition: &TestDefinition,
    index: usize,
    set: &ParameterSet,
) -> Result<(), ExpansionError> {
    let mismatch = |reason: String| ExpansionError::ParameterMismatch {
        definition: definition.name.clone(),
        index,
        reason,
    };

    if set.len() != definition.params.len() {
        return Err(mismatch(format!(
            "expected {} argument(s), got {}",
            definition.params.len(),
            set.len()
        )));
    }

    for (position, (kind, value)) in definition.params.iter().zip(set.values()).enumerate() {
        if !kind.accepts(value) {
            return Err(mismatch(format!(
                "argument {position} is {}, expected {kind}",
                value.type_name()
            )));
        }
    }

    Ok(())
}
