//! Lint rules for timed branches, using Validation.

use crate::config::ImplicitTimersConfig;
use crate::core::{Node, Spec, TimeExpr};
use crate::lint::violations::LintViolation;
use serde_json::Value;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type LintResult = Validation<(), NonEmptyVec<LintViolation>>;

/// Lint every node of `spec`, accumulating ALL violations.
/// Returns Validation::Success(()) if no timed branch is suspicious.
/// Nodes are visited in name order so findings are stable.
pub fn lint_spec(spec: &Spec, config: &ImplicitTimersConfig) -> LintResult {
    let mut names: Vec<&String> = spec.nodes.keys().collect();
    names.sort();

    let checks: Vec<LintResult> = names
        .into_iter()
        .filter_map(|name| spec.node(name).map(|node| lint_node(name, node, config)))
        .collect();

    combine(checks)
}

/// Lint a single node.
pub fn lint_node(name: &str, node: &Node, config: &ImplicitTimersConfig) -> LintResult {
    let Some(branches) = &node.branches else {
        return Validation::success(());
    };
    let timed: Vec<(usize, &Value)> = branches
        .branches
        .iter()
        .enumerate()
        .filter_map(|(i, b)| b.after().map(|after| (i, after)))
        .collect();

    let mut checks: Vec<LintResult> = Vec::new();

    if !branches.kind.is_message() {
        for (branch, _) in &timed {
            checks.push(Validation::fail(LintViolation::IgnoredAfter {
                node: name.to_string(),
                branch: *branch,
            }));
        }
        return combine(checks);
    }

    if timed.len() > 1 {
        checks.push(Validation::fail(LintViolation::MultipleTimedBranches {
            node: name.to_string(),
            count: timed.len(),
        }));
    }

    for (branch, after) in timed {
        // Variables are only known once the node is entered.
        if matches!(after, Value::String(s) if config.is_variable(s)) {
            continue;
        }
        let check = match TimeExpr::parse(after) {
            Ok(_) => Validation::success(()),
            Err(source) => Validation::fail(LintViolation::UninterpretableAfter {
                node: name.to_string(),
                branch,
                after: after.clone(),
                source,
            }),
        };
        checks.push(check);
    }

    combine(checks)
}

// Accumulate failures using all_vec.
fn combine(checks: Vec<LintResult>) -> LintResult {
    if checks.is_empty() {
        return Validation::success(());
    }
    Validation::all_vec(checks).map(|_| ())
}
