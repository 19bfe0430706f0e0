#![allow(dead_code)]

use std::thread;
use std::time::Duration;

use verdict::prelude::*;

#[derive(Debug, thiserror::Error)]
#[error("Test-exception")]
pub struct InvalidOperation;

/// The five fixture scenarios: pass, comparison failure, thrown fault,
/// explicit failure with output, and a parameterized nested assertion.
pub fn vstest_suite() -> TestSuite {
    TestSuite::new("vstest.Tests")
        .test(TestDefinition::new("TestValid", |_| {
            assertion::pass(Some("Test is valid."))
        }))
        .test(TestDefinition::new("Test1", |_| assertion::equal(1, 2)))
        .test(TestDefinition::new("Test2", |_| {
            Err::<(), _>(InvalidOperation).or_fault()
        }))
        .test(TestDefinition::new("Test3", |ctx| {
            ctx.emit("Console-output message");
            assertion::fail(None)
        }))
        .test(
            TestDefinition::new("SupClassTest", |ctx| {
                let test_data: i64 = ctx.arg(0)?;
                sup_class::method(test_data)
            })
            .with_params([ParamKind::Int])
            .case([1])
            .case([2]),
        )
}

pub mod sup_class {
    use verdict::prelude::*;

    pub fn method(test_data: i64) -> BodyResult {
        other(test_data)
    }

    fn other(test_data: i64) -> BodyResult {
        assertion::equal(1, test_data)
    }
}

/// A body that sleeps, then emits its own tag `times` times.
pub fn chatty(name: &str, sleep_ms: u64, times: usize) -> TestDefinition {
    let tag = name.to_string();
    TestDefinition::new(name, move |ctx| {
        for _ in 0..times {
            thread::sleep(Duration::from_millis(sleep_ms));
            ctx.emit(&tag);
        }
        Ok(())
    })
}

pub fn sleeper(name: &str, sleep_ms: u64) -> TestDefinition {
    TestDefinition::new(name, move |_| {
        thread::sleep(Duration::from_millis(sleep_ms));
        Ok(())
    })
}

pub fn names(report: &Report) -> Vec<String> {
    report
        .results()
        .iter()
        .map(|r| r.invocation_name.clone())
        .collect()
}

pub fn kinds(report: &Report) -> Vec<OutcomeKind> {
    report.results().iter().map(|r| r.kind()).collect()
}
