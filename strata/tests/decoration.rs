//! Rollup and decoration-chain behavior.

use std::cell::Cell;
use std::rc::Rc;

use strata::{Activators, LazyContainer, ResolveError, Scope, activators, lazy, rollup};

#[test]
fn combines_maps_that_depend_on_one_another() {
    strata_testhelpers::setup();

    let a_activators = activators! {
        "a" => |_: &Scope<String>| Ok("value a".to_owned()),
    };
    let b_activators = activators! {
        "b" => |scope: &Scope<String>| Ok(format!("b saw: {}", scope.get("a")?)),
    };
    let c_activators = activators! {
        "c" => |scope: &Scope<String>| {
            Ok(format!(
                "c combined a and b- a: {}; b: {}",
                scope.get("a")?,
                scope.get("b")?
            ))
        },
    };

    let dependencies = lazy(rollup([a_activators, b_activators, c_activators]));

    assert_eq!(dependencies.get("a").unwrap().as_str(), "value a");
    assert_eq!(dependencies.get("b").unwrap().as_str(), "b saw: value a");
    assert_eq!(
        dependencies.get("c").unwrap().as_str(),
        "c combined a and b- a: value a; b: b saw: value a"
    );
}

#[test]
fn supports_decoration() {
    strata_testhelpers::setup();

    let original = activators! {
        "a" => |_: &Scope<String>| Ok("original".to_owned()),
    };
    let decorated = activators! {
        "a" => |scope: &Scope<String>| Ok(format!("decorated {}", scope.get("a")?)),
    };

    let container = lazy(rollup([original, decorated]));

    assert_eq!(container.get("a").unwrap().as_str(), "decorated original");
}

#[test]
fn all_activators_except_the_decorator_see_the_decorated_value() {
    strata_testhelpers::setup();

    let original = activators! {
        "a" => |_: &Scope<String>| Ok("original".to_owned()),
        "b" => |scope: &Scope<String>| Ok(format!("b saw {}", scope.get("a")?)),
    };
    let decorated = activators! {
        "a" => |scope: &Scope<String>| Ok(format!("decorated {}", scope.get("a")?)),
    };

    let container = lazy(rollup([original, decorated]));

    assert_eq!(container.get("a").unwrap().as_str(), "decorated original");
    assert_eq!(container.get("b").unwrap().as_str(), "b saw decorated original");
}

#[test]
fn decoration_is_still_lazy() {
    strata_testhelpers::setup();

    let original_calls = Rc::new(Cell::new(0i32));
    let decorated_calls = Rc::new(Cell::new(0i32));

    let original = {
        let calls = Rc::clone(&original_calls);
        Activators::new().provide("a", move |_: &Scope<i32>| {
            calls.set(calls.get() + 1);
            Ok(calls.get())
        })
    };
    let decorated = {
        let calls = Rc::clone(&decorated_calls);
        Activators::new().provide("a", move |scope: &Scope<i32>| {
            calls.set(calls.get() + 1);
            Ok(*scope.get("a")? + calls.get())
        })
    };

    let container = lazy(rollup([original, decorated]));

    assert_eq!(*container.get("a").unwrap(), 2);
    assert_eq!(*container.get("a").unwrap(), 2);
    assert_eq!(original_calls.get(), 1);
    assert_eq!(decorated_calls.get(), 1);
}

#[test]
fn supports_decoration_with_a_long_chain() {
    strata_testhelpers::setup();

    let a_activators = activators! {
        "a" => |_: &Scope<String>| Ok("value a".to_owned()),
    };
    let a_decorator = activators! {
        "a" => |scope: &Scope<String>| Ok(format!("decorated {}", scope.get("a")?)),
    };
    let b_activators = activators! {
        "b" => |scope: &Scope<String>| Ok(format!("b saw: '{}'", scope.get("a")?)),
    };
    let c_activators = activators! {
        "c" => |scope: &Scope<String>| {
            Ok(format!(
                "c combined a and b: {{a: \"{}\", b: \"{}\"}}",
                scope.get("a")?,
                scope.get("b")?
            ))
        },
    };

    let dependencies = lazy(rollup([a_activators, a_decorator, b_activators, c_activators]));

    assert_eq!(dependencies.get("a").unwrap().as_str(), "decorated value a");
    assert_eq!(
        dependencies.get("b").unwrap().as_str(),
        "b saw: 'decorated value a'"
    );
    assert_eq!(
        dependencies.get("c").unwrap().as_str(),
        "c combined a and b: {a: \"decorated value a\", b: \"b saw: 'decorated value a'\"}"
    );
}

#[test]
fn stacked_decorators_resolve_in_input_order() {
    strata_testhelpers::setup();

    let base = activators! {
        "a" => |_: &Scope<String>| Ok("base".to_owned()),
        "b" => |scope: &Scope<String>| Ok(format!("b saw {}", scope.get("a")?)),
    };
    let first = activators! {
        "a" => |scope: &Scope<String>| Ok(format!("first({})", scope.get("a")?)),
    };
    let second = activators! {
        "a" => |scope: &Scope<String>| Ok(format!("second({})", scope.get("a")?)),
    };
    let third = activators! {
        "a" => |scope: &Scope<String>| Ok(format!("third({})", scope.get("a")?)),
    };

    let merged = rollup([base, first, second, third]);
    assert_eq!(merged.layer_count("a"), 4);
    assert_eq!(merged.layer_count("b"), 1);

    let container = lazy(merged);
    assert_eq!(
        container.get("a").unwrap().as_str(),
        "third(second(first(base)))"
    );
    assert_eq!(
        container.get("b").unwrap().as_str(),
        "b saw third(second(first(base)))"
    );
}

/// Three equivalent groupings of the same maps must produce the same
/// observable values.
#[test]
fn rollup_is_associative_for_observable_values() {
    strata_testhelpers::setup();

    fn base() -> Activators<String> {
        activators! {
            "a" => |_: &Scope<String>| Ok("base".to_owned()),
            "b" => |scope: &Scope<String>| Ok(format!("b saw {}", scope.get("a")?)),
        }
    }
    fn deco_one() -> Activators<String> {
        activators! {
            "a" => |scope: &Scope<String>| Ok(format!("one({})", scope.get("a")?)),
        }
    }
    fn deco_two() -> Activators<String> {
        activators! {
            "a" => |scope: &Scope<String>| Ok(format!("two({})", scope.get("a")?)),
        }
    }

    fn observe(container: &LazyContainer<String>) -> (String, String) {
        (
            container.get("a").unwrap().to_string(),
            container.get("b").unwrap().to_string(),
        )
    }

    let flat = lazy(rollup([base(), deco_one(), deco_two()]));
    let left = lazy(rollup([rollup([base(), deco_one()]), deco_two()]));
    let right = lazy(rollup([base(), rollup([deco_one(), deco_two()])]));

    let expected = ("two(one(base))".to_owned(), "b saw two(one(base))".to_owned());
    assert_eq!(observe(&flat), expected);
    assert_eq!(observe(&left), expected);
    assert_eq!(observe(&right), expected);
}

#[test]
fn rollup_without_collisions_is_a_plain_union() {
    strata_testhelpers::setup();

    let left = activators! {
        "a" => |_: &Scope<String>| Ok("a".to_owned()),
    };
    let right = activators! {
        "b" => |_: &Scope<String>| Ok("b".to_owned()),
    };

    let container = lazy(rollup([left, right]));

    assert_eq!(container.get("a").unwrap().as_str(), "a");
    assert_eq!(container.get("b").unwrap().as_str(), "b");
}

#[test]
fn a_failing_decorator_keeps_lower_layers_cached() {
    strata_testhelpers::setup();

    let base_calls = Rc::new(Cell::new(0u32));
    let decorator_calls = Rc::new(Cell::new(0u32));

    let base = {
        let calls = Rc::clone(&base_calls);
        Activators::new().provide("a", move |_: &Scope<u32>| {
            calls.set(calls.get() + 1);
            Ok(10)
        })
    };
    let decorator = {
        let calls = Rc::clone(&decorator_calls);
        Activators::new().provide("a", move |scope: &Scope<u32>| {
            calls.set(calls.get() + 1);
            let below = *scope.get("a")?;
            if calls.get() == 1 {
                Err(ResolveError::failure("decorator not ready"))
            } else {
                Ok(below + 1)
            }
        })
    };

    let container = lazy(rollup([base, decorator]));

    assert!(container.get("a").is_err());
    assert_eq!(*container.get("a").unwrap(), 11);

    // The decorator retried; the already-resolved base layer did not rerun.
    assert_eq!(decorator_calls.get(), 2);
    assert_eq!(base_calls.get(), 1);
}

#[test]
fn the_base_layer_of_a_chain_has_no_prior_value() {
    strata_testhelpers::setup();

    let base = activators! {
        "a" => |scope: &Scope<String>| Ok(format!("base saw {}", scope.get("a")?)),
    };
    let decorator = activators! {
        "a" => |scope: &Scope<String>| Ok(format!("decorated {}", scope.get("a")?)),
    };

    let container = lazy(rollup([base, decorator]));

    let err = container.get("a").unwrap_err();
    assert_eq!(err, ResolveError::NoEarlierLayer { key: "a".to_owned() });
}
