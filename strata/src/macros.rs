//! Construction macro for activator maps.

/// Build an [`Activators`](crate::Activators) map from `key => activator`
/// pairs.
///
/// Sugar over [`Activators::new`](crate::Activators::new) plus
/// [`insert`](crate::Activators::insert); keys registered twice keep the last
/// registration, like repeated `insert` calls.
///
/// ```
/// use strata::{Scope, activators, lazy};
///
/// let map = activators! {
///     "a" => |_: &Scope<String>| Ok("value a".to_owned()),
///     "b" => |scope: &Scope<String>| Ok(format!("b saw: {}", scope.get("a")?)),
/// };
///
/// let container = lazy(map);
/// assert_eq!(container.get("a").unwrap().as_str(), "value a");
/// ```
#[macro_export]
macro_rules! activators {
    () => {
        $crate::Activators::new()
    };
    ($($key:expr => $activator:expr),+ $(,)?) => {{
        let mut map = $crate::Activators::new();
        $(map.insert($key, $activator);)+
        map
    }};
}
