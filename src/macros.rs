/// Builds a [`Node`](crate::Node) from a JSON-like literal.
///
/// Object fields keep the order they are written in.
///
/// ```rust
/// use serde_mapper::{node, Node};
///
/// let doc = node!({ "id": 1, "tags": ["a", "b"], "extra": null });
/// assert_eq!(doc.get("id"), Some(&Node::from(1)));
/// ```
#[macro_export]
macro_rules! node {
    (null) => {
        $crate::Node::Null
    };

    (true) => {
        $crate::Node::Bool(true)
    };

    (false) => {
        $crate::Node::Bool(false)
    };

    ([]) => {
        $crate::Node::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Node::Array(vec![$($crate::node!($elem)),*])
    };

    ({}) => {
        $crate::Node::Object($crate::NodeMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::NodeMap::new();
        $(
            object.insert($key.to_string(), $crate::node!($value));
        )*
        $crate::Node::Object(object)
    }};

    // Negative numeric literals arrive as two tokens.
    (- $num:literal) => {
        $crate::Node::from(-$num)
    };

    ($other:expr) => {
        $crate::Node::from($other)
    };
}
