use serde::Serialize;

/// Which attributes a query or scan returns.
///
/// ```rust
/// use dynamodb_rpc::common::selection::Select;
///
/// assert_eq!(serde_json::to_value(Select::Count).unwrap(), "COUNT");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Select {
    /// Every attribute of every matching item.
    #[default]
    AllAttributes,
    /// Every attribute projected into the queried index.
    AllProjectedAttributes,
    /// Only the attributes named in the projection.
    SpecificAttributes,
    /// Only the number of matching items.
    Count,
}

/// Projection: the attribute names to return.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Projection(Vec<String>);

impl Projection {
    /// Project the given attribute names, in order, without duplicates.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut projection: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !projection.contains(&name) {
                projection.push(name);
            }
        }
        Self(projection)
    }

    /// Whether no attribute is projected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_names(self) -> Vec<String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::all(Select::AllAttributes, "ALL_ATTRIBUTES")]
    #[case::projected(Select::AllProjectedAttributes, "ALL_PROJECTED_ATTRIBUTES")]
    #[case::specific(Select::SpecificAttributes, "SPECIFIC_ATTRIBUTES")]
    #[case::count(Select::Count, "COUNT")]
    fn test_select_wire_name(#[case] select: Select, #[case] expected: &str) {
        assert_eq!(serde_json::to_value(select).unwrap(), expected);
    }

    #[rstest]
    #[case::single(vec!["a"], vec!["a"])]
    #[case::keeps_order(vec!["b", "a"], vec!["b", "a"])]
    #[case::drops_duplicates(vec!["a", "b", "a"], vec!["a", "b"])]
    fn test_projection(#[case] names: Vec<&str>, #[case] expected: Vec<&str>) {
        let actual = Projection::new(names).into_names();
        assert_eq!(actual, expected);
    }
}
