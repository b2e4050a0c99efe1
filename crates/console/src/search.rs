//! Client-side list filtering.
//!
//! Matching is a case-insensitive substring test over a record's
//! `search_fields`. It never touches the network.

use grocerdesk_client::Collection;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    term: String,
    needle: String,
}

impl SearchFilter {
    pub fn new(term: impl Into<String>) -> Self {
        let mut filter = Self::default();
        filter.set(term);
        filter
    }

    pub fn set(&mut self, term: impl Into<String>) {
        self.term = term.into();
        self.needle = self.term.trim().to_lowercase();
    }

    /// The term as typed.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches<T: Collection>(&self, record: &T) -> bool {
        self.is_empty()
            || record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&self.needle))
    }

    /// Matching records in their original order.
    pub fn apply<'a, T: Collection>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|record| self.matches(*record)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocerdesk_client::{AuthPolicy, Envelope};
    use grocerdesk_core::RecordId;
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Shelf {
        id: RecordId,
        name: String,
        aisle: String,
    }

    impl Collection for Shelf {
        const BASE_PATH: &'static str = "/shelves";
        const LABEL: &'static str = "shelf";
        const AUTH: AuthPolicy = AuthPolicy::Public;
        const LIST_ENVELOPE: Envelope = Envelope::Bare;
        const RECORD_ENVELOPE: Envelope = Envelope::Bare;

        fn id(&self) -> &RecordId {
            &self.id
        }

        fn display_name(&self) -> &str {
            &self.name
        }

        fn search_fields(&self) -> Vec<&str> {
            vec![self.name.as_str(), self.aisle.as_str()]
        }
    }

    fn shelf(id: &str, name: &str, aisle: &str) -> Shelf {
        Shelf {
            id: RecordId::new(id),
            name: name.to_string(),
            aisle: aisle.to_string(),
        }
    }

    #[test]
    fn empty_term_matches_everything() {
        let items = vec![shelf("a", "Fruits", "1"), shelf("b", "Dairy", "2")];
        assert_eq!(SearchFilter::default().apply(&items).len(), 2);
        assert_eq!(SearchFilter::new("   ").apply(&items).len(), 2);
    }

    #[test]
    fn matching_ignores_case_and_checks_every_search_field() {
        let items = vec![
            shelf("a", "Fresh Fruits", "north"),
            shelf("b", "Dairy", "North-East"),
            shelf("c", "Bakery", "south"),
        ];

        let names: Vec<_> = SearchFilter::new("FRUIT")
            .apply(&items)
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, ["Fresh Fruits"]);

        let ids: Vec<_> = SearchFilter::new("north")
            .apply(&items)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn term_is_kept_as_typed() {
        let filter = SearchFilter::new(" Milk ");
        assert_eq!(filter.term(), " Milk ");
        assert!(filter.matches(&shelf("a", "milk & eggs", "1")));
    }

    proptest! {
        #[test]
        fn filtered_list_is_an_ordered_subset_of_matches(
            names in proptest::collection::vec("[a-zA-Z ]{0,12}", 0..20),
            term in "[a-zA-Z]{0,4}",
        ) {
            let items: Vec<Shelf> = names
                .iter()
                .enumerate()
                .map(|(i, n)| shelf(&format!("id-{i}"), n, ""))
                .collect();
            let filter = SearchFilter::new(term.clone());
            let visible = filter.apply(&items);

            let expected: Vec<&Shelf> = items
                .iter()
                .filter(|s| s.name.to_lowercase().contains(&term.to_lowercase()))
                .collect();
            prop_assert_eq!(
                visible.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
                expected.iter().map(|s| s.id.as_str()).collect::<Vec<_>>()
            );
        }
    }
}
