use std::cmp::Ordering;
use std::collections::HashSet;

use clinicase_core::{compare_recency, CaseId, PatientCase};

/// Result of [`CaseStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Authoritative in-memory collection of persisted cases.
///
/// Entries are kept newest-first by `created_at`, cases without a timestamp
/// last, ties in arrival order. There is never more than one entry per id.
/// The store also owns the 1-based listing cursor because a wholesale
/// replacement must send the listing back to the first page.
#[derive(Debug, Clone)]
pub struct CaseStore {
    cases: Vec<PatientCase>,
    page: usize,
}

impl Default for CaseStore {
    fn default() -> Self {
        Self {
            cases: Vec::new(),
            page: 1,
        }
    }
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a fresh collection and reset the cursor to page 1.
    ///
    /// Duplicate ids in `cases` collapse to their last occurrence.
    pub fn replace_all(&mut self, cases: Vec<PatientCase>) {
        let mut seen = HashSet::with_capacity(cases.len());
        let mut deduped: Vec<PatientCase> = cases
            .into_iter()
            .rev()
            .filter(|case| seen.insert(case.id.clone()))
            .collect();
        deduped.reverse();
        deduped.sort_by(compare_recency);

        self.cases = deduped;
        self.page = 1;
    }

    /// Remove by id. Returns false when the id was not present.
    pub fn remove(&mut self, id: &CaseId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.cases.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the entry with the same id, or insert a new one in order.
    pub fn upsert(&mut self, case: PatientCase) -> Upsert {
        if let Some(index) = self.position(&case.id) {
            if self.cases[index].created_at == case.created_at {
                self.cases[index] = case;
                return Upsert::Replaced;
            }
            self.cases.remove(index);
            self.insert_sorted(case);
            return Upsert::Replaced;
        }
        self.insert_sorted(case);
        Upsert::Inserted
    }

    // Goes after every entry that does not sort strictly after it.
    fn insert_sorted(&mut self, case: PatientCase) {
        let index = self
            .cases
            .partition_point(|existing| compare_recency(existing, &case) != Ordering::Greater);
        self.cases.insert(index, case);
    }

    fn position(&self, id: &CaseId) -> Option<usize> {
        self.cases.iter().position(|case| &case.id == id)
    }

    pub fn get(&self, id: &CaseId) -> Option<&PatientCase> {
        self.cases.iter().find(|case| &case.id == id)
    }

    pub fn contains(&self, id: &CaseId) -> bool {
        self.position(id).is_some()
    }

    /// The most recent case, if any.
    pub fn newest(&self) -> Option<&PatientCase> {
        self.cases.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatientCase> {
        self.cases.iter()
    }

    pub fn as_slice(&self) -> &[PatientCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Current 1-based listing page, as last stored. Views clamp it.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

impl<'a> IntoIterator for &'a CaseStore {
    type Item = &'a PatientCase;
    type IntoIter = std::slice::Iter<'a, PatientCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinicase_core::testing;

    fn ids(store: &CaseStore) -> Vec<&str> {
        store.iter().map(|case| case.id.as_str()).collect()
    }

    #[test]
    fn replace_all_orders_newest_first_with_undated_last() {
        let mut store = CaseStore::new();
        store.replace_all(vec![
            testing::case("undated"),
            testing::case_created("old", 100),
            testing::case_created("new", 300),
            testing::case_created("mid", 200),
        ]);
        assert_eq!(ids(&store), vec!["new", "mid", "old", "undated"]);
    }

    #[test]
    fn replace_all_keeps_arrival_order_for_ties() {
        let mut store = CaseStore::new();
        store.replace_all(vec![
            testing::case_created("a", 100),
            testing::case_created("b", 100),
            testing::case("x"),
            testing::case("y"),
            testing::case_created("c", 100),
        ]);
        assert_eq!(ids(&store), vec!["a", "b", "c", "x", "y"]);
    }

    #[test]
    fn replace_all_collapses_duplicate_ids_to_last_occurrence() {
        let mut store = CaseStore::new();
        store.replace_all(vec![
            testing::case_titled("a", "first"),
            testing::case("b"),
            testing::case_titled("a", "second"),
        ]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&CaseId::new("a")).unwrap().case_title, "second");
    }

    #[test]
    fn replace_all_resets_cursor_to_first_page() {
        let mut store = CaseStore::new();
        store.set_page(3);
        assert_eq!(store.page(), 3);
        store.replace_all(vec![testing::case("a")]);
        assert_eq!(store.page(), 1);
    }

    #[test]
    fn set_page_never_goes_below_one() {
        let mut store = CaseStore::new();
        store.set_page(0);
        assert_eq!(store.page(), 1);
    }

    #[test]
    fn upsert_replaces_in_place_and_inserts_new() {
        let mut store = CaseStore::new();
        store.replace_all(vec![
            testing::case_created("a", 300),
            testing::case_created("b", 200),
        ]);

        let mut updated = testing::case_created("b", 200);
        updated.case_title = "renamed".to_string();
        assert_eq!(store.upsert(updated), Upsert::Replaced);
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(store.get(&CaseId::new("b")).unwrap().case_title, "renamed");

        assert_eq!(store.upsert(testing::case_created("c", 250)), Upsert::Inserted);
        assert_eq!(ids(&store), vec!["a", "c", "b"]);
    }

    #[test]
    fn upsert_appends_after_equal_keys() {
        let mut store = CaseStore::new();
        store.replace_all(vec![testing::case("a"), testing::case("b")]);
        store.upsert(testing::case("c"));
        assert_eq!(ids(&store), vec!["a", "b", "c"]);

        store.upsert(testing::case_created("d", 10));
        assert_eq!(ids(&store), vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn upsert_does_not_touch_the_cursor() {
        let mut store = CaseStore::new();
        store.replace_all(vec![testing::case("a")]);
        store.set_page(2);
        store.upsert(testing::case("b"));
        store.remove(&CaseId::new("a"));
        assert_eq!(store.page(), 2);
    }

    #[test]
    fn remove_reports_absence() {
        let mut store = CaseStore::new();
        store.replace_all(vec![testing::case("a")]);
        assert!(store.remove(&CaseId::new("a")));
        assert!(!store.remove(&CaseId::new("a")));
        assert!(store.is_empty());
    }

    #[test]
    fn mixed_mutations_keep_one_entry_per_id() {
        let mut store = CaseStore::new();
        let ops: Vec<(bool, &str, i64)> = vec![
            (true, "a", 1),
            (true, "b", 2),
            (true, "a", 3),
            (false, "b", 0),
            (true, "b", 1),
            (true, "c", 1),
            (true, "a", 1),
            (false, "z", 0),
            (true, "c", 9),
        ];
        for (is_upsert, id, secs) in ops {
            if is_upsert {
                store.upsert(testing::case_created(id, secs));
            } else {
                store.remove(&CaseId::new(id));
            }
            let unique: HashSet<_> = store.iter().map(|case| case.id.clone()).collect();
            assert_eq!(unique.len(), store.len());
        }
        assert_eq!(ids(&store), vec!["c", "b", "a"]);
    }
}
