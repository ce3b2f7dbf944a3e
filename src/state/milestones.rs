//! Milestone records and the insertion-ordered set that holds them.

use serde::{Deserialize, Serialize};

/// One tracked milestone. `name` is the unique key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Milestone {
    pub name: String,
    /// Free-form status label, e.g. "Not Started", "In Progress", "Done".
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Whether an upsert added a new milestone or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Milestones keyed by name, iterated in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MilestoneSet {
    entries: Vec<Milestone>,
}

impl MilestoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a raw list; later duplicates overwrite earlier ones
    /// but keep the earlier position.
    pub fn from_entries(entries: impl IntoIterator<Item = Milestone>) -> Self {
        let mut set = Self::new();
        for milestone in entries {
            set.upsert(milestone.name, milestone.status, milestone.notes);
        }
        set
    }

    /// Create the milestone if absent, otherwise overwrite status and notes.
    pub fn upsert(
        &mut self,
        name: impl Into<String>,
        status: impl Into<String>,
        notes: Option<String>,
    ) -> UpsertOutcome {
        let name = name.into().trim().to_string();
        let status = status.into().trim().to_string();
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if let Some(existing) = self.entries.iter_mut().find(|m| m.name == name) {
            existing.status = status;
            existing.notes = notes;
            return UpsertOutcome::Updated;
        }
        self.entries.push(Milestone {
            name,
            status,
            notes,
        });
        UpsertOutcome::Created
    }

    pub fn get(&self, name: &str) -> Option<&Milestone> {
        self.entries.iter().find(|m| m.name == name.trim())
    }

    pub fn remove(&mut self, name: &str) -> Option<Milestone> {
        let idx = self.entries.iter().position(|m| m.name == name.trim())?;
        Some(self.entries.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Milestone> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for MilestoneSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = Vec::<Milestone>::deserialize(deserializer)?;
        Ok(Self::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_in_place() {
        let mut set = MilestoneSet::new();
        assert_eq!(
            set.upsert("Implement user login", "Not Started", None),
            UpsertOutcome::Created
        );
        assert_eq!(
            set.upsert("Implement user login", "Done", Some("shipped".into())),
            UpsertOutcome::Updated
        );
        assert_eq!(set.len(), 1);
        let m = set.get("Implement user login").unwrap();
        assert_eq!(m.status, "Done");
        assert_eq!(m.notes.as_deref(), Some("shipped"));
    }

    #[test]
    fn upsert_clears_notes_when_omitted() {
        let mut set = MilestoneSet::new();
        set.upsert("Docs", "In Progress", Some("draft".into()));
        set.upsert("Docs", "Done", None);
        assert_eq!(set.get("Docs").unwrap().notes, None);
    }

    #[test]
    fn iteration_keeps_first_insertion_order() {
        let mut set = MilestoneSet::new();
        set.upsert("b", "Not Started", None);
        set.upsert("a", "Not Started", None);
        set.upsert("b", "Done", None);
        let names: Vec<&str> = set.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn remove_drops_entry() {
        let mut set = MilestoneSet::new();
        set.upsert("a", "Done", None);
        assert!(set.remove("a").is_some());
        assert!(set.remove("a").is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn deserialize_collapses_duplicate_names() {
        let set: MilestoneSet = serde_json::from_str(
            r#"[{"name":"a","status":"Not Started"},{"name":"b","status":"x"},{"name":"a","status":"Done"}]"#,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next().unwrap().status, "Done");
    }
}
