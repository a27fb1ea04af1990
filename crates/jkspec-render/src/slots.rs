//! Slot table: which formatter renders which section
//!
//! Registrations are kept in order and looked up from the back, so the last
//! formatter registered for a slot is the one used. The standard table
//! registers the generic formatter for every slot first and then the
//! specialized Meta, Requirements, Tasks and Notes formatters on top.

use serde_json::Value;

use crate::format;

/// A named section of the rendered document, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Meta,
    Problem,
    Deliverables,
    Requirements,
    Implementation,
    Workflow,
    Testing,
    Tasks,
    Notes,
}

impl Slot {
    pub const ALL: [Slot; 9] = [
        Slot::Meta,
        Slot::Problem,
        Slot::Deliverables,
        Slot::Requirements,
        Slot::Implementation,
        Slot::Workflow,
        Slot::Testing,
        Slot::Tasks,
        Slot::Notes,
    ];

    /// Section heading text
    pub fn title(self) -> &'static str {
        match self {
            Slot::Meta => "Meta",
            Slot::Problem => "Problem",
            Slot::Deliverables => "Deliverables",
            Slot::Requirements => "Requirements",
            Slot::Implementation => "Implementation",
            Slot::Workflow => "Workflow",
            Slot::Testing => "Testing",
            Slot::Tasks => "Tasks",
            Slot::Notes => "Notes",
        }
    }

    /// Record field feeding this slot; `None` for Meta, which reads the record itself
    pub fn field(self) -> Option<&'static str> {
        match self {
            Slot::Meta => None,
            Slot::Problem => Some("problem"),
            Slot::Deliverables => Some("deliverables"),
            Slot::Requirements => Some("requirements"),
            Slot::Implementation => Some("implementation"),
            Slot::Workflow => Some("workflow"),
            Slot::Testing => Some("testing"),
            Slot::Tasks => Some("tasks"),
            Slot::Notes => Some("notes"),
        }
    }

    /// The value this slot renders from `record`, if any
    pub fn input(self, record: &Value) -> Option<&Value> {
        match self.field() {
            None => Some(record),
            Some(field) => record.get(field).filter(|v| !v.is_null()),
        }
    }
}

/// A formatter that can be bound to a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    Structural,
    Meta,
    Requirements,
    Tasks,
    Notes,
}

impl Formatter {
    /// Render `value` with section body headings starting at `level`
    pub fn format(self, value: &Value, level: usize) -> String {
        match self {
            Formatter::Structural => format::structural(value, level),
            Formatter::Meta => format::meta(value, level),
            Formatter::Requirements => format::requirements(value, level),
            Formatter::Tasks => format::tasks(value, level),
            Formatter::Notes => format::notes(value, level),
        }
    }
}

/// Ordered slot-to-formatter registrations
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    entries: Vec<(Slot, Formatter)>,
}

impl SlotTable {
    /// Table with no registrations
    pub fn new() -> Self {
        Self::default()
    }

    /// Generic formatter everywhere, then the specialized ones
    pub fn standard() -> Self {
        let mut table = Self::new();
        for slot in Slot::ALL {
            table.register(slot, Formatter::Structural);
        }
        table
            .register(Slot::Meta, Formatter::Meta)
            .register(Slot::Requirements, Formatter::Requirements)
            .register(Slot::Tasks, Formatter::Tasks)
            .register(Slot::Notes, Formatter::Notes);
        table
    }

    pub fn register(&mut self, slot: Slot, formatter: Formatter) -> &mut Self {
        self.entries.push((slot, formatter));
        self
    }

    /// The most recently registered formatter for `slot`
    pub fn resolve(&self, slot: Slot) -> Option<Formatter> {
        self.entries
            .iter()
            .rev()
            .find(|(s, _)| *s == slot)
            .map(|(_, formatter)| *formatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_bindings() {
        let table = SlotTable::standard();
        assert_eq!(table.resolve(Slot::Meta), Some(Formatter::Meta));
        assert_eq!(table.resolve(Slot::Requirements), Some(Formatter::Requirements));
        assert_eq!(table.resolve(Slot::Tasks), Some(Formatter::Tasks));
        assert_eq!(table.resolve(Slot::Notes), Some(Formatter::Notes));
        for slot in [Slot::Problem, Slot::Deliverables, Slot::Implementation, Slot::Workflow, Slot::Testing] {
            assert_eq!(table.resolve(slot), Some(Formatter::Structural));
        }
    }

    #[test]
    fn test_last_registration_wins() {
        let mut table = SlotTable::standard();
        table.register(Slot::Tasks, Formatter::Structural);
        assert_eq!(table.resolve(Slot::Tasks), Some(Formatter::Structural));

        table.register(Slot::Tasks, Formatter::Notes);
        assert_eq!(table.resolve(Slot::Tasks), Some(Formatter::Notes));
    }

    #[test]
    fn test_unregistered_slot() {
        assert_eq!(SlotTable::new().resolve(Slot::Meta), None);
    }

    #[test]
    fn test_slot_input() {
        let record = json!({"type": "api", "tasks": [], "notes": null});
        assert_eq!(Slot::Meta.input(&record), Some(&record));
        assert_eq!(Slot::Tasks.input(&record), Some(&json!([])));
        assert_eq!(Slot::Notes.input(&record), None);
        assert_eq!(Slot::Problem.input(&record), None);
    }
}
