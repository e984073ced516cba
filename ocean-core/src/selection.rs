//! Shift-click and select-all behavior for an ordered list of checkboxes.

use crate::form::{FormRequest, Method};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkbox {
    pub value: String,
    pub checked: bool,
    /// Marks the control that drives every other box.
    pub select_all: bool,
}

impl Checkbox {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            checked: false,
            select_all: false,
        }
    }

    pub fn select_all_control() -> Self {
        Self {
            value: "on".into(),
            checked: false,
            select_all: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SelectionList {
    boxes: Vec<Checkbox>,
    last_clicked: Option<usize>,
}

impl SelectionList {
    pub fn new(boxes: Vec<Checkbox>) -> Self {
        Self {
            boxes,
            last_clicked: None,
        }
    }

    /// Plain item boxes for `values`, in order, with no select-all control.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(values.into_iter().map(Checkbox::new).collect())
    }

    pub fn boxes(&self) -> &[Checkbox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn last_clicked(&self) -> Option<usize> {
        self.last_clicked
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.boxes.get(index).is_some_and(|b| b.checked)
    }

    /// A click on box `index`. The box toggles first, as a native checkbox
    /// does; then a shift-click checks the inclusive range back to the last
    /// clicked box, and a select-all control pushes its new state to every
    /// box. Out-of-range indices are ignored.
    pub fn click(&mut self, index: usize, shift: bool) {
        let Some(clicked) = self.boxes.get_mut(index) else {
            return;
        };
        clicked.checked = !clicked.checked;
        let (state, is_select_all) = (clicked.checked, clicked.select_all);

        if shift {
            if let Some(last) = self.last_clicked {
                let (lo, hi) = (last.min(index), last.max(index));
                for b in &mut self.boxes[lo..=hi] {
                    b.checked = true;
                }
            }
        }

        if is_select_all {
            for b in &mut self.boxes {
                b.checked = state;
            }
        }

        self.last_clicked = Some(index);
    }

    /// Values of checked item boxes, in list order. Select-all controls are
    /// not items and never contribute.
    pub fn checked_values(&self) -> Vec<&str> {
        self.boxes
            .iter()
            .filter(|b| b.checked && !b.select_all)
            .map(|b| b.value.as_str())
            .collect()
    }

    pub fn joined_values(&self) -> String {
        self.checked_values().join(",")
    }

    /// Builds the submission of `form_action` with the checked values written
    /// into the hidden field `hidden_field`, comma-joined.
    pub fn submission(
        &self,
        form_action: &str,
        method: Method,
        hidden_field: &str,
    ) -> FormRequest {
        FormRequest::new(form_action, method).field(hidden_field, self.joined_values())
    }
}
