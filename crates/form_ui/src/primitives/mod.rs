//! Form field, layout, and navigation primitives emitting the `data-ui-*` DOM contract.

use leptos::ev::{FocusEvent, MouseEvent};
use leptos::*;

mod controls;
mod layout;
mod navigation;

pub use controls::{CheckControl, InputControl, RadioGroupControl, SelectControl, TextAreaControl};
pub use layout::{FieldShell, FormGrid, SectionShell};
pub use navigation::{ActionButton, StepNav, StepNavItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Visual weight of an [`ActionButton`].
pub enum ActionVariant {
    /// Main call to action.
    Primary,
    /// Secondary action.
    Secondary,
    /// Low-emphasis action.
    Ghost,
}

impl Default for ActionVariant {
    fn default() -> Self {
        Self::Secondary
    }
}

impl ActionVariant {
    pub(crate) fn token(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Ghost => "ghost",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Position of a wizard step relative to the current one.
pub enum StepStatus {
    /// Not reached yet.
    Upcoming,
    /// Current step.
    Active,
    /// Already passed.
    Completed,
}

impl Default for StepStatus {
    fn default() -> Self {
        Self::Upcoming
    }
}

impl StepStatus {
    /// Status of `step` while `current` is active.
    pub fn of(step: u32, current: u32) -> Self {
        match step.cmp(&current) {
            std::cmp::Ordering::Less => Self::Completed,
            std::cmp::Ordering::Equal => Self::Active,
            std::cmp::Ordering::Greater => Self::Upcoming,
        }
    }

    pub(crate) fn token(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

pub(crate) fn merge_layout_class(base: &'static str, layout_class: Option<&str>) -> String {
    match layout_class {
        Some(layout_class) if !layout_class.is_empty() => format!("{base} {layout_class}"),
        _ => base.to_string(),
    }
}

pub(crate) fn bool_token(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn call_focus(callback: Option<&Callback<FocusEvent>>, ev: FocusEvent) {
    if let Some(callback) = callback {
        callback.call(ev);
    }
}

fn call_click(callback: Option<&Callback<MouseEvent>>, ev: MouseEvent) {
    if let Some(callback) = callback {
        callback.call(ev);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn step_status_relative_to_current() {
        assert_eq!(StepStatus::of(1, 2), StepStatus::Completed);
        assert_eq!(StepStatus::of(2, 2), StepStatus::Active);
        assert_eq!(StepStatus::of(3, 2).token(), "upcoming");
    }

    #[test]
    fn layout_class_merges_only_non_empty() {
        assert_eq!(merge_layout_class("ui-form-field", None), "ui-form-field");
        assert_eq!(merge_layout_class("ui-form-field", Some("")), "ui-form-field");
        assert_eq!(
            merge_layout_class("ui-form-field", Some("col-span-6")),
            "ui-form-field col-span-6"
        );
        assert_eq!(bool_token(true), "true");
    }
}
