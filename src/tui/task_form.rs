//! Reminder form handling for the terminal user interface.
//!
//! `TaskForm` keeps the editable text buffers and field focus. Every edit is
//! forwarded to the `TaskFormController`, which owns the draft; selectors and
//! the radius slider read their value straight from the draft.

use crate::{
    controller::{SubmitError, TaskFormController, TaskSink},
    fields::{cycle_index, index_of, NotificationTrigger, Priority, RepeatKind, TaskType},
    geolocation::{GeolocationError, PendingPosition, Position},
    parse::parse_time_input,
    task::{Task, DEFAULT_RADIUS, RADIUS_STEP},
    tui::{enums::FieldKind, input::InputField},
};

/// Global order constants for the form fields.
pub const NAME_GLOBAL_ORDER: usize = 0;
pub const TYPE_GLOBAL_ORDER: usize = 1;
pub const LOCATION_GLOBAL_ORDER: usize = 2;
pub const USE_CURRENT_GLOBAL_ORDER: usize = 3;
pub const RADIUS_GLOBAL_ORDER: usize = 4;
pub const TRIGGER_GLOBAL_ORDER: usize = 5;
pub const PRIORITY_GLOBAL_ORDER: usize = 6;
pub const TIME_GLOBAL_ORDER: usize = 7;
pub const REPEAT_GLOBAL_ORDER: usize = 8;
pub const NOTES_GLOBAL_ORDER: usize = 9;

const FIELD_COUNT: usize = 10;

/// Reminder form state for the terminal UI.
pub struct TaskForm {
    pub controller: TaskFormController,
    pub name: InputField,
    pub location: InputField,
    pub time: InputField,
    pub notes: InputField,
    pub current_field: usize,
}

impl TaskForm {
    pub fn new(controller: TaskFormController) -> Self {
        let mut form = Self {
            controller,
            name: InputField::new(),
            location: InputField::new(),
            time: InputField::new(),
            notes: InputField::new(),
            current_field: NAME_GLOBAL_ORDER,
        };
        form.update_active_field();
        form
    }

    /// Widget kind of a field.
    pub fn field_kind(field: usize) -> FieldKind {
        match field {
            NAME_GLOBAL_ORDER | LOCATION_GLOBAL_ORDER | TIME_GLOBAL_ORDER | NOTES_GLOBAL_ORDER => FieldKind::Text,
            USE_CURRENT_GLOBAL_ORDER => FieldKind::Button,
            RADIUS_GLOBAL_ORDER => FieldKind::Slider,
            _ => FieldKind::Selector,
        }
    }

    pub fn current_kind(&self) -> FieldKind {
        Self::field_kind(self.current_field)
    }

    fn fields_mut(&mut self) -> [&mut InputField; 4] {
        [&mut self.name, &mut self.location, &mut self.time, &mut self.notes]
    }

    fn current_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            NAME_GLOBAL_ORDER => Some(&mut self.name),
            LOCATION_GLOBAL_ORDER => Some(&mut self.location),
            TIME_GLOBAL_ORDER => Some(&mut self.time),
            NOTES_GLOBAL_ORDER => Some(&mut self.notes),
            _ => None,
        }
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = cycle_index(self.current_field, FIELD_COUNT, true);
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = cycle_index(self.current_field, FIELD_COUNT, false);
        self.update_active_field();
    }

    /// Update which text field is currently active for editing.
    pub fn update_active_field(&mut self) {
        for field in self.fields_mut() {
            field.active = false;
        }
        if let Some(field) = self.current_input() {
            field.active = true;
        }
    }

    /// Push the focused text buffer into the draft.
    fn sync_current_text(&mut self) {
        match self.current_field {
            NAME_GLOBAL_ORDER => self.controller.set_name(&self.name.value),
            LOCATION_GLOBAL_ORDER => self.controller.set_location_text(&self.location.value),
            TIME_GLOBAL_ORDER => self.controller.set_time(parse_time_input(&self.time.value)),
            NOTES_GLOBAL_ORDER => self.controller.set_notes(&self.notes.value),
            _ => {}
        }
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.current_input() {
            field.handle_char(c);
            self.sync_current_text();
        }
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.current_input() {
            field.handle_backspace();
            self.sync_current_text();
        }
    }

    /// Handle delete input for the currently active field.
    pub fn handle_delete(&mut self) {
        if let Some(field) = self.current_input() {
            field.handle_delete();
            self.sync_current_text();
        }
    }

    /// Handle left/right arrow keys for cursor movement, selectors and the radius slider.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            TYPE_GLOBAL_ORDER => {
                let next = cycle_index(index_of(&TaskType::ALL, &self.task_type()), TaskType::ALL.len(), right);
                self.controller.set_task_type(TaskType::ALL[next]);
            }
            RADIUS_GLOBAL_ORDER => {
                let radius = self.radius();
                let radius = if right { radius + RADIUS_STEP } else { radius.saturating_sub(RADIUS_STEP) };
                self.controller.set_radius(radius);
            }
            TRIGGER_GLOBAL_ORDER => {
                let all = NotificationTrigger::ALL;
                let next = cycle_index(index_of(&all, &self.trigger()), all.len(), right);
                self.controller.set_notification_trigger(all[next]);
            }
            PRIORITY_GLOBAL_ORDER => {
                let next = cycle_index(index_of(&Priority::ALL, &self.priority()), Priority::ALL.len(), right);
                self.controller.set_priority(Priority::ALL[next]);
            }
            REPEAT_GLOBAL_ORDER => {
                let all = RepeatKind::ALL;
                let next = cycle_index(index_of(&all, &self.repeat_kind()), all.len(), right);
                self.controller.set_repeat_kind(all[next]);
            }
            _ => {
                if let Some(field) = self.current_input() {
                    if right {
                        field.move_cursor_right();
                    } else {
                        field.move_cursor_left();
                    }
                }
            }
        }
    }

    pub fn task_type(&self) -> TaskType {
        self.controller.draft().task_type.unwrap_or_default()
    }

    pub fn radius(&self) -> u32 {
        self.controller.draft().radius.unwrap_or(DEFAULT_RADIUS)
    }

    pub fn trigger(&self) -> NotificationTrigger {
        self.controller.draft().notification_trigger.unwrap_or_default()
    }

    pub fn priority(&self) -> Priority {
        self.controller.draft().priority.unwrap_or_default()
    }

    pub fn repeat_kind(&self) -> RepeatKind {
        self.controller.draft().repeat.as_ref().map(|r| r.kind).unwrap_or_default()
    }

    /// Start a current-location request.
    pub fn use_current_location(&mut self) -> Option<PendingPosition> {
        self.controller.request_current_location()
    }

    /// Apply a geolocation outcome and mirror the new coordinate text.
    pub fn apply_position(&mut self, result: Result<Position, GeolocationError>) {
        self.controller.apply_position(result);
        if self.location.value != self.controller.location_text() {
            let text = self.controller.location_text().to_string();
            self.location.set_value(&text);
        }
    }

    /// Submit the draft. A successful submission clears every field.
    pub fn submit(&mut self, sink: &mut dyn TaskSink) -> Result<Task, SubmitError> {
        let task = self.controller.submit(sink)?;
        for field in self.fields_mut() {
            field.clear();
        }
        self.current_field = NAME_GLOBAL_ORDER;
        self.update_active_field();
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DraftState;
    use crate::parse::CoordinateBounds;
    use crate::task::Location;

    struct Discard;

    impl TaskSink for Discard {
        fn emit(&mut self, _task: &Task) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn form() -> TaskForm {
        TaskForm::new(TaskFormController::new(None, CoordinateBounds::Permissive))
    }

    fn type_text(form: &mut TaskForm, text: &str) {
        for c in text.chars() {
            form.handle_char(c);
        }
    }

    fn focus(form: &mut TaskForm, field: usize) {
        while form.current_field != field {
            form.next_field();
        }
    }

    #[test]
    fn navigation_wraps() {
        let mut f = form();
        assert!(f.name.active);
        f.prev_field();
        assert_eq!(f.current_field, NOTES_GLOBAL_ORDER);
        assert!(f.notes.active && !f.name.active);
        f.next_field();
        assert_eq!(f.current_field, NAME_GLOBAL_ORDER);
    }

    #[test]
    fn typing_coordinates_updates_draft_on_every_edit() {
        let mut f = form();
        focus(&mut f, LOCATION_GLOBAL_ORDER);
        type_text(&mut f, "51.5074, -0.1278");
        assert_eq!(f.controller.location(), Some(&Location::new(51.5074, -0.1278)));

        f.handle_char('x');
        assert!(f.controller.location().is_none());
        f.handle_backspace();
        assert!(f.controller.location().is_some());
    }

    #[test]
    fn selectors_cycle_through_values() {
        let mut f = form();
        focus(&mut f, TYPE_GLOBAL_ORDER);
        f.handle_left_right(true);
        assert_eq!(f.task_type(), TaskType::Errands);
        f.handle_left_right(false);
        f.handle_left_right(false);
        assert_eq!(f.task_type(), TaskType::Work);
        f.handle_left_right(false);
        assert_eq!(f.task_type(), TaskType::Custom);

        focus(&mut f, PRIORITY_GLOBAL_ORDER);
        f.handle_left_right(true);
        assert_eq!(f.priority(), Priority::High);

        focus(&mut f, REPEAT_GLOBAL_ORDER);
        assert!(f.controller.draft().repeat.is_none());
        f.handle_left_right(true);
        assert_eq!(f.repeat_kind(), RepeatKind::Daily);
    }

    #[test]
    fn radius_slider_steps_and_clamps() {
        let mut f = form();
        focus(&mut f, RADIUS_GLOBAL_ORDER);
        f.handle_left_right(true);
        assert_eq!(f.radius(), 110);
        for _ in 0..200 {
            f.handle_left_right(false);
        }
        assert_eq!(f.radius(), 10);
        for _ in 0..200 {
            f.handle_left_right(true);
        }
        assert_eq!(f.radius(), 1000);
    }

    #[test]
    fn geolocation_result_rewrites_location_buffer() {
        let mut f = form();
        focus(&mut f, LOCATION_GLOBAL_ORDER);
        type_text(&mut f, "abc");
        f.apply_position(Ok(Position { latitude: 1.0, longitude: 2.0 }));
        assert_eq!(f.location.value, "1.000000, 2.000000");
        assert_eq!(f.location.cursor, f.location.value.chars().count());
    }

    #[test]
    fn unparseable_time_is_left_unset() {
        let mut f = form();
        focus(&mut f, TIME_GLOBAL_ORDER);
        type_text(&mut f, "2024-05-01 09:30");
        assert!(f.controller.draft().time.is_some());
        f.handle_char('x');
        assert!(f.controller.draft().time.is_none());
    }

    #[test]
    fn submit_clears_buffers_only_on_success() {
        let mut f = form();
        type_text(&mut f, "Dentist");
        assert_eq!(f.submit(&mut Discard), Err(SubmitError::MissingLocation));
        assert_eq!(f.name.value, "Dentist");

        focus(&mut f, LOCATION_GLOBAL_ORDER);
        type_text(&mut f, "1, 2");
        let task = f.submit(&mut Discard).unwrap();
        assert_eq!(task.name, "Dentist");
        assert!(f.name.value.is_empty() && f.location.value.is_empty());
        assert_eq!(f.current_field, NAME_GLOBAL_ORDER);
        assert_eq!(f.controller.draft(), &DraftState::default());
    }
}
