//! Multi-step search form coordination.
//!
//! The coordinator is the single owner of [`SearchFormState`]; every
//! mutation funnels through [`SearchForm::apply`] or the destination
//! completion callback, and focus hand-offs between steps happen here
//! rather than inside the sub-controls.

use crate::model::types::{FormAction, SearchFormState, SuggestItem};

/// Focusable steps, in completion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Destination,
    Dates,
    Guests,
    Submit,
}

impl FormStep {
    pub fn next(self) -> Self {
        match self {
            FormStep::Destination => FormStep::Dates,
            FormStep::Dates => FormStep::Guests,
            FormStep::Guests => FormStep::Submit,
            FormStep::Submit => FormStep::Destination,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormStep::Destination => FormStep::Submit,
            FormStep::Dates => FormStep::Destination,
            FormStep::Guests => FormStep::Dates,
            FormStep::Submit => FormStep::Guests,
        }
    }
}

pub struct SearchForm {
    state: SearchFormState,
    focus: FormStep,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchForm {
    pub fn new() -> Self {
        Self {
            state: SearchFormState::default(),
            focus: FormStep::Destination,
        }
    }

    pub fn state(&self) -> &SearchFormState {
        &self.state
    }

    pub fn focus(&self) -> FormStep {
        self.focus
    }

    pub fn focus_step(&mut self, step: FormStep) {
        self.focus = step;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Apply a named action. Picking dates hands focus to the guests
    /// control; guest-count changes stay put.
    pub fn apply(&mut self, action: FormAction) {
        let advance = matches!(action, FormAction::SetDates(_));
        self.state.apply(action);
        if advance {
            self.focus = FormStep::Guests;
        }
    }

    /// Destination-step completion callback: record the choice and hand
    /// focus to the date control.
    pub fn complete_destination(&mut self, item: SuggestItem) {
        self.state.apply(FormAction::SetDestination(item));
        self.focus = FormStep::Dates;
    }

    pub fn is_valid(&self) -> bool {
        self.state.destination.is_some() && self.state.dates.is_some() && self.state.guests > 0
    }

    /// Invoke `handler` with the full state when valid. Submitting an
    /// incomplete form is a no-op, not an error; returns whether the
    /// handler ran.
    pub fn submit<F>(&self, handler: F) -> bool
    where
        F: FnOnce(&SearchFormState),
    {
        if !self.is_valid() {
            return false;
        }
        handler(&self.state);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::DateRange;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 8).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn completion_chain_advances_focus_step_by_step() {
        let mut form = SearchForm::new();
        assert_eq!(form.focus(), FormStep::Destination);

        form.complete_destination(SuggestItem::new("loc:berlin", "Berlin"));
        assert_eq!(form.focus(), FormStep::Dates);

        form.apply(FormAction::SetDates(range()));
        assert_eq!(form.focus(), FormStep::Guests);

        form.apply(FormAction::SetGuests(2));
        assert_eq!(form.focus(), FormStep::Guests, "guest edits don't move focus");
    }

    #[test]
    fn validity_requires_every_step() {
        let mut form = SearchForm::new();
        assert!(!form.is_valid());

        form.complete_destination(SuggestItem::new("loc:berlin", "Berlin"));
        assert!(!form.is_valid());

        form.apply(FormAction::SetDates(range()));
        assert!(form.is_valid(), "guests default to one");
    }

    #[test]
    fn invalid_submit_is_a_silent_no_op() {
        let form = SearchForm::new();
        let mut calls = 0;
        assert!(!form.submit(|_| calls += 1));
        assert_eq!(calls, 0);
    }

    #[test]
    fn valid_submit_hands_over_the_full_state() {
        let mut form = SearchForm::new();
        form.complete_destination(SuggestItem::new("loc:shiraz", "Shiraz"));
        form.apply(FormAction::SetDates(range()));
        form.apply(FormAction::SetGuests(3));

        let mut seen = None;
        assert!(form.submit(|state| seen = Some(state.clone())));
        let state = seen.unwrap();
        assert_eq!(state.destination.unwrap().label, "Shiraz");
        assert_eq!(state.guests, 3);
    }

    #[test]
    fn tab_order_wraps_in_both_directions() {
        let mut form = SearchForm::new();
        form.focus_prev();
        assert_eq!(form.focus(), FormStep::Submit);
        form.focus_next();
        assert_eq!(form.focus(), FormStep::Destination);
    }
}
