use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use contact_common::{Field, FormValues};

pub const SUBMIT_LABEL: &str = "문의하기";
pub const SUBMITTING_LABEL: &str = "전송 중...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn css_class(self) -> &'static str {
        match self {
            MessageKind::Success => "form-message success",
            MessageKind::Error => "form-message error",
        }
    }
}

/// Everything the controller is allowed to change on screen.
pub trait FieldPresenter {
    fn set_value(&self, field: Field, value: &str);
    fn show_error(&self, field: Field, message: &str);
    fn clear_error(&self, field: Field);
    fn show_message(&self, kind: MessageKind, message: &str);
    fn hide_message(&self);
    fn set_loading(&self, loading: bool);
    fn focus(&self, field: Field);
}

impl<P: FieldPresenter + ?Sized> FieldPresenter for Rc<P> {
    fn set_value(&self, field: Field, value: &str) {
        (**self).set_value(field, value)
    }

    fn show_error(&self, field: Field, message: &str) {
        (**self).show_error(field, message)
    }

    fn clear_error(&self, field: Field) {
        (**self).clear_error(field)
    }

    fn show_message(&self, kind: MessageKind, message: &str) {
        (**self).show_message(kind, message)
    }

    fn hide_message(&self) {
        (**self).hide_message()
    }

    fn set_loading(&self, loading: bool) {
        (**self).set_loading(loading)
    }

    fn focus(&self, field: Field) {
        (**self).focus(field)
    }
}

/// Snapshot of what the form currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub values: FormValues,
    pub errors: BTreeMap<Field, String>,
    pub message: Option<(MessageKind, String)>,
    pub loading: bool,
    pub focused: Option<Field>,
}

impl ViewState {
    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }
}

/// Renderer-agnostic form model. The yew component draws from it and tests
/// assert against it.
#[derive(Debug, Default)]
pub struct FormView {
    state: RefCell<ViewState>,
}

impl FormView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn error(&self, field: Field) -> Option<String> {
        self.state.borrow().errors.get(&field).cloned()
    }

    /// Takes the pending focus request, if any.
    pub fn take_focus(&self) -> Option<Field> {
        self.state.borrow_mut().focused.take()
    }
}

impl FieldPresenter for FormView {
    fn set_value(&self, field: Field, value: &str) {
        self.state.borrow_mut().values.set(field, value);
    }

    fn show_error(&self, field: Field, message: &str) {
        self.state
            .borrow_mut()
            .errors
            .insert(field, message.to_string());
    }

    fn clear_error(&self, field: Field) {
        self.state.borrow_mut().errors.remove(&field);
    }

    fn show_message(&self, kind: MessageKind, message: &str) {
        self.state.borrow_mut().message = Some((kind, message.to_string()));
    }

    fn hide_message(&self) {
        self.state.borrow_mut().message = None;
    }

    fn set_loading(&self, loading: bool) {
        self.state.borrow_mut().loading = loading;
    }

    fn focus(&self, field: Field) {
        self.state.borrow_mut().focused = Some(field);
    }
}
