use std::rc::Rc;

use contact_common::{Field, RuleSet};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlElement, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::contact::draft::LocalStorageDraftStore;
use crate::contact::presenter::{FieldPresenter, FormView, MessageKind, ViewState};
use crate::contact::transport::HttpTransport;
use crate::contact::FormController;
use crate::utils::scheduler::TimeoutScheduler;

type BrowserController = FormController<DomPresenter, LocalStorageDraftStore, HttpTransport>;

fn element_id(field: Field) -> String {
    format!("contact-{}", field)
}

/// Writes into the shared [`FormView`] and asks yew to re-render.
#[derive(Clone)]
struct DomPresenter {
    view: Rc<FormView>,
    redraw: Rc<dyn Fn()>,
}

impl DomPresenter {
    fn update(&self, apply: impl FnOnce(&FormView)) {
        apply(&self.view);
        (self.redraw)();
    }
}

impl FieldPresenter for DomPresenter {
    fn set_value(&self, field: Field, value: &str) {
        self.update(|view| view.set_value(field, value));
    }

    fn show_error(&self, field: Field, message: &str) {
        self.update(|view| view.show_error(field, message));
    }

    fn clear_error(&self, field: Field) {
        self.update(|view| view.clear_error(field));
    }

    fn show_message(&self, kind: MessageKind, message: &str) {
        self.update(|view| view.show_message(kind, message));
    }

    fn hide_message(&self) {
        self.update(|view| view.hide_message());
    }

    fn set_loading(&self, loading: bool) {
        self.update(|view| view.set_loading(loading));
    }

    fn focus(&self, field: Field) {
        let element = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(&element_id(field)))
            .and_then(|element| element.dyn_into::<HtmlElement>().ok());
        if let Some(element) = element {
            if let Err(e) = element.focus() {
                log::debug!("Could not focus {}: {:?}", field, e);
            }
        }
    }
}

fn build_controller(presenter: DomPresenter) -> Option<Rc<BrowserController>> {
    match RuleSet::contact() {
        Ok(rules) => Some(Rc::new(FormController::new(
            rules,
            presenter,
            LocalStorageDraftStore,
            HttpTransport::default(),
            Rc::new(TimeoutScheduler),
        ))),
        Err(e) => {
            log::error!("Contact form rules failed to build: {}", e);
            None
        }
    }
}

struct InputDef {
    field: Field,
    label: &'static str,
    input_type: &'static str,
    placeholder: &'static str,
    required: bool,
}

const INPUT_FIELDS: [InputDef; 4] = [
    InputDef {
        field: Field::Name,
        label: "이름",
        input_type: "text",
        placeholder: "홍길동",
        required: true,
    },
    InputDef {
        field: Field::Email,
        label: "이메일",
        input_type: "email",
        placeholder: "example@email.com",
        required: true,
    },
    InputDef {
        field: Field::Phone,
        label: "연락처",
        input_type: "tel",
        placeholder: "010-1234-5678",
        required: false,
    },
    InputDef {
        field: Field::Company,
        label: "회사명",
        input_type: "text",
        placeholder: "회사명 (선택)",
        required: false,
    },
];

fn group_class(state: &ViewState, field: Field) -> Classes {
    classes!("form-group", state.errors.contains_key(&field).then_some("error"))
}

fn error_line(state: &ViewState, field: Field) -> Html {
    match state.errors.get(&field) {
        Some(message) => html! { <span class="error-message">{ message.clone() }</span> },
        None => html! {},
    }
}

fn render_input(controller: &Rc<BrowserController>, state: &ViewState, def: &InputDef) -> Html {
    let field = def.field;
    let oninput = {
        let controller = controller.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            controller.input(field, &input.value());
        })
    };
    let onblur = {
        let controller = controller.clone();
        Callback::from(move |_: FocusEvent| {
            controller.blur(field);
        })
    };
    let label = if def.required {
        format!("{} *", def.label)
    } else {
        def.label.to_string()
    };

    html! {
        <div class={group_class(state, field)}>
            <label for={element_id(field)}>{ label }</label>
            <input
                id={element_id(field)}
                name={field.as_str()}
                type={def.input_type}
                placeholder={def.placeholder}
                value={state.values.get(field).to_string()}
                {oninput}
                {onblur}
            />
            { error_line(state, field) }
        </div>
    }
}

fn render_message(controller: &Rc<BrowserController>, state: &ViewState) -> Html {
    let field = Field::Message;
    let oninput = {
        let controller = controller.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            controller.input(field, &input.value());
        })
    };
    let onblur = {
        let controller = controller.clone();
        Callback::from(move |_: FocusEvent| {
            controller.blur(field);
        })
    };

    html! {
        <div class={group_class(state, field)}>
            <label for={element_id(field)}>{ "문의 내용 *" }</label>
            <textarea
                id={element_id(field)}
                name={field.as_str()}
                rows="6"
                placeholder="문의하실 내용을 10자 이상 입력해주세요."
                value={state.values.get(field).to_string()}
                {oninput}
                {onblur}
            />
            { error_line(state, field) }
        </div>
    }
}

#[function_component(ContactForm)]
pub fn contact_form() -> Html {
    let force_update = use_force_update();
    let view = use_memo(|_| FormView::new(), ());
    let controller = {
        let view = view.clone();
        use_memo(
            move |_| {
                let redraw: Rc<dyn Fn()> = Rc::new(move || force_update.force_update());
                build_controller(DomPresenter { view, redraw })
            },
            (),
        )
    };

    {
        let controller = controller.clone();
        use_effect_with_deps(
            move |_| {
                if let Some(controller) = &*controller {
                    controller.restore_draft();
                }
                || ()
            },
            (),
        );
    }

    let Some(controller) = (*controller).clone() else {
        return html! {
            <p class="form-message error">{ "문의 양식을 불러오지 못했습니다." }</p>
        };
    };

    let state = view.snapshot();
    let onsubmit = {
        let controller = controller.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let controller = controller.clone();
            spawn_local(async move {
                controller.submit().await;
            });
        })
    };

    html! {
        <form id="contactForm" class="contact-form" novalidate="novalidate" {onsubmit}>
            { for INPUT_FIELDS.iter().map(|def| render_input(&controller, &state, def)) }
            { render_message(&controller, &state) }
            {
                match &state.message {
                    Some((kind, message)) => html! {
                        <div class={kind.css_class()} role="alert">{ message.clone() }</div>
                    },
                    None => html! {},
                }
            }
            <button type="submit" class="submit-btn" disabled={state.loading}>
                { state.submit_label() }
            </button>
        </form>
    }
}
