use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use contact_common::{escape_text, ContactPayload, Field, FormValues, RuleSet};
use log::{debug, info, warn};

use super::draft::DraftStore;
use super::presenter::{FieldPresenter, MessageKind};
use super::transport::{ContactTransport, ServerReply};
use crate::utils::format::format_phone_number;
use crate::utils::scheduler::{Scheduler, TaskHandle};

pub const INVALID_FORM_MESSAGE: &str = "모든 필수 항목을 올바르게 입력해주세요.";
pub const SUCCESS_MESSAGE: &str =
    "메일이 성공적으로 전송되었습니다! 입력해주신 이메일 주소로 빠른 시일 내에 답변드리겠습니다.";
pub const FALLBACK_FAILURE_MESSAGE: &str = "전송 중 오류가 발생했습니다. 다시 시도해주세요.";
pub const NETWORK_FAILURE_MESSAGE: &str =
    "네트워크 오류가 발생했습니다. 인터넷 연결을 확인하고 다시 시도해주세요.";

/// How long a success message stays up.
pub const MESSAGE_AUTO_HIDE: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission was already in flight.
    Ignored,
    /// Local validation failed; nothing was sent.
    Rejected,
    Sent,
    /// The server answered with a failure.
    Failed,
    /// No response was obtained.
    Unreachable,
}

/// Marks a submission in flight until dropped. Every exit from `submit`,
/// including a dropped future, releases the flag and the loading state.
struct InFlight<'a, P: FieldPresenter> {
    state: &'a Cell<SubmissionState>,
    presenter: &'a P,
}

impl<'a, P: FieldPresenter> InFlight<'a, P> {
    fn begin(state: &'a Cell<SubmissionState>, presenter: &'a P) -> Self {
        state.set(SubmissionState::Submitting);
        presenter.set_loading(true);
        Self { state, presenter }
    }
}

impl<P: FieldPresenter> Drop for InFlight<'_, P> {
    fn drop(&mut self) {
        self.presenter.set_loading(false);
        self.state.set(SubmissionState::Idle);
    }
}

/// Drives the contact form: field validation, draft persistence and the
/// submission lifecycle. All methods take `&self` so a UI callback can hold
/// the controller behind an `Rc`.
pub struct FormController<P, D, T> {
    rules: RuleSet,
    values: RefCell<FormValues>,
    presenter: P,
    drafts: D,
    transport: T,
    scheduler: Rc<dyn Scheduler>,
    state: Cell<SubmissionState>,
    auto_hide: RefCell<Option<TaskHandle>>,
}

impl<P, D, T> FormController<P, D, T>
where
    P: FieldPresenter + Clone + 'static,
    D: DraftStore,
    T: ContactTransport,
{
    pub fn new(
        rules: RuleSet,
        presenter: P,
        drafts: D,
        transport: T,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            rules,
            values: RefCell::new(FormValues::default()),
            presenter,
            drafts,
            transport,
            scheduler,
            state: Cell::new(SubmissionState::Idle),
            auto_hide: RefCell::new(None),
        }
    }

    pub fn values(&self) -> FormValues {
        self.values.borrow().clone()
    }

    pub fn state(&self) -> SubmissionState {
        self.state.get()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.get() == SubmissionState::Submitting
    }

    /// Loads a saved draft into the fields verbatim. A missing or unreadable
    /// draft leaves the form empty.
    pub fn restore_draft(&self) {
        match self.drafts.load() {
            Ok(Some(draft)) => {
                for field in Field::ALL {
                    self.presenter.set_value(field, draft.get(field));
                }
                *self.values.borrow_mut() = draft;
                info!("Restored contact form draft");
            }
            Ok(None) => {}
            Err(e) => warn!("Could not restore contact form draft: {}", e),
        }
    }

    /// A keystroke in `field`. Clears that field's error and saves the draft.
    pub fn input(&self, field: Field, raw: &str) {
        let value = match field {
            Field::Phone => format_phone_number(raw),
            _ => raw.to_string(),
        };
        self.presenter.set_value(field, &value);
        self.values.borrow_mut().set(field, value);
        self.presenter.clear_error(field);
        self.save_draft();
    }

    pub fn blur(&self, field: Field) -> bool {
        self.validate_field(field)
    }

    /// Validates one field and updates only that field's error.
    ///
    /// The rules run against the trimmed, escaped text that `submit` puts on
    /// the wire, so lengths agree with what the server counts.
    pub fn validate_field(&self, field: Field) -> bool {
        let outgoing = escape_text(self.values.borrow().get(field).trim());
        let result = self.rules.check(field, &outgoing);
        match result.message {
            Some(message) => {
                self.presenter.show_error(field, &message);
                false
            }
            None => {
                self.presenter.clear_error(field);
                true
            }
        }
    }

    /// Validates every field, annotating all failures.
    pub fn validate_form(&self) -> bool {
        self.first_invalid_field().is_none()
    }

    fn first_invalid_field(&self) -> Option<Field> {
        let mut first = None;
        for field in self.rules.fields() {
            if !self.validate_field(field) && first.is_none() {
                first = Some(field);
            }
        }
        first
    }

    pub async fn submit(&self) -> SubmitOutcome {
        if self.state.get() != SubmissionState::Idle {
            debug!("Contact form submission already in progress, ignoring");
            return SubmitOutcome::Ignored;
        }

        self.state.set(SubmissionState::Validating);
        if let Some(field) = self.first_invalid_field() {
            self.state.set(SubmissionState::Idle);
            self.show_message(MessageKind::Error, INVALID_FORM_MESSAGE);
            self.presenter.focus(field);
            return SubmitOutcome::Rejected;
        }

        let payload = ContactPayload::from_values(&self.values.borrow()).map_values(escape_text);
        let _in_flight = InFlight::begin(&self.state, &self.presenter);

        match self.transport.submit(&payload).await {
            Ok(reply) if reply.is_success() => {
                info!("Contact form sent");
                self.reset();
                self.show_message(MessageKind::Success, SUCCESS_MESSAGE);
                if let Err(e) = self.drafts.clear() {
                    warn!("Could not clear contact form draft: {}", e);
                }
                SubmitOutcome::Sent
            }
            Ok(reply) => {
                warn!("Contact form rejected by server with status {}", reply.status);
                self.show_failure(reply);
                SubmitOutcome::Failed
            }
            Err(e) => {
                warn!("Contact form could not reach the server: {}", e);
                self.show_message(MessageKind::Error, NETWORK_FAILURE_MESSAGE);
                SubmitOutcome::Unreachable
            }
        }
    }

    /// Empties every field, drops errors and messages, and focuses the name.
    pub fn reset(&self) {
        *self.values.borrow_mut() = FormValues::default();
        for field in Field::ALL {
            self.presenter.set_value(field, "");
            self.presenter.clear_error(field);
        }
        self.hide_message();
        self.presenter.focus(Field::Name);
    }

    fn show_failure(&self, reply: ServerReply) {
        let (message, errors) = match reply.envelope {
            Some(envelope) => (envelope.message, envelope.errors.unwrap_or_default()),
            None => (None, Vec::new()),
        };
        self.show_message(
            MessageKind::Error,
            message.as_deref().unwrap_or(FALLBACK_FAILURE_MESSAGE),
        );

        for error in errors {
            match error.field.parse::<Field>() {
                Ok(field) => self.presenter.show_error(field, &error.message),
                Err(e) => warn!("Ignoring server field error: {}", e),
            }
        }
    }

    fn show_message(&self, kind: MessageKind, message: &str) {
        self.cancel_auto_hide();
        self.presenter.show_message(kind, message);
        if kind == MessageKind::Success {
            let presenter = self.presenter.clone();
            let handle = self
                .scheduler
                .schedule(MESSAGE_AUTO_HIDE, Box::new(move || presenter.hide_message()));
            *self.auto_hide.borrow_mut() = Some(handle);
        }
    }

    fn hide_message(&self) {
        self.cancel_auto_hide();
        self.presenter.hide_message();
    }

    fn cancel_auto_hide(&self) {
        if let Some(handle) = self.auto_hide.borrow_mut().take() {
            handle.cancel();
        }
    }

    fn save_draft(&self) {
        if let Err(e) = self.drafts.save(&self.values.borrow()) {
            warn!("Could not save contact form draft: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::presenter::FormView;
    use crate::contact::testing::{MemoryDraftStore, ScriptedTransport};
    use crate::contact::transport::NetworkError;
    use crate::utils::scheduler::VirtualScheduler;
    use contact_common::{Envelope, FieldError};

    type TestController =
        FormController<Rc<FormView>, Rc<MemoryDraftStore>, Rc<ScriptedTransport>>;

    struct Harness {
        view: Rc<FormView>,
        drafts: Rc<MemoryDraftStore>,
        transport: Rc<ScriptedTransport>,
        scheduler: Rc<VirtualScheduler>,
        controller: TestController,
    }

    fn harness_with(drafts: MemoryDraftStore) -> Harness {
        let view = Rc::new(FormView::new());
        let drafts = Rc::new(drafts);
        let transport = Rc::new(ScriptedTransport::default());
        let scheduler = Rc::new(VirtualScheduler::new());
        let controller = FormController::new(
            RuleSet::contact().unwrap(),
            view.clone(),
            drafts.clone(),
            transport.clone(),
            scheduler.clone(),
        );
        Harness {
            view,
            drafts,
            transport,
            scheduler,
            controller,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryDraftStore::default())
    }

    fn fill_valid(controller: &TestController) {
        controller.input(Field::Name, "홍길동");
        controller.input(Field::Email, "hong@example.com");
        controller.input(Field::Message, "  Need a quote for <b>bulk</b> orders.  ");
    }

    #[test]
    fn field_errors_follow_rule_precedence() {
        let h = harness();

        assert!(!h.controller.validate_field(Field::Name));
        assert_eq!(h.view.error(Field::Name).as_deref(), Some("이름을 입력해주세요."));

        h.controller.input(Field::Name, "a");
        assert!(!h.controller.validate_field(Field::Name));
        assert_eq!(
            h.view.error(Field::Name).as_deref(),
            Some("이름은 2자 이상이어야 합니다.")
        );

        h.controller.input(Field::Name, "a1");
        assert!(!h.controller.validate_field(Field::Name));
        assert_eq!(
            h.view.error(Field::Name).as_deref(),
            Some("이름은 한글 또는 영문만 입력 가능합니다.")
        );

        h.controller.input(Field::Name, "Kim");
        assert!(h.controller.validate_field(Field::Name));
        assert_eq!(h.view.error(Field::Name), None);
    }

    #[test]
    fn validating_one_field_leaves_others_alone() {
        let h = harness();
        h.controller.validate_field(Field::Email);
        h.controller.validate_field(Field::Name);

        assert!(h.view.error(Field::Email).is_some());
        assert!(h.view.error(Field::Name).is_some());
        assert_eq!(h.view.error(Field::Phone), None);
        assert_eq!(h.view.error(Field::Message), None);
    }

    #[test]
    fn input_clears_error_and_blur_revalidates() {
        let h = harness();
        h.controller.blur(Field::Email);
        assert!(h.view.error(Field::Email).is_some());

        h.controller.input(Field::Email, "not-an-email");
        assert_eq!(h.view.error(Field::Email), None);

        assert!(!h.controller.blur(Field::Email));
        assert_eq!(
            h.view.error(Field::Email).as_deref(),
            Some("올바른 이메일 형식이 아닙니다.")
        );
    }

    #[test]
    fn phone_input_is_formatted_as_typed() {
        let h = harness();
        h.controller.input(Field::Phone, "01012345678");

        assert_eq!(h.controller.values().phone, "010-1234-5678");
        assert_eq!(h.view.snapshot().values.phone, "010-1234-5678");
        assert!(h.controller.blur(Field::Phone));
    }

    #[test]
    fn length_limits_apply_to_the_escaped_text() {
        let h = harness();

        h.controller.input(Field::Message, &format!("{}<", "a".repeat(499)));
        assert!(!h.controller.validate_field(Field::Message));
        assert_eq!(
            h.view.error(Field::Message).as_deref(),
            Some("메시지는 500자 이하로 입력해주세요.")
        );

        h.controller.input(Field::Message, &format!("{}<", "a".repeat(496)));
        assert!(h.controller.validate_field(Field::Message));

        h.controller.input(Field::Company, &format!("{}&", "b".repeat(99)));
        assert!(!h.controller.validate_field(Field::Company));

        h.controller.input(Field::Company, &format!("{}&", "b".repeat(95)));
        assert!(h.controller.validate_field(Field::Company));
    }

    #[test]
    fn client_and_server_agree_at_length_boundaries() {
        let rules = RuleSet::contact().unwrap();
        let cases = [
            (Field::Message, format!("{}<", "a".repeat(499))),
            (Field::Message, format!("{}<", "a".repeat(496))),
            (Field::Message, format!("{}&", "a".repeat(495))),
            (Field::Message, "a".repeat(500)),
            (Field::Message, "<<<".to_string()),
            (Field::Company, format!("{}&", "b".repeat(99))),
            (Field::Company, format!("{}&", "b".repeat(95))),
            (Field::Company, "b".repeat(100)),
        ];

        for (field, value) in cases {
            let h = harness();
            fill_valid(&h.controller);
            h.controller.input(field, &value);

            let client_valid = h.controller.validate_form();
            let sent = ContactPayload::from_values(&h.controller.values()).map_values(escape_text);
            let server_valid = rules.validate(&sent).is_valid;

            assert_eq!(client_valid, server_valid, "{field} with {} chars", value.len());
        }
    }

    #[test]
    fn valid_form_has_no_annotations() {
        let h = harness();
        fill_valid(&h.controller);

        assert!(h.controller.validate_form());
        assert!(h.view.snapshot().errors.is_empty());
    }

    #[test]
    fn every_keystroke_overwrites_the_draft() {
        let h = harness();
        h.controller.input(Field::Name, "홍");
        h.controller.input(Field::Name, "홍길");

        let saved: FormValues = serde_json::from_str(&h.drafts.raw().unwrap()).unwrap();
        assert_eq!(saved.name, "홍길");
        assert_eq!(saved.email, "");
    }

    #[test]
    fn saved_draft_is_restored_verbatim() {
        let draft = FormValues {
            name: " 홍길동 ".to_string(),
            email: "bad@".to_string(),
            phone: String::new(),
            company: "Acme".to_string(),
            message: "short".to_string(),
        };
        let h = harness_with(MemoryDraftStore::with_draft(&draft));

        h.controller.restore_draft();

        assert_eq!(h.controller.values(), draft);
        assert_eq!(h.view.snapshot().values, draft);
        assert!(h.view.snapshot().errors.is_empty());
    }

    #[test]
    fn storage_failures_do_not_break_the_form() {
        let h = harness_with(MemoryDraftStore::broken());
        h.controller.restore_draft();
        h.controller.input(Field::Name, "홍길동");

        assert_eq!(h.controller.values().name, "홍길동");
    }

    #[tokio::test]
    async fn invalid_submit_sends_nothing_and_focuses_first_error() {
        let h = harness();
        h.controller.input(Field::Email, "hong@example.com");

        let outcome = h.controller.submit().await;

        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert!(h.transport.requests().is_empty());
        let view = h.view.snapshot();
        assert_eq!(
            view.message,
            Some((MessageKind::Error, INVALID_FORM_MESSAGE.to_string()))
        );
        assert_eq!(
            view.errors.keys().copied().collect::<Vec<_>>(),
            vec![Field::Name, Field::Message]
        );
        assert_eq!(view.focused, Some(Field::Name));
        assert!(!view.loading);
        assert_eq!(h.controller.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn submit_sends_trimmed_escaped_payload() {
        let h = harness();
        h.transport.reply(200, Envelope::ok("ok"));
        fill_valid(&h.controller);

        h.controller.submit().await;

        let requests = h.transport.requests();
        assert_eq!(requests.len(), 1);
        let payload = &requests[0];
        assert_eq!(payload.name, "홍길동");
        assert_eq!(payload.email, "hong@example.com");
        assert_eq!(payload.phone, None);
        assert_eq!(payload.company, None);
        assert_eq!(
            payload.message.as_deref(),
            Some("Need a quote for &lt;b&gt;bulk&lt;/b&gt; orders.")
        );
    }

    #[tokio::test]
    async fn double_submit_issues_exactly_one_request() {
        let h = harness();
        h.transport.reply(200, Envelope::ok("ok"));
        fill_valid(&h.controller);

        let (first, second) = futures::join!(h.controller.submit(), h.controller.submit());

        assert_eq!(first, SubmitOutcome::Sent);
        assert_eq!(second, SubmitOutcome::Ignored);
        assert_eq!(h.transport.requests().len(), 1);
        assert!(!h.controller.is_submitting());
    }

    #[tokio::test]
    async fn success_resets_form_and_clears_draft() {
        let h = harness();
        h.transport.reply(200, Envelope::ok("ok"));
        fill_valid(&h.controller);
        assert!(h.drafts.raw().is_some());

        let outcome = h.controller.submit().await;

        assert_eq!(outcome, SubmitOutcome::Sent);
        let view = h.view.snapshot();
        assert_eq!(view.values, FormValues::default());
        assert_eq!(h.controller.values(), FormValues::default());
        assert_eq!(
            view.message,
            Some((MessageKind::Success, SUCCESS_MESSAGE.to_string()))
        );
        assert_eq!(view.focused, Some(Field::Name));
        assert!(!view.loading);
        assert_eq!(h.drafts.raw(), None);
        assert_eq!(h.controller.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn success_message_hides_after_eight_seconds() {
        let h = harness();
        h.transport.reply(200, Envelope::ok("ok"));
        fill_valid(&h.controller);
        h.controller.submit().await;

        h.scheduler.advance(Duration::from_secs(7));
        assert!(h.view.snapshot().message.is_some());

        h.scheduler.advance(Duration::from_secs(1));
        assert_eq!(h.view.snapshot().message, None);
    }

    #[tokio::test]
    async fn newer_message_cancels_pending_auto_hide() {
        let h = harness();
        h.transport.reply(200, Envelope::ok("ok"));
        fill_valid(&h.controller);
        h.controller.submit().await;

        h.scheduler.advance(Duration::from_secs(5));
        assert_eq!(h.controller.submit().await, SubmitOutcome::Rejected);
        assert_eq!(h.scheduler.pending(), 0);

        h.scheduler.advance(Duration::from_secs(10));
        assert_eq!(
            h.view.snapshot().message,
            Some((MessageKind::Error, INVALID_FORM_MESSAGE.to_string()))
        );
    }

    #[tokio::test]
    async fn server_field_errors_are_rendered_and_draft_kept() {
        let h = harness();
        h.transport.reply(
            400,
            Envelope::invalid(vec![FieldError::new(
                Field::Email,
                "올바른 이메일 형식이 아닙니다.",
            )]),
        );
        fill_valid(&h.controller);

        let outcome = h.controller.submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        let view = h.view.snapshot();
        assert_eq!(
            view.message,
            Some((MessageKind::Error, FALLBACK_FAILURE_MESSAGE.to_string()))
        );
        assert_eq!(
            view.errors.get(&Field::Email).map(String::as_str),
            Some("올바른 이메일 형식이 아닙니다.")
        );
        assert!(!view.loading);
        assert!(h.drafts.raw().is_some());
        assert_eq!(h.controller.values().name, "홍길동");
    }

    #[tokio::test]
    async fn server_message_is_shown_when_present() {
        let h = harness();
        h.transport
            .reply(429, Envelope::failure("너무 많은 요청입니다."));
        fill_valid(&h.controller);

        assert_eq!(h.controller.submit().await, SubmitOutcome::Failed);
        assert_eq!(
            h.view.snapshot().message,
            Some((MessageKind::Error, "너무 많은 요청입니다.".to_string()))
        );
    }

    #[tokio::test]
    async fn unparsable_reply_falls_back_to_generic_failure() {
        let h = harness();
        h.transport.reply_raw(ServerReply {
            status: 502,
            envelope: None,
        });
        fill_valid(&h.controller);

        assert_eq!(h.controller.submit().await, SubmitOutcome::Failed);
        assert_eq!(
            h.view.snapshot().message,
            Some((MessageKind::Error, FALLBACK_FAILURE_MESSAGE.to_string()))
        );
    }

    #[tokio::test]
    async fn network_failure_shows_connectivity_message_and_releases_flag() {
        let h = harness();
        h.transport
            .fail(NetworkError::Request("connection refused".to_string()))
            .reply(200, Envelope::ok("ok"));
        fill_valid(&h.controller);

        assert_eq!(h.controller.submit().await, SubmitOutcome::Unreachable);
        let view = h.view.snapshot();
        assert_eq!(
            view.message,
            Some((MessageKind::Error, NETWORK_FAILURE_MESSAGE.to_string()))
        );
        assert!(!view.loading);
        assert_eq!(h.controller.values().name, "홍길동");

        assert_eq!(h.controller.submit().await, SubmitOutcome::Sent);
        assert_eq!(h.transport.requests().len(), 2);
    }
}
