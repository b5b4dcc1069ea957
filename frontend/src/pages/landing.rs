use yew::prelude::*;

use crate::components::contact_form::ContactForm;

#[function_component(Landing)]
pub fn landing() -> Html {
    html! {
        <main class="landing">
            <section class="hero">
                <h1>{ "무엇이든 물어보세요" }</h1>
                <p>{ "문의를 남겨주시면 입력하신 이메일로 빠르게 답변드리겠습니다." }</p>
            </section>
            <section id="contact" class="contact-section">
                <h2>{ "문의하기" }</h2>
                <ContactForm />
            </section>
        </main>
    }
}
