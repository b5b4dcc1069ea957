#[cfg(target_arch = "wasm32")]
fn main() {
    yew::Renderer::<contact_frontend::pages::landing::Landing>::new().render();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("contact-frontend targets wasm32; build it with `trunk serve`");
}
