use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use services::{REGISTER_FAILED_MESSAGE, RegisterForm};

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn RegisterView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let auth = ctx.auth();

    let mut email = use_signal(String::new);
    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let auth = auth.clone();
        let form = RegisterForm {
            email: email(),
            username: username(),
            password: password(),
        };
        busy.set(true);
        error.set(None);
        spawn(async move {
            match auth.register(&form).await {
                Ok(_) => {
                    let _ = navigator.replace(Route::Login {});
                }
                Err(err) => error.set(Some(err.user_message(REGISTER_FAILED_MESSAGE))),
            }
            busy.set(false);
        });
    };

    rsx! {
        div { class: "page auth-page",
            h2 { "Create your account" }

            form { class: "auth-form", onsubmit: on_submit,
                if let Some(message) = error() {
                    p { class: "form-error", "{message}" }
                }
                label { r#for: "email", "Email" }
                input {
                    id: "email",
                    r#type: "email",
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }
                label { r#for: "username", "Username" }
                input {
                    id: "username",
                    r#type: "text",
                    value: "{username}",
                    oninput: move |evt| username.set(evt.value()),
                }
                label { r#for: "password", "Password" }
                input {
                    id: "password",
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                button { r#type: "submit", disabled: busy(),
                    if busy() { "Creating account..." } else { "Register" }
                }
            }

            p { class: "auth-switch",
                "Already have an account? "
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}
