use dioxus::prelude::*;
use dioxus_router::{Outlet, Routable, use_navigator};

use crate::context::AppContext;
use crate::views::{DashboardView, ExamView, LoginView, RegisterView, ResultsView};

#[derive(Clone, Debug, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/login", LoginView)] Login {},
    #[route("/register", RegisterView)] Register {},
    #[layout(Authenticated)]
        #[route("/", DashboardView)] Dashboard {},
        #[route("/exam", ExamView)] Exam {},
        #[route("/results/:exam_id", ResultsView)] Results { exam_id: u64 },
}

/// Gate for every page that needs a credential.
#[component]
fn Authenticated() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let authenticated = ctx.is_authenticated();

    use_effect(move || {
        if !authenticated {
            let _ = navigator.replace(Route::Login {});
        }
    });

    if !authenticated {
        return rsx! {};
    }

    rsx! {
        div { class: "app",
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
