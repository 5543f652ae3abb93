use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, is_unauthorized, view_state_from_resource};
use crate::vm::{HistoryRowVm, map_history_rows};

const HISTORY_FAILED_MESSAGE: &str = "Failed to load exam history.";

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let auth = ctx.auth();
    let exams = ctx.exams();
    let minutes = exams.config().duration_secs / 60;
    let username = auth.username().unwrap_or_default();

    let resource = use_resource(move || {
        let exams = exams.clone();
        async move {
            let records = exams
                .history()
                .await
                .map_err(|err| ViewError::from_api(&err, HISTORY_FAILED_MESSAGE))?;
            Ok::<_, ViewError>(map_history_rows(&records))
        }
    });

    use_effect(move || {
        if is_unauthorized(resource) {
            let _ = navigator.replace(Route::Login {});
        }
    });

    let state = view_state_from_resource(resource);

    let on_logout = move |_| {
        let auth = auth.clone();
        spawn(async move {
            // The live credential is dropped even if the store write fails.
            let _ = auth.logout().await;
            let _ = navigator.replace(Route::Login {});
        });
    };

    rsx! {
        div { class: "page dashboard",
            header { class: "topbar",
                h1 { "Exam Dashboard" }
                span { class: "welcome", "Welcome, {username}" }
                button { class: "secondary", onclick: on_logout, "Logout" }
            }

            section { class: "card",
                h2 { "Welcome to Your Exam Dashboard" }
                ul { class: "instructions",
                    li { "You will have {minutes} minutes to complete the exam" }
                    li { "Each question has 4 options (A, B, C, D)" }
                    li { "You can navigate between questions using Next/Previous buttons" }
                    li { "The exam will auto-submit when time runs out" }
                }
                button {
                    class: "primary",
                    onclick: move |_| {
                        let _ = navigator.push(Route::Exam {});
                    },
                    "Start Exam"
                }
            }

            section { class: "card",
                h2 { "Recent exams" }
                match state {
                    ViewState::Idle | ViewState::Loading => rsx! {
                        p { "Loading..." }
                    },
                    ViewState::Ready(rows) => rsx! {
                        if rows.is_empty() {
                            p { "No exams taken yet." }
                        } else {
                            ul { class: "history",
                                for row in rows {
                                    HistoryRow { key: "{row.id}", row }
                                }
                            }
                        }
                    },
                    ViewState::Error(err) => rsx! {
                        p { class: "form-error", "{err.message()}" }
                    },
                }
            }
        }
    }
}

#[component]
fn HistoryRow(row: HistoryRowVm) -> Element {
    rsx! {
        li {
            span { class: "history-date", "{row.started_at_str}" }
            span { class: "history-score", "{row.score}" }
            span { class: "history-correct", "{row.correct} correct" }
            if row.completed {
                Link { class: "history-link", to: Route::Results { exam_id: row.id.value() }, "View" }
            } else {
                span { class: "history-pending", "In progress" }
            }
        }
    }
}
