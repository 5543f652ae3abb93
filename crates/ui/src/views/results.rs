use dioxus::prelude::*;
use dioxus_router::use_navigator;

use exam_core::model::ExamId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, is_unauthorized, view_state_from_resource};
use crate::vm::ResultVm;

const RESULT_FAILED_MESSAGE: &str = "Failed to load exam results.";

#[component]
pub fn ResultsView(exam_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let exams = ctx.exams();

    let resource = use_resource(move || {
        let exams = exams.clone();
        async move {
            let result = exams
                .fetch_result(ExamId::new(exam_id))
                .await
                .map_err(|err| ViewError::from_api(&err, RESULT_FAILED_MESSAGE))?;
            Ok::<_, ViewError>(ResultVm::from(&result))
        }
    });

    use_effect(move || {
        if is_unauthorized(resource) {
            let _ = navigator.replace(Route::Login {});
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page results",
            h1 { "Exam Results" }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(vm) => rsx! {
                    ResultDetails { vm }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "form-error", "{err.message()}" }
                },
            }

            div { class: "actions",
                button {
                    class: "secondary",
                    onclick: move |_| {
                        let _ = navigator.push(Route::Dashboard {});
                    },
                    "Back to Dashboard"
                }
                button {
                    class: "primary",
                    onclick: move |_| {
                        let _ = navigator.push(Route::Exam {});
                    },
                    "Take Another Exam"
                }
            }
        }
    }
}

#[component]
fn ResultDetails(vm: ResultVm) -> Element {
    let band_class = vm.band.css_class();
    let message = vm.band.message();

    rsx! {
        section { class: "card score",
            div { class: "score-value {band_class}", "{vm.percentage}" }
            p { class: "score-message", "{message}" }
            p { "{vm.summary}" }
        }

        section { class: "card",
            dl { class: "summary",
                dt { "Total questions" }
                dd { "{vm.total}" }

                dt { "Correct answers" }
                dd { "{vm.correct}" }

                dt { "Incorrect answers" }
                dd { "{vm.incorrect}" }

                if let Some(started) = vm.started_at_str.clone() {
                    dt { "Started" }
                    dd { "{started}" }
                }
                if let Some(finished) = vm.finished_at_str.clone() {
                    dt { "Finished" }
                    dd { "{finished}" }
                }
                if let Some(minutes) = vm.minutes_taken {
                    dt { "Time taken" }
                    dd { "{minutes} minutes" }
                }
            }
        }

        section { class: "card",
            div { class: "progress-text",
                span { "Performance" }
                span { "{vm.percentage}" }
            }
            div { class: "progress-track",
                div { class: "progress-fill {band_class}", style: "width: {vm.bar_width}%;" }
            }
        }
    }
}
