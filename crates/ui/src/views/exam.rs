use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_router::use_navigator;

use exam_core::{SessionSnapshot, SessionStatus};
use services::{SessionCommand, SessionHandle};

use crate::context::AppContext;
use crate::routes::Route;
use crate::vm::ExamVm;

/// Shared slot for the running session's handle.
#[derive(Clone, Default)]
struct Controls(Rc<RefCell<Option<SessionHandle>>>);

impl Controls {
    fn install(&self, handle: SessionHandle) {
        self.0.borrow_mut().replace(handle);
    }

    fn send(&self, command: SessionCommand) {
        if let Some(handle) = self.0.borrow().as_ref() {
            handle.send(command);
        }
    }

    fn abandon(&self) {
        if let Some(handle) = self.0.borrow_mut().take() {
            handle.abandon();
        }
    }
}

#[component]
pub fn ExamView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let exams = ctx.exams();
    let auth = ctx.auth();

    let mut snapshot = use_signal(|| None::<SessionSnapshot>);
    let controls = use_hook(Controls::default);

    {
        let controls = controls.clone();
        use_hook(move || {
            spawn(async move {
                let Ok(session) = exams.start_session().await else {
                    // Only a rejected credential fails the start itself.
                    let _ = navigator.replace(Route::Login {});
                    return;
                };
                let handle = exams.spawn_session(session);
                let mut updates = handle.subscribe();
                controls.install(handle);

                loop {
                    let current = updates.borrow_and_update().clone();
                    let exit = exit_route(&current, auth.is_authenticated());
                    snapshot.set(Some(current));
                    if let Some(route) = exit {
                        let _ = navigator.replace(route);
                        break;
                    }
                    if updates.changed().await.is_err() {
                        break;
                    }
                }
            })
        });
    }

    {
        let controls = controls.clone();
        use_drop(move || controls.abandon());
    }

    let Some(current) = snapshot() else {
        return rsx! {
            div { class: "page centered",
                p { "Loading exam..." }
            }
        };
    };

    match current.status {
        SessionStatus::Loading => rsx! {
            div { class: "page centered",
                p { "Loading exam..." }
            }
        },
        SessionStatus::Error | SessionStatus::Abandoned => rsx! {
            div { class: "page centered",
                if let Some(message) = current.message.clone() {
                    p { class: "form-error", "{message}" }
                }
                button {
                    class: "primary",
                    onclick: move |_| {
                        let _ = navigator.replace(Route::Dashboard {});
                    },
                    "Back to Dashboard"
                }
            }
        },
        _ => rsx! {
            ExamScreen { vm: ExamVm::from(&current), controls }
        },
    }
}

/// Where the exam view goes after publishing `snapshot`, if anywhere.
///
/// A graded exam opens its results. A session that failed after the
/// credential was revoked sends the candidate back to login.
fn exit_route(snapshot: &SessionSnapshot, signed_in: bool) -> Option<Route> {
    if let Some(result) = &snapshot.result {
        return Some(Route::Results {
            exam_id: result.exam_id.value(),
        });
    }
    let stuck = matches!(snapshot.status, SessionStatus::Failed | SessionStatus::Error);
    (stuck && !signed_in).then_some(Route::Login {})
}

#[derive(Props, Clone)]
struct ExamScreenProps {
    vm: ExamVm,
    controls: Controls,
}

impl PartialEq for ExamScreenProps {
    fn eq(&self, other: &Self) -> bool {
        self.vm == other.vm && Rc::ptr_eq(&self.controls.0, &other.controls.0)
    }
}

#[component]
fn ExamScreen(props: ExamScreenProps) -> Element {
    let ExamScreenProps { vm, controls } = props;
    let interactive = vm.status == SessionStatus::Active;
    let percent = vm.percent_complete;
    let send = move |command: SessionCommand| {
        let controls = controls.clone();
        move |_: MouseEvent| controls.send(command)
    };

    rsx! {
        div { class: "page exam",
            header { class: "topbar",
                h1 { "Exam in Progress" }
                span { class: "position", "{vm.position}" }
                span {
                    class: if vm.timer_low { "timer timer-low" } else { "timer" },
                    "{vm.timer}"
                }
            }

            section { class: "card",
                div { class: "progress-text",
                    span { "{vm.progress}" }
                    span { "{percent}% complete" }
                }
                div { class: "progress-track",
                    div { class: "progress-fill", style: "width: {percent}%;" }
                }

                h2 { "{vm.heading}" }
                p { class: "question-text", "{vm.question_text}" }

                div { class: "options",
                    for option in vm.options.clone() {
                        button {
                            key: "{option.label}",
                            class: if option.selected { "option selected" } else { "option" },
                            disabled: !interactive,
                            onclick: send(SessionCommand::Select(option.label)),
                            span { class: "option-label", "{option.label}." }
                            span { "{option.text}" }
                        }
                    }
                }

                if let Some(message) = vm.message.clone() {
                    p { class: "form-error", "{message}" }
                }

                if vm.show_controls {
                    div { class: "exam-nav",
                        button {
                            class: "secondary",
                            disabled: !vm.can_go_previous,
                            onclick: send(SessionCommand::Previous),
                            "Previous"
                        }
                        button {
                            class: "success",
                            disabled: vm.submit_disabled,
                            onclick: send(SessionCommand::Submit),
                            "{vm.submit_label}"
                        }
                        if vm.can_go_next {
                            button {
                                class: "primary",
                                onclick: send(SessionCommand::Next),
                                "Next"
                            }
                        }
                    }
                }
            }
        }
    }
}
