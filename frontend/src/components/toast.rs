//! Toast 通知
//!
//! 会话核心通过 `Notifier` 发出提示，这里把它们排进信号队列并定时消失。

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use partsgate::{Notice, Notifier};

const TOAST_LIFETIME_MS: u32 = 4_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: &'static str,
    pub is_error: bool,
}

/// Toast 队列，同时是会话核心的通知器
#[derive(Clone, Copy)]
pub struct ToastNotifier {
    toasts: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl ToastNotifier {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    pub fn toasts(&self) -> ReadSignal<Vec<Toast>> {
        self.toasts.read_only()
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|list| list.retain(|t| t.id != id));
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, notice: Notice) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);

        self.toasts.update(|list| {
            list.push(Toast {
                id,
                message: notice.message(),
                is_error: notice.is_error(),
            })
        });

        let this = *self;
        Timeout::new(TOAST_LIFETIME_MS, move || this.dismiss(id)).forget();
    }
}

/// Toast 容器，挂在应用根部
#[component]
pub fn ToastStack(notifier: ToastNotifier) -> impl IntoView {
    let toasts = notifier.toasts();

    view! {
        <div class="toast toast-top toast-end z-50">
            <For
                each=move || toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let class = if toast.is_error {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    };
                    let id = toast.id;
                    view! {
                        <div role="alert" class=class on:click=move |_| notifier.dismiss(id)>
                            <span>{toast.message}</span>
                        </div>
                    }
                }
            />
        </div>
    }
}
