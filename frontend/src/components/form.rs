//! 表单共用的错误展示

use leptos::prelude::*;
use partsgate::Error;

/// 表单提交失败后的展示状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormError {
    /// 整体提示
    pub summary: Option<String>,
    /// 按字段的提示
    pub fields: Vec<(String, String)>,
}

impl FormError {
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Validation(fields) => Self {
                summary: None,
                fields: fields
                    .iter()
                    .map(|(field, message)| (field.to_string(), message.to_string()))
                    .collect(),
            },
            Error::Unauthorized => Self::summary("Invalid email or password."),
            Error::Rejected {
                message: Some(message),
                ..
            } => Self::summary(message),
            Error::Network(_) => Self::summary("Cannot reach the server. Please try again."),
            _ => Self::summary("Something went wrong. Please try again."),
        }
    }

    fn summary(message: impl Into<String>) -> Self {
        Self {
            summary: Some(message.into()),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, message)| message.clone())
    }
}

#[component]
pub fn ErrorAlert(error: RwSignal<FormError>) -> impl IntoView {
    move || {
        error.with(|e| e.summary.clone()).map(|message| {
            view! {
                <div role="alert" class="alert alert-error text-sm py-2">
                    <span>{message}</span>
                </div>
            }
        })
    }
}

#[component]
pub fn FieldHint(error: RwSignal<FormError>, field: &'static str) -> impl IntoView {
    move || {
        error.with(|e| e.field(field)).map(|message| {
            view! {
                <label class="label">
                    <span class="label-text-alt text-error">{message}</span>
                </label>
            }
        })
    }
}
