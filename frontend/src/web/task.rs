use futures::future::LocalBoxFuture;
use partsgate::TaskSpawner;

/// 把会话核心的后台任务交给 Leptos 的本地执行器
#[derive(Clone, Copy, Default)]
pub struct LeptosSpawner;

impl TaskSpawner for LeptosSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        leptos::task::spawn_local(task);
    }
}
