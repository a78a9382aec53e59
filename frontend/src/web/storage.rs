//! LocalStorage 封装模块
//!
//! 只保存非敏感的便利信息（上次登录的邮箱）。会话凭据永远不经过这里。

use gloo_storage::{LocalStorage as GlooStorage, Storage};

/// 本地存储操作封装
pub struct LocalStorage;

impl LocalStorage {
    /// 获取存储的字符串值，键不存在或发生错误时返回 `None`
    pub fn get(key: &str) -> Option<String> {
        GlooStorage::get::<String>(key).ok()
    }

    /// 设置存储值，返回是否成功
    pub fn set(key: &str, value: &str) -> bool {
        GlooStorage::set(key, value).is_ok()
    }

    pub fn delete(key: &str) {
        GlooStorage::delete(key);
    }
}
