//! # ReactiveProperty：最新值响应式属性内核
//!
//! 基于 [`tokio::sync::watch`] 的单写多读属性：写端只保留最新值，读端每次
//! `changed()` 拿到的都是当前最新值，中间值被合并丢弃。
//! 进度合并（coalesce-to-latest）完全依赖这一语义，缓冲内存恒为 O(1)。
//!
//! 与 `watch` 原生行为一致：写端销毁后，读端仍能取到尚未读过的最后一个值，
//! 之后 `changed()` 才返回 [`ReactivePropertyError::Destroyed`]。

use thiserror::Error;
use tokio::sync::watch;
use tokio::sync::watch::Ref;

// ──────────────────────────── Error ────────────────────────────

/// 响应式属性统一错误类型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReactivePropertyError {
    /// 属性（写端）已被销毁，且没有未读的新值
    #[error("属性已被销毁")]
    Destroyed,
}

// ──────────────────────────── ReactiveProperty ────────────────────────────

/// 响应式属性写端：由唯一的拥有者更新。
///
/// 不实现 Clone，保证所有写入都经过同一个拥有者（单写者约束）。
#[derive(Debug)]
pub struct ReactiveProperty<T> {
    sender: watch::Sender<Option<T>>,
}

impl<T> ReactiveProperty<T>
where
    T: Clone + Send + Sync,
{
    /// 创建一个尚无值的属性；第一个 `update` 之前监听者不会被唤醒。
    pub fn empty() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// 创建一个带初始值的属性。初始值对之后创建的监听者视为已读。
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(Some(value));
        Self { sender }
    }

    /// 更新属性的值；没有监听者时同样会保存，便于 `get_current` 读取。
    pub fn update(&self, new_value: T) {
        self.sender.send_replace(Some(new_value));
    }

    /// 使用闭包更新当前值；属性为空时不调用闭包。
    pub fn update_field<F>(&self, updater: F)
    where
        F: FnOnce(&mut T),
    {
        self.sender.send_if_modified(|slot| match slot.as_mut() {
            Some(value) => {
                updater(value);
                true
            }
            None => false,
        });
    }

    /// 获取当前属性值的快照（会 clone）。
    pub fn get_current(&self) -> Option<T> {
        self.sender.borrow().clone()
    }

    /// 获取当前属性值的只读借用（零拷贝）。
    pub fn get_current_borrow(&self) -> Ref<'_, Option<T>> {
        self.sender.borrow()
    }

    /// 是否还有监听者存活。
    pub fn is_watched(&self) -> bool {
        !self.sender.is_closed()
    }

    /// 创建一个监听器；当前值视为已读，只会收到之后的更新。
    pub fn watch(&self) -> PropertyWatcher<T> {
        PropertyWatcher {
            receiver: self.sender.subscribe(),
        }
    }
}

// ──────────────────────────── PropertyWatcher ────────────────────────────

/// 属性监听器，用于异步接收属性的最新值。
#[derive(Debug, Clone)]
pub struct PropertyWatcher<T> {
    receiver: watch::Receiver<Option<T>>,
}

impl<T> PropertyWatcher<T>
where
    T: Clone + Send + Sync,
{
    /// 异步等待下一个未读的最新值。
    ///
    /// 若写端已销毁且没有未读值，返回 [`ReactivePropertyError::Destroyed`]。
    pub async fn changed(&mut self) -> Result<T, ReactivePropertyError> {
        loop {
            self.receiver
                .changed()
                .await
                .map_err(|_| ReactivePropertyError::Destroyed)?;
            if let Some(value) = self.receiver.borrow_and_update().clone() {
                return Ok(value);
            }
        }
    }

    /// 同步获取当前值的克隆（不改变已读标记）。
    pub fn borrow(&self) -> Option<T> {
        self.receiver.borrow().clone()
    }

    /// 是否存在尚未读取的新值；写端销毁后返回 `false`。
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }
}
