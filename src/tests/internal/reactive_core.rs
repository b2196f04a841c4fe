//! 最新值属性测试：合并中间值、写端销毁后仍交付最后一个值。

use std::time::Duration;

use tokio::time::timeout;

use crate::states::reactive_core::{ReactiveProperty, ReactivePropertyError};

#[tokio::test]
async fn watcher_sees_only_latest_value() {
    let prop = ReactiveProperty::new(0u64);
    let mut watcher = prop.watch();

    prop.update(1);
    prop.update(2);
    prop.update(3);

    assert_eq!(watcher.changed().await, Ok(3));
    assert!(!watcher.has_changed());
    assert_eq!(prop.get_current(), Some(3));
}

#[tokio::test]
async fn empty_property_does_not_wake_watchers() {
    let prop = ReactiveProperty::<String>::empty();
    let mut watcher = prop.watch();
    assert_eq!(watcher.borrow(), None);

    let pending = timeout(Duration::from_millis(50), watcher.changed()).await;
    assert!(pending.is_err(), "没有值时不应被唤醒");

    prop.update("ready".to_string());
    assert_eq!(watcher.changed().await.as_deref(), Ok("ready"));
}

#[tokio::test]
async fn final_value_survives_writer_drop() {
    let prop = ReactiveProperty::new(0u32);
    let mut watcher = prop.watch();

    prop.update(41);
    prop.update(42);
    drop(prop);

    assert_eq!(watcher.changed().await, Ok(42));
    assert_eq!(watcher.changed().await, Err(ReactivePropertyError::Destroyed));
    assert!(!watcher.has_changed());
}

#[tokio::test]
async fn update_field_modifies_in_place() {
    let prop = ReactiveProperty::new(vec![1, 2]);
    let mut watcher = prop.watch();

    prop.update_field(|v| v.push(3));
    assert_eq!(watcher.changed().await, Ok(vec![1, 2, 3]));

    let empty = ReactiveProperty::<Vec<i32>>::empty();
    empty.update_field(|v| v.push(1));
    assert_eq!(empty.get_current(), None);
}

#[tokio::test]
async fn concurrent_reader_never_goes_backwards() {
    let prop = ReactiveProperty::new(0u64);
    let mut watcher = prop.watch();
    assert!(prop.is_watched());

    let reader = tokio::spawn(async move {
        let mut last = 0;
        while let Ok(v) = watcher.changed().await {
            assert!(v >= last);
            last = v;
        }
        last
    });

    for i in 1..=10_000u64 {
        prop.update(i);
        if i % 1000 == 0 {
            tokio::task::yield_now().await;
        }
    }
    drop(prop);

    assert_eq!(reader.await.unwrap(), 10_000);
}
